use std::mem;
use std::ptr;
use anyhow::{Context, Result};
use errno::{Errno, errno};
use libc::{SIG_SETMASK, sigset_t};

/// Every signal blocked for the lifetime of the value; the previous mask
/// is put back on drop.
pub struct Mask {
    prev: sigset_t,
}

impl Mask {
    pub fn block() -> Result<Self> {
        unsafe {
            let mut all:  sigset_t = mem::zeroed();
            let mut prev: sigset_t = mem::zeroed();

            if libc::sigfillset(&mut all) != 0 {
                return Err(errno()).context("unable to fill signal set");
            }

            match libc::pthread_sigmask(SIG_SETMASK, &all, &mut prev) {
                0 => Ok(Self { prev }),
                e => Err(Errno(e)).context("unable to set signal mask"),
            }
        }
    }

    /// Mask in effect before `block`, installed only while waiting.
    pub fn prev(&self) -> &sigset_t {
        &self.prev
    }
}

impl Drop for Mask {
    fn drop(&mut self) {
        unsafe {
            libc::pthread_sigmask(SIG_SETMASK, &self.prev, ptr::null_mut());
        }
    }
}
