use std::mem;
use std::ptr;
use std::time::Instant;
use anyhow::{Context, Result};
use errno::{Errno, errno};
use libc::{EINTR, POLLHUP, POLLIN, nfds_t, pollfd, sigset_t, timespec};
use log::{error, trace};
use super::{Data, Mask, Pollable};

pub struct Poller<'a> {
    pollables: Vec<&'a mut dyn Pollable>,
    fds:       Vec<pollfd>,
    index:     Vec<usize>,
}

impl<'a> Poller<'a> {
    pub fn new() -> Self {
        Self {
            pollables: Vec::new(),
            fds:       Vec::new(),
            index:     Vec::new(),
        }
    }

    pub fn add(&mut self, pollable: &'a mut dyn Pollable) {
        self.pollables.push(pollable);
    }

    /// All signals stay blocked except inside `ppoll`, which installs the
    /// previous mask while it waits, so only the wait is ever interrupted.
    pub fn run(&mut self) -> Result<()> {
        let mask = Mask::block()?;
        loop {
            self.turn(Some(&mask))?;
        }
    }

    pub fn turn(&mut self, mask: Option<&Mask>) -> Result<()> {
        self.fds.clear();
        self.index.clear();

        let mut deadline = None;

        for (n, pollable) in self.pollables.iter().enumerate() {
            let Data { fd, deadline: next } = pollable.data();

            if let Some(fd) = fd {
                self.fds.push(pollfd {
                    fd:      fd,
                    events:  POLLIN,
                    revents: 0,
                });
                self.index.push(n);
            }

            deadline = earliest(deadline, next);
        }

        let sigmask = mask.map(Mask::prev);

        match unsafe { wait(&mut self.fds, deadline, sigmask) } {
            Ok(_)                  => (),
            Err(e) if e.0 == EINTR => {
                trace!("poll interrupted");
                return Ok(());
            }
            Err(e)                 => {
                error!("polling failed: {}", e);
                return Err(e).context("polling failed");
            }
        }

        for (fd, &n) in self.fds.iter().zip(&self.index) {
            let pollable = &mut self.pollables[n];
            if fd.revents & POLLIN != 0 {
                pollable.on_read_available();
            }
            if fd.revents & POLLHUP != 0 {
                pollable.on_close();
            }
        }

        // after I/O so handlers can push their deadline back
        let now = Instant::now();

        for pollable in &mut self.pollables {
            match pollable.data().deadline {
                Some(deadline) if deadline <= now => pollable.on_timeout(),
                _                                 => (),
            }
        }

        Ok(())
    }
}

impl<'a> Default for Poller<'a> {
    fn default() -> Self {
        Self::new()
    }
}

fn earliest(a: Option<Instant>, b: Option<Instant>) -> Option<Instant> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None)          => a,
        (None, b)          => b,
    }
}

unsafe fn wait(fds: &mut [pollfd], deadline: Option<Instant>, mask: Option<&sigset_t>) -> Result<usize, Errno> {
    let mut ts: timespec = mem::zeroed();

    let timeout = match deadline {
        Some(deadline) => {
            let timeout = deadline.saturating_duration_since(Instant::now());
            ts.tv_sec  = timeout.as_secs()      as libc::time_t;
            ts.tv_nsec = timeout.subsec_nanos() as libc::c_long;
            &ts as *const timespec
        }
        None => ptr::null(),
    };

    let mask = mask.map_or(ptr::null(), |mask| mask as *const sigset_t);
    let nfds = fds.len() as nfds_t;

    match libc::ppoll(fds.as_mut_ptr(), nfds, timeout, mask) {
        -1 => Err(errno()),
         n => Ok(n as usize),
    }
}
