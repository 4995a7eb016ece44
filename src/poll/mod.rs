use std::os::unix::io::RawFd;
use std::time::Instant;
use errno::Errno;

pub use mask::Mask;
pub use poller::Poller;
pub use timer::Timer;

mod mask;
mod poller;
mod timer;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Data {
    pub fd:       Option<RawFd>,
    pub deadline: Option<Instant>,
}

/// `on_timeout` fires on every poll cycle until the deadline is moved.
pub trait Pollable {
    fn data(&self) -> Data;
    fn on_read_available(&mut self);
    fn on_close(&mut self);
    fn on_timeout(&mut self);
}

/// Process exit status for a fatal reactor error: the errno when known.
pub fn status(e: &anyhow::Error) -> i32 {
    e.downcast_ref::<Errno>().map(|e| e.0).unwrap_or(1)
}
