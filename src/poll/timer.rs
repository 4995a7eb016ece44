use std::time::{Duration, Instant};
use super::{Data, Pollable};

/// Deadline-only pollable running `task` every `delay`.
pub struct Timer<F> {
    delay: Duration,
    next:  Instant,
    task:  F,
}

impl<F: FnMut()> Timer<F> {
    pub fn new(delay: Duration, task: F) -> Self {
        Timer {
            delay: delay,
            next:  Instant::now() + delay,
            task:  task,
        }
    }

    pub fn ready(&mut self, now: Instant) -> bool {
        if self.next <= now {
            self.next = now + self.delay;
            true
        } else {
            false
        }
    }
}

impl<F: FnMut()> Pollable for Timer<F> {
    fn data(&self) -> Data {
        Data {
            fd:       None,
            deadline: Some(self.next),
        }
    }

    fn on_read_available(&mut self) {
    }

    fn on_close(&mut self) {
    }

    fn on_timeout(&mut self) {
        if self.ready(Instant::now()) {
            (self.task)();
        }
    }
}
