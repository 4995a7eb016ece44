use std::io::{ErrorKind, Read};
use std::os::raw::c_int;
use std::os::unix::io::AsRawFd;
use std::os::unix::net::UnixStream;
use anyhow::Result;
use log::{debug, warn};
use signal_hook::SigId;
use signal_hook::low_level::{pipe, unregister};
use crate::poll::{Data, Pollable};

/// Pollable self-pipe that runs `handler` once per batch of delivered
/// signals.
pub struct Signals<F> {
    rx:      UnixStream,
    ids:     Vec<SigId>,
    handler: F,
}

impl<F: FnMut()> Signals<F> {
    pub fn new(signals: &[c_int], handler: F) -> Result<Self> {
        let (rx, tx) = UnixStream::pair()?;
        rx.set_nonblocking(true)?;
        tx.set_nonblocking(true)?;

        let ids = signals.iter().map(|&signal| {
            Ok(pipe::register(signal, tx.try_clone()?)?)
        }).collect::<Result<Vec<_>>>()?;

        Ok(Self { rx, ids, handler })
    }
}

impl<F: FnMut()> Pollable for Signals<F> {
    fn data(&self) -> Data {
        Data {
            fd:       Some(self.rx.as_raw_fd()),
            deadline: None,
        }
    }

    fn on_read_available(&mut self) {
        let mut buf   = [0u8; 64];
        let mut count = 0;

        loop {
            match (&self.rx).read(&mut buf) {
                Ok(0)                                       => break,
                Ok(n)                                       => count += n,
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e)                                      => {
                    warn!("signal pipe read failed: {}", e);
                    break;
                }
            }
        }

        if count > 0 {
            debug!("{} signals delivered", count);
            (self.handler)();
        }
    }

    fn on_close(&mut self) {
        warn!("signal pipe closed");
    }

    fn on_timeout(&mut self) {
    }
}

impl<F> Drop for Signals<F> {
    fn drop(&mut self) {
        for id in self.ids.drain(..) {
            unregister(id);
        }
    }
}
