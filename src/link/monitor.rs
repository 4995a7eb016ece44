use std::os::unix::io::AsRawFd;
use anyhow::{Result, anyhow};
use libc::MSG_DONTWAIT;
use log::{debug, error, trace};
use crate::netlink::{IFF_UP, IfInfo, Message, RTM_NEWLINK, messages};
use crate::os::ifname;
use crate::poll::{Data, Pollable};
use super::{Socket, State};

pub const GROUPS: u32 = (libc::RTMGRP_LINK | libc::RTMGRP_IPV4_IFADDR | libc::RTMGRP_IPV6_IFADDR) as u32;

const BUFFER_SIZE: usize = 32768;

type Open     = Box<dyn FnMut() -> Result<Socket>>;
type Callback = Box<dyn FnMut(u32, &str, State)>;

/// Best effort: messages dropped on socket buffer overflow are not noticed.
pub struct Monitor {
    sock:     Option<Socket>,
    open:     Open,
    callback: Option<Callback>,
    buf:      Vec<u8>,
}

impl Monitor {
    pub fn new() -> Self {
        Self::with(|| Socket::route(GROUPS))
    }

    /// The sender is not checked to be a `sockaddr_nl`, so `open` may
    /// return any datagram socket.
    pub fn with<F: FnMut() -> Result<Socket> + 'static>(open: F) -> Self {
        Self {
            sock:     None,
            open:     Box::new(open),
            callback: None,
            buf:      vec![0; BUFFER_SIZE],
        }
    }

    pub fn init(&mut self) -> Result<()> {
        self.open()
    }

    pub fn set_on_interface_state<F: FnMut(u32, &str, State) + 'static>(&mut self, callback: F) {
        self.callback = Some(Box::new(callback));
    }

    fn open(&mut self) -> Result<()> {
        if self.sock.is_some() {
            return Err(anyhow!("monitor already initialized"));
        }
        self.sock = Some((self.open)()?);
        Ok(())
    }

    fn close(&mut self) {
        self.sock = None;
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new()
    }
}

impl Pollable for Monitor {
    fn data(&self) -> Data {
        Data {
            fd:       self.sock.as_ref().map(Socket::as_raw_fd),
            deadline: None,
        }
    }

    fn on_read_available(&mut self) {
        let sock = match &self.sock {
            Some(sock) => sock,
            None       => return,
        };

        loop {
            let n = match sock.recv(&mut self.buf, MSG_DONTWAIT) {
                Ok(Some(n)) if n > 0 => n,
                Ok(_)                => return,
                Err(e)               => {
                    error!("monitor {:#}", e);
                    return;
                }
            };

            for msg in messages(&self.buf[..n]) {
                match msg.kind() {
                    RTM_NEWLINK => new_link(&mut self.callback, &msg),
                    kind        => trace!("ignoring message type {}", kind),
                }
            }
        }
    }

    fn on_close(&mut self) {
        debug!("monitor socket closed, reopening");
        self.close();
        if let Err(e) = self.open() {
            error!("{:#}", e);
        }
    }

    fn on_timeout(&mut self) {
    }
}

fn new_link(callback: &mut Option<Callback>, msg: &Message<'_>) {
    let callback = match callback {
        Some(callback) => callback,
        None           => return,
    };

    let info = match IfInfo::decode(msg.payload) {
        Some(info) => info,
        None       => {
            debug!("short link message");
            return;
        }
    };

    if info.change & IFF_UP == 0 {
        return;
    }

    let index = info.index as u32;
    let name  = match IfInfo::name(msg.payload) {
        Some(name) => name.to_string(),
        None       => ifname(index).unwrap_or_default(),
    };

    let state = match info.flags & IFF_UP {
        0 => State::Down,
        _ => State::Up,
    };

    debug!("link {} ({}) {}", name, index, state);

    callback(index, &name, state);
}
