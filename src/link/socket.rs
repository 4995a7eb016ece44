use std::mem;
use std::os::raw::{c_int, c_void};
use std::os::unix::io::{AsRawFd, IntoRawFd, RawFd};
use std::os::unix::net::UnixDatagram;
use anyhow::{Context, Result};
use errno::errno;
use libc::{AF_NETLINK, EAGAIN, EWOULDBLOCK, NETLINK_ROUTE, SOCK_CLOEXEC, SOCK_DGRAM};
use libc::sockaddr_nl;

/// Owned datagram socket descriptor, closed on drop.
#[derive(Debug)]
pub struct Socket {
    fd: RawFd,
}

impl Socket {
    /// Routing netlink socket bound to the multicast `groups` bitmask.
    pub fn route(groups: u32) -> Result<Self> {
        let fd = unsafe { libc::socket(AF_NETLINK, SOCK_DGRAM | SOCK_CLOEXEC, NETLINK_ROUTE) };
        if fd == -1 {
            return Err(errno()).context("failed to open netlink socket");
        }

        let sock = Self { fd };

        let mut addr: sockaddr_nl = unsafe { mem::zeroed() };
        addr.nl_family = AF_NETLINK as u16;
        addr.nl_groups = groups;

        let ptr = &addr as *const sockaddr_nl as *const libc::sockaddr;
        let len = mem::size_of::<sockaddr_nl>() as libc::socklen_t;

        match unsafe { libc::bind(sock.fd, ptr, len) } {
            0 => Ok(sock),
            _ => Err(errno()).context("failed to bind netlink socket"),
        }
    }

    /// Receive one datagram. `Ok(None)` means the read would block.
    pub fn recv(&self, buf: &mut [u8], flags: c_int) -> Result<Option<usize>> {
        let ptr = buf.as_mut_ptr() as *mut c_void;
        match unsafe { libc::recv(self.fd, ptr, buf.len(), flags) } {
            -1 => match errno() {
                e if e.0 == EAGAIN || e.0 == EWOULDBLOCK => Ok(None),
                e                                        => Err(e).context("receive failed"),
            },
            n => Ok(Some(n as usize)),
        }
    }

    pub fn send(&self, buf: &[u8]) -> Result<usize> {
        let ptr = buf.as_ptr() as *const c_void;
        match unsafe { libc::send(self.fd, ptr, buf.len(), 0) } {
            -1 => Err(errno()).context("send failed"),
            n  => Ok(n as usize),
        }
    }
}

impl AsRawFd for Socket {
    fn as_raw_fd(&self) -> RawFd {
        self.fd
    }
}

impl From<UnixDatagram> for Socket {
    fn from(sock: UnixDatagram) -> Self {
        Self { fd: sock.into_raw_fd() }
    }
}

impl Drop for Socket {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}
