use anyhow::{Result, anyhow};
use log::trace;
use super::{NLMSG_ALIGNTO, NLMSG_DONE, NLMSG_ERROR, align, pad, u16_at, u32_at};

pub const HEADER: usize = 16;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Header {
    pub len:   u32,
    pub kind:  u16,
    pub flags: u16,
    pub seq:   u32,
    pub pid:   u32,
}

#[derive(Debug)]
pub struct Message<'a> {
    pub header:  Header,
    pub payload: &'a [u8],
}

/// Lazy walk over a buffer of netlink messages as returned by a single
/// datagram read. Iteration ends at `NLMSG_DONE`, at the end of the buffer,
/// or at the first record whose length is not self-consistent.
pub struct Messages<'a> {
    buf:  &'a [u8],
    done: bool,
}

pub fn messages(buf: &[u8]) -> Messages<'_> {
    Messages { buf, done: false }
}

impl Header {
    pub fn decode(buf: &[u8]) -> Option<Self> {
        Some(Self {
            len:   u32_at(buf, 0)?,
            kind:  u16_at(buf, 4)?,
            flags: u16_at(buf, 6)?,
            seq:   u32_at(buf, 8)?,
            pid:   u32_at(buf, 12)?,
        })
    }
}

impl<'a> Message<'a> {
    pub fn kind(&self) -> u16 {
        self.header.kind
    }

    /// For `NLMSG_ERROR` messages, the error carried in the payload or `Ok`
    /// when the message is an acknowledgement.
    pub fn error(&self) -> Option<Result<()>> {
        if self.header.kind != NLMSG_ERROR {
            return None;
        }

        let code = u32_at(self.payload, 0).map(|n| n as i32);

        Some(match code {
            Some(0)    => Ok(()),
            Some(code) => Err(anyhow!("netlink error: {}", errno::Errno(-code))),
            None       => Err(anyhow!("truncated netlink error message")),
        })
    }
}

impl<'a> Iterator for Messages<'a> {
    type Item = Message<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buf.is_empty() {
            return None;
        }

        let header = match Header::decode(self.buf) {
            Some(header) => header,
            None         => return self.stop("short header"),
        };

        let len = header.len as usize;
        if len < HEADER || len > self.buf.len() {
            return self.stop("invalid length");
        }

        if header.kind == NLMSG_DONE {
            self.buf  = &[];
            self.done = true;
            return None;
        }

        let payload = &self.buf[HEADER..len];
        let next    = align(len, NLMSG_ALIGNTO).min(self.buf.len());
        self.buf    = &self.buf[next..];

        Some(Message { header, payload })
    }
}

impl<'a> Messages<'a> {
    /// Whether iteration reached the `NLMSG_DONE` terminating a dump.
    pub fn done(&self) -> bool {
        self.done
    }

    fn stop(&mut self, why: &str) -> Option<Message<'a>> {
        trace!("dropping {} trailing bytes: {}", self.buf.len(), why);
        self.buf = &[];
        None
    }
}

pub fn encode(buf: &mut Vec<u8>, kind: u16, flags: u16, seq: u32, payload: &[u8]) {
    let len = (HEADER + payload.len()) as u32;
    buf.extend_from_slice(&len.to_ne_bytes());
    buf.extend_from_slice(&kind.to_ne_bytes());
    buf.extend_from_slice(&flags.to_ne_bytes());
    buf.extend_from_slice(&seq.to_ne_bytes());
    buf.extend_from_slice(&0u32.to_ne_bytes());
    buf.extend_from_slice(payload);
    pad(buf, NLMSG_ALIGNTO);
}
