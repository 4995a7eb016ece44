use super::{RTA_ALIGNTO, align, pad, u16_at};

const HEADER: usize = 4;

#[derive(Debug)]
pub struct Attr<'a> {
    pub kind: u16,
    pub data: &'a [u8],
}

pub struct Attrs<'a> {
    buf: &'a [u8],
}

pub fn attrs(buf: &[u8]) -> Attrs<'_> {
    Attrs { buf }
}

impl<'a> Attr<'a> {
    pub fn string(&self) -> Option<&'a str> {
        let end = self.data.iter().position(|&b| b == 0).unwrap_or(self.data.len());
        std::str::from_utf8(&self.data[..end]).ok()
    }
}

impl<'a> Iterator for Attrs<'a> {
    type Item = Attr<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let len  = u16_at(self.buf, 0)? as usize;
        let kind = u16_at(self.buf, 2)?;

        if len < HEADER || len > self.buf.len() {
            self.buf = &[];
            return None;
        }

        let data = &self.buf[HEADER..len];
        let next = align(len, RTA_ALIGNTO).min(self.buf.len());
        self.buf = &self.buf[next..];

        Some(Attr { kind, data })
    }
}

pub fn encode(buf: &mut Vec<u8>, kind: u16, data: &[u8]) {
    let len = (HEADER + data.len()) as u16;
    buf.extend_from_slice(&len.to_ne_bytes());
    buf.extend_from_slice(&kind.to_ne_bytes());
    buf.extend_from_slice(data);
    pad(buf, RTA_ALIGNTO);
}
