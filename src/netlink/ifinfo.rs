use super::{Attrs, IFLA_IFNAME, attr, attrs, message, u16_at, u32_at};

pub const LEN: usize = 16;

/// Fixed `ifinfomsg` header that opens every link message payload.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct IfInfo {
    pub family: u8,
    pub kind:   u16,
    pub index:  i32,
    pub flags:  u32,
    pub change: u32,
}

impl IfInfo {
    pub fn decode(payload: &[u8]) -> Option<Self> {
        Some(Self {
            family: *payload.get(0)?,
            kind:   u16_at(payload, 2)?,
            index:  u32_at(payload, 4)? as i32,
            flags:  u32_at(payload, 8)?,
            change: u32_at(payload, 12)?,
        })
    }

    pub fn attrs(payload: &[u8]) -> Attrs<'_> {
        attrs(payload.get(LEN..).unwrap_or(&[]))
    }

    pub fn name(payload: &[u8]) -> Option<&str> {
        Self::attrs(payload).find(|a| a.kind == IFLA_IFNAME)?.string()
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.push(self.family);
        buf.push(0);
        buf.extend_from_slice(&self.kind.to_ne_bytes());
        buf.extend_from_slice(&self.index.to_ne_bytes());
        buf.extend_from_slice(&self.flags.to_ne_bytes());
        buf.extend_from_slice(&self.change.to_ne_bytes());
    }

    pub fn encode_name(buf: &mut Vec<u8>, name: &str) {
        let mut data = name.as_bytes().to_vec();
        data.push(0);
        attr::encode(buf, IFLA_IFNAME, &data);
    }

    /// Complete netlink message carrying this header and an optional
    /// `IFLA_IFNAME` attribute.
    pub fn message(&self, kind: u16, flags: u16, seq: u32, name: Option<&str>) -> Vec<u8> {
        let mut payload = Vec::with_capacity(LEN + 20);
        self.encode(&mut payload);
        if let Some(name) = name {
            Self::encode_name(&mut payload, name);
        }

        let mut buf = Vec::with_capacity(payload.len() + message::HEADER);
        message::encode(&mut buf, kind, flags, seq, &payload);
        buf
    }
}
