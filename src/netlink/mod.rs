pub use attr::{Attr, Attrs, attrs};
pub use ifinfo::IfInfo;
pub use message::{Header, Message, Messages, messages};

pub mod attr;
pub mod ifinfo;
pub mod message;

pub const NLMSG_ALIGNTO: usize = 4;
pub const RTA_ALIGNTO:   usize = 4;

pub const NLMSG_ERROR: u16 = libc::NLMSG_ERROR as u16;
pub const NLMSG_DONE:  u16 = libc::NLMSG_DONE  as u16;

pub const RTM_NEWLINK: u16 = libc::RTM_NEWLINK;
pub const RTM_DELLINK: u16 = libc::RTM_DELLINK;
pub const RTM_GETLINK: u16 = libc::RTM_GETLINK;

pub const NLM_F_REQUEST: u16 = libc::NLM_F_REQUEST as u16;
pub const NLM_F_MULTI:   u16 = libc::NLM_F_MULTI   as u16;
pub const NLM_F_DUMP:    u16 = libc::NLM_F_DUMP    as u16;

pub const IFLA_IFNAME: u16 = 3;

pub const IFF_UP: u32 = libc::IFF_UP as u32;

pub fn align(len: usize, to: usize) -> usize {
    (len + to - 1) & !(to - 1)
}

fn u16_at(buf: &[u8], at: usize) -> Option<u16> {
    let bytes = buf.get(at..at + 2)?;
    Some(u16::from_ne_bytes([bytes[0], bytes[1]]))
}

fn u32_at(buf: &[u8], at: usize) -> Option<u32> {
    let bytes = buf.get(at..at + 4)?;
    Some(u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn pad(buf: &mut Vec<u8>, to: usize) {
    let len = align(buf.len(), to);
    buf.resize(len, 0);
}
