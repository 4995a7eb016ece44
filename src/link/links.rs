use anyhow::Result;
use libc::AF_UNSPEC;
use crate::netlink::{IFF_UP, IfInfo, NLM_F_DUMP, NLM_F_REQUEST, RTM_GETLINK, RTM_NEWLINK, messages};
use super::{Socket, State};

const BUFFER_SIZE: usize = 32768;

#[derive(Debug, Default)]
pub struct Link {
    pub index: u32,
    pub name:  String,
    pub flags: u32,
}

impl Link {
    pub fn state(&self) -> State {
        match self.flags & IFF_UP {
            0 => State::Down,
            _ => State::Up,
        }
    }
}

/// Dump every link known to the kernel over a fresh routing socket.
pub fn links() -> Result<Vec<Link>> {
    let sock = Socket::route(0)?;

    let req = IfInfo {
        family: AF_UNSPEC as u8,
        ..IfInfo::default()
    };
    sock.send(&req.message(RTM_GETLINK, NLM_F_REQUEST | NLM_F_DUMP, 1, None))?;

    dump(&sock)
}

pub fn dump(sock: &Socket) -> Result<Vec<Link>> {
    let mut buf   = vec![0u8; BUFFER_SIZE];
    let mut links = Vec::new();

    while let Some(n) = sock.recv(&mut buf, 0)? {
        let mut msgs = messages(&buf[..n]);

        for msg in &mut msgs {
            if let Some(result) = msg.error() {
                result?;
                return Ok(links);
            }

            if msg.kind() != RTM_NEWLINK {
                continue;
            }

            if let Some(info) = IfInfo::decode(msg.payload) {
                links.push(Link {
                    index: info.index as u32,
                    name:  IfInfo::name(msg.payload).unwrap_or_default().to_string(),
                    flags: info.flags,
                });
            }
        }

        if msgs.done() || n == 0 {
            break;
        }
    }

    Ok(links)
}
