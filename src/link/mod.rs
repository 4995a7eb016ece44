use std::fmt;

pub use links::{Link, dump, links};
pub use monitor::{Monitor, GROUPS};
pub use socket::Socket;

mod links;
mod monitor;
mod socket;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
    Up,
    Down,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Event {
    pub index: u32,
    pub name:  String,
    pub state: State,
}

impl Event {
    pub fn new(index: u32, name: &str, state: State) -> Self {
        Self { index, name: name.to_string(), state }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            State::Up   => write!(f, "up"),
            State::Down => write!(f, "down"),
        }
    }
}

#[cfg(test)]
mod test;
