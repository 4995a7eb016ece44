pub mod args;
pub mod link;
pub mod netlink;
pub mod os;
pub mod poll;
pub mod signals;
