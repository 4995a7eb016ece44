use std::cell::RefCell;
use std::os::unix::net::UnixDatagram;
use std::rc::Rc;
use std::time::{Duration, Instant};
use anyhow::{Result, anyhow};
use crate::netlink::{IFF_UP, IfInfo, NLM_F_MULTI, NLMSG_DONE, NLMSG_ERROR, RTM_DELLINK, RTM_NEWLINK};
use crate::netlink::message::encode;
use crate::os::ifname;
use crate::poll::{Data, Pollable, Poller};
use super::*;

type Events = Rc<RefCell<Vec<Event>>>;

fn monitor() -> Result<(Monitor, UnixDatagram, Events)> {
    let (a, b) = UnixDatagram::pair()?;

    let mut sock    = Some(Socket::from(a));
    let mut monitor = Monitor::with(move || sock.take().ok_or_else(|| anyhow!("no socket")));
    monitor.init()?;

    let events = Events::default();
    let record = events.clone();
    monitor.set_on_interface_state(move |index, name, state| {
        record.borrow_mut().push(Event::new(index, name, state));
    });

    Ok((monitor, b, events))
}

fn link(kind: u16, index: i32, flags: u32, change: u32, name: Option<&str>) -> Vec<u8> {
    let info = IfInfo { index, flags, change, ..IfInfo::default() };
    info.message(kind, 0, 0, name)
}

#[test]
fn link_up() -> Result<()> {
    let (mut monitor, peer, events) = monitor()?;

    peer.send(&link(RTM_NEWLINK, 3, IFF_UP, IFF_UP, Some("eth0")))?;
    monitor.on_read_available();

    assert_eq!(vec![Event::new(3, "eth0", State::Up)], *events.borrow());

    Ok(())
}

#[test]
fn link_down() -> Result<()> {
    let (mut monitor, peer, events) = monitor()?;

    peer.send(&link(RTM_NEWLINK, 3, 0, IFF_UP, Some("eth0")))?;
    monitor.on_read_available();

    assert_eq!(vec![Event::new(3, "eth0", State::Down)], *events.borrow());

    Ok(())
}

#[test]
fn unchanged_up_flag() -> Result<()> {
    let (mut monitor, peer, events) = monitor()?;

    peer.send(&link(RTM_NEWLINK, 3, IFF_UP, 0, Some("eth0")))?;
    peer.send(&link(RTM_NEWLINK, 3, IFF_UP, libc::IFF_PROMISC as u32, Some("eth0")))?;
    monitor.on_read_available();

    assert!(events.borrow().is_empty());

    Ok(())
}

#[test]
fn other_messages_ignored() -> Result<()> {
    let (mut monitor, peer, events) = monitor()?;

    peer.send(&link(RTM_DELLINK, 3, 0, IFF_UP, Some("eth0")))?;
    peer.send(&link(libc::RTM_NEWADDR, 3, IFF_UP, IFF_UP, None))?;
    monitor.on_read_available();

    assert!(events.borrow().is_empty());

    Ok(())
}

#[test]
fn drain_all_datagrams() -> Result<()> {
    let (mut monitor, peer, events) = monitor()?;

    for index in 1..=5 {
        peer.send(&link(RTM_NEWLINK, index, IFF_UP, IFF_UP, Some("veth")))?;
    }

    let mut batch = link(RTM_NEWLINK, 6, 0, IFF_UP, Some("wlan0"));
    batch.extend(link(RTM_NEWLINK, 7, IFF_UP, IFF_UP, Some("wlan1")));
    peer.send(&batch)?;

    monitor.on_read_available();

    let indexes = events.borrow().iter().map(|e| e.index).collect::<Vec<_>>();
    assert_eq!(vec![1, 2, 3, 4, 5, 6, 7], indexes);
    assert_eq!(State::Down, events.borrow()[5].state);

    Ok(())
}

#[test]
fn name_from_index() -> Result<()> {
    let (mut monitor, peer, events) = monitor()?;

    peer.send(&link(RTM_NEWLINK, 1, IFF_UP, IFF_UP, None))?;
    monitor.on_read_available();

    let name = ifname(1).unwrap_or_default();
    assert_eq!(vec![Event::new(1, &name, State::Up)], *events.borrow());

    Ok(())
}

#[test]
fn no_callback() -> Result<()> {
    let (a, b) = UnixDatagram::pair()?;

    let mut sock    = Some(Socket::from(a));
    let mut monitor = Monitor::with(move || sock.take().ok_or_else(|| anyhow!("no socket")));
    monitor.init()?;

    b.send(&link(RTM_NEWLINK, 3, IFF_UP, IFF_UP, Some("eth0")))?;
    monitor.on_read_available();

    Ok(())
}

#[test]
fn replace_callback() -> Result<()> {
    let (mut monitor, peer, events) = monitor()?;

    let replaced = Events::default();
    let record   = replaced.clone();
    monitor.set_on_interface_state(move |index, name, state| {
        record.borrow_mut().push(Event::new(index, name, state));
    });

    peer.send(&link(RTM_NEWLINK, 3, IFF_UP, IFF_UP, Some("eth0")))?;
    monitor.on_read_available();

    assert!(events.borrow().is_empty());
    assert_eq!(1, replaced.borrow().len());

    Ok(())
}

#[test]
fn init_twice() -> Result<()> {
    let (mut monitor, _peer, _) = monitor()?;
    assert!(monitor.init().is_err());
    assert!(monitor.data().fd.is_some());
    assert_eq!(None, monitor.data().deadline);
    Ok(())
}

#[test]
fn reopen_on_close() -> Result<()> {
    let mut peers   = Vec::new();
    let mut monitor = Monitor::with(move || {
        let (a, b) = UnixDatagram::pair()?;
        peers.push(b);
        Ok(Socket::from(a))
    });
    monitor.init()?;

    let before = monitor.data().fd;
    monitor.on_close();
    let after  = monitor.data().fd;

    assert!(before.is_some());
    assert!(after.is_some());

    Ok(())
}

#[test]
fn reopen_failure() -> Result<()> {
    let (mut monitor, _peer, events) = monitor()?;

    monitor.on_close();
    assert_eq!(None, monitor.data().fd);

    monitor.on_read_available();
    monitor.on_timeout();
    assert!(events.borrow().is_empty());

    Ok(())
}

struct Once {
    deadline: Option<Instant>,
    fired:    Rc<RefCell<Vec<Instant>>>,
}

impl Pollable for Once {
    fn data(&self) -> Data {
        Data {
            fd:       None,
            deadline: self.deadline,
        }
    }

    fn on_read_available(&mut self) {
    }

    fn on_close(&mut self) {
    }

    fn on_timeout(&mut self) {
        self.fired.borrow_mut().push(Instant::now());
        self.deadline = None;
    }
}

#[test]
fn monitor_and_timer() -> Result<()> {
    let (mut monitor, peer, events) = monitor()?;

    let deadline  = Instant::now() + Duration::from_millis(100);
    let fired     = Rc::new(RefCell::new(Vec::new()));
    let mut timer = Once { deadline: Some(deadline), fired: fired.clone() };

    peer.send(&link(RTM_NEWLINK, 3, IFF_UP, IFF_UP, Some("eth0")))?;

    {
        let mut poller = Poller::new();
        poller.add(&mut monitor);
        poller.add(&mut timer);
        while fired.borrow().is_empty() {
            poller.turn(None)?;
        }
    }

    assert_eq!(vec![Event::new(3, "eth0", State::Up)], *events.borrow());
    assert_eq!(1, fired.borrow().len());
    assert!(fired.borrow()[0] >= deadline);

    Ok(())
}

#[test]
fn dump_until_done() -> Result<()> {
    let (a, b) = UnixDatagram::pair()?;
    let sock   = Socket::from(a);

    let mut first = link(RTM_NEWLINK, 1, IFF_UP, 0, Some("lo"));
    first.extend(link(RTM_NEWLINK, 2, 0, 0, Some("eth0")));
    b.send(&first)?;

    let mut last = link(RTM_NEWLINK, 3, IFF_UP, 0, Some("wlan0"));
    encode(&mut last, NLMSG_DONE, NLM_F_MULTI, 1, &0u32.to_ne_bytes());
    b.send(&last)?;

    b.send(&link(RTM_NEWLINK, 4, IFF_UP, 0, Some("late0")))?;

    let links = dump(&sock)?;
    let names = links.iter().map(|l| l.name.as_str()).collect::<Vec<_>>();

    assert_eq!(vec!["lo", "eth0", "wlan0"], names);
    assert_eq!(State::Up,   links[0].state());
    assert_eq!(State::Down, links[1].state());
    assert_eq!(3, links[2].index);

    Ok(())
}

#[test]
fn dump_error() -> Result<()> {
    let (a, b) = UnixDatagram::pair()?;
    let sock   = Socket::from(a);

    let mut buf = link(RTM_NEWLINK, 1, IFF_UP, 0, Some("lo"));
    encode(&mut buf, NLMSG_ERROR, 0, 1, &(-libc::EPERM).to_ne_bytes());
    b.send(&buf)?;

    assert!(dump(&sock).is_err());

    let mut ack = Vec::new();
    encode(&mut ack, NLMSG_ERROR, 0, 1, &0i32.to_ne_bytes());
    b.send(&ack)?;

    assert!(dump(&sock)?.is_empty());

    Ok(())
}

#[test]
fn kernel_links() -> Result<()> {
    let links = links()?;

    let lo = links.iter().find(|l| l.index == 1).ok_or_else(|| anyhow!("no link at index 1"))?;
    assert_ne!(0, lo.flags & libc::IFF_LOOPBACK as u32);
    assert!(!lo.name.is_empty());

    Ok(())
}

#[test]
fn kernel_monitor() -> Result<()> {
    let mut monitor = Monitor::new();
    assert_eq!(None, monitor.data().fd);

    monitor.init()?;
    assert!(monitor.data().fd.is_some());

    monitor.on_close();
    assert!(monitor.data().fd.is_some());

    monitor.on_read_available();

    Ok(())
}
