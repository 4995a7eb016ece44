use std::process;
use std::time::Duration;
use anyhow::Result;
use clap::{App, load_yaml};
use env_logger::Builder;
use jemallocator::Jemalloc;
use log::{debug, error, info, warn};
use log::LevelFilter::*;
use signal_hook::consts::{SIGINT, SIGTERM};
use ifmon::args::{Filter, opt};
use ifmon::link::{self, Monitor};
use ifmon::poll::{self, Poller, Timer};
use ifmon::signals::Signals;

#[global_allocator]
static ALLOC: Jemalloc = Jemalloc;

fn main() -> Result<()> {
    let yaml = load_yaml!("args.yml");
    let ver  = env!("CARGO_PKG_VERSION");
    let args = App::from_yaml(&yaml).version(ver).get_matches();

    let interval = opt(args.value_of("interval"))?.unwrap_or(0);
    let filter   = Filter::new(&args)?;

    let (module, level) = match args.occurrences_of("verbose") {
        0 => (Some(module_path!()), Info),
        1 => (Some(module_path!()), Debug),
        2 => (Some(module_path!()), Trace),
        _ => (None,                 Trace),
    };
    Builder::from_default_env().filter(module, level).init();

    info!("initializing ifmon {}", ver);

    if args.is_present("dump") {
        report(&filter);
    }

    let mut monitor = Monitor::new();
    monitor.init()?;

    let check = filter.clone();
    monitor.set_on_interface_state(move |index, name, state| {
        if check.check(name) {
            info!("link {} ({}) is {}", name, index, state);
        }
    });

    let mut signals = Signals::new(&[SIGINT, SIGTERM], || {
        info!("shutting down");
        process::exit(0);
    })?;

    let delay     = Duration::from_secs(interval.max(1));
    let mut timer = Timer::new(delay, || report(&filter));

    let mut poller = Poller::new();
    poller.add(&mut monitor);
    poller.add(&mut signals);

    if interval > 0 {
        poller.add(&mut timer);
    }

    if let Err(e) = poller.run() {
        error!("{:#}", e);
        process::exit(poll::status(&e));
    }

    Ok(())
}

fn report(filter: &Filter) {
    let links = match link::links() {
        Ok(links) => links,
        Err(e)    => {
            warn!("link dump failed: {:#}", e);
            return;
        }
    };

    let links = links.into_iter().filter(|l| filter.check(&l.name)).collect::<Vec<_>>();
    let up    = links.iter().filter(|l| l.state() == link::State::Up).count();

    info!("{} links, {} up", links.len(), up);

    for link in links {
        debug!("link {} ({}) is {}", link.name, link.index, link.state());
    }
}
