extern crate anyhow;
extern crate chrono;
extern crate chrono_tz;
extern crate flexi_logger;
extern crate getopts;
#[macro_use]
extern crate log;
extern crate nix;
extern crate prost;
extern crate reqwest;
extern crate rppal;

mod arrivals;
mod config;
mod feed;
mod layout;
mod result;
mod screen;

pub mod transit_realtime {
    include!(concat!(env!("OUT_DIR"), "/transit_realtime.rs"));
}

use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

const FETCH_BACKOFF: std::time::Duration = std::time::Duration::from_secs(5);
const STATIC_TICK: std::time::Duration = std::time::Duration::from_secs(1);
const SHUTDOWN_POLL: std::time::Duration = std::time::Duration::from_millis(250);

extern "C" fn handle_shutdown_signal(_signal: nix::libc::c_int) {
    SHUTDOWN.store(true, Ordering::SeqCst);
}

fn install_signal_handlers() {
    use nix::sys::signal;

    let action = signal::SigAction::new(
        signal::SigHandler::Handler(handle_shutdown_signal),
        signal::SaFlags::empty(),
        signal::SigSet::empty());
    unsafe {
        signal::sigaction(signal::Signal::SIGINT, &action)
            .expect("install SIGINT handler");
        signal::sigaction(signal::Signal::SIGTERM, &action)
            .expect("install SIGTERM handler");
    }
}

/// Sleeps in short ticks so a termination signal is noticed promptly.
/// Returns true if shutdown was requested during the sleep.
fn sleep_checking_shutdown(duration: std::time::Duration) -> bool {
    let deadline = std::time::Instant::now() + duration;
    loop {
        if SHUTDOWN.load(Ordering::SeqCst) {
            return true;
        }
        let now = std::time::Instant::now();
        if now >= deadline {
            return false;
        }
        std::thread::sleep(std::cmp::min(deadline - now, SHUTDOWN_POLL));
    }
}

fn run(config: &config::Config, screen: &mut dyn screen::Screen) -> result::SubsignResult<()> {
    let mut tracker = arrivals::TrainTracker::new();

    screen.render("G Train Display", "Starting...")?;
    screen.render("Fetching train", "data...")?;

    let mut last_fetch: Option<std::time::Instant> = None;
    match tracker.refresh(config) {
        Ok(()) => {
            last_fetch = Some(std::time::Instant::now());
        },
        Err(err) => {
            error!("Initial fetch failed: {}", err);
            screen.render("Network Error", "Check WiFi")?;
            sleep_checking_shutdown(FETCH_BACKOFF);
        },
    }

    while !SHUTDOWN.load(Ordering::SeqCst) {
        let due = match last_fetch {
            Some(at) => at.elapsed() >= config.refresh_interval,
            None => true,
        };
        if due {
            debug!("Refreshing train data");
            match tracker.refresh(config) {
                Ok(()) => {
                    last_fetch = Some(std::time::Instant::now());
                },
                Err(err) => {
                    error!("Fetch failed: {}", err);
                    if let Some(at) = tracker.last_update {
                        warn!("Displaying stale data from {}", at.format("%H:%M:%S"));
                    }
                    // Back off and retry without advancing the display.
                    if sleep_checking_shutdown(FETCH_BACKOFF) {
                        break;
                    }
                    continue;
                },
            }
        }

        match config.mode {
            config::DisplayMode::Static => {
                let (line1, line2) = layout::static_screen(
                    &tracker.northbound, &tracker.southbound);
                screen.render(&line1, &line2)?;
                if sleep_checking_shutdown(STATIC_TICK) {
                    break;
                }
            },
            config::DisplayMode::Dynamic => {
                let mut interrupted = false;
                for (line1, line2) in layout::dynamic_pages(
                        &tracker.northbound, &tracker.southbound) {
                    screen.render(&line1, &line2)?;
                    if sleep_checking_shutdown(config.page_interval) {
                        interrupted = true;
                        break;
                    }
                }
                if interrupted {
                    break;
                }
            },
        }
    }

    info!("Shutting down");
    screen.render("G Train Display", "Stopped")?;
    std::thread::sleep(std::time::Duration::from_secs(1));
    screen.cleanup()?;

    return Ok(());
}

fn main() {
    let _logger = flexi_logger::Logger::try_with_env_or_str("info")
        .expect("bad log spec")
        .start()
        .expect("start logger");

    let args: Vec<String> = std::env::args().collect();
    let mut opts = getopts::Options::new();
    opts.optflag("h", "help", "print this help");
    opts.optflag("c", "console", "render to the console instead of the LCD");
    opts.optopt("u", "url", "GTFS-realtime feed URL", "URL");
    opts.optopt("r", "refresh-interval", "seconds between feed fetches", "SECONDS");
    opts.optopt("p", "page-interval", "seconds each page is shown", "SECONDS");
    opts.optopt("a", "lcd-address", "I2C address of the LCD backpack", "HEX");
    opts.optopt("n", "num-trains", "trains tracked per direction (2 or 3)", "COUNT");
    opts.optopt("m", "mode", "display mode: static or dynamic", "MODE");
    opts.optopt("", "north-stop", "northbound stop id", "STOP_ID");
    opts.optopt("", "south-stop", "southbound stop id", "STOP_ID");

    let matches = opts.parse(&args[1..]).expect("parse opts");
    if matches.opt_present("help") {
        print!("{}", opts.usage("Usage: subsign [options]"));
        return;
    }

    let config = match config::Config::from_matches(&matches) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(2);
        },
    };

    install_signal_handlers();

    info!("G Train Display - stops {}/{}",
          config.north_stop_id, config.south_stop_id);
    info!("Refresh interval: {}s, page interval: {}s",
          config.refresh_interval.as_secs(), config.page_interval.as_secs());

    let mut screen = match screen::create_screen(&config) {
        Ok(screen) => screen,
        Err(err) => {
            error!("Error initializing LCD: {}", err);
            error!("Make sure I2C is enabled: sudo raspi-config");
            error!("Check wiring and I2C address: sudo i2cdetect -y 1");
            std::process::exit(1);
        },
    };

    match run(&config, screen.as_mut()) {
        Ok(()) => info!("Goodbye!"),
        Err(err) => {
            error!("{}", err);
            let _ = screen.cleanup();
            std::process::exit(1);
        },
    }
}
