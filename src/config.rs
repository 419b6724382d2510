extern crate anyhow;
extern crate getopts;

use crate::result;

use anyhow::Context;

pub const DEFAULT_FEED_URL: &str =
    "https://api-endpoint.mta.info/Dataservice/mtagtfsfeeds/nyct%2Fgtfs-g";
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_PAGE_INTERVAL_SECS: u64 = 4;
pub const DEFAULT_LCD_ADDRESS: u16 = 0x27; // change to 0x3f on some backpacks
pub const DEFAULT_TRAINS_PER_DIRECTION: usize = 2;
pub const DEFAULT_NORTH_STOP_ID: &str = "G22N";
pub const DEFAULT_SOUTH_STOP_ID: &str = "G22S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Static,
    Dynamic,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub feed_url: String,
    pub refresh_interval: std::time::Duration,
    pub page_interval: std::time::Duration,
    pub lcd_address: u16,
    pub trains_per_direction: usize,
    pub mode: DisplayMode,
    pub north_stop_id: String,
    pub south_stop_id: String,
    pub use_console: bool,
}

impl Config {
    pub fn from_matches(matches: &getopts::Matches) -> result::SubsignResult<Config> {
        let refresh_secs = parse_or_default(
            matches.opt_str("refresh-interval"),
            DEFAULT_REFRESH_INTERVAL_SECS,
            "refresh-interval")?;
        let page_secs = parse_or_default(
            matches.opt_str("page-interval"),
            DEFAULT_PAGE_INTERVAL_SECS,
            "page-interval")?;

        let lcd_address = match matches.opt_str("lcd-address") {
            Some(ref s) => parse_i2c_address(s)?,
            None => DEFAULT_LCD_ADDRESS,
        };

        let trains_per_direction = parse_or_default(
            matches.opt_str("num-trains"),
            DEFAULT_TRAINS_PER_DIRECTION,
            "num-trains")?;
        if trains_per_direction != 2 && trains_per_direction != 3 {
            return Err(result::make_error(&format!(
                "num-trains must be 2 or 3, got {}", trains_per_direction)));
        }

        let mode = match matches.opt_str("mode").as_deref() {
            None | Some("dynamic") => DisplayMode::Dynamic,
            Some("static") => DisplayMode::Static,
            Some(other) => {
                return Err(result::make_error(&format!(
                    "mode must be 'static' or 'dynamic', got '{}'", other)));
            },
        };

        return Ok(Config{
            feed_url: matches.opt_str("url")
                .unwrap_or_else(|| DEFAULT_FEED_URL.to_string()),
            refresh_interval: std::time::Duration::from_secs(refresh_secs),
            page_interval: std::time::Duration::from_secs(page_secs),
            lcd_address: lcd_address,
            trains_per_direction: trains_per_direction,
            mode: mode,
            north_stop_id: matches.opt_str("north-stop")
                .unwrap_or_else(|| DEFAULT_NORTH_STOP_ID.to_string()),
            south_stop_id: matches.opt_str("south-stop")
                .unwrap_or_else(|| DEFAULT_SOUTH_STOP_ID.to_string()),
            use_console: matches.opt_present("console"),
        });
    }
}

fn parse_or_default<T: std::str::FromStr>(
    opt: Option<String>, default: T, name: &str) -> result::SubsignResult<T>
    where T::Err: std::error::Error + Send + Sync + 'static {
    match opt {
        Some(s) => {
            let parsed = s.parse::<T>()
                .with_context(|| format!("invalid value for --{}: '{}'", name, s))?;
            return Ok(parsed);
        },
        None => return Ok(default),
    }
}

fn parse_i2c_address(s: &str) -> result::SubsignResult<u16> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    let addr = u16::from_str_radix(digits, 16)
        .with_context(|| format!("invalid I2C address '{}'", s))?;
    return Ok(addr);
}
