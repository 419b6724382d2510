extern crate prost;
extern crate reqwest;

use crate::config;
use crate::result;
use crate::transit_realtime;

use prost::Message;

const FETCH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

// The MTA feeds are free and no longer require API keys.
pub fn fetch_feed(config: &config::Config) -> result::SubsignResult<Vec<u8>> {
    debug!("Fetching {}", config.feed_url);
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()?;
    let response = client.get(&config.feed_url).send()?.error_for_status()?;
    let body = response.bytes()?;
    debug!("Feed response: {} bytes", body.len());
    return Ok(body.to_vec());
}

pub fn decode_feed(bytes: &[u8]) -> result::SubsignResult<transit_realtime::FeedMessage> {
    let feed = transit_realtime::FeedMessage::decode(bytes)?;
    return Ok(feed);
}
