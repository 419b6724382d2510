extern crate chrono;
extern crate chrono_tz;

use crate::config;
use crate::feed;
use crate::result;
use crate::transit_realtime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrivalRecord {
    pub arrival_timestamp: i64,
    pub minutes_until: i64,
}

/// Holds the most recent extraction per direction. Replaced wholesale on
/// each successful fetch; a failed fetch leaves the previous (possibly
/// stale) arrivals in place rather than blanking the display.
pub struct TrainTracker {
    pub northbound: Vec<ArrivalRecord>,
    pub southbound: Vec<ArrivalRecord>,
    pub last_update: Option<chrono::DateTime<chrono::Utc>>,
}

impl TrainTracker {
    pub fn new() -> TrainTracker {
        return TrainTracker{
            northbound: vec![],
            southbound: vec![],
            last_update: None,
        };
    }

    pub fn refresh(&mut self, config: &config::Config) -> result::SubsignResult<()> {
        let bytes = feed::fetch_feed(config)?;
        let feed = feed::decode_feed(&bytes)?;
        let now = chrono::Utc::now();

        let (northbound, southbound) = extract(&feed, now.timestamp(), config);

        info!("Updated: {} northbound, {} southbound trains found",
              northbound.len(), southbound.len());
        if let Some(first) = northbound.first() {
            debug!("Next northbound: {} ({} min)",
                   clock_time(first.arrival_timestamp), first.minutes_until);
        }
        if let Some(first) = southbound.first() {
            debug!("Next southbound: {} ({} min)",
                   clock_time(first.arrival_timestamp), first.minutes_until);
        }

        self.northbound = northbound;
        self.southbound = southbound;
        self.last_update = Some(now);

        return Ok(());
    }
}

/// Pure function of (feed, now): walks trip updates, keeps the first
/// stop-time update per trip matching either configured stop id, and
/// returns (northbound, southbound) sorted ascending and truncated to the
/// configured count.
pub fn extract(feed: &transit_realtime::FeedMessage,
               now: i64,
               config: &config::Config)
               -> (Vec<ArrivalRecord>, Vec<ArrivalRecord>) {
    let mut northbound = vec![];
    let mut southbound = vec![];

    for entity in &feed.entity {
        let trip_update = match entity.trip_update {
            Some(ref trip_update) => trip_update,
            None => continue,
        };

        for stop in &trip_update.stop_time_update {
            let list;
            if stop.stop_id() == config.north_stop_id {
                list = &mut northbound;
            } else if stop.stop_id() == config.south_stop_id {
                list = &mut southbound;
            } else {
                continue;
            }

            if let Some(ref arrival) = stop.arrival {
                if let Some(arrival_ts) = arrival.time {
                    let minutes_until = (arrival_ts - now).div_euclid(60);
                    if minutes_until >= 0 {
                        list.push(ArrivalRecord{
                            arrival_timestamp: arrival_ts,
                            minutes_until: minutes_until,
                        });
                    }
                }
            }

            // A trip passes the station once per direction; only its first
            // matching stop-time update counts.
            break;
        }
    }

    northbound.sort_by_key(|record| record.arrival_timestamp);
    southbound.sort_by_key(|record| record.arrival_timestamp);
    northbound.truncate(config.trains_per_direction);
    southbound.truncate(config.trains_per_direction);

    return (northbound, southbound);
}

fn clock_time(ts: i64) -> String {
    use chrono::TimeZone;
    match chrono_tz::US::Eastern.timestamp_opt(ts, 0) {
        chrono::LocalResult::Single(t) => return t.format("%-I:%M").to_string(),
        _ => return "?".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transit_realtime::trip_update::{StopTimeEvent, StopTimeUpdate};
    use crate::transit_realtime::{
        FeedEntity, FeedHeader, FeedMessage, TripDescriptor, TripUpdate,
    };

    const NOW: i64 = 1_700_000_000;

    fn test_config() -> config::Config {
        return config::Config{
            feed_url: "http://example.com/feed".to_string(),
            refresh_interval: std::time::Duration::from_secs(30),
            page_interval: std::time::Duration::from_secs(4),
            lcd_address: 0x27,
            trains_per_direction: 2,
            mode: config::DisplayMode::Dynamic,
            north_stop_id: "G22N".to_string(),
            south_stop_id: "G22S".to_string(),
            use_console: true,
        };
    }

    fn stop_time(stop_id: &str, arrival_ts: Option<i64>) -> StopTimeUpdate {
        return StopTimeUpdate{
            stop_sequence: None,
            arrival: arrival_ts.map(|ts| StopTimeEvent{
                delay: None,
                time: Some(ts),
                uncertainty: None,
            }),
            departure: None,
            stop_id: Some(stop_id.to_string()),
        };
    }

    fn trip_entity(id: &str, stops: Vec<StopTimeUpdate>) -> FeedEntity {
        return FeedEntity{
            id: id.to_string(),
            is_deleted: None,
            trip_update: Some(TripUpdate{
                trip: TripDescriptor::default(),
                stop_time_update: stops,
                timestamp: None,
                delay: None,
            }),
        };
    }

    fn feed_of(entities: Vec<FeedEntity>) -> FeedMessage {
        return FeedMessage{
            header: FeedHeader{
                gtfs_realtime_version: "2.0".to_string(),
                incrementality: None,
                timestamp: Some(NOW as u64),
            },
            entity: entities,
        };
    }

    #[test]
    fn extracts_sorted_and_truncated() {
        let feed = feed_of(vec![
            trip_entity("1", vec![stop_time("G22N", Some(NOW + 900))]),
            trip_entity("2", vec![stop_time("G22N", Some(NOW + 120))]),
            trip_entity("3", vec![stop_time("G22N", Some(NOW + 540))]),
        ]);

        let (northbound, southbound) = extract(&feed, NOW, &test_config());

        assert!(southbound.is_empty());
        assert_eq!(northbound.len(), 2);
        assert_eq!(northbound[0].arrival_timestamp, NOW + 120);
        assert_eq!(northbound[0].minutes_until, 2);
        assert_eq!(northbound[1].arrival_timestamp, NOW + 540);
        assert_eq!(northbound[1].minutes_until, 9);
    }

    #[test]
    fn splits_directions() {
        let feed = feed_of(vec![
            trip_entity("1", vec![stop_time("G22N", Some(NOW + 60))]),
            trip_entity("2", vec![stop_time("G22S", Some(NOW + 300))]),
        ]);

        let (northbound, southbound) = extract(&feed, NOW, &test_config());

        assert_eq!(northbound.len(), 1);
        assert_eq!(southbound.len(), 1);
        assert_eq!(southbound[0].minutes_until, 5);
    }

    #[test]
    fn discards_past_arrivals() {
        let feed = feed_of(vec![
            trip_entity("1", vec![stop_time("G22N", Some(NOW - 300))]),
            // 30 seconds ago floors to -1 minute, not 0
            trip_entity("2", vec![stop_time("G22N", Some(NOW - 30))]),
            trip_entity("3", vec![stop_time("G22N", Some(NOW))]),
        ]);

        let (northbound, _) = extract(&feed, NOW, &test_config());

        assert_eq!(northbound.len(), 1);
        assert_eq!(northbound[0].arrival_timestamp, NOW);
        assert_eq!(northbound[0].minutes_until, 0);
    }

    #[test]
    fn minutes_until_floors() {
        let feed = feed_of(vec![
            trip_entity("1", vec![stop_time("G22N", Some(NOW + 7 * 60 + 30))]),
        ]);

        let (northbound, _) = extract(&feed, NOW, &test_config());

        assert_eq!(northbound[0].minutes_until, 7);
    }

    #[test]
    fn only_first_matching_stop_counts() {
        // The second G22N update belongs to a later loop of the same trip
        // and must be ignored.
        let feed = feed_of(vec![
            trip_entity("1", vec![
                stop_time("G26N", Some(NOW + 60)),
                stop_time("G22N", Some(NOW + 300)),
                stop_time("G22N", Some(NOW + 3000)),
            ]),
        ]);

        let (northbound, _) = extract(&feed, NOW, &test_config());

        assert_eq!(northbound.len(), 1);
        assert_eq!(northbound[0].arrival_timestamp, NOW + 300);
    }

    #[test]
    fn matching_stop_without_arrival_skips_trip() {
        let feed = feed_of(vec![
            trip_entity("1", vec![
                stop_time("G22N", None),
                stop_time("G22N", Some(NOW + 300)),
            ]),
        ]);

        let (northbound, _) = extract(&feed, NOW, &test_config());

        assert!(northbound.is_empty());
    }

    #[test]
    fn entity_without_trip_update_contributes_nothing() {
        let feed = feed_of(vec![
            FeedEntity{
                id: "1".to_string(),
                is_deleted: None,
                trip_update: None,
            },
        ]);

        let (northbound, southbound) = extract(&feed, NOW, &test_config());

        assert!(northbound.is_empty());
        assert!(southbound.is_empty());
    }

    #[test]
    fn extract_is_idempotent() {
        let feed = feed_of(vec![
            trip_entity("1", vec![stop_time("G22N", Some(NOW + 420))]),
            trip_entity("2", vec![stop_time("G22S", Some(NOW + 180))]),
        ]);

        let first = extract(&feed, NOW, &test_config());
        let second = extract(&feed, NOW, &test_config());

        assert_eq!(first, second);
    }

    #[test]
    fn fetch_failure_retains_prior_arrivals() {
        let mut config = test_config();
        // Discard port; connection refused without touching the network.
        config.feed_url = "http://127.0.0.1:9/feed".to_string();

        let mut tracker = TrainTracker::new();
        tracker.northbound = vec![
            ArrivalRecord{arrival_timestamp: NOW + 120, minutes_until: 2},
            ArrivalRecord{arrival_timestamp: NOW + 540, minutes_until: 9},
        ];
        tracker.southbound = vec![
            ArrivalRecord{arrival_timestamp: NOW + 300, minutes_until: 5},
        ];

        let result = tracker.refresh(&config);

        assert!(result.is_err());
        assert_eq!(tracker.northbound.len(), 2);
        assert_eq!(tracker.northbound[0].arrival_timestamp, NOW + 120);
        assert_eq!(tracker.southbound.len(), 1);
        assert_eq!(tracker.southbound[0].minutes_until, 5);
        assert!(tracker.last_update.is_none());
    }

    #[test]
    fn truncates_to_three_when_configured() {
        let mut config = test_config();
        config.trains_per_direction = 3;

        let feed = feed_of(vec![
            trip_entity("1", vec![stop_time("G22S", Some(NOW + 60))]),
            trip_entity("2", vec![stop_time("G22S", Some(NOW + 120))]),
            trip_entity("3", vec![stop_time("G22S", Some(NOW + 180))]),
            trip_entity("4", vec![stop_time("G22S", Some(NOW + 240))]),
        ]);

        let (_, southbound) = extract(&feed, NOW, &config);

        assert_eq!(southbound.len(), 3);
        assert_eq!(southbound[2].arrival_timestamp, NOW + 180);
    }
}
