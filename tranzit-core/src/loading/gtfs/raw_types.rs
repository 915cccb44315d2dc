//! Rows of the GTFS tables, as read from CSV

use serde::{Deserialize, Serialize};

use super::de::{deserialize_gtfs_date, deserialize_gtfs_time};
use crate::Time;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FeedStop {
    pub stop_id: String,
    pub stop_name: String,
    pub stop_lat: String,
    pub stop_lon: String,
    pub location_type: String,
    pub parent_station: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FeedRoute {
    pub route_id: String,
    pub agency_id: String,
    pub route_short_name: String,
    pub route_long_name: String,
    pub route_type: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FeedTrip {
    pub route_id: String,
    pub service_id: String,
    pub trip_id: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct FeedStopTime {
    pub trip_id: String,
    #[serde(deserialize_with = "deserialize_gtfs_time")]
    pub arrival_time: Option<Time>,
    #[serde(deserialize_with = "deserialize_gtfs_time")]
    pub departure_time: Option<Time>,
    pub stop_id: String,
    pub stop_sequence: u32,
}

/// Weekly service pattern of `calendar.txt`
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FeedCalendar {
    pub service_id: String,
    pub monday: String,
    pub tuesday: String,
    pub wednesday: String,
    pub thursday: String,
    pub friday: String,
    pub saturday: String,
    pub sunday: String,
    #[serde(deserialize_with = "deserialize_gtfs_date")]
    pub start_date: Option<chrono::NaiveDate>,
    #[serde(deserialize_with = "deserialize_gtfs_date")]
    pub end_date: Option<chrono::NaiveDate>,
}

/// Service exception of `calendar_dates.txt`: `1` adds service, `2` removes it
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FeedCalendarDate {
    pub service_id: String,
    #[serde(deserialize_with = "deserialize_gtfs_date")]
    pub date: Option<chrono::NaiveDate>,
    pub exception_type: String,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone)]
#[serde(default)]
#[allow(clippy::struct_field_names)]
pub struct FeedInfo {
    pub feed_publisher_name: String,
    pub feed_publisher_url: String,
    pub feed_lang: String,
    #[serde(deserialize_with = "deserialize_gtfs_date")]
    pub feed_start_date: Option<chrono::NaiveDate>,
    #[serde(deserialize_with = "deserialize_gtfs_date")]
    pub feed_end_date: Option<chrono::NaiveDate>,
    pub feed_version: String,
}
