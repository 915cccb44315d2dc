use geo::Point;
use serde::Serialize;

use crate::loading::gtfs::FeedInfo;

/// Seconds since midnight of the service day
pub type Time = u32;
/// Index of a stop in `PublicTransitData::stops`
pub type RaptorStopId = usize;
/// Index of a route in `PublicTransitData::routes`
pub type RouteId = usize;

/// Transit stop
#[derive(Debug, Clone)]
pub struct Stop {
    /// GTFS `stop_id`
    pub stop_id: String,
    pub geometry: Point<f64>,
    /// Offset into `PublicTransitData::stop_routes`
    pub routes_start: usize,
    pub routes_len: usize,
    /// Offset into `PublicTransitData::transfers`
    pub transfers_start: usize,
    pub transfers_len: usize,
}

impl Stop {
    pub fn new(stop_id: impl Into<String>, geometry: Point<f64>) -> Self {
        Self {
            stop_id: stop_id.into(),
            geometry,
            routes_start: 0,
            routes_len: 0,
            transfers_start: 0,
            transfers_len: 0,
        }
    }
}

/// RAPTOR route: one stop pattern whose trips never overtake each other.
///
/// Trips are stored row by row in `PublicTransitData::stop_times`,
/// `num_stops` entries per trip, ordered by departure.
#[derive(Debug, Clone)]
pub struct Route {
    /// GTFS `route_id` this pattern belongs to
    pub route_id: String,
    pub num_trips: usize,
    pub num_stops: usize,
    pub stops_start: usize,
    pub trips_start: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StopTime {
    pub arrival: Time,
    pub departure: Time,
}

impl StopTime {
    pub fn new(arrival: Time, departure: Time) -> Self {
        Self { arrival, departure }
    }
}

/// Walking connection between two stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub target_stop: RaptorStopId,
    pub duration: Time,
}

/// A trip as handed over by a loader, before it is grouped into routes
#[derive(Debug, Clone)]
pub struct ScheduledTrip {
    /// GTFS `route_id`
    pub route_id: String,
    pub stop_times: Vec<(RaptorStopId, StopTime)>,
}

/// Metadata for feeds
#[derive(Debug, Clone, Serialize)]
pub struct FeedMeta {
    pub feed_info: FeedInfo,
}
