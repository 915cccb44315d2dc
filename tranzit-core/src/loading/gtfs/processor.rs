use chrono::{Datelike, NaiveDate, Weekday};
use geo::Point;
use hashbrown::{HashMap, HashSet};
use log::{info, warn};

use super::parser::{deserialize_gtfs_file, deserialize_optional_gtfs_file};
use super::raw_types::{
    FeedCalendar, FeedCalendarDate, FeedInfo, FeedRoute, FeedStop, FeedStopTime, FeedTrip,
};
use crate::loading::config::TransitModelConfig;
use crate::model::{FeedMeta, PublicTransitData, RaptorStopId, ScheduledTrip, Stop, StopTime};
use crate::Error;

#[derive(Default)]
struct RawFeed {
    stops: Vec<FeedStop>,
    routes: Vec<FeedRoute>,
    trips: Vec<FeedTrip>,
    stop_times: Vec<FeedStopTime>,
    calendars: Vec<FeedCalendar>,
    calendar_dates: Vec<FeedCalendarDate>,
    feed_info: Vec<FeedInfo>,
}

/// Create public transit data model from GTFS files
///
/// # Errors
///
/// `IoError` when a required table is missing, `NoActiveTrips` when no trip
/// runs on the configured date.
pub fn transit_model_from_gtfs(config: &TransitModelConfig) -> Result<PublicTransitData, Error> {
    let raw = load_raw_feed(config)?;
    info!(
        "Read {} stops, {} routes, {} trips and {} stop times",
        raw.stops.len(),
        raw.routes.len(),
        raw.trips.len(),
        raw.stop_times.len()
    );

    let feeds_meta = raw
        .feed_info
        .into_iter()
        .map(|feed_info| FeedMeta { feed_info })
        .collect::<Vec<_>>();

    let active_trips = filter_trips_by_service_day(
        config.date,
        &raw.calendars,
        &raw.calendar_dates,
        raw.trips,
    );
    warn_unknown_routes(&raw.routes, &active_trips);

    let (stops, stop_id_map) = create_stops_vector(raw.stops);
    let trips = build_scheduled_trips(&stop_id_map, &active_trips, raw.stop_times);

    if trips.is_empty() {
        return Err(Error::NoActiveTrips);
    }
    info!("{} trips are active", trips.len());

    PublicTransitData::from_trips(stops, trips, feeds_meta)
}

fn load_raw_feed(config: &TransitModelConfig) -> Result<RawFeed, Error> {
    let mut raw = RawFeed::default();

    for dir in &config.gtfs_dirs {
        raw.stops.extend(deserialize_gtfs_file(&dir.join("stops.txt"))?);
        raw.routes.extend(deserialize_gtfs_file(&dir.join("routes.txt"))?);
        raw.trips.extend(deserialize_gtfs_file(&dir.join("trips.txt"))?);
        raw.stop_times
            .extend(deserialize_gtfs_file(&dir.join("stop_times.txt"))?);
        raw.calendars
            .extend(deserialize_optional_gtfs_file(&dir.join("calendar.txt"))?);
        raw.calendar_dates
            .extend(deserialize_optional_gtfs_file(&dir.join("calendar_dates.txt"))?);
        raw.feed_info
            .extend(deserialize_optional_gtfs_file(&dir.join("feed_info.txt"))?);
    }

    raw.stop_times.shrink_to_fit();
    Ok(raw)
}

/// Services running on `date`: the weekly calendar first, then the
/// `calendar_dates` exceptions on top of it
fn active_services<'a>(
    date: NaiveDate,
    calendars: &'a [FeedCalendar],
    calendar_dates: &'a [FeedCalendarDate],
) -> HashSet<&'a str> {
    let mut active: HashSet<&str> = calendars
        .iter()
        .filter(|calendar| {
            let in_range = calendar.start_date.is_none_or(|start| start <= date)
                && calendar.end_date.is_none_or(|end| date <= end);
            let flag = match date.weekday() {
                Weekday::Mon => &calendar.monday,
                Weekday::Tue => &calendar.tuesday,
                Weekday::Wed => &calendar.wednesday,
                Weekday::Thu => &calendar.thursday,
                Weekday::Fri => &calendar.friday,
                Weekday::Sat => &calendar.saturday,
                Weekday::Sun => &calendar.sunday,
            };
            in_range && flag == "1"
        })
        .map(|calendar| calendar.service_id.as_str())
        .collect();

    for exception in calendar_dates
        .iter()
        .filter(|exception| exception.date == Some(date))
    {
        match exception.exception_type.as_str() {
            "1" => {
                active.insert(exception.service_id.as_str());
            }
            "2" => {
                active.remove(exception.service_id.as_str());
            }
            other => warn!(
                "Unknown exception_type '{other}' for service '{}'",
                exception.service_id
            ),
        }
    }

    active
}

fn filter_trips_by_service_day(
    date: Option<NaiveDate>,
    calendars: &[FeedCalendar],
    calendar_dates: &[FeedCalendarDate],
    mut trips: Vec<FeedTrip>,
) -> Vec<FeedTrip> {
    let Some(date) = date else {
        return trips;
    };

    let services = active_services(date, calendars, calendar_dates);
    let total = trips.len();
    trips.retain(|trip| services.contains(trip.service_id.as_str()));
    info!(
        "{} of {total} trips run on {date} ({} active services)",
        trips.len(),
        services.len()
    );
    trips
}

fn warn_unknown_routes(routes: &[FeedRoute], trips: &[FeedTrip]) {
    let known: HashSet<&str> = routes.iter().map(|route| route.route_id.as_str()).collect();
    let unknown = trips
        .iter()
        .filter(|trip| !known.contains(trip.route_id.as_str()))
        .count();
    if unknown > 0 {
        warn!("{unknown} trips reference routes missing from routes.txt");
    }
}

fn create_stops_vector(feed_stops: Vec<FeedStop>) -> (Vec<Stop>, HashMap<String, RaptorStopId>) {
    let mut stops = Vec::with_capacity(feed_stops.len());
    let mut stop_id_map = HashMap::with_capacity(feed_stops.len());

    for feed_stop in feed_stops {
        let coordinates = (
            feed_stop.stop_lon.parse::<f64>(),
            feed_stop.stop_lat.parse::<f64>(),
        );
        let (Ok(lon), Ok(lat)) = coordinates else {
            warn!(
                "Skipping stop '{}' with invalid coordinates ({}, {})",
                feed_stop.stop_id, feed_stop.stop_lat, feed_stop.stop_lon
            );
            continue;
        };
        if stop_id_map.contains_key(&feed_stop.stop_id) {
            warn!("Duplicate stop_id '{}', keeping the first", feed_stop.stop_id);
            continue;
        }

        stop_id_map.insert(feed_stop.stop_id.clone(), stops.len());
        stops.push(Stop::new(feed_stop.stop_id, Point::new(lon, lat)));
    }

    (stops, stop_id_map)
}

/// Groups stop times by trip, ordered by `stop_sequence`.
///
/// A stop time missing one of its times takes the other; trips with untimed
/// stops or unknown stops are dropped.
fn build_scheduled_trips(
    stop_id_map: &HashMap<String, RaptorStopId>,
    trips: &[FeedTrip],
    stop_times: Vec<FeedStopTime>,
) -> Vec<ScheduledTrip> {
    let trip_routes: HashMap<&str, &str> = trips
        .iter()
        .map(|trip| (trip.trip_id.as_str(), trip.route_id.as_str()))
        .collect();

    let mut by_trip: HashMap<String, Vec<FeedStopTime>> = HashMap::new();
    for stop_time in stop_times {
        if trip_routes.contains_key(stop_time.trip_id.as_str()) {
            by_trip
                .entry(stop_time.trip_id.clone())
                .or_default()
                .push(stop_time);
        }
    }

    let mut grouped: Vec<(String, Vec<FeedStopTime>)> = by_trip.into_iter().collect();
    grouped.sort_unstable_by(|a, b| a.0.cmp(&b.0));

    let mut dropped = 0usize;
    let mut scheduled = Vec::with_capacity(grouped.len());

    for (trip_id, mut stop_list) in grouped {
        stop_list.sort_by_key(|stop_time| stop_time.stop_sequence);

        let resolved: Option<Vec<(RaptorStopId, StopTime)>> = stop_list
            .iter()
            .map(|stop_time| {
                let stop = *stop_id_map.get(&stop_time.stop_id)?;
                let arrival = stop_time.arrival_time.or(stop_time.departure_time)?;
                let departure = stop_time.departure_time.unwrap_or(arrival);
                Some((stop, StopTime::new(arrival, departure)))
            })
            .collect();

        match resolved {
            Some(stop_times) => scheduled.push(ScheduledTrip {
                route_id: trip_routes[trip_id.as_str()].to_string(),
                stop_times,
            }),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!("Dropped {dropped} trips with unknown stops or untimed stop times");
    }
    scheduled
}
