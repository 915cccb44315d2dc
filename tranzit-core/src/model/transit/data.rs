//! Public transit data structure and methods to work with it

use std::collections::BTreeMap;

use hashbrown::HashMap;
use itertools::Itertools;
use log::warn;
use petgraph::graph::NodeIndex;

use super::types::{
    FeedMeta, RaptorStopId, Route, RouteId, ScheduledTrip, Stop, StopTime, Time, Transfer,
};
use crate::Error;
use crate::routing::raptor::RaptorError;

/// Main public transit data structure
/// based on original microsoft paper
#[derive(Debug, Clone)]
pub struct PublicTransitData {
    /// All routes
    pub routes: Vec<Route>,
    /// Stops for each route
    pub route_stops: Vec<RaptorStopId>,
    /// Schedule for each route stop
    pub stop_times: Vec<StopTime>,
    /// All stops
    pub stops: Vec<Stop>,
    /// Routes through each stop
    pub stop_routes: Vec<RouteId>,
    /// Transfers between stops
    pub transfers: Vec<Transfer>,
    /// Street node each stop is snapped to, with the walking time of the snap
    pub stop_nodes: Vec<Option<(NodeIndex, Time)>>,
    /// Mapping road network nodes to stops
    pub node_to_stops: HashMap<NodeIndex, Vec<RaptorStopId>>,
    /// Metadata for feeds
    pub feeds_meta: Vec<FeedMeta>,
}

impl PublicTransitData {
    /// Builds RAPTOR tables from stops and individual trips.
    ///
    /// Trips are grouped by GTFS route and stop pattern, sorted by departure
    /// and split further wherever one trip would overtake another, so that
    /// every route's trips stay ordered at every stop.
    ///
    /// # Errors
    ///
    /// Returns an error if a trip references a stop that does not exist.
    pub fn from_trips(
        mut stops: Vec<Stop>,
        trips: Vec<ScheduledTrip>,
        feeds_meta: Vec<FeedMeta>,
    ) -> Result<Self, Error> {
        let num_stops = stops.len();
        let mut patterns: BTreeMap<(String, Vec<RaptorStopId>), Vec<Vec<StopTime>>> =
            BTreeMap::new();
        let mut dropped = 0usize;

        for trip in trips {
            if let Some(&(stop, _)) = trip.stop_times.iter().find(|(stop, _)| *stop >= num_stops) {
                return Err(Error::InvalidData(format!(
                    "Trip on route '{}' references unknown stop {stop}",
                    trip.route_id
                )));
            }
            if trip.stop_times.len() < 2 || !is_chronological(&trip.stop_times) {
                dropped += 1;
                continue;
            }
            let (pattern, times): (Vec<RaptorStopId>, Vec<StopTime>) =
                trip.stop_times.into_iter().unzip();
            patterns
                .entry((trip.route_id, pattern))
                .or_default()
                .push(times);
        }

        if dropped > 0 {
            warn!("Dropped {dropped} trips with less than two stops or non-chronological times");
        }

        let mut routes = Vec::new();
        let mut route_stops = Vec::new();
        let mut stop_times = Vec::new();

        for ((route_id, pattern), mut pattern_trips) in patterns {
            pattern_trips.sort_unstable_by(|a, b| a[0].departure.cmp(&b[0].departure).then(a.cmp(b)));

            for group in split_overtaking(pattern_trips) {
                routes.push(Route {
                    route_id: route_id.clone(),
                    num_trips: group.len(),
                    num_stops: pattern.len(),
                    stops_start: route_stops.len(),
                    trips_start: stop_times.len(),
                });
                route_stops.extend_from_slice(&pattern);
                stop_times.extend(group.into_iter().flatten());
            }
        }

        // Index of routes for each stop
        let mut stop_to_routes: Vec<Vec<RouteId>> = vec![Vec::new(); num_stops];
        for (route_idx, route) in routes.iter().enumerate() {
            for &stop in &route_stops[route.stops_start..route.stops_start + route.num_stops] {
                if stop_to_routes[stop].last() != Some(&route_idx) {
                    stop_to_routes[stop].push(route_idx);
                }
            }
        }

        let mut stop_routes = Vec::with_capacity(route_stops.len());
        for (stop, routes_here) in stop_to_routes.into_iter().enumerate() {
            stops[stop].routes_start = stop_routes.len();
            stops[stop].routes_len = routes_here.len();
            stop_routes.extend(routes_here);
        }

        Ok(Self {
            routes,
            route_stops,
            stop_times,
            stops,
            stop_routes,
            transfers: Vec::new(), // Will be filled in `calculate_transfers`
            stop_nodes: vec![None; num_stops],
            node_to_stops: HashMap::new(),
            feeds_meta,
        })
    }

    /// Total number of scheduled trips
    pub fn trip_count(&self) -> usize {
        self.routes.iter().map(|route| route.num_trips).sum()
    }

    /// Number of distinct GTFS routes with at least one trip
    pub fn gtfs_route_count(&self) -> usize {
        self.routes
            .iter()
            .map(|route| route.route_id.as_str())
            .unique()
            .count()
    }

    /// Returns all departure times from the given source stop within the specified time range.
    pub(crate) fn get_source_departures(
        &self,
        source: RaptorStopId,
        min_departure: Time,
        max_departure: Time,
    ) -> Result<Vec<Time>, RaptorError> {
        self.validate_stop(source)?;

        let mut departures = Vec::new();

        for &route_id in self.routes_for_stop(source) {
            let route_stops = self.get_route_stops(route_id)?;
            let route = &self.routes[route_id];

            // A stop can be served more than once by a looping pattern
            for stop_idx in route_stops
                .iter()
                .positions(|&stop| stop == source)
                .filter(|&idx| idx + 1 < route.num_stops)
            {
                for trip_idx in 0..route.num_trips {
                    let departure_time = self.get_trip(route_id, trip_idx)?[stop_idx].departure;
                    if (min_departure..=max_departure).contains(&departure_time) {
                        departures.push(departure_time);
                    }
                }
            }
        }

        departures.sort_unstable();
        departures.dedup();

        Ok(departures)
    }

    /// check if such stop exists
    pub(crate) fn validate_stop(&self, stop: RaptorStopId) -> Result<(), RaptorError> {
        if stop >= self.stops.len() {
            Err(RaptorError::InvalidStop)
        } else {
            Ok(())
        }
    }

    /// Stops for specific route
    pub(crate) fn get_route_stops(
        &self,
        route_id: RouteId,
    ) -> Result<&[RaptorStopId], RaptorError> {
        self.routes
            .get(route_id)
            .ok_or(RaptorError::InvalidRoute)
            .and_then(|route| {
                let end = route.stops_start + route.num_stops;
                if end > self.route_stops.len() {
                    Err(RaptorError::InvalidRoute)
                } else {
                    Ok(&self.route_stops[route.stops_start..end])
                }
            })
    }

    /// `StopTime` slice for specific route and trip
    pub(crate) fn get_trip(
        &self,
        route_id: RouteId,
        trip_idx: usize,
    ) -> Result<&[StopTime], RaptorError> {
        let route = self.routes.get(route_id).ok_or(RaptorError::InvalidRoute)?;

        if trip_idx >= route.num_trips {
            return Err(RaptorError::InvalidTrip);
        }

        let start = route.trips_start + trip_idx * route.num_stops;
        let end = start + route.num_stops;

        if end > self.stop_times.len() {
            Err(RaptorError::InvalidRoute)
        } else {
            Ok(&self.stop_times[start..end])
        }
    }

    /// Returns transfers from the specified stop
    pub(crate) fn get_stop_transfers(
        &self,
        stop_id: RaptorStopId,
    ) -> Result<&[Transfer], RaptorError> {
        self.validate_stop(stop_id)?;
        let stop = &self.stops[stop_id];
        let end = stop.transfers_start + stop.transfers_len;
        if end > self.transfers.len() {
            Err(RaptorError::InvalidStop)
        } else {
            Ok(&self.transfers[stop.transfers_start..end])
        }
    }

    /// Returns routes through the specified stop
    pub(crate) fn routes_for_stop(&self, stop_idx: RaptorStopId) -> &[RouteId] {
        let start = self.stops[stop_idx].routes_start;
        let end = start + self.stops[stop_idx].routes_len;
        &self.stop_routes[start..end]
    }

    /// Stops snapped to the given street node
    pub(crate) fn stops_at_node(&self, node: NodeIndex) -> &[RaptorStopId] {
        self.node_to_stops.get(&node).map_or(&[], Vec::as_slice)
    }

    /// Walking time between a stop and the street node it is snapped to
    pub(crate) fn stop_snap_time(&self, stop: RaptorStopId) -> Option<Time> {
        self.stop_nodes
            .get(stop)
            .copied()
            .flatten()
            .map(|(_, time)| time)
    }

    /// Get the location of a transit stop by ID
    pub fn transit_stop_location(&self, stop_id: RaptorStopId) -> Option<geo::Point<f64>> {
        self.stops.get(stop_id).map(|stop| stop.geometry)
    }

    /// Get the name of a transit stop by ID
    pub fn transit_stop_name(&self, stop_id: RaptorStopId) -> Option<&str> {
        self.stops.get(stop_id).map(|stop| stop.stop_id.as_str())
    }
}

/// Arrival never precedes departure at the previous stop, nor departure the arrival
fn is_chronological(stop_times: &[(RaptorStopId, StopTime)]) -> bool {
    stop_times.iter().all(|(_, st)| st.arrival <= st.departure)
        && stop_times
            .iter()
            .tuple_windows()
            .all(|((_, prev), (_, next))| prev.departure <= next.arrival)
}

/// Greedily distributes trips (sorted by first departure) into groups
/// where each trip is never earlier than its predecessor at any stop.
fn split_overtaking(trips: Vec<Vec<StopTime>>) -> Vec<Vec<Vec<StopTime>>> {
    let mut groups: Vec<Vec<Vec<StopTime>>> = Vec::new();

    for trip in trips {
        let slot = groups.iter().position(|group| {
            group.last().is_some_and(|last| {
                last.iter()
                    .zip(&trip)
                    .all(|(a, b)| a.arrival <= b.arrival && a.departure <= b.departure)
            })
        });
        match slot {
            Some(idx) => groups[idx].push(trip),
            None => groups.push(vec![trip]),
        }
    }

    groups
}
