//! Unified multimodal model and the points routed between

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use geo::Point;
use petgraph::graph::NodeIndex;
use serde_json::json;

use super::streets::StreetGraph;
use super::transit::data::PublicTransitData;
use crate::routing::dijkstra::dijkstra_path_weights;
use crate::{Error, RaptorStopId, Time};

static NEXT_MODEL_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy)]
pub struct TransitModelMeta {
    /// Longest walk between two stops that is still a transfer, seconds
    pub max_transfer_time: Time,
}

/// Street network and transit schedules combined into one read-only structure.
///
/// Each instance gets a process-unique id; transit points and isochrone
/// indices remember it and are rejected by other models.
#[derive(Debug)]
pub struct TransitModel {
    pub street_graph: StreetGraph,
    pub transit_data: PublicTransitData,
    pub meta: TransitModelMeta,
    id: u64,
}

impl TransitModel {
    pub fn with_transit(
        street_graph: StreetGraph,
        transit_data: PublicTransitData,
        meta: TransitModelMeta,
    ) -> Self {
        Self {
            street_graph,
            transit_data,
            meta,
            id: NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn stop_count(&self) -> usize {
        self.transit_data.stops.len()
    }

    /// Number of distinct GTFS routes with active trips
    pub fn route_count(&self) -> usize {
        self.transit_data.gtfs_route_count()
    }

    /// Number of RAPTOR route patterns
    pub fn pattern_count(&self) -> usize {
        self.transit_data.routes.len()
    }

    pub fn trip_count(&self) -> usize {
        self.transit_data.trip_count()
    }

    /// Number of scheduled stop events over all trips
    pub fn stop_time_count(&self) -> usize {
        self.transit_data.stop_times.len()
    }

    /// JSON summary of the loaded feeds and network size
    pub fn feeds_info(&self) -> String {
        let feeds: Vec<_> = self
            .transit_data
            .feeds_meta
            .iter()
            .map(|meta| &meta.feed_info)
            .collect();

        json!({
            "feeds": feeds,
            "stops": self.stop_count(),
            "routes": self.route_count(),
            "patterns": self.pattern_count(),
            "trips": self.trip_count(),
            "stop_times": self.stop_time_count(),
            "transfers": self.transit_data.transfers.len(),
            "street_nodes": self.street_graph.node_count(),
            "street_edges": self.street_graph.edge_count(),
        })
        .to_string()
    }
}

/// The trips figure is the stop-time count; `trip_count` is in `feeds_info`.
impl fmt::Display for TransitModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TransitModel with {} stops, {} routes and {} trips",
            self.stop_count(),
            self.route_count(),
            self.stop_time_count()
        )
    }
}

/// A geographic location connected to the street network, with walking
/// access times to the transit stops around it.
#[derive(Debug, Clone)]
pub struct TransitPoint {
    /// Query coordinates
    pub geometry: Point<f64>,
    /// Street node the point is snapped to
    pub node_id: NodeIndex,
    /// Walk from the coordinates to `node_id`
    pub snap_time: Time,
    /// Reachable stops with access times, nearest first
    pub nearest_stops: Vec<(RaptorStopId, Time)>,
    pub max_walking_time: Time,
    model_id: u64,
}

impl TransitPoint {
    /// Snaps `geometry` to the street network of `transit_model`.
    ///
    /// # Errors
    ///
    /// `Error::NoPointsFound` when no street node lies within `max_walking_time`.
    pub fn new(
        geometry: Point<f64>,
        transit_model: &TransitModel,
        max_walking_time: Time,
        max_nearest_stops: usize,
    ) -> Result<Self, Error> {
        let (node_id, snap_time) = transit_model
            .street_graph
            .nearest_node(&geometry, max_walking_time)
            .ok_or(Error::NoPointsFound)?;

        let transit_data = &transit_model.transit_data;
        let reachable = dijkstra_path_weights(
            &transit_model.street_graph,
            node_id,
            None,
            Some(max_walking_time - snap_time),
        );

        let mut nearest_stops: Vec<(RaptorStopId, Time)> = reachable
            .iter()
            .flat_map(|(&node, &walk)| {
                transit_data.stops_at_node(node).iter().filter_map(move |&stop| {
                    let access = snap_time + walk + transit_data.stop_snap_time(stop)?;
                    (access <= max_walking_time).then_some((stop, access))
                })
            })
            .collect();

        nearest_stops.sort_unstable_by_key(|&(stop, time)| (time, stop));
        nearest_stops.truncate(max_nearest_stops);

        Ok(Self {
            geometry,
            node_id,
            snap_time,
            nearest_stops,
            max_walking_time,
            model_id: transit_model.id(),
        })
    }

    pub fn model_id(&self) -> u64 {
        self.model_id
    }

    /// # Errors
    ///
    /// `Error::ModelMismatch` if the point was created for another model.
    pub fn ensure_model(&self, transit_model: &TransitModel) -> Result<(), Error> {
        if self.model_id == transit_model.id() {
            Ok(())
        } else {
            Err(Error::ModelMismatch)
        }
    }

    /// `(lat, lon)` of the query coordinates
    pub fn coordinates(&self) -> (f64, f64) {
        (self.geometry.y(), self.geometry.x())
    }

    /// Ids of the nearby stops, nearest first
    pub fn nearest_stop_ids(&self) -> Vec<RaptorStopId> {
        self.nearest_stops.iter().map(|&(stop, _)| stop).collect()
    }

    /// Street walk to another point, within this point's walking budget.
    ///
    /// Points at the same coordinates are zero seconds apart.
    pub fn walking_time_to(
        &self,
        transit_model: &TransitModel,
        other: &TransitPoint,
    ) -> Option<Time> {
        if self.geometry == other.geometry {
            return Some(0);
        }

        let snaps = self.snap_time + other.snap_time;
        let budget = self.max_walking_time.checked_sub(snaps)?;

        if self.node_id == other.node_id {
            return Some(snaps);
        }

        dijkstra_path_weights(
            &transit_model.street_graph,
            self.node_id,
            Some(other.node_id),
            Some(budget),
        )
        .get(&other.node_id)
        .map(|&walk| walk + snaps)
    }

    /// `walking_time_to` for many points with one street search
    pub fn walking_times_to(
        &self,
        transit_model: &TransitModel,
        others: &[TransitPoint],
    ) -> Vec<Option<Time>> {
        let reachable = dijkstra_path_weights(
            &transit_model.street_graph,
            self.node_id,
            None,
            Some(self.max_walking_time.saturating_sub(self.snap_time)),
        );

        others
            .iter()
            .map(|other| {
                if self.geometry == other.geometry {
                    return Some(0);
                }
                let walk = reachable.get(&other.node_id)?;
                let total = walk + self.snap_time + other.snap_time;
                (total <= self.max_walking_time).then_some(total)
            })
            .collect()
    }
}
