//! Synthetic city for the integration tests: one straight street with
//! two bus lines meeting at neighbouring stops B and E.

#![allow(dead_code)]

use geo::Point;
use tranzit::TransitModel;
use tranzit_core::loading::calculate_transfers;
use tranzit_core::loading::gtfs::FeedInfo;
use tranzit_core::model::{
    FeedMeta, PublicTransitData, ScheduledTrip, Stop, StopTime, StreetGraph, StreetNode,
    TransitModelMeta,
};

pub const LAT: f64 = 56.25;

pub fn lon_of_node(idx: usize) -> f64 {
    93.49 + idx as f64 * 0.002
}

/// `(lat, lon)` of the stops
pub const A: (f64, f64) = (LAT, 93.50);
pub const B: (f64, f64) = (LAT, 93.52);
pub const C: (f64, f64) = (LAT, 93.54);
pub const D: (f64, f64) = (LAT, 93.56);
pub const E: (f64, f64) = (LAT, 93.522);

fn trip(route_id: &str, first: u32, stops: &[(usize, u32)]) -> ScheduledTrip {
    ScheduledTrip {
        route_id: route_id.to_string(),
        stop_times: stops
            .iter()
            .map(|&(stop, offset)| (stop, StopTime::new(first + offset, first + offset)))
            .collect(),
    }
}

pub fn fixture_model() -> TransitModel {
    let nodes = (0..41)
        .map(|idx| StreetNode {
            id: idx as i64,
            geometry: Point::new(lon_of_node(idx), LAT),
        })
        .collect();
    let street_graph = StreetGraph::from_segments(nodes, (1..41).map(|idx| (idx - 1, idx)));

    let stops = [("A", 5), ("B", 15), ("C", 25), ("D", 35), ("E", 16)]
        .into_iter()
        .map(|(name, node)| Stop::new(name, Point::new(lon_of_node(node), LAT)))
        .collect();

    let trips = (0..8)
        .flat_map(|k| {
            [
                trip("R1", 28800 + 1800 * k, &[(0, 0), (1, 300), (2, 600)]),
                trip("R2", 29400 + 1800 * k, &[(4, 0), (3, 600)]),
            ]
        })
        .collect();

    let feeds_meta = vec![FeedMeta {
        feed_info: FeedInfo {
            feed_publisher_name: "Fixture Transit".to_string(),
            ..FeedInfo::default()
        },
    }];

    let transit_data = PublicTransitData::from_trips(stops, trips, feeds_meta).unwrap();
    let mut model = TransitModel::with_transit(
        street_graph,
        transit_data,
        TransitModelMeta {
            max_transfer_time: 600,
        },
    );
    calculate_transfers(&mut model);
    model
}

pub const FIXTURE_AREA: &str =
    "POLYGON((93.49 56.246, 93.57 56.246, 93.57 56.254, 93.49 56.254, 93.49 56.246))";
