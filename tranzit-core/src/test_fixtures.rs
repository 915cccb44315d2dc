//! Small synthetic city shared by the unit tests.
//!
//! One straight street of 41 nodes, 0.002° apart (89 s walk per segment).
//! Route `R1` runs A → B → C and route `R2` runs E → D, every 30 minutes
//! from 08:00 and 08:10. B and E are neighbours, which makes B ↔ E the only
//! transfer under the 600 s limit.

use geo::Point;

use crate::loading::calculate_transfers;
use crate::loading::gtfs::FeedInfo;
use crate::model::{
    FeedMeta, PublicTransitData, RaptorStopId, ScheduledTrip, Stop, StopTime, StreetGraph,
    StreetNode, TransitModelMeta,
};
use crate::{Time, TransitModel, TransitPoint};

pub(crate) const STOP_A: RaptorStopId = 0;
pub(crate) const STOP_B: RaptorStopId = 1;
pub(crate) const STOP_C: RaptorStopId = 2;
pub(crate) const STOP_D: RaptorStopId = 3;
pub(crate) const STOP_E: RaptorStopId = 4;

const NODE_COUNT: usize = 41;
const TRIPS_PER_ROUTE: Time = 8;

fn node_point(idx: usize) -> Point<f64> {
    Point::new(93.49 + idx as f64 * 0.002, 56.25)
}

fn trip(route_id: &str, first_departure: Time, stops: &[(RaptorStopId, Time)]) -> ScheduledTrip {
    ScheduledTrip {
        route_id: route_id.to_string(),
        stop_times: stops
            .iter()
            .map(|&(stop, offset)| {
                let time = first_departure + offset;
                (stop, StopTime::new(time, time))
            })
            .collect(),
    }
}

pub(crate) fn fixture_model() -> TransitModel {
    let nodes = (0..NODE_COUNT)
        .map(|idx| StreetNode {
            id: 1000 + idx as i64,
            geometry: node_point(idx),
        })
        .collect();
    let street_graph = StreetGraph::from_segments(nodes, (1..NODE_COUNT).map(|idx| (idx - 1, idx)));

    let stops = vec![
        Stop::new("A", node_point(5)),
        Stop::new("B", node_point(15)),
        Stop::new("C", node_point(25)),
        Stop::new("D", node_point(35)),
        Stop::new("E", node_point(16)),
    ];

    let mut trips = Vec::new();
    for k in 0..TRIPS_PER_ROUTE {
        trips.push(trip(
            "R1",
            28800 + 1800 * k,
            &[(STOP_A, 0), (STOP_B, 300), (STOP_C, 600)],
        ));
        trips.push(trip("R2", 29400 + 1800 * k, &[(STOP_E, 0), (STOP_D, 600)]));
    }

    let feeds_meta = vec![FeedMeta {
        feed_info: FeedInfo {
            feed_publisher_name: "Fixture Transit".to_string(),
            feed_version: "1".to_string(),
            ..FeedInfo::default()
        },
    }];

    let transit_data = PublicTransitData::from_trips(stops, trips, feeds_meta)
        .expect("fixture trips reference known stops");

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

/// Point placed exactly on a stop, 20 minutes walking budget
pub(crate) fn point_at_stop(model: &TransitModel, stop: RaptorStopId) -> TransitPoint {
    TransitPoint::new(model.transit_data.stops[stop].geometry, model, 1200, 10)
        .expect("fixture stops lie on the street")
}
