//! Street network components - nodes and edges

use geo::{Distance, Haversine, LineString, Point};

use super::network::walking_time;
use crate::Time;

/// Street graph node
#[derive(Debug, Clone)]
pub struct StreetNode {
    /// OSM ID of the node
    pub id: i64,
    /// Node coordinates
    pub geometry: Point<f64>,
}

/// Street graph edge (street segment)
#[derive(Debug, Clone)]
pub struct StreetEdge {
    /// Pedestrian crossing time in seconds
    pub weight: Time,
    /// Optional geometry for visualization
    pub geometry: LineString<f64>,
}

impl StreetEdge {
    /// Straight segment between two nodes, weighted by its haversine length
    pub fn between(from: &StreetNode, to: &StreetNode) -> Self {
        let length = Haversine.distance(from.geometry, to.geometry);
        Self {
            weight: walking_time(length),
            geometry: LineString::from(vec![from.geometry, to.geometry]),
        }
    }
}
