//! Street graph with a spatial index over its nodes

use geo::{Distance, Haversine, Point};
use petgraph::Undirected;
use petgraph::graph::{Edges, NodeIndex, UnGraph};
use rstar::primitives::GeomWithData;
use rstar::{AABB, RTree};

use super::components::{StreetEdge, StreetNode};
use crate::{Time, WALKING_SPEED};

/// Street node position in the R-tree, `[lon, lat]`
pub type IndexedPoint = GeomWithData<[f64; 2], NodeIndex>;

const METERS_PER_DEGREE: f64 = 111_320.0;

/// Walking time in whole seconds for a distance in meters
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn walking_time(distance_m: f64) -> Time {
    (distance_m / WALKING_SPEED).round() as Time
}

/// Walkable street network
#[derive(Debug, Clone)]
pub struct StreetGraph {
    pub graph: UnGraph<StreetNode, StreetEdge>,
    pub rtree: RTree<IndexedPoint>,
}

impl StreetGraph {
    pub fn new(graph: UnGraph<StreetNode, StreetEdge>) -> Self {
        let points = graph
            .node_indices()
            .map(|idx| {
                let geometry = graph[idx].geometry;
                IndexedPoint::new([geometry.x(), geometry.y()], idx)
            })
            .collect();

        Self {
            graph,
            rtree: RTree::bulk_load(points),
        }
    }

    /// Builds a graph from nodes and `(from, to)` node position pairs,
    /// weighting every edge by its straight-line length.
    pub fn from_segments(
        nodes: Vec<StreetNode>,
        segments: impl IntoIterator<Item = (usize, usize)>,
    ) -> Self {
        let mut graph = UnGraph::with_capacity(nodes.len(), 0);
        let indices: Vec<NodeIndex> = nodes.into_iter().map(|n| graph.add_node(n)).collect();

        for (from, to) in segments {
            let (Some(&a), Some(&b)) = (indices.get(from), indices.get(to)) else {
                log::warn!("Skipping street segment {from}-{to} with unknown endpoint");
                continue;
            };
            let edge = StreetEdge::between(&graph[a], &graph[b]);
            graph.add_edge(a, b, edge);
        }

        Self::new(graph)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn edges(&self, node: NodeIndex) -> Edges<'_, StreetEdge, Undirected> {
        self.graph.edges(node)
    }

    /// Nearest street node reachable on foot within `max_walking_time`.
    ///
    /// Candidates come from the R-tree envelope of the walking radius and are
    /// ranked by haversine distance; equal distances resolve to the lowest
    /// node index.
    pub fn nearest_node(
        &self,
        point: &Point<f64>,
        max_walking_time: Time,
    ) -> Option<(NodeIndex, Time)> {
        let radius = f64::from(max_walking_time) * WALKING_SPEED;
        let lat_span = radius / METERS_PER_DEGREE;
        let lon_span = radius / (METERS_PER_DEGREE * point.y().to_radians().cos().max(1e-6));

        let envelope = AABB::from_corners(
            [point.x() - lon_span, point.y() - lat_span],
            [point.x() + lon_span, point.y() + lat_span],
        );

        self.rtree
            .locate_in_envelope(&envelope)
            .map(|candidate| {
                let distance = Haversine.distance(*point, Point::from(*candidate.geom()));
                (candidate.data, distance)
            })
            .filter(|&(_, distance)| distance <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)))
            .map(|(node, distance)| (node, walking_time(distance)))
    }
}

#[cfg(test)]
mod tests {
    use petgraph::visit::EdgeRef;

    use super::*;

    fn node(id: i64, lon: f64, lat: f64) -> StreetNode {
        StreetNode {
            id,
            geometry: Point::new(lon, lat),
        }
    }

    #[test]
    fn edges_are_weighted_by_walking_time() {
        // ~111 m along a meridian
        let graph = StreetGraph::from_segments(
            vec![node(1, 10.0, 50.0), node(2, 10.0, 50.001)],
            [(0, 1)],
        );
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);

        let weight = graph.edges(NodeIndex::new(0)).next().unwrap().weight().weight;
        assert!((79..=81).contains(&weight), "unexpected weight {weight}");
    }

    #[test]
    fn nearest_node_respects_radius() {
        let graph = StreetGraph::from_segments(vec![node(1, 10.0, 50.0)], Vec::new());

        let near = graph.nearest_node(&Point::new(10.0, 50.0005), 600);
        assert_eq!(near.map(|(n, _)| n), Some(NodeIndex::new(0)));

        assert!(graph.nearest_node(&Point::new(0.0, 0.0), 600).is_none());
        assert!(graph.nearest_node(&Point::new(10.0, 50.05), 600).is_none());
    }

    #[test]
    fn equidistant_nodes_resolve_to_lowest_index() {
        let graph = StreetGraph::from_segments(
            // offsets of 2^-10 degrees keep both distances bit-identical
            vec![node(7, 10.0, 50.000_976_562_5), node(3, 10.0, 49.999_023_437_5)],
            Vec::new(),
        );
        let (nearest, _) = graph.nearest_node(&Point::new(10.0, 50.0), 600).unwrap();
        assert_eq!(nearest, NodeIndex::new(0));
    }
}
