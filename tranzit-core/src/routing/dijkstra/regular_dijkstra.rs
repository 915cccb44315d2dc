use std::collections::BinaryHeap;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use petgraph::{graph::NodeIndex, visit::EdgeRef};

use super::state::State;
use crate::Time;
use crate::model::StreetGraph;

/// Dijkstra's algorithm over the walking network.
///
/// Returns walking times in seconds from `start` to every settled node.
/// Nodes farther than `max_cost` are never recorded; the search stops as soon
/// as `target` is settled.
pub fn dijkstra_path_weights(
    graph: &StreetGraph,
    start: NodeIndex,
    target: Option<NodeIndex>,
    max_cost: Option<Time>,
) -> HashMap<NodeIndex, Time> {
    let max_cost = max_cost.unwrap_or(Time::MAX);
    let mut distances: HashMap<NodeIndex, Time> = HashMap::new();
    let mut heap = BinaryHeap::new();

    if graph.graph.node_weight(start).is_none() {
        return distances;
    }

    heap.push(State {
        cost: 0,
        node: start,
    });
    distances.insert(start, 0);

    while let Some(State { cost, node }) = heap.pop() {
        if target == Some(node) {
            break;
        }

        // Stale heap entry
        if distances.get(&node).is_some_and(|&best| cost > best) {
            continue;
        }

        for edge in graph.edges(node) {
            let next = edge.target();
            let next_cost = cost.saturating_add(edge.weight().weight);
            if next_cost > max_cost {
                continue;
            }

            match distances.entry(next) {
                Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    heap.push(State {
                        cost: next_cost,
                        node: next,
                    });
                }
                Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        heap.push(State {
                            cost: next_cost,
                            node: next,
                        });
                    }
                }
            }
        }
    }

    distances
}

#[cfg(test)]
mod tests {
    use geo::Point;

    use super::*;
    use crate::model::StreetNode;

    fn line_graph(n: usize) -> StreetGraph {
        let nodes = (0..n)
            .map(|i| StreetNode {
                id: i as i64,
                geometry: Point::new(10.0, 50.0 + i as f64 * 0.001),
            })
            .collect();
        StreetGraph::from_segments(nodes, (1..n).map(|i| (i - 1, i)))
    }

    #[test]
    fn weights_accumulate_along_the_path() {
        let graph = line_graph(4);
        let weights = dijkstra_path_weights(&graph, NodeIndex::new(0), None, None);

        assert_eq!(weights.len(), 4);
        assert_eq!(weights[&NodeIndex::new(0)], 0);
        let step = weights[&NodeIndex::new(1)];
        assert!(weights[&NodeIndex::new(3)] >= 3 * step - 2);
    }

    #[test]
    fn nodes_beyond_max_cost_are_not_recorded() {
        let graph = line_graph(4);
        let step = dijkstra_path_weights(&graph, NodeIndex::new(0), None, None)[&NodeIndex::new(1)];

        let weights = dijkstra_path_weights(&graph, NodeIndex::new(0), None, Some(step + 1));
        assert_eq!(weights.len(), 2);
        assert!(weights.values().all(|&w| w <= step + 1));
    }

    #[test]
    fn search_stops_at_target() {
        let graph = line_graph(6);
        let target = NodeIndex::new(2);
        let weights = dijkstra_path_weights(&graph, NodeIndex::new(0), Some(target), None);

        assert!(weights.contains_key(&target));
        assert!(!weights.contains_key(&NodeIndex::new(5)));
    }

    #[test]
    fn unknown_start_yields_nothing() {
        let graph = line_graph(2);
        assert!(dijkstra_path_weights(&graph, NodeIndex::new(42), None, None).is_empty());
    }
}
