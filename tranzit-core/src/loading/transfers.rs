use hashbrown::HashMap;
use log::{debug, info};
use petgraph::graph::NodeIndex;
use rayon::prelude::*;

use crate::{RaptorStopId, Time, TransitModel, model::Transfer, routing::dijkstra};

/// Snaps stops to the street network and computes walking transfers between them.
///
/// Fills `stop_nodes`, `node_to_stops` and `transfers` of the transit data and
/// sets the transfer slice of every stop. A transfer is the walk
/// `snap(from) + street path + snap(to)`, kept while it fits in
/// `max_transfer_time`.
pub fn calculate_transfers(graph: &mut TransitModel) {
    let max_transfer_time = graph.meta.max_transfer_time;
    let stop_count = graph.transit_data.stops.len();

    info!("Calculating transfers between {stop_count} stops");

    let stop_nodes = snap_stops_to_network(graph);
    let stop_transfers = calculate_stop_transfers(graph, &stop_nodes, max_transfer_time);

    update_transit_model_with_transfers(graph, stop_transfers, stop_nodes);
}

/// Nearest street node of every stop; `None` for stops farther than
/// `max_transfer_time` from any street
fn snap_stops_to_network(graph: &TransitModel) -> Vec<Option<(NodeIndex, Time)>> {
    let max_snap_time = graph.meta.max_transfer_time;

    graph
        .transit_data
        .stops
        .par_iter()
        .map(|stop| {
            let snapped = graph.street_graph.nearest_node(&stop.geometry, max_snap_time);
            if snapped.is_none() {
                log::trace!(
                    "Stop '{}' has no street within {max_snap_time}s walk - excluding from transfers",
                    stop.stop_id
                );
            }
            snapped
        })
        .collect()
}

fn calculate_stop_transfers(
    graph: &TransitModel,
    stop_nodes: &[Option<(NodeIndex, Time)>],
    max_transfer_time: Time,
) -> Vec<Vec<Transfer>> {
    (0..stop_nodes.len())
        .into_par_iter()
        .map(|source_idx| {
            stop_nodes[source_idx].map_or_else(Vec::new, |source| {
                find_transfers_from_stop(graph, stop_nodes, source_idx, source, max_transfer_time)
            })
        })
        .collect()
}

/// All valid transfers from a single stop, ordered by target stop
fn find_transfers_from_stop(
    graph: &TransitModel,
    stop_nodes: &[Option<(NodeIndex, Time)>],
    source_idx: RaptorStopId,
    (source_node, source_snap): (NodeIndex, Time),
    max_transfer_time: Time,
) -> Vec<Transfer> {
    let Some(budget) = max_transfer_time.checked_sub(source_snap) else {
        return Vec::new();
    };

    let reachable =
        dijkstra::dijkstra_path_weights(&graph.street_graph, source_node, None, Some(budget));

    stop_nodes
        .iter()
        .enumerate()
        .filter(|&(target_idx, _)| target_idx != source_idx)
        .filter_map(|(target_idx, target)| {
            let (target_node, target_snap) = (*target)?;
            let duration = source_snap + reachable.get(&target_node)? + target_snap;
            (duration <= max_transfer_time).then_some(Transfer {
                target_stop: target_idx,
                duration,
            })
        })
        .collect()
}

fn update_transit_model_with_transfers(
    graph: &mut TransitModel,
    stop_transfers: Vec<Vec<Transfer>>,
    stop_nodes: Vec<Option<(NodeIndex, Time)>>,
) {
    let transit_data = &mut graph.transit_data;
    let mut all_transfers = Vec::new();

    for (stop, transfers) in transit_data.stops.iter_mut().zip(stop_transfers) {
        stop.transfers_start = all_transfers.len();
        stop.transfers_len = transfers.len();
        all_transfers.extend(transfers);
    }

    let mut node_to_stops: HashMap<NodeIndex, Vec<RaptorStopId>> = HashMap::new();
    for (stop_idx, snapped) in stop_nodes.iter().enumerate() {
        if let Some((node, _)) = snapped {
            node_to_stops.entry(*node).or_default().push(stop_idx);
        }
    }

    let unsnapped = stop_nodes.iter().filter(|node| node.is_none()).count();
    if unsnapped > 0 {
        debug!("{unsnapped} stops could not be snapped to the street network");
    }

    transit_data.transfers = all_transfers;
    transit_data.node_to_stops = node_to_stops;
    transit_data.stop_nodes = stop_nodes;
}

#[cfg(test)]
mod tests {
    use crate::test_fixtures::{STOP_A, STOP_B, STOP_C, STOP_E, fixture_model};

    #[test]
    fn transfers_connect_nearby_stops_only() {
        let model = fixture_model();
        let data = &model.transit_data;

        let from_b = data.get_stop_transfers(STOP_B).unwrap();
        assert_eq!(from_b.len(), 1);
        assert_eq!(from_b[0].target_stop, STOP_E);

        let from_e = data.get_stop_transfers(STOP_E).unwrap();
        assert_eq!(from_e[0].target_stop, STOP_B);
        assert_eq!(from_e[0].duration, from_b[0].duration);

        assert!(data.get_stop_transfers(STOP_A).unwrap().is_empty());
        assert!(data.get_stop_transfers(STOP_C).unwrap().is_empty());
        assert_eq!(data.transfers.len(), 2);
    }

    #[test]
    fn every_stop_is_snapped() {
        let model = fixture_model();
        let data = &model.transit_data;

        for stop in 0..data.stops.len() {
            assert_eq!(data.stop_snap_time(stop), Some(0));
            let (node, _) = data.stop_nodes[stop].unwrap();
            assert!(data.stops_at_node(node).contains(&stop));
        }
    }
}
