use std::path::Path;

use geo::{LineString, Point};
use hashbrown::HashMap;
use log::{debug, info};
use osm4routing::{Edge, FootAccessibility, Reader};
use petgraph::graph::{NodeIndex, UnGraph};

use crate::Error;
use crate::model::streets::walking_time;
use crate::model::{StreetEdge, StreetGraph, StreetNode};

/// Reads the walkable street network from an OSM `.pbf` extract.
///
/// Only edges open to pedestrians are kept, so every node of the graph lies
/// on a walkable street.
pub(crate) fn create_street_graph(filename: impl AsRef<Path>) -> Result<StreetGraph, Error> {
    let filename = filename.as_ref();
    let path = filename.to_str().ok_or_else(|| {
        Error::InvalidData(format!("OSM path is not valid UTF-8: {}", filename.display()))
    })?;

    let (nodes, edges) = Reader::new()
        .read(path)
        .map_err(|e| Error::NetworkError(e.to_string()))?;
    debug!("Read {} OSM nodes and {} edges", nodes.len(), edges.len());

    let coordinates: HashMap<i64, Point<f64>> = nodes
        .iter()
        .map(|node| (node.id.0, Point::new(node.coord.lon, node.coord.lat)))
        .collect();
    drop(nodes);

    let mut graph = UnGraph::<StreetNode, StreetEdge>::new_undirected();
    let mut indices: HashMap<i64, NodeIndex> = HashMap::new();
    let mut skipped = 0usize;

    for edge in edges.iter().filter(|edge| is_walkable(edge)) {
        let endpoints = [edge.source.0, edge.target.0].map(|id| {
            let geometry = *coordinates.get(&id)?;
            Some(
                *indices
                    .entry(id)
                    .or_insert_with(|| graph.add_node(StreetNode { id, geometry })),
            )
        });
        let [Some(source), Some(target)] = endpoints else {
            skipped += 1;
            continue;
        };

        graph.add_edge(
            source,
            target,
            StreetEdge {
                weight: walking_time(edge.length()),
                geometry: edge_geometry(edge),
            },
        );
    }

    if skipped > 0 {
        log::warn!("Skipped {skipped} OSM edges with missing end nodes");
    }
    info!(
        "Built street graph: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    Ok(StreetGraph::new(graph))
}

fn is_walkable(edge: &Edge) -> bool {
    edge.properties.foot == FootAccessibility::Allowed
}

fn edge_geometry(edge: &Edge) -> LineString<f64> {
    edge.geometry
        .iter()
        .map(|coord| (coord.lon, coord.lat))
        .collect()
}
