use geo::{ConvexHull, Intersects, MultiPoint};
use log::info;

use super::config::TransitModelConfig;
use super::gtfs::transit_model_from_gtfs;
use super::osm::create_street_graph;
use super::transfers::calculate_transfers;
use crate::model::{StreetGraph, TransitModelMeta};
use crate::{Error, PublicTransitData, TransitModel};

/// Creates a transit model based on the provided configuration
///
/// # Errors
///
/// Returns an error if there are problems reading or processing data
pub fn create_transit_model(config: &TransitModelConfig) -> Result<TransitModel, Error> {
    validate_config(config)?;

    info!(
        "Processing street data (OSM): {}",
        config.osm_path.display()
    );

    // Start OSM data processing in a separate thread
    let osm_path = config.osm_path.clone();
    let graph_handle = std::thread::spawn(move || create_street_graph(osm_path));

    info!("Processing public transit data (GTFS)");
    let transit_data = transit_model_from_gtfs(config)?;

    let street_graph = graph_handle
        .join()
        .map_err(|_| Error::UnrecoverableError("OSM processing thread panicked"))??;
    info!(
        "Street network has {} nodes and {} edges",
        street_graph.node_count(),
        street_graph.edge_count()
    );

    validate_graph_transit_overlap(&street_graph, &transit_data);

    let mut graph = TransitModel::with_transit(
        street_graph,
        transit_data,
        TransitModelMeta {
            max_transfer_time: config.max_transfer_time,
        },
    );

    calculate_transfers(&mut graph);
    info!(
        "Calculated {} transfers between stops",
        graph.transit_data.transfers.len()
    );

    info!("{graph} created successfully");
    release_free_heap();
    Ok(graph)
}

/// Hands heap pages freed after OSM and CSV parsing back to the OS
fn release_free_heap() {
    // SAFETY: `malloc_trim` only touches allocator state and is available on glibc
    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    unsafe {
        if libc::malloc_trim(0) == 0 {
            log::debug!("No heap memory released by malloc_trim");
        } else {
            log::debug!("Released free heap memory");
        }
    }
}

fn validate_config(config: &TransitModelConfig) -> Result<(), Error> {
    if !config.osm_path.exists() {
        return Err(Error::InvalidData(format!(
            "OSM file not found: {}",
            config.osm_path.display()
        )));
    }

    if config.gtfs_dirs.is_empty() {
        return Err(Error::InvalidData(
            "No GTFS directories provided in the configuration".to_string(),
        ));
    }

    for dir in &config.gtfs_dirs {
        if !dir.exists() {
            return Err(Error::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("GTFS directory not found: {}", dir.display()),
            )));
        }
    }

    Ok(())
}

/// Number of stops lying outside the convex hull of the street nodes
fn stops_outside_streets(streets: &StreetGraph, transit: &PublicTransitData) -> usize {
    let hull = streets
        .graph
        .node_weights()
        .map(|node| node.geometry)
        .collect::<MultiPoint>()
        .convex_hull();

    transit
        .stops
        .iter()
        .filter(|stop| !stop.geometry.intersects(&hull))
        .count()
}

#[allow(clippy::cast_precision_loss)]
fn validate_graph_transit_overlap(streets: &StreetGraph, transit: &PublicTransitData) {
    let total = transit.stops.len();
    let outside = stops_outside_streets(streets, transit);
    if outside == 0 || total == 0 {
        return;
    }

    log::warn!(
        "{outside} of {total} stops ({:.1}%) lie outside the street network and may be \
         unreachable; the OSM extract should cover the whole transit area",
        outside as f64 / total as f64 * 100.0
    );
}
