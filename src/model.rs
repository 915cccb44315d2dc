use std::path::{Path, PathBuf};

use tranzit_core::prelude::*;

/// Create a unified transit model from OSM and GTFS data
///
/// Builds the street network from the OSM extract, loads every GTFS feed in
/// `gtfs_dirs`, connects stops to the streets and computes walking transfers
/// between stops closer than `max_transfer_time` seconds.
///
/// With `date` set, only trips running on that service day are kept.
///
/// # Errors
///
/// Fails when an input is missing or unreadable, or when no trip is active.
pub fn create_transit_model(
    osm_path: impl AsRef<Path>,
    gtfs_dirs: &[impl AsRef<Path>],
    date: Option<chrono::NaiveDate>,
    max_transfer_time: Time,
) -> Result<TransitModel, Error> {
    let config = TransitModelConfig::new(
        osm_path.as_ref(),
        gtfs_dirs
            .iter()
            .map(|dir| PathBuf::from(dir.as_ref()))
            .collect(),
    )
    .with_date(date)
    .with_max_transfer_time(max_transfer_time);

    tranzit_core::create_transit_model(&config)
}
