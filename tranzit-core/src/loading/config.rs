use std::path::PathBuf;

use chrono::NaiveDate;

use crate::Time;

/// Longest walk between two stops accepted as a transfer by default, seconds
pub const DEFAULT_MAX_TRANSFER_TIME: Time = 1800;

/// Inputs of `create_transit_model`
#[derive(Debug, Clone)]
pub struct TransitModelConfig {
    /// OSM `.pbf` extract covering the transit area
    pub osm_path: PathBuf,
    /// Directories holding unpacked GTFS feeds
    pub gtfs_dirs: Vec<PathBuf>,
    /// Service day to keep trips for; `None` keeps every trip
    pub date: Option<NaiveDate>,
    pub max_transfer_time: Time,
}

impl TransitModelConfig {
    pub fn new(osm_path: impl Into<PathBuf>, gtfs_dirs: Vec<PathBuf>) -> Self {
        Self {
            osm_path: osm_path.into(),
            gtfs_dirs,
            date: None,
            max_transfer_time: DEFAULT_MAX_TRANSFER_TIME,
        }
    }

    #[must_use]
    pub fn with_date(mut self, date: Option<NaiveDate>) -> Self {
        self.date = date;
        self
    }

    #[must_use]
    pub fn with_max_transfer_time(mut self, max_transfer_time: Time) -> Self {
        self.max_transfer_time = max_transfer_time;
        self
    }
}
