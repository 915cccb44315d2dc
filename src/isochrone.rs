use geo::{Geometry, MultiPolygon};
use tranzit_core::prelude::*;
use wkt::{ToWkt, TryFromWkt};

use crate::routing::DEFAULT_MAX_WALKING_TIME;

/// Builds an H3 isochrone index over a WKT `POLYGON` or `MULTIPOLYGON`,
/// snapping cell centroids with the default walking budget
///
/// # Errors
///
/// `Error::InvalidArea` when the WKT cannot be parsed or is not areal.
pub fn create_isochrone_index(
    model: &TransitModel,
    area: &str,
    cell_resolution: u8,
) -> Result<IsochroneIndex, Error> {
    create_isochrone_index_with(model, area, cell_resolution, DEFAULT_MAX_WALKING_TIME)
}

pub fn create_isochrone_index_with(
    model: &TransitModel,
    area: &str,
    cell_resolution: u8,
    max_walking_time: Time,
) -> Result<IsochroneIndex, Error> {
    IsochroneIndex::new(model, &parse_area(area)?, cell_resolution, max_walking_time)
}

/// Rough number of H3 cells an index over `area` would hold, without
/// snapping any of them
///
/// # Errors
///
/// `Error::InvalidArea` for a bad WKT area, `Error::InvalidData` for a bad
/// resolution.
pub fn estimate_isochrone_cells(area: &str, cell_resolution: u8) -> Result<usize, Error> {
    estimate_cell_count(&parse_area(area)?, cell_resolution)
}

fn parse_area(area: &str) -> Result<MultiPolygon<f64>, Error> {
    let geometry = Geometry::<f64>::try_from_wkt_str(area)
        .map_err(|e| Error::InvalidArea(format!("Failed to parse area WKT: {e}")))?;

    match geometry {
        Geometry::Polygon(polygon) => Ok(MultiPolygon::new(vec![polygon])),
        Geometry::MultiPolygon(multi_polygon) => Ok(multi_polygon),
        _ => Err(Error::InvalidArea(
            "Area must be a POLYGON or MULTIPOLYGON".to_string(),
        )),
    }
}

/// Isochrone as WKT; `MULTIPOLYGON EMPTY` when the cutoff reaches nothing
pub fn calculate_isochrone(
    model: &TransitModel,
    start: &TransitPoint,
    departure_time: Time,
    max_transfers: usize,
    cutoff: Time,
    index: &IsochroneIndex,
) -> Result<String, Error> {
    let isochrone = tranzit_core::algo::isochrone::calculate_isochrone(
        model,
        start,
        departure_time,
        max_transfers,
        cutoff,
        index,
    )?;

    Ok(isochrone.wkt_string())
}

pub fn calculate_bulk_isochrones(
    model: &TransitModel,
    starts: &[TransitPoint],
    departure_time: Time,
    max_transfers: usize,
    cutoff: Time,
    index: &IsochroneIndex,
) -> Result<Vec<String>, Error> {
    let isochrones = tranzit_core::algo::isochrone::bulk_isochrones(
        model,
        starts,
        departure_time,
        max_transfers,
        cutoff,
        index,
    )?;

    Ok(isochrones.iter().map(ToWkt::wkt_string).collect())
}
