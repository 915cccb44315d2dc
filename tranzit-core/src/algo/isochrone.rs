//! Calculation of isochrones with naive buffer over reached nodes
//! can be very slow for large areas. This module provides an
//! alternative approach to calculate isochrones using H3 hexagonal
//! grid cells as a `index`.

use geo::{BoundingRect, MultiPolygon, Point};
use log::{debug, warn};
use rayon::prelude::*;

use h3o::{
    CellIndex, LatLng, Resolution,
    geom::{ContainmentMode, SolventBuilder, TilerBuilder},
};

use crate::routing::multimodal_routing::{best_of, candidate_stops};
use crate::routing::raptor::{RaptorQuery, raptor};
use crate::{Error, MAX_CANDIDATE_STOPS, Time, TransitModel, TransitPoint};

/// Index for isochrone calculation covering a specific area
/// It contains a grid of hexagonal H3 cells and their respective
/// transit points.
#[derive(Debug, Clone)]
pub struct IsochroneIndex {
    grid: Vec<CellIndex>,
    transit_points: Vec<TransitPoint>,
    resolution: u8,
    model_id: u64,
}

impl IsochroneIndex {
    /// Covers `area` with H3 cells and snaps every cell centroid to the street
    /// network of `transit_model`.
    ///
    /// Cells whose centroid has no street within `max_walking_time` are left out.
    ///
    /// # Errors
    ///
    /// `InvalidData` for a resolution outside `0..=15`, `H3Error` for an area
    /// H3 cannot tile.
    pub fn new(
        transit_model: &TransitModel,
        area: &MultiPolygon<f64>,
        cell_resolution: u8,
        max_walking_time: Time,
    ) -> Result<Self, Error> {
        let coverage = create_hex_coverage(area, cell_resolution)?;

        let (grid, transit_points): (Vec<CellIndex>, Vec<TransitPoint>) = coverage
            .par_iter()
            .filter_map(|&cell| {
                TransitPoint::new(
                    cell_centroid(cell),
                    transit_model,
                    max_walking_time,
                    MAX_CANDIDATE_STOPS,
                )
                .ok()
                .map(|point| (cell, point))
            })
            .unzip();

        let skipped = coverage.len() - grid.len();
        if skipped > 0 {
            warn!(
                "{skipped} of {} isochrone cells have no street within {max_walking_time}s",
                coverage.len()
            );
        }
        debug!(
            "Isochrone index with {} cells at resolution {cell_resolution}",
            grid.len()
        );

        Ok(Self {
            grid,
            transit_points,
            resolution: cell_resolution,
            model_id: transit_model.id(),
        })
    }

    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    pub fn resolution(&self) -> u8 {
        self.resolution
    }

    pub fn model_id(&self) -> u64 {
        self.model_id
    }

    pub fn cells(&self) -> &[CellIndex] {
        &self.grid
    }

    /// Snapped cell centroids, aligned with `cells()`
    pub fn transit_points(&self) -> &[TransitPoint] {
        &self.transit_points
    }
}

/// Area reachable from `start` within `cutoff` seconds, as dissolved H3 cells.
///
/// A cell counts as reached when the fastest journey to its centroid, by
/// transit or on foot, takes at most `cutoff`. Nothing reached gives an
/// empty `MultiPolygon`.
///
/// # Errors
///
/// `IndexMismatch` or `ModelMismatch` when the index or the point belongs to
/// another model.
pub fn calculate_isochrone(
    transit_model: &TransitModel,
    start: &TransitPoint,
    departure_time: Time,
    max_transfers: usize,
    cutoff: Time,
    index: &IsochroneIndex,
) -> Result<MultiPolygon, Error> {
    if index.model_id != transit_model.id() {
        return Err(Error::IndexMismatch);
    }
    start.ensure_model(transit_model)?;

    let query = RaptorQuery {
        sources: candidate_stops(start),
        egress: None,
        departure_time,
        max_transfers,
        cutoff: Some(cutoff),
    };
    let result = raptor(&transit_model.transit_data, &query)?;
    let walking = start.walking_times_to(transit_model, &index.transit_points);

    let reached_cells: Vec<CellIndex> = index
        .transit_points
        .iter()
        .zip(walking)
        .zip(&index.grid)
        .filter_map(|((point, walk), &cell)| {
            best_of(departure_time, walk, result.best_via(candidate_stops(point)))
                .filter(|journey| journey.travel_time <= cutoff)
                .map(|_| cell)
        })
        .collect();

    debug!(
        "{} of {} cells reached within {cutoff}s",
        reached_cells.len(),
        index.len()
    );

    if reached_cells.is_empty() {
        return Ok(MultiPolygon::new(Vec::new()));
    }

    let solvent = SolventBuilder::new().build();
    solvent
        .dissolve(reached_cells)
        .map_err(|e| Error::IsochroneError(e.to_string()))
}

/// Isochrones of many origins sharing one index, computed in parallel
pub fn bulk_isochrones(
    transit_model: &TransitModel,
    starts: &[TransitPoint],
    departure_time: Time,
    max_transfers: usize,
    cutoff: Time,
    index: &IsochroneIndex,
) -> Result<Vec<MultiPolygon>, Error> {
    starts
        .par_iter()
        .map(|start| {
            calculate_isochrone(
                transit_model,
                start,
                departure_time,
                max_transfers,
                cutoff,
                index,
            )
        })
        .collect()
}

/// Upper estimate of the H3 cells needed to cover `area`, from its bounding
/// box and the average cell area at `cell_resolution`.
///
/// # Errors
///
/// `InvalidData` for a resolution outside `0..=15`.
pub fn estimate_cell_count(area: &MultiPolygon<f64>, cell_resolution: u8) -> Result<usize, Error> {
    let resolution = Resolution::try_from(cell_resolution)
        .map_err(|e| Error::InvalidData(format!("Got invalid H3 resolution {e}")))?;
    let Some(bbox) = area.bounding_rect() else {
        return Ok(0);
    };

    let mid_lat = bbox.center().y.to_radians();
    let height_km = bbox.height() * KM_PER_DEGREE;
    let width_km = bbox.width() * KM_PER_DEGREE * mid_lat.cos().abs();
    let cells = (height_km * width_km / resolution.area_km2()).ceil();

    // always at least the cell holding the area
    Ok((cells as usize).max(1))
}

const KM_PER_DEGREE: f64 = 111.32;

fn create_hex_coverage(area: &MultiPolygon<f64>, resolution: u8) -> Result<Vec<CellIndex>, Error> {
    let resolution = Resolution::try_from(resolution)
        .map_err(|e| Error::InvalidData(format!("Got invalid H3 resolution {e}")))?;

    let mut tiler = TilerBuilder::new(resolution)
        .containment_mode(ContainmentMode::Covers)
        .build();
    tiler.add_batch(area.0.iter().cloned())?;

    Ok(tiler.into_coverage().collect::<Vec<_>>())
}

fn cell_centroid(cell: CellIndex) -> Point<f64> {
    let lat_lng = LatLng::from(cell);
    Point::new(lat_lng.lng(), lat_lng.lat())
}
