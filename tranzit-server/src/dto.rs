//! Request and response bodies of the HTTP API

use serde::{Deserialize, Serialize};
use tranzit::{RouteSummary, Time, TransitModel, TransitPoint};

use crate::error::ApiError;

/// Largest accepted transfer budget
pub const MAX_TRANSFERS: usize = 8;
/// Finest accepted H3 resolution for isochrone areas
pub const MAX_RESOLUTION: u8 = 12;
/// Largest estimated H3 cell count of an isochrone area
pub const MAX_ISOCHRONE_CELLS: usize = 100_000;
/// Most destinations of a one-to-many request
pub const MAX_DESTINATIONS: usize = 10_000;
/// Most points of a matrix request, which runs one search per point
pub const MAX_MATRIX_POINTS: usize = 500;

fn default_max_transfers() -> usize {
    2
}

fn default_resolution() -> u8 {
    9
}

/// Limits checked before a request reaches the blocking pool
pub trait Validate {
    fn validate(&self) -> Result<(), ApiError>;
}

fn check_max_transfers(max_transfers: usize) -> Result<(), ApiError> {
    if max_transfers > MAX_TRANSFERS {
        return Err(ApiError::BadRequest(format!(
            "max_transfers must be at most {MAX_TRANSFERS}, got {max_transfers}"
        )));
    }
    Ok(())
}

fn check_len(what: &str, len: usize, max: usize) -> Result<(), ApiError> {
    if len > max {
        return Err(ApiError::BadRequest(format!(
            "At most {max} {what} are allowed, got {len}"
        )));
    }
    Ok(())
}

/// A location in WGS84 degrees
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PointDto {
    pub lat: f64,
    pub lon: f64,
}

impl PointDto {
    pub fn snap(self, model: &TransitModel) -> Result<TransitPoint, ApiError> {
        if !(-90.0..=90.0).contains(&self.lat) || !(-180.0..=180.0).contains(&self.lon) {
            return Err(ApiError::BadRequest(format!(
                "Coordinates out of range: ({}, {})",
                self.lat, self.lon
            )));
        }
        Ok(tranzit::create_transit_point(self.lat, self.lon, model)?)
    }
}

pub fn snap_all(points: &[PointDto], model: &TransitModel) -> Result<Vec<TransitPoint>, ApiError> {
    points.iter().map(|point| point.snap(model)).collect()
}

#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    pub start: PointDto,
    pub end: PointDto,
    pub departure_time: Time,
    #[serde(default = "default_max_transfers")]
    pub max_transfers: usize,
}

#[derive(Debug, Deserialize)]
pub struct OneToManyRequest {
    pub start: PointDto,
    pub ends: Vec<PointDto>,
    pub departure_time: Time,
    #[serde(default = "default_max_transfers")]
    pub max_transfers: usize,
}

#[derive(Debug, Deserialize)]
pub struct MatrixRequest {
    pub points: Vec<PointDto>,
    pub departure_time: Time,
    #[serde(default = "default_max_transfers")]
    pub max_transfers: usize,
}

/// Isochrone over `area`, a WKT polygon tiled with H3 cells of `resolution`
#[derive(Debug, Deserialize)]
pub struct IsochroneRequest {
    pub start: PointDto,
    pub departure_time: Time,
    pub cutoff: Time,
    pub area: String,
    #[serde(default = "default_resolution")]
    pub resolution: u8,
    #[serde(default = "default_max_transfers")]
    pub max_transfers: usize,
}

#[derive(Debug, Deserialize)]
pub struct RangeRequest {
    pub start: PointDto,
    pub end: PointDto,
    pub earliest_departure: Time,
    pub latest_departure: Time,
    #[serde(default = "default_max_transfers")]
    pub max_transfers: usize,
}

impl Validate for RouteRequest {
    fn validate(&self) -> Result<(), ApiError> {
        check_max_transfers(self.max_transfers)
    }
}

impl Validate for OneToManyRequest {
    fn validate(&self) -> Result<(), ApiError> {
        check_max_transfers(self.max_transfers)?;
        check_len("destinations", self.ends.len(), MAX_DESTINATIONS)
    }
}

impl Validate for MatrixRequest {
    fn validate(&self) -> Result<(), ApiError> {
        check_max_transfers(self.max_transfers)?;
        check_len("matrix points", self.points.len(), MAX_MATRIX_POINTS)
    }
}

impl Validate for IsochroneRequest {
    fn validate(&self) -> Result<(), ApiError> {
        check_max_transfers(self.max_transfers)?;
        if self.resolution > MAX_RESOLUTION {
            return Err(ApiError::BadRequest(format!(
                "resolution must be at most {MAX_RESOLUTION}, got {}",
                self.resolution
            )));
        }
        let cells = tranzit::estimate_isochrone_cells(&self.area, self.resolution)?;
        check_len("isochrone cells", cells, MAX_ISOCHRONE_CELLS)
    }
}

impl Validate for RangeRequest {
    fn validate(&self) -> Result<(), ApiError> {
        check_max_transfers(self.max_transfers)
    }
}

#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub route: Option<RouteSummary>,
}

#[derive(Debug, Serialize)]
pub struct OneToManyResponse {
    pub routes: Vec<Option<RouteSummary>>,
}

#[derive(Debug, Serialize)]
pub struct DetailedRouteResponse {
    /// `GeoJSON` `FeatureCollection`, `null` when unreachable
    pub journey: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct MatrixResponse {
    pub travel_times: Vec<Vec<Option<Time>>>,
}

#[derive(Debug, Serialize)]
pub struct IsochroneResponse {
    pub wkt: String,
    pub cells: usize,
}

#[derive(Debug, Serialize)]
pub struct RangeResponse {
    pub departure_times: Vec<Time>,
    pub travel_times: Vec<Time>,
    pub median_travel_time: Option<Time>,
}

#[derive(Debug, Serialize)]
pub struct ModelResponse {
    pub summary: String,
    pub info: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_transfers_defaults_to_two() {
        let request: RouteRequest = serde_json::from_str(
            r#"{"start": {"lat": 56.25, "lon": 93.5}, "end": {"lat": 56.25, "lon": 93.56}, "departure_time": 28800}"#,
        )
        .unwrap();
        assert_eq!(request.max_transfers, 2);
    }

    #[test]
    fn isochrone_resolution_defaults_to_nine() {
        let request: IsochroneRequest = serde_json::from_str(
            r#"{"start": {"lat": 56.25, "lon": 93.5}, "departure_time": 0, "cutoff": 600, "area": "POLYGON EMPTY"}"#,
        )
        .unwrap();
        assert_eq!(request.resolution, 9);
    }

    fn isochrone(area: &str, resolution: u8, max_transfers: usize) -> IsochroneRequest {
        IsochroneRequest {
            start: PointDto { lat: 56.25, lon: 93.5 },
            departure_time: 28800,
            cutoff: 1800,
            area: area.to_string(),
            resolution,
            max_transfers,
        }
    }

    #[test]
    fn isochrone_limits() {
        let city = "POLYGON((93.49 56.246, 93.57 56.246, 93.57 56.254, 93.49 56.254, 93.49 56.246))";
        let country = "POLYGON((80 50, 90 50, 90 60, 80 60, 80 50))";

        assert!(isochrone(city, 9, 2).validate().is_ok());
        assert!(isochrone(city, MAX_RESOLUTION + 1, 2).validate().is_err());
        assert!(isochrone(city, 9, MAX_TRANSFERS + 1).validate().is_err());
        assert!(isochrone(country, 9, 2).validate().is_err());
        assert!(isochrone("LINESTRING(93.49 56.25, 93.57 56.25)", 9, 2).validate().is_err());
    }

    #[test]
    fn batch_sizes_and_transfer_budget_are_capped() {
        let point = PointDto { lat: 56.25, lon: 93.5 };
        let matrix = MatrixRequest {
            points: vec![point; MAX_MATRIX_POINTS + 1],
            departure_time: 28800,
            max_transfers: 2,
        };
        assert!(matches!(matrix.validate(), Err(ApiError::BadRequest(_))));

        let route = RouteRequest {
            start: point,
            end: point,
            departure_time: 28800,
            max_transfers: usize::MAX,
        };
        assert!(matches!(route.validate(), Err(ApiError::BadRequest(_))));
        assert!(RouteRequest { max_transfers: MAX_TRANSFERS, ..route }.validate().is_ok());
    }
}
