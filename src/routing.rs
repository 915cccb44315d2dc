use geo::Point;
use serde::Serialize;
use tranzit_core::prelude::*;

/// Walking budget of points created with `create_transit_point`, seconds
pub const DEFAULT_MAX_WALKING_TIME: Time = 1200;
/// Stops kept per point created with `create_transit_point`
pub const DEFAULT_MAX_NEAREST_STOPS: usize = 10;

/// Summary of the fastest journey between two points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteSummary {
    pub travel_time_seconds: Time,
    pub walking_time_seconds: Time,
    pub transit_time_seconds: Option<Time>,
    pub transfers: usize,
    pub used_transit: bool,
}

impl From<&MultiModalResult> for RouteSummary {
    fn from(result: &MultiModalResult) -> Self {
        Self {
            travel_time_seconds: result.travel_time,
            walking_time_seconds: result.walking_time,
            transit_time_seconds: result.transit_time,
            transfers: result.transfers,
            used_transit: result.used_transit(),
        }
    }
}

/// Snap `(lat, lon)` to the model with the default walking budget and stop count
///
/// # Errors
///
/// `Error::NoPointsFound` when no street is within walking distance.
pub fn create_transit_point(lat: f64, lon: f64, model: &TransitModel) -> Result<TransitPoint, Error> {
    create_transit_point_with(
        lat,
        lon,
        model,
        DEFAULT_MAX_WALKING_TIME,
        DEFAULT_MAX_NEAREST_STOPS,
    )
}

pub fn create_transit_point_with(
    lat: f64,
    lon: f64,
    model: &TransitModel,
    max_walking_time: Time,
    max_nearest_stops: usize,
) -> Result<TransitPoint, Error> {
    TransitPoint::new(Point::new(lon, lat), model, max_walking_time, max_nearest_stops)
}

pub fn find_route(
    model: &TransitModel,
    start: &TransitPoint,
    end: &TransitPoint,
    departure_time: Time,
    max_transfers: usize,
) -> Result<Option<RouteSummary>, Error> {
    let result = multimodal_routing(model, start, end, departure_time, max_transfers)?;
    Ok(result.as_ref().map(RouteSummary::from))
}

/// Routes from `start` to every end point; `None` marks unreachable ends
pub fn find_routes_one_to_many(
    model: &TransitModel,
    start: &TransitPoint,
    ends: &[TransitPoint],
    departure_time: Time,
    max_transfers: usize,
) -> Result<Vec<Option<RouteSummary>>, Error> {
    let results = multimodal_routing_one_to_many(model, start, ends, departure_time, max_transfers)?;
    Ok(results
        .iter()
        .map(|result| result.as_ref().map(RouteSummary::from))
        .collect())
}

/// Fastest journey with every leg, as a `GeoJSON` `FeatureCollection` string
pub fn find_detailed_route(
    model: &TransitModel,
    start: &TransitPoint,
    end: &TransitPoint,
    departure_time: Time,
    max_transfers: usize,
) -> Result<Option<String>, Error> {
    traced_multimodal_routing(model, start, end, departure_time, max_transfers)?
        .map(|journey| journey.to_geojson_string(&model.transit_data))
        .transpose()
}
