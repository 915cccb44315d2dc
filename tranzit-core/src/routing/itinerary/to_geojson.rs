use geo::{Coord, LineString, line_string};
use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use serde_json::json;

use super::{DetailedJourney, WalkingLeg};
use crate::routing::raptor::JourneyLeg;
use crate::{Error, PublicTransitData, RaptorStopId, RouteId, Time};

impl WalkingLeg {
    fn to_feature(&self, leg_type: &str) -> Result<Feature, Error> {
        let line = line_string![
            (x: self.from_location.x(), y: self.from_location.y()),
            (x: self.to_location.x(), y: self.to_location.y()),
        ];

        let value = json!({
            "type": "Feature",
            "geometry": Geometry::new(GeoJsonValue::from(&line)),
            "properties": {
                "leg_type": leg_type,
                "from_name": self.from_name,
                "to_name": self.to_name,
                "departure_time": self.departure_time,
                "arrival_time": self.arrival_time,
                "duration": self.duration,
            }
        });

        Feature::from_json_value(value).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

impl DetailedJourney {
    /// Converts the complete journey to a `GeoJSON` `FeatureCollection`.
    ///
    /// Walks and transfers are straight lines; rides pass through every
    /// intermediate stop of their route.
    pub fn to_geojson(&self, transit_data: &PublicTransitData) -> Result<FeatureCollection, Error> {
        let mut features = Vec::new();

        if let Some(access) = &self.access_leg {
            features.push(access.to_feature("access_walk")?);
        }

        if let Some(transit) = &self.transit_journey {
            for (idx, leg) in transit.legs.iter().enumerate() {
                let feature = match *leg {
                    JourneyLeg::Transit {
                        route_id,
                        trip_id,
                        from_stop,
                        departure_time,
                        to_stop,
                        arrival_time,
                    } => create_transit_feature(
                        transit_data,
                        idx,
                        route_id,
                        trip_id,
                        (from_stop, to_stop),
                        (departure_time, arrival_time),
                    )?,
                    JourneyLeg::Transfer {
                        from_stop,
                        departure_time,
                        to_stop,
                        arrival_time,
                        duration,
                    } => create_transfer_feature(
                        transit_data,
                        idx,
                        (from_stop, to_stop),
                        (departure_time, arrival_time),
                        duration,
                    )?,
                };
                features.push(feature);
            }
        }

        if let Some(egress) = &self.egress_leg {
            features.push(egress.to_feature("egress_walk")?);
        }

        Ok(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        })
    }

    pub fn to_geojson_string(&self, transit_data: &PublicTransitData) -> Result<String, Error> {
        serde_json::to_string(&self.to_geojson(transit_data)?)
            .map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

fn stop_coord(transit_data: &PublicTransitData, stop: RaptorStopId) -> Result<Coord<f64>, Error> {
    transit_data
        .transit_stop_location(stop)
        .map(Coord::from)
        .ok_or(Error::Raptor(crate::routing::raptor::RaptorError::InvalidStop))
}

fn create_transit_feature(
    transit_data: &PublicTransitData,
    leg_idx: usize,
    route_id: RouteId,
    trip_id: usize,
    (from_stop, to_stop): (RaptorStopId, RaptorStopId),
    (departure_time, arrival_time): (Time, Time),
) -> Result<Feature, Error> {
    let route_stops = transit_data.get_route_stops(route_id)?;
    let start_idx = route_stops
        .iter()
        .position(|&s| s == from_stop)
        .unwrap_or_default();
    let end_idx = route_stops
        .iter()
        .skip(start_idx + 1)
        .position(|&s| s == to_stop)
        .map_or(start_idx, |offset| start_idx + 1 + offset);

    let mut coords = vec![stop_coord(transit_data, from_stop)?];
    for &stop in route_stops.iter().take(end_idx).skip(start_idx + 1) {
        coords.push(stop_coord(transit_data, stop)?);
    }
    coords.push(stop_coord(transit_data, to_stop)?);

    let geometry = Geometry::new(GeoJsonValue::from(&LineString::new(coords)));

    let value = json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": {
            "leg_type": "transit",
            "leg_index": leg_idx,
            "route_id": transit_data.routes[route_id].route_id,
            "trip_id": trip_id,
            "from_name": transit_data.transit_stop_name(from_stop).unwrap_or_default(),
            "to_name": transit_data.transit_stop_name(to_stop).unwrap_or_default(),
            "departure_time": departure_time,
            "arrival_time": arrival_time,
            "duration": arrival_time.saturating_sub(departure_time),
        }
    });

    Feature::from_json_value(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}

fn create_transfer_feature(
    transit_data: &PublicTransitData,
    leg_idx: usize,
    (from_stop, to_stop): (RaptorStopId, RaptorStopId),
    (departure_time, arrival_time): (Time, Time),
    duration: Time,
) -> Result<Feature, Error> {
    let line = LineString::new(vec![
        stop_coord(transit_data, from_stop)?,
        stop_coord(transit_data, to_stop)?,
    ]);

    let value = json!({
        "type": "Feature",
        "geometry": Geometry::new(GeoJsonValue::from(&line)),
        "properties": {
            "leg_type": "transfer",
            "leg_index": leg_idx,
            "from_name": transit_data.transit_stop_name(from_stop).unwrap_or_default(),
            "to_name": transit_data.transit_stop_name(to_stop).unwrap_or_default(),
            "departure_time": departure_time,
            "arrival_time": arrival_time,
            "duration": duration,
        }
    });

    Feature::from_json_value(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}
