//! Journeys with their individual legs

mod to_geojson;

use geo::Point;

use crate::routing::multimodal_routing::{candidate_stops, is_walking_better};
use crate::routing::raptor::{Journey, RaptorQuery, traced_raptor};
use crate::{Error, PublicTransitData, RaptorStopId, Time, TransitModel, TransitPoint};

/// Represents a walking leg outside the transit network
#[derive(Debug, Clone, PartialEq)]
pub struct WalkingLeg {
    pub from_location: Point<f64>,
    pub to_location: Point<f64>,
    pub from_name: String,
    pub to_name: String,
    pub departure_time: Time,
    pub arrival_time: Time,
    pub duration: Time,
}

/// Represents a complete journey with first/last mile connections
#[derive(Debug, Clone, PartialEq)]
pub struct DetailedJourney {
    pub access_leg: Option<WalkingLeg>,
    pub transit_journey: Option<Journey>,
    pub egress_leg: Option<WalkingLeg>,
    pub total_time: Time,
    pub walking_time: Time,
    pub transit_time: Option<Time>,
    pub transfers: usize,
    pub departure_time: Time,
    pub arrival_time: Time,
}

impl DetailedJourney {
    /// Creates a walking-only journey
    pub fn walking_only(
        start: &TransitPoint,
        end: &TransitPoint,
        departure_time: Time,
        walking_time: Time,
    ) -> Self {
        let arrival_time = departure_time + walking_time;

        Self {
            access_leg: Some(WalkingLeg {
                from_location: start.geometry,
                to_location: end.geometry,
                from_name: String::new(),
                to_name: String::new(),
                departure_time,
                arrival_time,
                duration: walking_time,
            }),
            transit_journey: None,
            egress_leg: None,
            total_time: walking_time,
            walking_time,
            transit_time: None,
            transfers: 0,
            departure_time,
            arrival_time,
        }
    }

    fn with_transit(
        start: &TransitPoint,
        end: &TransitPoint,
        transit_data: &PublicTransitData,
        transit_journey: Journey,
        (access_time, egress_time): (Time, Time),
        departure_time: Time,
    ) -> Self {
        let stop_point = |stop: RaptorStopId| {
            let location = transit_data
                .transit_stop_location(stop)
                .unwrap_or(start.geometry);
            let name = transit_data
                .transit_stop_name(stop)
                .unwrap_or_default()
                .to_string();
            (location, name)
        };
        let (access_location, access_name) = stop_point(transit_journey.access_stop);
        let (egress_location, egress_name) = stop_point(transit_journey.egress_stop);

        let transit_departure = departure_time + access_time;
        let transit_arrival = transit_journey.arrival_time;
        let arrival_time = transit_arrival + egress_time;

        let access_leg = WalkingLeg {
            from_location: start.geometry,
            to_location: access_location,
            from_name: String::new(),
            to_name: access_name,
            departure_time,
            arrival_time: transit_departure,
            duration: access_time,
        };
        let egress_leg = WalkingLeg {
            from_location: egress_location,
            to_location: end.geometry,
            from_name: egress_name,
            to_name: String::new(),
            departure_time: transit_arrival,
            arrival_time,
            duration: egress_time,
        };

        let walking_time = access_time + egress_time;
        let total_time = arrival_time - departure_time;
        let transit_time = (!transit_journey.legs.is_empty())
            .then(|| total_time.saturating_sub(walking_time));

        Self {
            access_leg: Some(access_leg),
            egress_leg: Some(egress_leg),
            total_time,
            walking_time,
            transit_time,
            transfers: transit_journey.transfers_count,
            departure_time,
            arrival_time,
            transit_journey: Some(transit_journey).filter(|journey| !journey.legs.is_empty()),
        }
    }
}

/// Traced multimodal routing from one point to another with detailed itinerary
pub fn traced_multimodal_routing(
    transit_model: &TransitModel,
    start: &TransitPoint,
    end: &TransitPoint,
    departure_time: Time,
    max_transfers: usize,
) -> Result<Option<DetailedJourney>, Error> {
    start.ensure_model(transit_model)?;
    end.ensure_model(transit_model)?;

    let transit_data = &transit_model.transit_data;
    let sources = candidate_stops(start);
    let egress = candidate_stops(end);

    let journey = traced_raptor(
        transit_data,
        &RaptorQuery {
            sources,
            egress: Some(egress),
            departure_time,
            max_transfers,
            cutoff: None,
        },
    )?;

    let transit = journey.and_then(|journey| {
        let access = walk_to(sources, journey.access_stop)?;
        let egress = walk_to(egress, journey.egress_stop)?;
        let total = (journey.arrival_time + egress).saturating_sub(departure_time);
        Some((journey, (access, egress), total))
    });
    let walking = start.walking_time_to(transit_model, end);

    if is_walking_better(walking, transit.as_ref().map(|(_, _, total)| *total)) {
        return Ok(walking
            .map(|walk| DetailedJourney::walking_only(start, end, departure_time, walk)));
    }

    Ok(transit.map(|(journey, walks, _)| {
        DetailedJourney::with_transit(start, end, transit_data, journey, walks, departure_time)
    }))
}

fn walk_to(stops: &[(RaptorStopId, Time)], stop: RaptorStopId) -> Option<Time> {
    stops
        .iter()
        .find(|&&(candidate, _)| candidate == stop)
        .map(|&(_, walk)| walk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::multimodal_routing::multimodal_routing;
    use crate::routing::raptor::JourneyLeg;
    use crate::test_fixtures::{STOP_A, STOP_B, STOP_D, STOP_E, fixture_model, point_at_stop};

    #[test]
    fn detailed_route_matches_summary() {
        let model = fixture_model();
        let start = point_at_stop(&model, STOP_A);
        let end = point_at_stop(&model, STOP_D);

        let detailed = traced_multimodal_routing(&model, &start, &end, 28800, 2)
            .unwrap()
            .unwrap();
        let summary = multimodal_routing(&model, &start, &end, 28800, 2)
            .unwrap()
            .unwrap();

        assert_eq!(detailed.total_time, summary.travel_time);
        assert_eq!(detailed.transfers, summary.transfers);
        assert_eq!(detailed.walking_time, summary.walking_time);
        assert_eq!(detailed.arrival_time, 30000);

        let journey = detailed.transit_journey.as_ref().unwrap();
        assert_eq!(journey.legs.len(), 3);
        assert!(matches!(journey.legs[1], JourneyLeg::Transfer { .. }));
        assert_eq!(detailed.access_leg.as_ref().unwrap().to_name, "A");
        assert_eq!(detailed.egress_leg.as_ref().unwrap().from_name, "D");
    }

    #[test]
    fn short_hop_is_walked() {
        let model = fixture_model();
        let start = point_at_stop(&model, STOP_B);
        let end = point_at_stop(&model, STOP_E);

        let detailed = traced_multimodal_routing(&model, &start, &end, 28800, 2)
            .unwrap()
            .unwrap();
        assert!(detailed.transit_journey.is_none());
        assert!(detailed.egress_leg.is_none());
        assert_eq!(detailed.transit_time, None);
        assert_eq!(detailed.total_time, detailed.walking_time);
    }

    #[test]
    fn unreachable_gives_none() {
        let model = fixture_model();
        let start = point_at_stop(&model, STOP_D);
        let end = point_at_stop(&model, STOP_A);

        assert!(
            traced_multimodal_routing(&model, &start, &end, 28800, 2)
                .unwrap()
                .is_none()
        );
    }
}
