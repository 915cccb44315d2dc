use serde::Serialize;

use crate::routing::raptor::{AccessStop, EgressArrival, RaptorQuery, raptor};
use crate::{Error, MAX_CANDIDATE_STOPS, Time, TransitModel, TransitPoint};

/// Result of a multimodal routing query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MultiModalResult {
    /// Door-to-door travel time in seconds
    pub travel_time: Time,
    /// Access and egress walking, or the whole walk when no transit is used
    pub walking_time: Time,
    /// Time between the first boarding stop and the last alighting stop
    pub transit_time: Option<Time>,
    pub transfers: usize,
    pub departure_time: Time,
}

impl MultiModalResult {
    fn walking_only(departure_time: Time, walking_time: Time) -> Self {
        Self {
            travel_time: walking_time,
            walking_time,
            transit_time: None,
            transfers: 0,
            departure_time,
        }
    }

    fn with_transit(departure_time: Time, found: EgressArrival) -> Self {
        let travel_time = found.arrival.saturating_sub(departure_time);
        let walking_time = found.access_walk + found.egress_walk;
        Self {
            travel_time,
            walking_time,
            transit_time: Some(travel_time.saturating_sub(walking_time)),
            transfers: found.transfers,
            departure_time,
        }
    }

    pub fn used_transit(&self) -> bool {
        self.transit_time.is_some()
    }

    pub fn arrival_time(&self) -> Time {
        self.departure_time.saturating_add(self.travel_time)
    }
}

/// Access or egress stops of a point considered by routing
pub(crate) fn candidate_stops(point: &TransitPoint) -> &[AccessStop] {
    let len = point.nearest_stops.len().min(MAX_CANDIDATE_STOPS);
    &point.nearest_stops[..len]
}

/// Walking wins ties against transit
pub(crate) fn is_walking_better(walking: Option<Time>, transit_travel: Option<Time>) -> bool {
    match (walking, transit_travel) {
        (Some(walk), Some(transit)) => walk <= transit,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

pub(crate) fn best_of(
    departure_time: Time,
    walking: Option<Time>,
    transit: Option<EgressArrival>,
) -> Option<MultiModalResult> {
    let transit = transit.map(|found| MultiModalResult::with_transit(departure_time, found));

    if is_walking_better(walking, transit.map(|result| result.travel_time)) {
        walking.map(|walk| MultiModalResult::walking_only(departure_time, walk))
    } else {
        transit
    }
}

/// Fastest journey between two points, by transit or on foot.
///
/// All nearby stops of `start` are searched at once; the journey is compared
/// with walking directly. `Ok(None)` when the destination cannot be reached.
pub fn multimodal_routing(
    transit_model: &TransitModel,
    start: &TransitPoint,
    end: &TransitPoint,
    departure_time: Time,
    max_transfers: usize,
) -> Result<Option<MultiModalResult>, Error> {
    start.ensure_model(transit_model)?;
    end.ensure_model(transit_model)?;

    let egress = candidate_stops(end);
    let query = RaptorQuery {
        sources: candidate_stops(start),
        egress: Some(egress),
        departure_time,
        max_transfers,
        cutoff: None,
    };
    let transit = raptor(&transit_model.transit_data, &query)?.best_via(egress);
    let walking = start.walking_time_to(transit_model, end);

    Ok(best_of(departure_time, walking, transit))
}

/// Journeys from one point to many, from a single sweep over all stops.
///
/// Results keep the order of `end_points`; unreachable destinations are `None`.
pub fn multimodal_routing_one_to_many(
    transit_model: &TransitModel,
    start: &TransitPoint,
    end_points: &[TransitPoint],
    departure_time: Time,
    max_transfers: usize,
) -> Result<Vec<Option<MultiModalResult>>, Error> {
    start.ensure_model(transit_model)?;
    for end in end_points {
        end.ensure_model(transit_model)?;
    }

    let query = RaptorQuery {
        sources: candidate_stops(start),
        egress: None,
        departure_time,
        max_transfers,
        cutoff: None,
    };
    let result = raptor(&transit_model.transit_data, &query)?;
    let walking = start.walking_times_to(transit_model, end_points);

    Ok(end_points
        .iter()
        .zip(walking)
        .map(|(end, walk)| best_of(departure_time, walk, result.best_via(candidate_stops(end))))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::raptor::RaptorError;
    use crate::test_fixtures::{STOP_A, STOP_B, STOP_D, STOP_E, fixture_model, point_at_stop};

    #[test]
    fn transfer_between_routes() {
        let model = fixture_model();
        let start = point_at_stop(&model, STOP_A);
        let end = point_at_stop(&model, STOP_D);

        let result = multimodal_routing(&model, &start, &end, 28800, 2)
            .unwrap()
            .unwrap();
        assert_eq!(result.travel_time, 1200);
        assert_eq!(result.transfers, 1);
        assert_eq!(result.walking_time, 0);
        assert_eq!(result.transit_time, Some(1200));
        assert!(result.used_transit());
        assert_eq!(result.arrival_time(), 30000);
    }

    #[test]
    fn fewer_transfers_cannot_be_faster() {
        let model = fixture_model();
        let start = point_at_stop(&model, STOP_A);
        let end = point_at_stop(&model, STOP_D);

        // a zero budget boards nothing
        let no_trip = multimodal_routing(&model, &start, &end, 28800, 0).unwrap();
        assert!(no_trip.is_none_or(|r| !r.used_transit()));

        let direct_ride = multimodal_routing(&model, &start, &end, 28800, 1)
            .unwrap()
            .unwrap();
        assert!(direct_ride.travel_time > 1200);
        assert_eq!(direct_ride.transfers, 0);
        assert!(direct_ride.walking_time > 0);

        let mut previous = direct_ride.travel_time;
        for max_transfers in 2..5 {
            let result = multimodal_routing(&model, &start, &end, 28800, max_transfers)
                .unwrap()
                .unwrap();
            assert!(result.travel_time <= previous);
            previous = result.travel_time;
        }
        assert_eq!(previous, 1200);
    }

    #[test]
    fn unbounded_transfer_budget_matches_a_small_one() {
        let model = fixture_model();
        let start = point_at_stop(&model, STOP_A);
        let end = point_at_stop(&model, STOP_D);

        let bounded = multimodal_routing(&model, &start, &end, 28800, 3).unwrap();
        assert!(bounded.is_some());
        for max_transfers in [1 << 40, usize::MAX] {
            let unbounded =
                multimodal_routing(&model, &start, &end, 28800, max_transfers).unwrap();
            assert_eq!(unbounded, bounded);
        }
    }

    #[test]
    fn walking_wins_ties() {
        let model = fixture_model();
        let start = point_at_stop(&model, STOP_B);
        let end = point_at_stop(&model, STOP_E);

        let result = multimodal_routing(&model, &start, &end, 28800, 2)
            .unwrap()
            .unwrap();
        assert!(!result.used_transit());
        assert_eq!(result.walking_time, result.travel_time);
        assert_eq!(Some(result.travel_time), start.walking_time_to(&model, &end));
    }

    #[test]
    fn unreachable_destination_is_none() {
        let model = fixture_model();
        let start = point_at_stop(&model, STOP_D);
        let end = point_at_stop(&model, STOP_A);

        assert_eq!(multimodal_routing(&model, &start, &end, 28800, 3).unwrap(), None);
    }

    #[test]
    fn one_to_many_preserves_order() {
        let model = fixture_model();
        let start = point_at_stop(&model, STOP_A);
        let ends = vec![
            point_at_stop(&model, STOP_D),
            point_at_stop(&model, STOP_B),
            point_at_stop(&model, STOP_A),
        ];

        let results = multimodal_routing_one_to_many(&model, &start, &ends, 28800, 2).unwrap();
        assert_eq!(results.len(), 3);
        let times: Vec<_> = results.iter().map(|r| r.map(|r| r.travel_time)).collect();
        assert_eq!(times, vec![Some(1200), Some(300), Some(0)]);

        for (end, batched) in ends.iter().zip(&results) {
            let single = multimodal_routing(&model, &start, end, 28800, 2).unwrap();
            assert_eq!(&single, batched);
        }
    }

    #[test]
    fn rejects_foreign_points_and_bad_times() {
        let model = fixture_model();
        let other = fixture_model();
        let start = point_at_stop(&model, STOP_A);
        let foreign = point_at_stop(&other, STOP_D);

        assert!(matches!(
            multimodal_routing(&model, &start, &foreign, 28800, 1),
            Err(Error::ModelMismatch)
        ));
        assert!(matches!(
            multimodal_routing_one_to_many(&model, &start, &[foreign], 28800, 1),
            Err(Error::ModelMismatch)
        ));
        assert!(matches!(
            multimodal_routing(&model, &start, &start, 86400 * 3, 1),
            Err(Error::Raptor(RaptorError::InvalidTime))
        ));
    }
}
