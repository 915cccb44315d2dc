//! Journeys over a window of departure times

use itertools::Itertools;
use log::warn;
use serde::Serialize;

use crate::routing::multimodal_routing::candidate_stops;
use crate::routing::raptor::{RaptorError, rraptor};
use crate::{Error, MAX_DEPARTURE_TIME, Time, TransitModel, TransitPoint};

/// Departure samples evaluated per range query; later ones are dropped
pub const MAX_RANGE_DEPARTURES: usize = 1024;

/// Best journey for one departure sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeJourney {
    pub departure_time: Time,
    pub travel_time: Time,
    pub transfers: usize,
}

/// Journeys of a range query, ordered by departure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RangeRoutingResult {
    pub journeys: Vec<RangeJourney>,
}

impl RangeRoutingResult {
    pub fn travel_times(&self) -> Vec<Time> {
        self.journeys.iter().map(|j| j.travel_time).collect()
    }

    pub fn departure_times(&self) -> Vec<Time> {
        self.journeys.iter().map(|j| j.departure_time).collect()
    }

    /// Median travel time; the two middle values are averaged (floored) for even counts
    pub fn median_travel_time(&self) -> Option<Time> {
        let sorted: Vec<Time> = self.travel_times().into_iter().sorted_unstable().collect();
        let mid = sorted.len() / 2;
        match sorted.len() {
            0 => None,
            len if len % 2 == 1 => Some(sorted[mid]),
            _ => Some(((u64::from(sorted[mid - 1]) + u64::from(sorted[mid])) / 2) as Time),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.journeys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.journeys.len()
    }

    pub fn as_json(&self) -> Result<String, Error> {
        serde_json::to_string(self).map_err(|e| Error::InvalidData(e.to_string()))
    }
}

/// Departure instants worth evaluating in `[t0, t1]`.
///
/// Every trip departure `d` at an access stop reached after `access` seconds
/// gives the instant `d - access`; the window bounds are always included.
fn departure_samples(
    transit_model: &TransitModel,
    start: &TransitPoint,
    (t0, t1): (Time, Time),
) -> Result<Vec<Time>, Error> {
    let data = &transit_model.transit_data;
    let mut samples = vec![t0, t1];

    for &(stop, access) in candidate_stops(start) {
        let earliest = t0.saturating_add(access);
        let latest = t1.saturating_add(access);
        samples.extend(
            data.get_source_departures(stop, earliest, latest)?
                .into_iter()
                .map(|departure| departure - access),
        );
    }

    samples.sort_unstable();
    samples.dedup();

    if samples.len() > MAX_RANGE_DEPARTURES {
        warn!(
            "Range query has {} departure samples, keeping the earliest {MAX_RANGE_DEPARTURES}",
            samples.len()
        );
        samples.truncate(MAX_RANGE_DEPARTURES);
    }

    Ok(samples)
}

/// Travel time for every departure sample in `departure_range`.
///
/// Each sample uses the faster of transit and walking directly; unreachable
/// samples are left out.
pub fn range_multimodal_routing(
    transit_model: &TransitModel,
    start: &TransitPoint,
    end: &TransitPoint,
    departure_range: (Time, Time),
    max_transfers: usize,
) -> Result<RangeRoutingResult, Error> {
    start.ensure_model(transit_model)?;
    end.ensure_model(transit_model)?;

    let (t0, t1) = departure_range;
    if t0 > t1 {
        return Err(Error::InvalidData(format!(
            "Departure range start {t0} is after its end {t1}"
        )));
    }
    if t1 > MAX_DEPARTURE_TIME {
        return Err(RaptorError::InvalidTime.into());
    }

    let samples = departure_samples(transit_model, start, departure_range)?;
    let walking = start.walking_time_to(transit_model, end);

    let journeys = rraptor(
        &transit_model.transit_data,
        candidate_stops(start),
        candidate_stops(end),
        &samples,
        max_transfers,
    )?;

    let mut journeys: Vec<RangeJourney> = journeys
        .into_iter()
        .filter_map(|journey| {
            let transit = journey
                .arrival_time
                .map(|arrival| (arrival - journey.departure_time, journey.transfers_used));
            let (travel_time, transfers) = match (transit, walking) {
                (Some((ride, _)), Some(walk)) if walk <= ride => (walk, 0),
                (Some(found), _) => found,
                (None, Some(walk)) => (walk, 0),
                (None, None) => return None,
            };
            Some(RangeJourney {
                departure_time: journey.departure_time,
                travel_time,
                transfers,
            })
        })
        .collect();
    journeys.sort_unstable_by_key(|journey| journey.departure_time);

    Ok(RangeRoutingResult { journeys })
}

/// Range routing reduced to Pareto-optimal journeys.
///
/// A journey is dropped when another departs no earlier and travels no
/// longer, at least one of the two strictly.
pub fn pareto_range_multimodal_routing(
    transit_model: &TransitModel,
    start: &TransitPoint,
    end: &TransitPoint,
    departure_range: (Time, Time),
    max_transfers: usize,
) -> Result<RangeRoutingResult, Error> {
    let result =
        range_multimodal_routing(transit_model, start, end, departure_range, max_transfers)?;
    Ok(pareto_filter(result))
}

fn dominates(a: &RangeJourney, b: &RangeJourney) -> bool {
    a.departure_time >= b.departure_time
        && a.travel_time <= b.travel_time
        && (a.departure_time > b.departure_time || a.travel_time < b.travel_time)
}

fn pareto_filter(result: RangeRoutingResult) -> RangeRoutingResult {
    let journeys = result
        .journeys
        .iter()
        .filter(|candidate| {
            !result
                .journeys
                .iter()
                .any(|other| dominates(other, candidate))
        })
        .copied()
        .collect();

    RangeRoutingResult { journeys }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{STOP_A, STOP_D, fixture_model, point_at_stop};

    fn journey(departure_time: Time, travel_time: Time) -> RangeJourney {
        RangeJourney {
            departure_time,
            travel_time,
            transfers: 0,
        }
    }

    #[test]
    fn range_covers_every_sample() {
        let model = fixture_model();
        let start = point_at_stop(&model, STOP_A);
        let end = point_at_stop(&model, STOP_D);

        let result = range_multimodal_routing(&model, &start, &end, (28000, 30000), 3).unwrap();
        // window bounds, ride from A, walk to B (890 s) and walk to E (979 s)
        assert_eq!(
            result.departure_times(),
            vec![28000, 28210, 28421, 28800, 30000]
        );
        assert_eq!(result.travel_times(), vec![2000, 1790, 1579, 1200, 1800]);
        assert_eq!(result.median_travel_time(), Some(1790));
        assert_eq!(result.len(), 5);

        let json: serde_json::Value = serde_json::from_str(&result.as_json().unwrap()).unwrap();
        assert_eq!(json["journeys"][3]["travel_time"], 1200);
    }

    #[test]
    fn pareto_keeps_only_non_dominated() {
        let model = fixture_model();
        let start = point_at_stop(&model, STOP_A);
        let end = point_at_stop(&model, STOP_D);

        let result =
            pareto_range_multimodal_routing(&model, &start, &end, (28000, 30000), 3).unwrap();
        assert_eq!(result.departure_times(), vec![28800, 30000]);
        assert_eq!(result.travel_times(), vec![1200, 1800]);

        for a in &result.journeys {
            assert!(!result.journeys.iter().any(|b| dominates(b, a)));
        }
    }

    #[test]
    fn pareto_filter_handles_equal_entries() {
        let filtered = pareto_filter(RangeRoutingResult {
            journeys: vec![journey(100, 50), journey(100, 50), journey(90, 60), journey(80, 40)],
        });
        assert_eq!(filtered.journeys, vec![journey(100, 50), journey(100, 50), journey(80, 40)]);
    }

    #[test]
    fn median_of_odd_and_empty_sets() {
        let odd = RangeRoutingResult {
            journeys: vec![journey(1, 30), journey(2, 10), journey(3, 20)],
        };
        assert_eq!(odd.median_travel_time(), Some(20));
        assert_eq!(RangeRoutingResult::default().median_travel_time(), None);

        let even = RangeRoutingResult {
            journeys: vec![journey(1, 10), journey(2, 15)],
        };
        assert_eq!(even.median_travel_time(), Some(12));
    }

    #[test]
    fn unreachable_range_is_empty() {
        let model = fixture_model();
        let start = point_at_stop(&model, STOP_D);
        let end = point_at_stop(&model, STOP_A);

        let result = range_multimodal_routing(&model, &start, &end, (28000, 30000), 3).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.median_travel_time(), None);
    }

    #[test]
    fn inverted_window_is_rejected() {
        let model = fixture_model();
        let start = point_at_stop(&model, STOP_A);
        let end = point_at_stop(&model, STOP_D);

        assert!(matches!(
            range_multimodal_routing(&model, &start, &end, (30000, 28000), 3),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn sample_budget_drops_latest_departures() {
        let model = fixture_model();
        let start = point_at_stop(&model, STOP_A);

        let samples = departure_samples(&model, &start, (0, 172_800)).unwrap();
        assert!(samples.len() <= MAX_RANGE_DEPARTURES);
        assert_eq!(samples.first(), Some(&0));
        assert!(samples.windows(2).all(|w| w[0] < w[1]));
    }
}
