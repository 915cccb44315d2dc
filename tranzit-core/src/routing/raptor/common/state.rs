use fixedbitset::FixedBitSet;
use thiserror::Error;

use crate::{MAX_DEPARTURE_TIME, PublicTransitData, RaptorStopId, RouteId, Time};

/// A stop together with the walking time between it and a point
pub type AccessStop = (RaptorStopId, Time);

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaptorError {
    #[error("Invalid stop ID")]
    InvalidStop,
    #[error("Invalid route ID")]
    InvalidRoute,
    #[error("Invalid trip index")]
    InvalidTrip,
    #[error("Invalid time value")]
    InvalidTime,
    #[error("Maximum transfers exceeded")]
    MaxTransfersExceeded,
    #[error("Invalid journey")]
    InvalidJourney,
}

/// Inputs of one earliest-arrival search
#[derive(Debug, Clone, Copy)]
pub struct RaptorQuery<'a> {
    /// Stops the search starts from, with their access walk
    pub sources: &'a [AccessStop],
    /// Stops the destination is reached from, with their egress walk.
    /// `None` runs a sweep over all stops.
    pub egress: Option<&'a [AccessStop]>,
    pub departure_time: Time,
    pub max_transfers: usize,
    /// Arrivals later than `departure_time + cutoff` count as unreached
    pub cutoff: Option<Time>,
}

impl RaptorQuery<'_> {
    pub(crate) fn cutoff_bound(&self) -> Time {
        self.cutoff.map_or(Time::MAX, |cutoff| {
            self.departure_time
                .saturating_add(cutoff)
                .saturating_add(1)
        })
    }
}

/// How a round label was reached
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum Predecessor {
    #[default]
    None,
    /// Access walk from the origin
    Access,
    Ride(Ride),
    /// Footpath from a stop labelled earlier in the same round
    Walk {
        from_stop: RaptorStopId,
        departure_time: Time,
        duration: Time,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Ride {
    pub(crate) route_id: RouteId,
    pub(crate) trip_idx: usize,
    pub(crate) board_stop: RaptorStopId,
    pub(crate) board_pos: usize,
    pub(crate) departure_time: Time,
}

/// Predecessors kept by traced searches.
///
/// `rides` keeps the trip behind every transit label even when a footpath
/// improves the same stop afterwards in that round.
#[derive(Debug)]
pub(crate) struct Trace {
    pub(crate) labels: Vec<Vec<Predecessor>>,
    pub(crate) rides: Vec<Vec<Option<Ride>>>,
}

#[derive(Debug)]
pub(crate) struct RaptorState {
    /// Round k holds arrivals using at most k trips
    pub(crate) arrival_times: Vec<Vec<Time>>,
    /// Access walk of the journey behind each label
    pub(crate) access_walks: Vec<Vec<Time>>,
    pub(crate) marked_stops: Vec<FixedBitSet>,
    /// Minimum over rounds, used for target pruning
    pub(crate) best_arrival: Vec<Time>,
    pub(crate) trace: Option<Trace>,
    /// Round 0 plus one round per allowed trip
    max_rounds: usize,
}

impl RaptorState {
    /// State for a search boarding at most `max_transfers` trips.
    ///
    /// Only round 0 is allocated here; later rounds are added by
    /// `ensure_round` as the search reaches them.
    pub(crate) fn new(num_stops: usize, max_transfers: usize) -> Self {
        RaptorState {
            arrival_times: vec![vec![Time::MAX; num_stops]],
            access_walks: vec![vec![0; num_stops]],
            marked_stops: vec![FixedBitSet::with_capacity(num_stops)],
            best_arrival: vec![Time::MAX; num_stops],
            trace: None,
            max_rounds: max_transfers.saturating_add(1),
        }
    }

    pub(crate) fn traced(num_stops: usize, max_transfers: usize) -> Self {
        let mut state = Self::new(num_stops, max_transfers);
        state.trace = Some(Trace {
            labels: vec![vec![Predecessor::None; num_stops]],
            rides: vec![vec![None; num_stops]],
        });
        state
    }

    /// Rounds allocated so far
    pub(crate) fn rounds(&self) -> usize {
        self.arrival_times.len()
    }

    pub(crate) fn max_rounds(&self) -> usize {
        self.max_rounds
    }

    /// Allocates rows up to `round`; fails past the transfer budget
    pub(crate) fn ensure_round(&mut self, round: usize) -> Result<(), RaptorError> {
        if round >= self.max_rounds {
            return Err(RaptorError::MaxTransfersExceeded);
        }
        let num_stops = self.best_arrival.len();
        while self.arrival_times.len() <= round {
            self.arrival_times.push(vec![Time::MAX; num_stops]);
            self.access_walks.push(vec![0; num_stops]);
            self.marked_stops.push(FixedBitSet::with_capacity(num_stops));
            if let Some(trace) = &mut self.trace {
                trace.labels.push(vec![Predecessor::None; num_stops]);
                trace.rides.push(vec![None; num_stops]);
            }
        }
        Ok(())
    }

    /// Lowers the label of `stop` in `round`; true only on strict improvement.
    pub(crate) fn improve(
        &mut self,
        round: usize,
        stop: RaptorStopId,
        arrival: Time,
        access_walk: Time,
    ) -> Result<bool, RaptorError> {
        let label = self
            .arrival_times
            .get_mut(round)
            .ok_or(RaptorError::MaxTransfersExceeded)?
            .get_mut(stop)
            .ok_or(RaptorError::InvalidStop)?;

        if arrival >= *label {
            return Ok(false);
        }
        *label = arrival;
        self.access_walks[round][stop] = access_walk;
        if arrival < self.best_arrival[stop] {
            self.best_arrival[stop] = arrival;
        }
        Ok(true)
    }

    pub(crate) fn record(&mut self, round: usize, stop: RaptorStopId, predecessor: Predecessor) {
        if let Some(trace) = &mut self.trace {
            trace.labels[round][stop] = predecessor;
            if let Predecessor::Ride(ride) = predecessor {
                trace.rides[round][stop] = Some(ride);
            }
        }
    }

    /// `arr[round][p] = min(arr[round][p], arr[round - 1][p])`; carried labels stay unmarked
    pub(crate) fn carry_over(&mut self, round: usize) {
        let (previous, current) = self.arrival_times.split_at_mut(round);
        let (previous_walks, current_walks) = self.access_walks.split_at_mut(round);
        for (stop, label) in current[0].iter_mut().enumerate() {
            let earlier = previous[round - 1][stop];
            if earlier < *label {
                *label = earlier;
                current_walks[0][stop] = previous_walks[round - 1][stop];
            }
        }
    }

    pub(crate) fn clear_marks(&mut self) {
        for marks in &mut self.marked_stops {
            marks.clear();
        }
    }

    /// First round whose label equals the best arrival at `stop`
    pub(crate) fn earliest_round(&self, stop: RaptorStopId) -> Option<usize> {
        let best = *self.best_arrival.get(stop)?;
        if best == Time::MAX {
            return None;
        }
        self.arrival_times
            .iter()
            .position(|round| round[stop] == best)
    }

    /// Pruning bound from the egress stops: `min_e(best[e] + egress_e)`
    pub(crate) fn target_bound(&self, egress: Option<&[AccessStop]>) -> Time {
        egress.map_or(Time::MAX, |egress| {
            egress
                .iter()
                .map(|&(stop, walk)| self.best_arrival[stop].saturating_add(walk))
                .min()
                .unwrap_or(Time::MAX)
        })
    }

    /// Best label of `stop` over all rounds
    pub(crate) fn label(&self, stop: RaptorStopId) -> Option<StopLabel> {
        let round = self.earliest_round(stop)?;
        Some(StopLabel {
            arrival: self.best_arrival[stop],
            transfers: round.saturating_sub(1),
            access_walk: self.access_walks[round][stop],
        })
    }

    /// Best arrival at the destination behind `egress`
    pub(crate) fn best_via(&self, egress: &[AccessStop]) -> Option<EgressArrival> {
        pick_egress(egress, |stop| self.label(stop))
    }

    pub(crate) fn into_result(self) -> RaptorResult {
        let labels = (0..self.best_arrival.len())
            .map(|stop| self.label(stop))
            .collect();
        RaptorResult { labels }
    }
}

/// Earliest arrival over an egress set; ties go to fewer transfers
fn pick_egress(
    egress: &[AccessStop],
    label: impl Fn(RaptorStopId) -> Option<StopLabel>,
) -> Option<EgressArrival> {
    egress
        .iter()
        .filter_map(|&(stop, walk)| {
            let label = label(stop)?;
            Some(EgressArrival {
                arrival: label.arrival.saturating_add(walk),
                transfers: label.transfers,
                access_walk: label.access_walk,
                egress_walk: walk,
                egress_stop: stop,
            })
        })
        .min_by_key(|found| (found.arrival, found.transfers, found.egress_stop))
}

/// Common validation for all RAPTOR searches
pub fn validate_raptor_inputs(
    data: &PublicTransitData,
    query: &RaptorQuery<'_>,
) -> Result<(), RaptorError> {
    for &(stop, _) in query.sources {
        data.validate_stop(stop)?;
    }
    for &(stop, _) in query.egress.unwrap_or_default() {
        data.validate_stop(stop)?;
    }
    if query.departure_time > MAX_DEPARTURE_TIME {
        return Err(RaptorError::InvalidTime);
    }
    Ok(())
}

/// Earliest trip of `route_id` leaving position `stop_idx` at or after `earliest_board`.
///
/// Trips of a route never overtake, so departures are sorted at every position.
pub fn find_earliest_trip(
    data: &PublicTransitData,
    route_id: RouteId,
    stop_idx: usize,
    earliest_board: Time,
) -> Option<usize> {
    let route = data.routes.get(route_id)?;
    let trips_offset = route.trips_start;
    let num_stops = route.num_stops;
    let mut low = 0;
    let mut high = route.num_trips;
    let mut result = None;
    while low < high {
        let mid = (low + high) / 2;
        let departure = data.stop_times[trips_offset + mid * num_stops + stop_idx].departure;
        if departure >= earliest_board {
            result = Some(mid);
            high = mid;
        } else {
            low = mid + 1;
        }
    }
    result
}

/// Best known way to reach a stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopLabel {
    pub arrival: Time,
    pub transfers: usize,
    /// Walk from the origin to the first stop of the journey
    pub access_walk: Time,
}

/// Destination reached through one egress stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EgressArrival {
    /// Arrival at the destination, egress walk included
    pub arrival: Time,
    pub transfers: usize,
    pub access_walk: Time,
    pub egress_walk: Time,
    pub egress_stop: RaptorStopId,
}

/// Outcome of an earliest-arrival search over all stops
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaptorResult {
    /// Best label per stop, `None` when unreached
    pub labels: Vec<Option<StopLabel>>,
}

impl RaptorResult {
    pub fn arrival(&self, stop: RaptorStopId) -> Option<Time> {
        self.labels.get(stop).copied().flatten().map(|label| label.arrival)
    }

    pub fn transfers(&self, stop: RaptorStopId) -> Option<usize> {
        self.labels.get(stop).copied().flatten().map(|label| label.transfers)
    }

    /// Earliest arrival at a destination reached through `egress`
    pub fn best_via(&self, egress: &[AccessStop]) -> Option<EgressArrival> {
        pick_egress(egress, |stop| self.labels.get(stop).copied().flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn improve_is_strict_and_tracks_best() {
        let mut state = RaptorState::new(3, 2);
        assert_eq!(state.rounds(), 1);
        assert_eq!(state.max_rounds(), 3);
        state.ensure_round(2).unwrap();
        assert_eq!(state.rounds(), 3);

        assert!(state.improve(1, 0, 100, 0).unwrap());
        assert!(!state.improve(1, 0, 100, 0).unwrap());
        assert!(state.improve(2, 0, 90, 0).unwrap());
        assert_eq!(state.best_arrival[0], 90);

        assert_eq!(state.improve(5, 0, 1, 0), Err(RaptorError::MaxTransfersExceeded));
        assert_eq!(state.improve(0, 9, 1, 0), Err(RaptorError::InvalidStop));
    }

    #[test]
    fn carry_over_keeps_the_minimum() {
        let mut state = RaptorState::new(2, 1);
        state.ensure_round(1).unwrap();
        state.improve(0, 0, 50, 5).unwrap();
        state.improve(1, 1, 70, 7).unwrap();
        state.improve(0, 1, 80, 8).unwrap();

        state.carry_over(1);
        assert_eq!(state.arrival_times[1], vec![50, 70]);
        assert_eq!(state.access_walks[1], vec![5, 7]);
        assert!(state.marked_stops[1].is_clear());
        assert_eq!(state.earliest_round(0), Some(0));
        assert_eq!(state.earliest_round(1), Some(1));
    }

    #[test]
    fn best_via_adds_egress_and_prefers_fewer_transfers() {
        let mut state = RaptorState::new(3, 2);
        state.ensure_round(2).unwrap();
        state.improve(2, 0, 100, 30).unwrap();
        state.improve(1, 1, 90, 40).unwrap();

        let best = state.best_via(&[(0, 10), (1, 20)]).unwrap();
        assert_eq!((best.arrival, best.transfers, best.egress_stop), (110, 0, 1));
        assert_eq!((best.access_walk, best.egress_walk), (40, 20));

        let only_first = state.best_via(&[(0, 0)]).unwrap();
        assert_eq!((only_first.arrival, only_first.transfers), (100, 1));
        assert_eq!(state.best_via(&[(2, 0)]), None);
        assert_eq!(state.target_bound(Some(&[(0, 5), (1, 30)])), 105);
        assert_eq!(state.target_bound(None), Time::MAX);

        let expected = state.best_via(&[(0, 10), (1, 20)]);
        let result = state.into_result();
        assert_eq!(result.arrival(2), None);
        assert_eq!(result.transfers(0), Some(1));
        assert_eq!(result.best_via(&[(0, 10), (1, 20)]), expected);
    }

    #[test]
    fn rounds_grow_on_demand_within_budget() {
        let mut state = RaptorState::traced(4, 1);
        assert_eq!(state.max_rounds(), 2);
        state.ensure_round(1).unwrap();
        state.ensure_round(1).unwrap();
        assert_eq!(state.rounds(), 2);
        assert_eq!(state.trace.as_ref().unwrap().labels.len(), 2);
        assert_eq!(state.ensure_round(2), Err(RaptorError::MaxTransfersExceeded));

        // no overflow and no up-front allocation for an unbounded budget
        let state = RaptorState::new(4, usize::MAX);
        assert_eq!(state.max_rounds(), usize::MAX);
        assert_eq!(state.rounds(), 1);
    }

    #[test]
    fn cutoff_bound_is_exclusive_of_later_arrivals() {
        let query = RaptorQuery {
            sources: &[],
            egress: None,
            departure_time: 1000,
            max_transfers: 0,
            cutoff: Some(600),
        };
        assert_eq!(query.cutoff_bound(), 1601);
    }
}
