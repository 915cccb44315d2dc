use serde::Serialize;

use crate::routing::raptor::common::{
    Predecessor, RaptorError, RaptorQuery, RaptorState, Ride, validate_raptor_inputs,
};
use crate::routing::raptor::regular::run_rounds;
use crate::{PublicTransitData, RaptorStopId, RouteId, Time};

/// Represents a single leg of an itinerary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "leg_type", rename_all = "snake_case")]
pub enum JourneyLeg {
    /// A transit trip segment
    Transit {
        route_id: RouteId,
        trip_id: usize,
        from_stop: RaptorStopId,
        departure_time: Time,
        to_stop: RaptorStopId,
        arrival_time: Time,
    },
    /// A walking transfer between stops
    Transfer {
        from_stop: RaptorStopId,
        departure_time: Time,
        to_stop: RaptorStopId,
        arrival_time: Time,
        duration: Time,
    },
}

/// Stop-to-stop part of a journey, from the access stop to the egress stop
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Journey {
    pub legs: Vec<JourneyLeg>,
    pub access_stop: RaptorStopId,
    pub egress_stop: RaptorStopId,
    pub departure_time: Time,
    /// Arrival at the egress stop
    pub arrival_time: Time,
    pub transfers_count: usize,
}

/// RAPTOR with predecessor tracking.
///
/// Reconstructs the journey to the best stop of `query.egress`, counting the
/// egress walk when choosing it. Returns `None` when no egress stop is reached.
pub fn traced_raptor(
    data: &PublicTransitData,
    query: &RaptorQuery<'_>,
) -> Result<Option<Journey>, RaptorError> {
    validate_raptor_inputs(data, query)?;

    let mut state = RaptorState::traced(data.stops.len(), query.max_transfers);
    run_rounds(data, &mut state, query)?;

    let best_egress = query
        .egress
        .unwrap_or_default()
        .iter()
        .filter_map(|&(stop, walk)| {
            let round = state.earliest_round(stop)?;
            let arrival = state.best_arrival[stop].saturating_add(walk);
            Some((arrival, round, stop))
        })
        .min();

    best_egress
        .map(|(_, _, stop)| reconstruct_journey(data, &state, stop))
        .transpose()
}

fn reconstruct_journey(
    data: &PublicTransitData,
    state: &RaptorState,
    target: RaptorStopId,
) -> Result<Journey, RaptorError> {
    let trace = state.trace.as_ref().ok_or(RaptorError::InvalidJourney)?;
    let arrival_time = state.best_arrival[target];
    let mut round = state
        .earliest_round(target)
        .ok_or(RaptorError::InvalidJourney)?;
    let mut stop = target;
    let mut legs = Vec::new();

    loop {
        round = label_round(state, round, stop);
        match trace.labels[round][stop] {
            Predecessor::None => return Err(RaptorError::InvalidJourney),
            Predecessor::Access => break,
            Predecessor::Ride(ride) => {
                let arrival = state.arrival_times[round][stop];
                legs.push(transit_leg(data, ride, stop, arrival)?);
                stop = ride.board_stop;
                round = round.checked_sub(1).ok_or(RaptorError::InvalidJourney)?;
            }
            Predecessor::Walk {
                from_stop,
                departure_time,
                duration,
            } => {
                legs.push(JourneyLeg::Transfer {
                    from_stop,
                    departure_time,
                    to_stop: stop,
                    arrival_time: departure_time.saturating_add(duration),
                    duration,
                });
                stop = from_stop;
                if round == 0 {
                    // walked straight from an access stop
                    break;
                }
                let ride = trace.rides[round][from_stop].ok_or(RaptorError::InvalidJourney)?;
                legs.push(transit_leg(data, ride, from_stop, departure_time)?);
                stop = ride.board_stop;
                round -= 1;
            }
        }
    }

    legs.reverse();
    let departure_time = legs.first().map_or(arrival_time, |leg| match leg {
        JourneyLeg::Transit { departure_time, .. } | JourneyLeg::Transfer { departure_time, .. } => {
            *departure_time
        }
    });
    let rides = legs
        .iter()
        .filter(|leg| matches!(leg, JourneyLeg::Transit { .. }))
        .count();

    Ok(Journey {
        legs,
        access_stop: stop,
        egress_stop: target,
        departure_time,
        arrival_time,
        transfers_count: rides.saturating_sub(1),
    })
}

/// Lowest round still holding the same label; carried labels have no predecessor
fn label_round(state: &RaptorState, mut round: usize, stop: RaptorStopId) -> usize {
    let label = state.arrival_times[round][stop];
    while round > 0 && state.arrival_times[round - 1][stop] == label {
        round -= 1;
    }
    round
}

fn transit_leg(
    data: &PublicTransitData,
    ride: Ride,
    to_stop: RaptorStopId,
    arrival_time: Time,
) -> Result<JourneyLeg, RaptorError> {
    let stops = data.get_route_stops(ride.route_id)?;
    // alighting stop lies after the boarding position
    if !stops
        .iter()
        .skip(ride.board_pos + 1)
        .any(|&stop| stop == to_stop)
    {
        return Err(RaptorError::InvalidJourney);
    }

    Ok(JourneyLeg::Transit {
        route_id: ride.route_id,
        trip_id: ride.trip_idx,
        from_stop: ride.board_stop,
        departure_time: ride.departure_time,
        to_stop,
        arrival_time,
    })
}
