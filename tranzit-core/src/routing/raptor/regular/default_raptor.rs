use fixedbitset::FixedBitSet;

use crate::model::transit::types::{StopTime, Transfer};
use crate::routing::raptor::common::{
    Predecessor, RaptorError, RaptorQuery, RaptorResult, RaptorState, Ride, find_earliest_trip,
    validate_raptor_inputs,
};
use crate::{PublicTransitData, RaptorStopId, RouteId, Time};

/// Earliest arrival at every stop from a set of access stops.
///
/// Runs rounds `1..=max_transfers`; round k holds journeys with at most
/// k trips, so `max_transfers` bounds the number of trips boarded. With an
/// egress set the search is pruned against the best destination arrival
/// found so far.
pub fn raptor(
    data: &PublicTransitData,
    query: &RaptorQuery<'_>,
) -> Result<RaptorResult, RaptorError> {
    validate_raptor_inputs(data, query)?;

    let mut state = RaptorState::new(data.stops.len(), query.max_transfers);
    run_rounds(data, &mut state, query)?;

    Ok(state.into_result())
}

/// Runs a full search on `state`, keeping any labels already present.
///
/// Range queries call this repeatedly with decreasing departure times on
/// the same state.
pub(crate) fn run_rounds(
    data: &PublicTransitData,
    state: &mut RaptorState,
    query: &RaptorQuery<'_>,
) -> Result<(), RaptorError> {
    let cutoff_bound = query.cutoff_bound();
    state.clear_marks();

    for &(stop, access) in query.sources {
        let arrival = query.departure_time.saturating_add(access);
        if arrival < cutoff_bound && state.improve(0, stop, arrival, access)? {
            state.marked_stops[0].insert(stop);
            state.record(0, stop, Predecessor::Access);
        }
    }
    relax_transfers(data, state, query, 0, cutoff_bound)?;

    for round in 1..state.max_rounds() {
        if state.marked_stops[round - 1].is_clear() {
            break;
        }
        state.ensure_round(round)?;
        state.carry_over(round);

        for (route_id, start_pos) in collect_routes(data, &state.marked_stops[round - 1])? {
            scan_route(data, state, query, round, route_id, start_pos, cutoff_bound)?;
        }

        relax_transfers(data, state, query, round, cutoff_bound)?;

        if state.marked_stops[round].is_clear() {
            break;
        }
    }

    Ok(())
}

/// Routes serving marked stops with the earliest marked position, by ascending route id
pub(crate) fn collect_routes(
    data: &PublicTransitData,
    marked_stops: &FixedBitSet,
) -> Result<Vec<(RouteId, usize)>, RaptorError> {
    let mut touched = FixedBitSet::with_capacity(data.routes.len());
    let mut first_pos = vec![usize::MAX; data.routes.len()];

    for stop in marked_stops.ones() {
        for &route_id in data.routes_for_stop(stop) {
            let stops = data.get_route_stops(route_id)?;
            if let Some(pos) = stops.iter().position(|&s| s == stop) {
                touched.insert(route_id);
                first_pos[route_id] = first_pos[route_id].min(pos);
            }
        }
    }

    Ok(touched
        .ones()
        .map(|route_id| (route_id, first_pos[route_id]))
        .collect())
}

fn scan_route(
    data: &PublicTransitData,
    state: &mut RaptorState,
    query: &RaptorQuery<'_>,
    round: usize,
    route_id: RouteId,
    start_pos: usize,
    cutoff_bound: Time,
) -> Result<(), RaptorError> {
    let stops = data.get_route_stops(route_id)?;
    // Trip being ridden, with the access walk of the label it was boarded from
    let mut current: Option<(usize, &[StopTime], Ride, Time)> = None;

    for (pos, &stop) in stops.iter().enumerate().skip(start_pos) {
        if let Some((_, trip, ride, access_walk)) = current {
            let arrival = trip[pos].arrival;
            let bound = state.target_bound(query.egress).min(cutoff_bound);
            if arrival < bound && state.improve(round, stop, arrival, access_walk)? {
                state.marked_stops[round].insert(stop);
                state.record(round, stop, Predecessor::Ride(ride));
            }
        }

        let previous = state.arrival_times[round - 1][stop];
        if previous == Time::MAX {
            continue;
        }

        // An earlier trip may be catchable from this stop
        let may_switch = current.is_none_or(|(_, trip, _, _)| previous <= trip[pos].departure);
        if may_switch
            && let Some(trip_idx) = find_earliest_trip(data, route_id, pos, previous)
            && current.is_none_or(|(idx, _, _, _)| idx != trip_idx)
        {
            let trip = data.get_trip(route_id, trip_idx)?;
            current = Some((
                trip_idx,
                trip,
                Ride {
                    route_id,
                    trip_idx,
                    board_stop: stop,
                    board_pos: pos,
                    departure_time: trip[pos].departure,
                },
                state.access_walks[round - 1][stop],
            ));
        }
    }

    Ok(())
}

/// One footpath pass from the stops marked in `round`, on a snapshot of
/// their arrivals; footpaths never chain.
fn relax_transfers(
    data: &PublicTransitData,
    state: &mut RaptorState,
    query: &RaptorQuery<'_>,
    round: usize,
    cutoff_bound: Time,
) -> Result<(), RaptorError> {
    let snapshot: Vec<(RaptorStopId, Time, Time)> = state.marked_stops[round]
        .ones()
        .map(|stop| {
            (
                stop,
                state.arrival_times[round][stop],
                state.access_walks[round][stop],
            )
        })
        .collect();

    for (stop, departure_time, access_walk) in snapshot {
        let bound = state.target_bound(query.egress).min(cutoff_bound);
        for &Transfer {
            target_stop,
            duration,
        } in data.get_stop_transfers(stop)?
        {
            let arrival = departure_time.saturating_add(duration);
            if arrival < bound && state.improve(round, target_stop, arrival, access_walk)? {
                state.marked_stops[round].insert(target_stop);
                state.record(
                    round,
                    target_stop,
                    Predecessor::Walk {
                        from_stop: stop,
                        departure_time,
                        duration,
                    },
                );
            }
        }
    }

    Ok(())
}
