use log::debug;

use crate::routing::raptor::common::{
    AccessStop, RaptorError, RaptorQuery, RaptorState, validate_raptor_inputs,
};
use crate::routing::raptor::regular::run_rounds;
use crate::{PublicTransitData, Time};

/// Result for a range query journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaptorRangeJourney {
    /// Departure from the origin point
    pub departure_time: Time,
    /// Arrival at the destination, egress walk included
    pub arrival_time: Option<Time>,
    pub transfers_used: usize,
}

/// rRAPTOR: range query version of RAPTOR.
///
/// Departures are processed from latest to earliest on one shared state, so
/// labels found for later departures bound the searches of earlier ones.
/// One journey is returned per departure, latest first.
pub fn rraptor(
    data: &PublicTransitData,
    sources: &[AccessStop],
    egress: &[AccessStop],
    departures: &[Time],
    max_transfers: usize,
) -> Result<Vec<RaptorRangeJourney>, RaptorError> {
    let mut departures = departures.to_vec();
    departures.sort_unstable_by(|a, b| b.cmp(a));
    departures.dedup();

    let mut state = RaptorState::new(data.stops.len(), max_transfers);
    let mut journeys = Vec::with_capacity(departures.len());

    for departure_time in departures {
        let query = RaptorQuery {
            sources,
            egress: Some(egress),
            departure_time,
            max_transfers,
            cutoff: None,
        };
        validate_raptor_inputs(data, &query)?;
        run_rounds(data, &mut state, &query)?;

        let best = state.best_via(egress);
        debug!("rRAPTOR departure {departure_time}: {best:?}");

        journeys.push(RaptorRangeJourney {
            departure_time,
            arrival_time: best.map(|found| found.arrival),
            transfers_used: best.map_or(0, |found| found.transfers),
        });
    }

    Ok(journeys)
}
