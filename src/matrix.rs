use log::warn;
use rayon::prelude::*;
use tranzit_core::prelude::*;

/// Door-to-door travel times between every pair of `points`.
///
/// Row `i` holds the times from `points[i]`; `None` marks unreachable pairs.
/// A row whose routing fails is reported as unreachable.
pub fn travel_time_matrix(
    model: &TransitModel,
    points: &[TransitPoint],
    departure_time: Time,
    max_transfers: usize,
) -> Vec<Vec<Option<Time>>> {
    points
        .par_iter()
        .map(|start| {
            match multimodal_routing_one_to_many(model, start, points, departure_time, max_transfers)
            {
                Ok(results) => results
                    .into_iter()
                    .map(|result| result.map(|journey| journey.travel_time))
                    .collect(),
                Err(e) => {
                    let (lat, lon) = start.coordinates();
                    warn!("Routing failed for point ({lat}, {lon}): {e}");
                    vec![None; points.len()]
                }
            }
        })
        .collect()
}
