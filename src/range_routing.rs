use serde::Serialize;
use tranzit_core::prelude::*;

/// Journeys of a departure-window query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RangeResult {
    inner: RangeRoutingResult,
}

impl RangeResult {
    /// Median travel time, `None` when no departure reaches the destination
    pub fn median_travel_time(&self) -> Option<Time> {
        self.inner.median_travel_time()
    }

    pub fn travel_times(&self) -> Vec<Time> {
        self.inner.travel_times()
    }

    pub fn departure_times(&self) -> Vec<Time> {
        self.inner.departure_times()
    }

    pub fn journeys(&self) -> &[RangeJourney] {
        &self.inner.journeys
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn as_json(&self) -> Result<String, Error> {
        self.inner.as_json()
    }
}

impl From<RangeRoutingResult> for RangeResult {
    fn from(inner: RangeRoutingResult) -> Self {
        Self { inner }
    }
}

/// Travel times for every departure in `departure_range`
pub fn range_multimodal_routing(
    model: &TransitModel,
    start: &TransitPoint,
    end: &TransitPoint,
    departure_range: (Time, Time),
    max_transfers: usize,
) -> Result<RangeResult, Error> {
    tranzit_core::prelude::range_multimodal_routing(
        model,
        start,
        end,
        departure_range,
        max_transfers,
    )
    .map(RangeResult::from)
}

/// Only the Pareto-optimal journeys over departure time and travel time
pub fn pareto_range_multimodal_routing(
    model: &TransitModel,
    start: &TransitPoint,
    end: &TransitPoint,
    departure_range: (Time, Time),
    max_transfers: usize,
) -> Result<RangeResult, Error> {
    tranzit_core::prelude::pareto_range_multimodal_routing(
        model,
        start,
        end,
        departure_range,
        max_transfers,
    )
    .map(RangeResult::from)
}
