//! Core of the tranzit journey planner.
//!
//! Holds the multimodal model (street network + public transit schedules),
//! the loaders that build it, point snapping, and the RAPTOR family of
//! routing algorithms used for single routes, batches, isochrones and
//! departure-range queries.

pub mod algo;
pub mod error;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod routing;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use error::Error;
pub use loading::{TransitModelConfig, create_transit_model};
pub use model::{PublicTransitData, TransitModel, TransitPoint};
pub use routing::multimodal_routing::{
    MultiModalResult, multimodal_routing, multimodal_routing_one_to_many,
};

pub use model::transit::types::{RaptorStopId, RouteId, Time};

/// Identifier of a node in the street graph
pub type StreetNodeId = petgraph::graph::NodeIndex;

/// Walking time in seconds
pub type WalkingTime = u32;

/// How many nearest stops of a point are used as RAPTOR sources or egress stops
pub const MAX_CANDIDATE_STOPS: usize = 10;

/// Pedestrian speed used for every street traversal, meters per second (5 km/h)
pub const WALKING_SPEED: f64 = 5.0 / 3.6;

/// Departures later than two service days are rejected
pub const MAX_DEPARTURE_TIME: Time = 86400 * 2;
