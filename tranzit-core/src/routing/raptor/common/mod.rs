// Common RAPTOR components shared between implementations
mod state;

pub use state::{
    AccessStop, EgressArrival, RaptorError, RaptorQuery, RaptorResult, StopLabel,
    find_earliest_trip, validate_raptor_inputs,
};
pub(crate) use state::{Predecessor, RaptorState, Ride};
