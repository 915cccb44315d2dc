// RAPTOR (Round-bAsed Public Transit Optimized Router) implementations

pub mod common;
pub mod range;
pub mod regular;
pub mod traced;

pub use common::{AccessStop, EgressArrival, RaptorError, RaptorQuery, RaptorResult, StopLabel};
pub use range::{RaptorRangeJourney, rraptor};
pub use regular::raptor;
pub use traced::{Journey, JourneyLeg, traced_raptor};
