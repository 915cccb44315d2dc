mod traced_raptor;

pub use traced_raptor::{Journey, JourneyLeg, traced_raptor};
