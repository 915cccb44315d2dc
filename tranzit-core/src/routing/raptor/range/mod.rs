mod range_raptor;

pub use range_raptor::{RaptorRangeJourney, rraptor};
