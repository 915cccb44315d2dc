//! Public transit schedule model

pub mod data;
pub mod types;

pub use data::PublicTransitData;
pub use types::{FeedMeta, RaptorStopId, Route, RouteId, ScheduledTrip, Stop, StopTime, Time, Transfer};
