//! Data model for public transportation routing
//!
//! Contains types and structures for representing a multimodal network.

pub mod streets;
pub mod transit;
pub mod transit_model;

pub use transit_model::{TransitModel, TransitModelMeta, TransitPoint};

pub use streets::{StreetEdge, StreetGraph, StreetNode};
pub use transit::data::PublicTransitData;
pub use transit::types::{
    FeedMeta, RaptorStopId, Route, RouteId, ScheduledTrip, Stop, StopTime, Time, Transfer,
};
