pub use crate::{MAX_CANDIDATE_STOPS, WALKING_SPEED};

// Re-export key components
pub use crate::algo::isochrone::{
    IsochroneIndex, bulk_isochrones, calculate_isochrone, estimate_cell_count,
};
pub use crate::error::Error;
pub use crate::loading::{TransitModelConfig, create_transit_model};
pub use crate::model::{PublicTransitData, StreetGraph, TransitModel, TransitPoint};
pub use crate::routing::itinerary::{
    DetailedJourney, WalkingLeg, traced_multimodal_routing,
};
pub use crate::routing::multimodal_routing::{
    MultiModalResult, multimodal_routing, multimodal_routing_one_to_many,
};
pub use crate::routing::pareto::{
    MAX_RANGE_DEPARTURES, RangeJourney, RangeRoutingResult, pareto_range_multimodal_routing,
    range_multimodal_routing,
};
pub use crate::routing::raptor::{Journey, JourneyLeg, RaptorError};

// Core types for the street network
pub use crate::StreetNodeId;
pub use crate::WalkingTime; // seconds

// Core types for transit routing
pub use crate::RaptorStopId;
pub use crate::RouteId;
pub use crate::Time;
