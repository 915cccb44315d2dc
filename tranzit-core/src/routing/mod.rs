//! Routing algorithms over the street network and transit schedules

pub mod dijkstra;
pub mod itinerary;
pub mod multimodal_routing;
pub mod pareto;
pub mod raptor;
