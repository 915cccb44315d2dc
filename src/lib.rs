//! Query surface of the tranzit journey planner.
//!
//! Thin layer over `tranzit_core` taking plain coordinates, WKT areas and
//! paths, and returning serializable summaries, WKT and `GeoJSON`.
//!
//! ```ignore
//! let model = tranzit::create_transit_model("city.osm.pbf", &["gtfs"], None, 1800)?;
//! let start = tranzit::create_transit_point(56.2567, 93.5336, &model)?;
//! let end = tranzit::create_transit_point(56.2426, 93.4992, &model)?;
//! let route = tranzit::find_route(&model, &start, &end, 43200, 2)?;
//! ```

pub mod isochrone;
pub mod matrix;
pub mod model;
pub mod range_routing;
pub mod routing;

pub use isochrone::{
    calculate_bulk_isochrones, calculate_isochrone, create_isochrone_index,
    create_isochrone_index_with, estimate_isochrone_cells,
};
pub use matrix::travel_time_matrix;
pub use model::create_transit_model;
pub use range_routing::{RangeResult, pareto_range_multimodal_routing, range_multimodal_routing};
pub use routing::{
    DEFAULT_MAX_NEAREST_STOPS, DEFAULT_MAX_WALKING_TIME, RouteSummary, create_transit_point,
    create_transit_point_with, find_detailed_route, find_route, find_routes_one_to_many,
};

pub use tranzit_core::prelude::{Error, IsochroneIndex, Time, TransitModel, TransitPoint};
