//! HTTP surface of the tranzit journey planner

pub mod config;
pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
