use thiserror::Error;

use crate::routing::raptor::RaptorError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No nearby points found for snapping")]
    NoPointsFound,
    #[error("Transit point was created for a different transit model")]
    ModelMismatch,
    #[error("Isochrone index was built for a different transit model")]
    IndexMismatch,
    #[error("Invalid area: {0}")]
    InvalidArea(String),
    #[error("No active trips found for the requested date")]
    NoActiveTrips,
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Isochrone error: {0}")]
    IsochroneError(String),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
    #[error("H3 error: {0}")]
    H3Error(#[from] h3o::error::InvalidGeometry),
    #[error("Routing error: {0}")]
    Raptor(#[from] RaptorError),
    #[error("Unrecoverable error: {0}")]
    UnrecoverableError(&'static str),
}

impl Error {
    /// Errors that prevent a transit model from being built at all
    pub fn is_model_build_error(&self) -> bool {
        matches!(
            self,
            Error::NoActiveTrips
                | Error::NetworkError(_)
                | Error::IoError(_)
                | Error::InvalidData(_)
                | Error::UnrecoverableError(_)
        )
    }
}
