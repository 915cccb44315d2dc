//! Algorithms built on top of routing

pub mod isochrone;
