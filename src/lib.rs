//! georadius - maps of the administrative regions within a radius of a place.
//!
//! This library provides the shared modules for the server and generate binaries.

pub mod config;
pub mod error;
pub mod geocoder;
pub mod geodesy;
pub mod models;
pub mod pipeline;
pub mod publish;
pub mod render;
pub mod selection;

pub use error::{MapError, MapResult};
pub use models::{MapRequest, MapResponse, Region};
pub use pipeline::MapService;
