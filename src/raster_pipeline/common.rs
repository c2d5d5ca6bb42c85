//! Common utilities module
//!
//! Error types shared by every stage of the payload to GeoTIFF pipeline.

pub mod error;

pub use error::{ConversionError, Result};
