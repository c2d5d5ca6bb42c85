//! Pipeline conversions module
//!
//! This module contains orchestration logic for payload to GeoTIFF conversion.

mod payload_to_geotiff;

#[cfg(test)]
mod tests;

pub use payload_to_geotiff::{OUTPUT_EXTENSION, PayloadToGeoTiffPipeline, output_path_for};
