//! Delimited payload reading module
//!
//! This module turns the `|||` separated text payload into a dense grid and
//! its raster origin.

mod reader;
mod delimited_reader;
pub mod types;

pub use reader::PayloadReader;
pub use delimited_reader::DelimitedPayloadReader;
pub use types::{GridPayload, SEGMENT_DELIMITER};
