//! GeoTIFF writing module
//!
//! This module encodes float64 rasters as GeoTIFF with the georeferencing
//! tags and GeoKeys needed by GIS readers, and can read those files back.

mod writer;
mod standard_geotiff_writer;
mod inspect;
pub mod geokeys;
pub mod types;

pub use writer::GeoTiffWriter;
pub use standard_geotiff_writer::StandardGeoTiffWriter;
pub use inspect::{GeoTiffSummary, inspect_geotiff, inspect_geotiff_file};
pub use types::{
    ConversionConfig, ConversionConfigBuilder, GeoRaster, GridLayout, NODATA_VALUE, PIXEL_SIZE,
    TiffCompression,
};
