//! Raster export pipeline module
//!
//! This module converts `|||` delimited grid payloads into georeferenced
//! GeoTIFFs, with separate modules for payload parsing, georeferencing,
//! GeoTIFF encoding and conversion orchestration.

pub mod payload;
pub mod georef;
pub mod geotiff;
pub mod conversions;
pub mod common;

pub use common::{
    ConversionError,
    Result,
};

pub use payload::{
    DelimitedPayloadReader,
    GridPayload,
    PayloadReader,
};

pub use georef::{
    Affine,
    SVY21,
    SVY21_PROJ,
    TransverseMercator,
};

pub use geotiff::{
    ConversionConfig,
    ConversionConfigBuilder,
    GeoRaster,
    GeoTiffSummary,
    GeoTiffWriter,
    GridLayout,
    StandardGeoTiffWriter,
    TiffCompression,
    inspect_geotiff,
    inspect_geotiff_file,
};

pub use conversions::{
    PayloadToGeoTiffPipeline,
    output_path_for,
};
