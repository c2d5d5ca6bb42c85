use std::io::{Seek, Write};
use crate::raster_pipeline::common::error::Result;
use crate::raster_pipeline::geotiff::types::{ConversionConfig, GeoRaster};

pub trait GeoTiffWriter {
    /// Encode `raster` into `output`. TIFF offsets are absolute, so `output`
    /// must start out empty.
    fn write_geotiff<O: Write + Seek>(
        &self,
        raster: &GeoRaster,
        output: &mut O,
        config: &ConversionConfig,
    ) -> Result<()>;
}
