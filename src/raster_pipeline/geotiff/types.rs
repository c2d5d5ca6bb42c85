//! GeoTIFF conversion configuration and raster types

use crate::raster_pipeline::georef::{Affine, TransverseMercator};

/// Nodata sentinel recorded in every exported raster.
pub const NODATA_VALUE: f64 = 0.0;

/// Ground size of one pixel, in CRS units.
pub const PIXEL_SIZE: f64 = 1.0;

/// TIFF compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    None,
    /// LZW compression (slow, good compression)
    Lzw,
    /// Deflate compression - fast level (good speed/size balance)
    DeflateFast,
    /// Deflate compression - best compression (slower)
    DeflateBest,
    /// Deflate compression - balanced
    DeflateBalanced,
}

/// How the axes of a parsed grid map onto raster rows and columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridLayout {
    /// `(band, row, col)`: height from axis 1, width from axis 2, exactly one band
    BandRowsCols,
    /// `(row, col)`: a bare 2-D grid
    RowsCols,
}

impl GridLayout {
    pub fn required_dimensions(&self) -> usize {
        match self {
            GridLayout::BandRowsCols => 3,
            GridLayout::RowsCols => 2,
        }
    }
}

/// Configuration for payload to GeoTIFF conversion
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Compression method to use
    pub compression: TiffCompression,
    /// Whether to reject rasters with a zero width or height before encoding
    pub validate_dimensions: bool,
    /// Expected axis layout of the parsed grid
    pub layout: GridLayout,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            compression: TiffCompression::None,
            validate_dimensions: true,
            layout: GridLayout::BandRowsCols,
        }
    }
}

impl ConversionConfig {
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder::default()
    }
}

/// Builder for ConversionConfig
#[derive(Default)]
pub struct ConversionConfigBuilder {
    compression: Option<TiffCompression>,
    validate_dimensions: Option<bool>,
    layout: Option<GridLayout>,
}

impl ConversionConfigBuilder {
    pub fn compression(mut self, compression: TiffCompression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn layout(mut self, layout: GridLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn build(self) -> ConversionConfig {
        let default = ConversionConfig::default();
        ConversionConfig {
            compression: self.compression.unwrap_or(default.compression),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
            layout: self.layout.unwrap_or(default.layout),
        }
    }
}

/// A single-band float64 raster ready to be encoded
#[derive(Debug, Clone, PartialEq)]
pub struct GeoRaster {
    /// Width of the raster in pixels
    pub width: usize,
    /// Height of the raster in pixels
    pub height: usize,
    /// Row-major samples, `width * height` long
    pub data: Vec<f64>,
    pub transform: Affine,
    pub crs: TransverseMercator,
    pub nodata: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConversionConfig::default();
        assert_eq!(config.compression, TiffCompression::None);
        assert!(config.validate_dimensions);
        assert_eq!(config.layout, GridLayout::BandRowsCols);
    }

    #[test]
    fn test_config_builder() {
        let config = ConversionConfig::builder()
            .compression(TiffCompression::DeflateBest)
            .validate_dimensions(false)
            .layout(GridLayout::RowsCols)
            .build();

        assert_eq!(config.compression, TiffCompression::DeflateBest);
        assert!(!config.validate_dimensions);
        assert_eq!(config.layout, GridLayout::RowsCols);
    }

    #[test]
    fn test_builder_keeps_unset_defaults() {
        let config = ConversionConfig::builder().compression(TiffCompression::Lzw).build();
        assert!(config.validate_dimensions);
        assert_eq!(config.layout.required_dimensions(), 3);
    }
}
