use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::raster_pipeline::{
    common::error::{ConversionError, Result},
    georef::{Affine, SVY21},
    geotiff::{
        ConversionConfig, GeoRaster, GeoTiffWriter, GridLayout, NODATA_VALUE, PIXEL_SIZE,
        StandardGeoTiffWriter,
    },
    payload::{DelimitedPayloadReader, GridPayload, PayloadReader},
};

/// Extension appended to the input filename to name the output raster.
pub const OUTPUT_EXTENSION: &str = ".tif";

/// `<input>.tif`, keeping the input's own extension: `grid.txt` becomes
/// `grid.txt.tif`.
pub fn output_path_for<P: AsRef<Path>>(input_path: P) -> PathBuf {
    let mut name = OsString::from(input_path.as_ref().as_os_str());
    name.push(OUTPUT_EXTENSION);
    PathBuf::from(name)
}

pub struct PayloadToGeoTiffPipeline<R: PayloadReader, W: GeoTiffWriter> {
    reader: R,
    writer: W,
    config: ConversionConfig,
}

impl PayloadToGeoTiffPipeline<DelimitedPayloadReader, StandardGeoTiffWriter> {
    pub fn new(config: ConversionConfig) -> Self {
        Self {
            reader: DelimitedPayloadReader,
            writer: StandardGeoTiffWriter,
            config,
        }
    }
}

impl<R: PayloadReader, W: GeoTiffWriter> PayloadToGeoTiffPipeline<R, W> {
    pub fn with_custom(reader: R, writer: W, config: ConversionConfig) -> Self {
        Self {
            reader,
            writer,
            config,
        }
    }

    /// Height and width of the output raster for a grid of `shape`.
    fn resolve_dimensions(&self, shape: &[usize]) -> Result<(usize, usize)> {
        let required = self.config.layout.required_dimensions();

        // a fragment that kept its own brackets arrives with extra length-1
        // wrapper axes in front; they do not change the row-major samples
        let mut shape = shape;
        while shape.len() > required && shape[0] == 1 {
            shape = &shape[1..];
        }

        if shape.len() < required {
            return Err(ConversionError::InsufficientDimensions(shape.len(), required));
        }
        if shape.len() > required {
            return Err(ConversionError::TooManyDimensions(shape.len(), required));
        }

        match self.config.layout {
            GridLayout::BandRowsCols => {
                if shape[0] != 1 {
                    return Err(ConversionError::BandCountMismatch(shape[0]));
                }
                Ok((shape[1], shape[2]))
            }
            GridLayout::RowsCols => Ok((shape[0], shape[1])),
        }
    }

    fn validate_dimensions(&self, width: usize, height: usize) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        if width == 0 || height == 0 {
            return Err(ConversionError::InvalidDimensions(width, height));
        }

        Ok(())
    }

    /// Georeference a parsed payload as a single-band raster.
    pub fn build_raster(&self, payload: GridPayload) -> Result<GeoRaster> {
        let (height, width) = self.resolve_dimensions(payload.shape())?;
        self.validate_dimensions(width, height)?;

        let transform = Affine::from_origin(payload.min_x(), payload.max_y(), PIXEL_SIZE);
        debug!(%transform, "Raster transform");

        // standard layout is row-major, so a single band flattens to rows of `width`
        let data = payload.grid.iter().copied().collect();

        Ok(GeoRaster {
            width,
            height,
            data,
            transform,
            crs: SVY21,
            nodata: NODATA_VALUE,
        })
    }

    #[instrument(skip(self, input, output), fields(input_size = input.len()))]
    pub fn convert<O: Write + Seek>(&self, input: &str, output: &mut O) -> Result<GeoRaster> {
        info!("Starting payload to GeoTIFF conversion");

        let payload = {
            let _span = tracing::info_span!("parse_payload").entered();
            self.reader.read_payload(input)?
        };
        debug!(
            min_x = payload.min_x(),
            max_y = payload.max_y(),
            shape = ?payload.shape(),
            "Payload parsed"
        );

        let raster = {
            let _span = tracing::info_span!("build_raster").entered();
            self.build_raster(payload)?
        };

        {
            let _span = tracing::info_span!("encode_geotiff").entered();
            self.writer.write_geotiff(&raster, output, &self.config)?;
        }

        info!(
            width = raster.width,
            height = raster.height,
            "Conversion complete"
        );
        Ok(raster)
    }

    /// Convert `input_path` into `<input_path>.tif` and return the output path.
    pub fn convert_file<P: AsRef<Path>>(&self, input_path: P) -> Result<PathBuf> {
        let input_path = input_path.as_ref();
        let output_path = output_path_for(input_path);
        self.convert_file_to(input_path, &output_path)?;
        Ok(output_path)
    }

    #[instrument(skip(self, input_path, output_path))]
    pub fn convert_file_to<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
    ) -> Result<()> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        info!(
            input = %input_path.display(),
            output = %output_path.display(),
            "Converting file"
        );

        let input_text = {
            let _span = tracing::info_span!("read_input_file").entered();
            std::fs::read_to_string(input_path).map_err(|e| {
                ConversionError::InputReadError(format!("{}: {}", input_path.display(), e))
            })?
        };

        // encode fully in memory so a rejected payload never leaves a partial file
        let mut encoded = Cursor::new(Vec::<u8>::new());
        self.convert(&input_text, &mut encoded)?;

        {
            let _span = tracing::info_span!("write_output_file").entered();
            let file = File::create(output_path).map_err(|e| {
                ConversionError::OutputWriteError(format!("{}: {}", output_path.display(), e))
            })?;
            let mut writer = BufWriter::new(file);
            writer
                .write_all(encoded.get_ref())
                .and_then(|_| writer.flush())
                .map_err(|e| {
                    ConversionError::OutputWriteError(format!("{}: {}", output_path.display(), e))
                })?;
        }

        Ok(())
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ConversionConfig) {
        self.config = config;
    }
}
