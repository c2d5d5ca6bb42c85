//! GeoTIFF writer built on the `tiff` crate.
//!
//! Rasters are encoded as a single float64 sample per pixel. Georeferencing
//! is carried by the ModelPixelScale and ModelTiepoint tags plus a GeoKey
//! directory describing the transverse Mercator CRS; the nodata sentinel is
//! written to the GDAL_NODATA tag so GDAL based readers pick it up.

use std::io::{Seek, SeekFrom, Write};

use tiff::encoder::colortype::Gray64Float;
use tiff::encoder::{DirectoryEncoder, TiffEncoder, TiffKind};
use tiff::tags::Tag;
use tracing::debug;

use crate::raster_pipeline::common::error::{ConversionError, Result};
use crate::raster_pipeline::geotiff::geokeys::encode_geokeys;
use crate::raster_pipeline::geotiff::types::{ConversionConfig, GeoRaster, TiffCompression};
use crate::raster_pipeline::geotiff::writer::GeoTiffWriter;

pub struct StandardGeoTiffWriter;

impl GeoTiffWriter for StandardGeoTiffWriter {
    fn write_geotiff<O: Write + Seek>(
        &self,
        raster: &GeoRaster,
        output: &mut O,
        config: &ConversionConfig,
    ) -> Result<()> {
        debug!("Encoding GeoTIFF raster: {}x{}", raster.width, raster.height);

        if raster.data.len() != raster.width * raster.height {
            return Err(ConversionError::EncodeError(format!(
                "{} samples do not fill a {}x{} raster",
                raster.data.len(),
                raster.width,
                raster.height
            )));
        }

        let compression = match config.compression {
            TiffCompression::None => tiff::encoder::Compression::Uncompressed,
            TiffCompression::Lzw => tiff::encoder::Compression::Lzw,
            TiffCompression::DeflateFast => tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Fast),
            TiffCompression::DeflateBalanced => tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Balanced),
            TiffCompression::DeflateBest => tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Best),
        };

        {
            let mut encoder = TiffEncoder::new(&mut *output)
                .map_err(encode_error)?
                .with_compression(compression);

            let mut image = encoder
                .new_image::<Gray64Float>(raster.width as u32, raster.height as u32)
                .map_err(encode_error)?;

            write_geotiff_tags(image.encoder(), raster)?;

            image.write_data(&raster.data).map_err(encode_error)?;
        }

        // the encoder seeks back to patch IFD offsets
        let written = output.seek(SeekFrom::End(0))?;
        debug!("GeoTIFF encoding complete, {} bytes", written);
        Ok(())
    }
}

fn write_geotiff_tags<W: Write + Seek, K: TiffKind>(
    dir: &mut DirectoryEncoder<'_, W, K>,
    raster: &GeoRaster,
) -> Result<()> {
    let transform = &raster.transform;
    if !transform.is_rectilinear() {
        return Err(ConversionError::EncodeError(
            "rotated transforms cannot be expressed with a tiepoint and pixel scale".to_string(),
        ));
    }

    let pixel_scale = transform.pixel_scale();
    dir.write_tag(Tag::ModelPixelScaleTag, pixel_scale.as_slice())
        .map_err(encode_error)?;

    let tiepoint = transform.tiepoint();
    dir.write_tag(Tag::ModelTiepointTag, tiepoint.as_slice())
        .map_err(encode_error)?;

    let geokeys = encode_geokeys(&raster.crs);
    dir.write_tag(Tag::GeoKeyDirectoryTag, geokeys.keys.as_slice())
        .map_err(encode_error)?;
    dir.write_tag(Tag::GeoDoubleParamsTag, geokeys.doubles.as_slice())
        .map_err(encode_error)?;
    dir.write_tag(Tag::GeoAsciiParamsTag, geokeys.ascii.as_str())
        .map_err(encode_error)?;

    let nodata = raster.nodata.to_string();
    dir.write_tag(Tag::GdalNodata, nodata.as_str())
        .map_err(encode_error)?;

    Ok(())
}

fn encode_error(e: tiff::TiffError) -> ConversionError {
    ConversionError::EncodeError(e.to_string())
}
