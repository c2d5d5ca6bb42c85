//! Read back GeoTIFFs produced by [`StandardGeoTiffWriter`].
//!
//! [`StandardGeoTiffWriter`]: crate::raster_pipeline::geotiff::StandardGeoTiffWriter

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tracing::debug;

use crate::raster_pipeline::common::error::{ConversionError, Result};
use crate::raster_pipeline::georef::{Affine, TransverseMercator};
use crate::raster_pipeline::geotiff::geokeys::decode_geokeys;

/// Dimensions, georeferencing and samples of a decoded GeoTIFF
#[derive(Debug, Clone, PartialEq)]
pub struct GeoTiffSummary {
    pub width: usize,
    pub height: usize,
    /// Row-major float64 samples of the first band
    pub samples: Vec<f64>,
    pub transform: Affine,
    pub crs: TransverseMercator,
    /// Value of the GDAL_NODATA tag, if present
    pub nodata: Option<f64>,
}

impl GeoTiffSummary {
    /// Sample at pixel `(col, row)`.
    pub fn sample(&self, col: usize, row: usize) -> Option<f64> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.samples.get(row * self.width + col).copied()
    }
}

pub fn inspect_geotiff<R: Read + Seek>(reader: R) -> Result<GeoTiffSummary> {
    let mut decoder = Decoder::new(reader).map_err(decode_error)?;

    let (width, height) = decoder.dimensions().map_err(decode_error)?;
    debug!("Inspecting GeoTIFF: {}x{}", width, height);

    let pixel_scale = decoder
        .get_tag_f64_vec(Tag::ModelPixelScaleTag)
        .map_err(|_| missing("ModelPixelScale"))?;
    let tiepoint = decoder
        .get_tag_f64_vec(Tag::ModelTiepointTag)
        .map_err(|_| missing("ModelTiepoint"))?;
    let transform = Affine::from_geotiff_tags(&pixel_scale, &tiepoint)
        .ok_or_else(|| ConversionError::DecodeError("truncated georeferencing tags".to_string()))?;

    let keys = decoder
        .get_tag_u16_vec(Tag::GeoKeyDirectoryTag)
        .map_err(|_| missing("GeoKeyDirectory"))?;
    let doubles = decoder
        .get_tag_f64_vec(Tag::GeoDoubleParamsTag)
        .unwrap_or_default();
    let crs = decode_geokeys(&keys, &doubles)?;

    let nodata = match decoder.find_tag(Tag::GdalNodata).map_err(decode_error)? {
        Some(value) => Some(parse_nodata(&value.into_string().map_err(decode_error)?)?),
        None => None,
    };

    let samples = match decoder.read_image().map_err(decode_error)? {
        DecodingResult::F64(samples) => samples,
        _ => {
            return Err(ConversionError::DecodeError(
                "expected float64 samples".to_string(),
            ))
        }
    };

    Ok(GeoTiffSummary {
        width: width as usize,
        height: height as usize,
        samples,
        transform,
        crs,
        nodata,
    })
}

pub fn inspect_geotiff_file<P: AsRef<Path>>(path: P) -> Result<GeoTiffSummary> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        ConversionError::InputReadError(format!("{}: {}", path.display(), e))
    })?;
    inspect_geotiff(BufReader::new(file))
}

fn parse_nodata(text: &str) -> Result<f64> {
    let trimmed = text.trim_end_matches('\0').trim();
    trimmed
        .parse::<f64>()
        .map_err(|_| ConversionError::DecodeError(format!("invalid GDAL_NODATA value '{trimmed}'")))
}

fn missing(tag: &str) -> ConversionError {
    ConversionError::MissingGeoKey(tag.to_string())
}

fn decode_error(e: tiff::TiffError) -> ConversionError {
    ConversionError::DecodeError(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use crate::raster_pipeline::georef::SVY21;
    use crate::raster_pipeline::geotiff::geokeys::encode_geokeys;
    use crate::raster_pipeline::geotiff::{ConversionConfig, GeoRaster, GeoTiffWriter, StandardGeoTiffWriter};

    #[test]
    fn test_inspect_written_raster() {
        let raster = GeoRaster {
            width: 3,
            height: 2,
            data: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            transform: Affine::from_origin(100.0, 200.0, 1.0),
            crs: SVY21,
            nodata: 0.0,
        };
        let mut bytes = Cursor::new(Vec::<u8>::new());
        StandardGeoTiffWriter
            .write_geotiff(&raster, &mut bytes, &ConversionConfig::default())
            .unwrap();

        bytes.set_position(0);
        let summary = inspect_geotiff(bytes).unwrap();

        assert_eq!((summary.width, summary.height), (3, 2));
        assert_eq!(summary.samples, raster.data);
        assert_eq!(summary.transform, raster.transform);
        assert_eq!(summary.crs, SVY21);
        assert_eq!(summary.nodata, Some(0.0));
        assert_eq!(summary.sample(2, 1), Some(6.0));
        assert_eq!(summary.sample(3, 0), None);
    }

    #[test]
    fn test_plain_tiff_has_no_georeferencing() {
        let mut buffer: Vec<u8> = Vec::new();
        {
            let mut encoder = tiff::encoder::TiffEncoder::new(Cursor::new(&mut buffer)).unwrap();
            encoder
                .write_image::<tiff::encoder::colortype::Gray64Float>(2, 1, &[1.0, 2.0])
                .unwrap();
        }

        let err = inspect_geotiff(Cursor::new(buffer)).unwrap_err();
        assert!(matches!(err, ConversionError::MissingGeoKey(_)));
    }

    type TestDirectory<'a, 'b> =
        tiff::encoder::DirectoryEncoder<'a, &'b mut Cursor<Vec<u8>>, tiff::encoder::TiffKindStandard>;

    /// Georeferenced TIFF with a caller-chosen GDAL_NODATA entry.
    fn encode_with_nodata(write_nodata: impl FnOnce(&mut TestDirectory<'_, '_>)) -> Cursor<Vec<u8>> {
        let transform = Affine::from_origin(10.0, 20.0, 1.0);
        let geokeys = encode_geokeys(&SVY21);
        let mut buffer = Cursor::new(Vec::<u8>::new());
        {
            let mut encoder = tiff::encoder::TiffEncoder::new(&mut buffer).unwrap();
            let mut image = encoder
                .new_image::<tiff::encoder::colortype::Gray64Float>(2, 1)
                .unwrap();
            let dir = image.encoder();
            dir.write_tag(Tag::ModelPixelScaleTag, transform.pixel_scale().as_slice()).unwrap();
            dir.write_tag(Tag::ModelTiepointTag, transform.tiepoint().as_slice()).unwrap();
            dir.write_tag(Tag::GeoKeyDirectoryTag, geokeys.keys.as_slice()).unwrap();
            dir.write_tag(Tag::GeoDoubleParamsTag, geokeys.doubles.as_slice()).unwrap();
            write_nodata(dir);
            image.write_data(&[1.0, 2.0]).unwrap();
        }
        buffer.set_position(0);
        buffer
    }

    #[test]
    fn test_missing_nodata_tag_is_none() {
        let summary = inspect_geotiff(encode_with_nodata(|_| {})).unwrap();
        assert_eq!(summary.nodata, None);
        assert_eq!(summary.samples, vec![1.0, 2.0]);
    }

    #[test]
    fn test_non_ascii_nodata_tag_is_an_error() {
        let bytes = encode_with_nodata(|dir| dir.write_tag(Tag::GdalNodata, 7u16).unwrap());

        let err = inspect_geotiff(bytes).unwrap_err();
        assert!(matches!(err, ConversionError::DecodeError(_)));
    }

    #[test]
    fn test_unparsable_nodata_tag_is_an_error() {
        let bytes = encode_with_nodata(|dir| dir.write_tag(Tag::GdalNodata, "none").unwrap());

        let err = inspect_geotiff(bytes).unwrap_err();
        assert!(matches!(err, ConversionError::DecodeError(_)));
    }

    #[test]
    fn test_parse_nodata() {
        assert_eq!(parse_nodata("0").unwrap(), 0.0);
        assert_eq!(parse_nodata("-9999\0").unwrap(), -9999.0);
        assert!(parse_nodata("none").is_err());
    }
}
