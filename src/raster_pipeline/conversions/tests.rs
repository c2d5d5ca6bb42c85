use std::io::{Cursor, Seek, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use ndarray::{ArrayD, IxDyn};

use crate::raster_pipeline::common::error::{ConversionError, Result};
use crate::raster_pipeline::conversions::{PayloadToGeoTiffPipeline, output_path_for};
use crate::raster_pipeline::georef::SVY21;
use crate::raster_pipeline::geotiff::{ConversionConfig, GeoRaster, GeoTiffWriter, GridLayout};
use crate::raster_pipeline::payload::{GridPayload, PayloadReader};

struct MockReader {
    should_fail: bool,
    mock_payload: Option<GridPayload>,
}

impl PayloadReader for MockReader {
    fn read_payload(&self, _text: &str) -> Result<GridPayload> {
        if self.should_fail {
            return Err(ConversionError::DelimiterCount(1));
        }
        Ok(self.mock_payload.clone().unwrap_or_else(|| grid_payload(&[1, 10, 20])))
    }
}

struct MockWriter {
    should_fail: bool,
    written_data: Arc<Mutex<Vec<GeoRaster>>>,
}

impl GeoTiffWriter for MockWriter {
    fn write_geotiff<O: Write + Seek>(
        &self,
        raster: &GeoRaster,
        output: &mut O,
        _config: &ConversionConfig,
    ) -> Result<()> {
        if self.should_fail {
            return Err(ConversionError::EncodeError("Mock encode error".to_string()));
        }
        self.written_data.lock().unwrap().push(raster.clone());
        output.write_all(b"mock")?;
        Ok(())
    }
}

fn grid_payload(shape: &[usize]) -> GridPayload {
    let len: usize = shape.iter().product();
    let values = (0..len).map(|v| v as f64).collect();
    GridPayload {
        grid: ArrayD::from_shape_vec(IxDyn(shape), values).unwrap(),
        origin: (500.0, 600.0),
    }
}

fn pipeline_with(
    payload: Option<GridPayload>,
    config: ConversionConfig,
) -> (PayloadToGeoTiffPipeline<MockReader, MockWriter>, Arc<Mutex<Vec<GeoRaster>>>) {
    let written = Arc::new(Mutex::new(Vec::new()));
    let reader = MockReader { should_fail: false, mock_payload: payload };
    let writer = MockWriter { should_fail: false, written_data: written.clone() };
    (PayloadToGeoTiffPipeline::with_custom(reader, writer, config), written)
}

#[test]
fn test_successful_conversion() {
    let (pipeline, written) = pipeline_with(None, ConversionConfig::default());

    let mut output = Cursor::new(Vec::<u8>::new());
    let raster = pipeline.convert("ignored", &mut output).unwrap();

    assert_eq!(output.into_inner(), b"mock");
    assert_eq!((raster.width, raster.height), (20, 10));
    assert_eq!(raster.crs, SVY21);
    assert_eq!(raster.nodata, 0.0);
    assert_eq!(raster.transform.apply(0.0, 0.0), (500.0, 600.0));
    assert_eq!(raster.transform.apply(0.0, 1.0), (500.0, 599.0));
    assert_eq!(written.lock().unwrap().len(), 1);
}

#[test]
fn test_samples_stay_row_major() {
    let (pipeline, _) = pipeline_with(Some(grid_payload(&[1, 2, 3])), ConversionConfig::default());

    let raster = pipeline.convert("ignored", &mut Cursor::new(Vec::<u8>::new())).unwrap();
    assert_eq!(raster.data, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
}

#[test]
fn test_reader_failure() {
    let written = Arc::new(Mutex::new(Vec::new()));
    let reader = MockReader { should_fail: true, mock_payload: None };
    let writer = MockWriter { should_fail: false, written_data: written.clone() };

    let pipeline = PayloadToGeoTiffPipeline::with_custom(reader, writer, ConversionConfig::default());

    let mut output = Cursor::new(Vec::<u8>::new());
    let result = pipeline.convert("ignored", &mut output);

    assert!(matches!(result.unwrap_err(), ConversionError::DelimiterCount(_)));
    assert!(output.get_ref().is_empty());
    assert!(written.lock().unwrap().is_empty());
}

#[test]
fn test_writer_failure() {
    let written = Arc::new(Mutex::new(Vec::new()));
    let reader = MockReader { should_fail: false, mock_payload: None };
    let writer = MockWriter { should_fail: true, written_data: written };

    let pipeline = PayloadToGeoTiffPipeline::with_custom(reader, writer, ConversionConfig::default());

    let result = pipeline.convert("ignored", &mut Cursor::new(Vec::<u8>::new()));
    assert!(matches!(result.unwrap_err(), ConversionError::EncodeError(_)));
}

#[test]
fn test_two_dimensional_grid_rejected_by_default() {
    let (pipeline, written) = pipeline_with(Some(grid_payload(&[4, 5])), ConversionConfig::default());

    let result = pipeline.convert("ignored", &mut Cursor::new(Vec::<u8>::new()));
    assert!(matches!(result.unwrap_err(), ConversionError::InsufficientDimensions(2, 3)));
    assert!(written.lock().unwrap().is_empty());
}

#[test]
fn test_two_dimensional_grid_with_rows_cols_layout() {
    let config = ConversionConfig::builder().layout(GridLayout::RowsCols).build();
    let (pipeline, _) = pipeline_with(Some(grid_payload(&[4, 5])), config);

    let raster = pipeline.convert("ignored", &mut Cursor::new(Vec::<u8>::new())).unwrap();
    assert_eq!((raster.width, raster.height), (5, 4));
}

#[test]
fn test_leading_wrapper_axes_collapse() {
    let (pipeline, _) = pipeline_with(Some(grid_payload(&[1, 1, 2, 3])), ConversionConfig::default());

    let raster = pipeline.convert("ignored", &mut Cursor::new(Vec::<u8>::new())).unwrap();
    assert_eq!((raster.width, raster.height), (3, 2));
    assert_eq!(raster.data, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
}

#[test]
fn test_four_dimensional_grid_rejected() {
    let (pipeline, _) = pipeline_with(Some(grid_payload(&[2, 1, 2, 2])), ConversionConfig::default());

    let result = pipeline.convert("ignored", &mut Cursor::new(Vec::<u8>::new()));
    assert!(matches!(result.unwrap_err(), ConversionError::TooManyDimensions(4, 3)));
}

#[test]
fn test_multiple_bands_rejected() {
    let (pipeline, _) = pipeline_with(Some(grid_payload(&[2, 3, 3])), ConversionConfig::default());

    let result = pipeline.convert("ignored", &mut Cursor::new(Vec::<u8>::new()));
    assert!(matches!(result.unwrap_err(), ConversionError::BandCountMismatch(2)));
}

#[test]
fn test_dimension_validation_failure() {
    let (pipeline, _) = pipeline_with(Some(grid_payload(&[1, 0, 3])), ConversionConfig::default());

    let result = pipeline.convert("ignored", &mut Cursor::new(Vec::<u8>::new()));
    assert!(matches!(result.unwrap_err(), ConversionError::InvalidDimensions(3, 0)));
}

#[test]
fn test_dimension_validation_disabled() {
    let config = ConversionConfig::builder().validate_dimensions(false).build();
    let (pipeline, written) = pipeline_with(Some(grid_payload(&[1, 0, 3])), config);

    let result = pipeline.convert("ignored", &mut Cursor::new(Vec::<u8>::new()));
    assert!(result.is_ok());
    assert_eq!(written.lock().unwrap()[0].data.len(), 0);
}

#[test]
fn test_set_config() {
    let (mut pipeline, _) = pipeline_with(Some(grid_payload(&[4, 5])), ConversionConfig::default());
    assert_eq!(pipeline.config().layout, GridLayout::BandRowsCols);

    pipeline.set_config(ConversionConfig::builder().layout(GridLayout::RowsCols).build());
    assert!(pipeline.convert("ignored", &mut Cursor::new(Vec::<u8>::new())).is_ok());
}

#[test]
fn test_output_path_appends_extension() {
    assert_eq!(output_path_for("grid.txt"), Path::new("grid.txt.tif"));
    assert_eq!(output_path_for("dir/result"), Path::new("dir/result.tif"));
}
