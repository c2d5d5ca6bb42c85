//! Parsed payload types

use ndarray::ArrayD;

/// Literal separator between the grid fragment and the origin fragment.
pub const SEGMENT_DELIMITER: &str = "|||";

/// Grid values and raster origin decoded from a delimited payload
#[derive(Debug, Clone, PartialEq)]
pub struct GridPayload {
    /// Dense float64 array, shape taken from the JSON nesting
    pub grid: ArrayD<f64>,
    /// Top-left corner of the raster extent as `(minX, maxY)`, in metres
    pub origin: (f64, f64),
}

impl GridPayload {
    pub fn min_x(&self) -> f64 {
        self.origin.0
    }

    pub fn max_y(&self) -> f64 {
        self.origin.1
    }

    pub fn shape(&self) -> &[usize] {
        self.grid.shape()
    }
}
