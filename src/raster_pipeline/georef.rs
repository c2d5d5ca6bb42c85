//! Georeferencing module
//!
//! Affine pixel transform and the fixed projected CRS attached to output
//! rasters.

mod affine;
mod crs;

pub use affine::Affine;
pub use crs::{Ellipsoid, LinearUnit, SVY21, SVY21_PROJ, TransverseMercator};
