//! Pixel to world affine transform

use std::fmt;

/// Six-coefficient affine transform mapping pixel `(col, row)` to world
/// `(x, y)`:
///
/// ```text
/// x = a * col + b * row + c
/// y = d * col + e * row + f
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine {
    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// North-up transform whose pixel (0, 0) corner sits at `(min_x, max_y)`.
    /// Row indices grow southwards.
    pub const fn from_origin(min_x: f64, max_y: f64, pixel_size: f64) -> Self {
        Self::new(pixel_size, 0.0, min_x, 0.0, -pixel_size, max_y)
    }

    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.a * col + self.b * row + self.c,
            self.d * col + self.e * row + self.f,
        )
    }

    pub fn is_rectilinear(&self) -> bool {
        self.b == 0.0 && self.d == 0.0
    }

    /// `[ScaleX, ScaleY, ScaleZ]` for the ModelPixelScale tag.
    pub fn pixel_scale(&self) -> [f64; 3] {
        [self.a, -self.e, 0.0]
    }

    /// `[I, J, K, X, Y, Z]` for the ModelTiepoint tag, tying pixel (0, 0)
    /// to the transform origin.
    pub fn tiepoint(&self) -> [f64; 6] {
        [0.0, 0.0, 0.0, self.c, self.f, 0.0]
    }

    /// Rebuild a transform from ModelPixelScale and ModelTiepoint values.
    pub fn from_geotiff_tags(pixel_scale: &[f64], tiepoint: &[f64]) -> Option<Self> {
        let [scale_x, scale_y, ..] = pixel_scale else {
            return None;
        };
        let [i, j, _k, x, y, ..] = tiepoint else {
            return None;
        };
        Some(Self::new(
            *scale_x,
            0.0,
            x - i * scale_x,
            0.0,
            -scale_y,
            y + j * scale_y,
        ))
    }
}

impl fmt::Display for Affine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "| {:.2}, {:.2}, {:.2}|", self.a, self.b, self.c)?;
        writeln!(f, "| {:.2}, {:.2}, {:.2}|", self.d, self.e, self.f)?;
        write!(f, "| {:.2}, {:.2}, {:.2}|", 0.0, 0.0, 1.0)
    }
}
