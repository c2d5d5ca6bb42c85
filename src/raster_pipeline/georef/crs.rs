//! Transverse Mercator coordinate reference system.
//!
//! Only the projection family the exporter writes is modelled: a transverse
//! Mercator on the WGS84 ellipsoid with metre units. Definitions are read
//! from and rendered to PROJ strings such as
//!
//! ```text
//! +proj=tmerc +lat_0=1.36666666666667 +lon_0=103.833333333333 +k=1
//! +x_0=28001.642 +y_0=38744.572 +ellps=WGS84 +towgs84=0,0,0,0,0,0,0
//! +units=m +no_defs +type=crs
//! ```

use std::fmt;

use proj4rs::proj::Proj;
use proj4rs::transform::transform;

use crate::raster_pipeline::common::error::{ConversionError, Result};

/// PROJ definition of the fixed output CRS.
pub const SVY21_PROJ: &str = "+proj=tmerc +lat_0=1.36666666666667 +lon_0=103.833333333333 \
+k=1 +x_0=28001.642 +y_0=38744.572 +ellps=WGS84 \
+towgs84=0,0,0,0,0,0,0 +units=m +no_defs +type=crs";

/// The CRS attached to every exported raster.
pub const SVY21: TransverseMercator = TransverseMercator {
    lat_0: 1.36666666666667,
    lon_0: 103.833333333333,
    scale_factor: 1.0,
    false_easting: 28001.642,
    false_northing: 38744.572,
    ellipsoid: Ellipsoid::Wgs84,
    towgs84: [0.0; 7],
    units: LinearUnit::Metre,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ellipsoid {
    Wgs84,
}

impl Ellipsoid {
    pub fn proj_name(&self) -> &'static str {
        match self {
            Ellipsoid::Wgs84 => "WGS84",
        }
    }

    /// EPSG code of the geographic CRS built on this ellipsoid.
    pub fn geographic_epsg(&self) -> u16 {
        match self {
            Ellipsoid::Wgs84 => 4326,
        }
    }

    fn from_proj_name(name: &str) -> Option<Self> {
        match name {
            "WGS84" => Some(Ellipsoid::Wgs84),
            _ => None,
        }
    }

    pub(crate) fn from_geographic_epsg(code: u16) -> Option<Self> {
        match code {
            4326 => Some(Ellipsoid::Wgs84),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinearUnit {
    Metre,
}

impl LinearUnit {
    pub fn proj_name(&self) -> &'static str {
        match self {
            LinearUnit::Metre => "m",
        }
    }

    pub fn epsg(&self) -> u16 {
        match self {
            LinearUnit::Metre => 9001,
        }
    }

    fn from_proj_name(name: &str) -> Option<Self> {
        match name {
            "m" => Some(LinearUnit::Metre),
            _ => None,
        }
    }

    pub(crate) fn from_epsg(code: u16) -> Option<Self> {
        match code {
            9001 => Some(LinearUnit::Metre),
            _ => None,
        }
    }
}

/// Transverse Mercator projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransverseMercator {
    /// Latitude of natural origin, degrees
    pub lat_0: f64,
    /// Longitude of natural origin (central meridian), degrees
    pub lon_0: f64,
    pub scale_factor: f64,
    pub false_easting: f64,
    pub false_northing: f64,
    pub ellipsoid: Ellipsoid,
    /// Helmert shift to WGS84: dx, dy, dz, rx, ry, rz, ds
    pub towgs84: [f64; 7],
    pub units: LinearUnit,
}

impl TransverseMercator {
    /// Parse a `+proj=tmerc` PROJ string.
    ///
    /// Missing origin and false offset parameters default to 0 and the scale
    /// factor to 1, as PROJ does. The ellipsoid must be given and must be
    /// WGS84; units default to metres. The definition must also be accepted
    /// by `proj4rs`.
    pub fn from_proj_str(definition: &str) -> Result<Self> {
        let mut projection = None;
        let mut ellipsoid = None;
        let mut crs = TransverseMercator {
            lat_0: 0.0,
            lon_0: 0.0,
            scale_factor: 1.0,
            false_easting: 0.0,
            false_northing: 0.0,
            ellipsoid: Ellipsoid::Wgs84,
            towgs84: [0.0; 7],
            units: LinearUnit::Metre,
        };

        for token in definition.split_whitespace() {
            let Some(param) = token.strip_prefix('+') else {
                return Err(invalid(format!("expected '+key=value', got '{token}'")));
            };
            let (key, value) = param.split_once('=').unwrap_or((param, ""));

            match key {
                "proj" => projection = Some(value),
                "lat_0" => crs.lat_0 = parse_number(key, value)?,
                "lon_0" => crs.lon_0 = parse_number(key, value)?,
                "k" | "k_0" => crs.scale_factor = parse_number(key, value)?,
                "x_0" => crs.false_easting = parse_number(key, value)?,
                "y_0" => crs.false_northing = parse_number(key, value)?,
                "ellps" | "datum" => {
                    ellipsoid = Some(
                        Ellipsoid::from_proj_name(value)
                            .ok_or_else(|| invalid(format!("unsupported {key} '{value}'")))?,
                    )
                }
                "towgs84" => crs.towgs84 = parse_towgs84(value)?,
                "units" => {
                    crs.units = LinearUnit::from_proj_name(value)
                        .ok_or_else(|| invalid(format!("unsupported units '{value}'")))?
                }
                "no_defs" | "type" => {}
                other => return Err(invalid(format!("unsupported parameter '{other}'"))),
            }
        }

        match projection {
            Some("tmerc") => {}
            Some(other) => return Err(invalid(format!("unsupported projection '{other}'"))),
            None => return Err(invalid("missing +proj".to_string())),
        }
        crs.ellipsoid = ellipsoid.ok_or_else(|| invalid("missing +ellps".to_string()))?;

        Proj::from_proj_string(definition).map_err(proj_error)?;

        Ok(crs)
    }

    pub fn to_proj(&self) -> Result<Proj> {
        Proj::from_proj_string(&self.to_proj_string()).map_err(proj_error)
    }

    /// Project a longitude/latitude in degrees on this CRS's ellipsoid to
    /// easting/northing.
    pub fn project_geographic(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        let geographic = format!("+proj=longlat +ellps={} +no_defs", self.ellipsoid.proj_name());
        let source = Proj::from_proj_string(&geographic).map_err(proj_error)?;
        let target = self.to_proj()?;

        // proj4rs works in radians for geographic coordinates
        let mut point = (lon.to_radians(), lat.to_radians(), 0.0);
        transform(&source, &target, &mut point).map_err(proj_error)?;

        Ok((point.0, point.1))
    }

    pub fn to_proj_string(&self) -> String {
        let towgs84 = self
            .towgs84
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "+proj=tmerc +lat_0={} +lon_0={} +k={} +x_0={} +y_0={} +ellps={} +towgs84={} +units={} +no_defs +type=crs",
            self.lat_0,
            self.lon_0,
            self.scale_factor,
            self.false_easting,
            self.false_northing,
            self.ellipsoid.proj_name(),
            towgs84,
            self.units.proj_name(),
        )
    }
}

impl fmt::Display for TransverseMercator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_proj_string())
    }
}

fn parse_number(key: &str, value: &str) -> Result<f64> {
    value
        .parse::<f64>()
        .map_err(|_| invalid(format!("+{key} is not a number: '{value}'")))
}

fn parse_towgs84(value: &str) -> Result<[f64; 7]> {
    let terms = value
        .split(',')
        .map(|term| parse_number("towgs84", term))
        .collect::<Result<Vec<_>>>()?;

    let mut shift = [0.0; 7];
    match terms.len() {
        3 | 7 => shift[..terms.len()].copy_from_slice(&terms),
        n => return Err(invalid(format!("+towgs84 needs 3 or 7 terms, got {n}"))),
    }
    Ok(shift)
}

fn proj_error<E: fmt::Debug>(e: E) -> ConversionError {
    invalid(format!("rejected by proj4rs: {e:?}"))
}

fn invalid(message: String) -> ConversionError {
    ConversionError::InvalidCrs(message)
}
