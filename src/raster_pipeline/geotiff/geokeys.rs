//! GeoKey directory encoding for user-defined transverse Mercator rasters.
//!
//! The directory is a flat `u16` array:
//! `[KeyDirectoryVersion, KeyRevision, MinorRevision, NumberOfKeys,
//!   KeyID, TIFFTagLocation, Count, Value_Offset, ...]`.
//! Entries with location 0 hold their value inline; double and ASCII
//! values live in the GeoDoubleParams and GeoAsciiParams tags.

use std::collections::HashMap;

use crate::raster_pipeline::common::error::{ConversionError, Result};
use crate::raster_pipeline::georef::{Ellipsoid, LinearUnit, TransverseMercator};

// Tag locations referenced from key entries
pub const GEO_DOUBLE_PARAMS_TAG: u16 = 34736;
pub const GEO_ASCII_PARAMS_TAG: u16 = 34737;

// GeoKey IDs
pub const GT_MODEL_TYPE_GEO_KEY: u16 = 1024;
pub const GT_RASTER_TYPE_GEO_KEY: u16 = 1025;
pub const GT_CITATION_GEO_KEY: u16 = 1026;
pub const GEOGRAPHIC_TYPE_GEO_KEY: u16 = 2048;
pub const GEOG_ANGULAR_UNITS_GEO_KEY: u16 = 2054;
pub const GEOG_TOWGS84_GEO_KEY: u16 = 2062;
pub const PROJECTED_CS_TYPE_GEO_KEY: u16 = 3072;
pub const PROJECTION_GEO_KEY: u16 = 3074;
pub const PROJ_COORD_TRANS_GEO_KEY: u16 = 3075;
pub const PROJ_LINEAR_UNITS_GEO_KEY: u16 = 3076;
pub const PROJ_NAT_ORIGIN_LONG_GEO_KEY: u16 = 3080;
pub const PROJ_NAT_ORIGIN_LAT_GEO_KEY: u16 = 3081;
pub const PROJ_FALSE_EASTING_GEO_KEY: u16 = 3082;
pub const PROJ_FALSE_NORTHING_GEO_KEY: u16 = 3083;
pub const PROJ_SCALE_AT_NAT_ORIGIN_GEO_KEY: u16 = 3092;

// GeoKey values
pub const MODEL_TYPE_PROJECTED: u16 = 1;
pub const RASTER_PIXEL_IS_AREA: u16 = 1;
pub const ANGULAR_DEGREE: u16 = 9102;
pub const USER_DEFINED: u16 = 32767;
pub const CT_TRANSVERSE_MERCATOR: u16 = 1;

const DIRECTORY_HEADER: [u16; 3] = [1, 1, 0];

/// Contents of the three GeoTIFF key tags
#[derive(Debug, Clone, PartialEq)]
pub struct GeoKeyDirectory {
    pub keys: Vec<u16>,
    pub doubles: Vec<f64>,
    pub ascii: String,
}

impl GeoKeyDirectory {
    fn new() -> Self {
        Self {
            keys: DIRECTORY_HEADER.to_vec(),
            doubles: Vec::new(),
            ascii: String::new(),
        }
    }

    fn push_short(&mut self, key: u16, value: u16) {
        self.keys.extend_from_slice(&[key, 0, 1, value]);
    }

    fn push_doubles(&mut self, key: u16, values: &[f64]) {
        let offset = self.doubles.len() as u16;
        self.keys
            .extend_from_slice(&[key, GEO_DOUBLE_PARAMS_TAG, values.len() as u16, offset]);
        self.doubles.extend_from_slice(values);
    }

    fn push_ascii(&mut self, key: u16, value: &str) {
        let offset = self.ascii.len() as u16;
        // each string ends with '|' inside GeoAsciiParams
        let count = value.len() as u16 + 1;
        self.keys
            .extend_from_slice(&[key, GEO_ASCII_PARAMS_TAG, count, offset]);
        self.ascii.push_str(value);
        self.ascii.push('|');
    }

    fn finish(mut self) -> Self {
        let count = (self.keys.len() - DIRECTORY_HEADER.len()) / 4;
        self.keys.insert(DIRECTORY_HEADER.len(), count as u16);
        self
    }
}

/// Build the key directory for a projected raster in `crs`. Keys are
/// emitted in ascending ID order.
pub fn encode_geokeys(crs: &TransverseMercator) -> GeoKeyDirectory {
    let mut dir = GeoKeyDirectory::new();

    dir.push_short(GT_MODEL_TYPE_GEO_KEY, MODEL_TYPE_PROJECTED);
    dir.push_short(GT_RASTER_TYPE_GEO_KEY, RASTER_PIXEL_IS_AREA);
    dir.push_ascii(GT_CITATION_GEO_KEY, &crs.to_proj_string());
    dir.push_short(GEOGRAPHIC_TYPE_GEO_KEY, crs.ellipsoid.geographic_epsg());
    dir.push_short(GEOG_ANGULAR_UNITS_GEO_KEY, ANGULAR_DEGREE);
    dir.push_doubles(GEOG_TOWGS84_GEO_KEY, &crs.towgs84);
    dir.push_short(PROJECTED_CS_TYPE_GEO_KEY, USER_DEFINED);
    dir.push_short(PROJECTION_GEO_KEY, USER_DEFINED);
    dir.push_short(PROJ_COORD_TRANS_GEO_KEY, CT_TRANSVERSE_MERCATOR);
    dir.push_short(PROJ_LINEAR_UNITS_GEO_KEY, crs.units.epsg());
    dir.push_doubles(PROJ_NAT_ORIGIN_LONG_GEO_KEY, &[crs.lon_0]);
    dir.push_doubles(PROJ_NAT_ORIGIN_LAT_GEO_KEY, &[crs.lat_0]);
    dir.push_doubles(PROJ_FALSE_EASTING_GEO_KEY, &[crs.false_easting]);
    dir.push_doubles(PROJ_FALSE_NORTHING_GEO_KEY, &[crs.false_northing]);
    dir.push_doubles(PROJ_SCALE_AT_NAT_ORIGIN_GEO_KEY, &[crs.scale_factor]);

    dir.finish()
}

#[derive(Debug, Clone, Copy)]
struct KeyEntry {
    location: u16,
    count: usize,
    value: u16,
}

struct KeyLookup<'a> {
    entries: HashMap<u16, KeyEntry>,
    doubles: &'a [f64],
}

impl<'a> KeyLookup<'a> {
    fn new(keys: &[u16], doubles: &'a [f64]) -> Result<Self> {
        if keys.len() < 4 {
            return Err(ConversionError::MissingGeoKey("GeoKeyDirectory header".to_string()));
        }
        let declared = keys[3] as usize;
        let entries = keys[4..]
            .chunks_exact(4)
            .take(declared)
            .map(|entry| {
                (
                    entry[0],
                    KeyEntry {
                        location: entry[1],
                        count: entry[2] as usize,
                        value: entry[3],
                    },
                )
            })
            .collect();
        Ok(Self { entries, doubles })
    }

    fn short(&self, key: u16) -> Result<u16> {
        match self.entries.get(&key) {
            Some(entry) if entry.location == 0 => Ok(entry.value),
            _ => Err(ConversionError::MissingGeoKey(format!("short key {key}"))),
        }
    }

    fn doubles(&self, key: u16) -> Result<&'a [f64]> {
        let doubles = self.doubles;
        self.entries
            .get(&key)
            .filter(|entry| entry.location == GEO_DOUBLE_PARAMS_TAG)
            .and_then(|entry| {
                let start = entry.value as usize;
                doubles.get(start..start + entry.count)
            })
            .ok_or_else(|| ConversionError::MissingGeoKey(format!("double key {key}")))
    }

    fn double(&self, key: u16) -> Result<f64> {
        self.doubles(key)?
            .first()
            .copied()
            .ok_or_else(|| ConversionError::MissingGeoKey(format!("double key {key}")))
    }
}

/// Rebuild the CRS from GeoKeyDirectory and GeoDoubleParams values.
pub fn decode_geokeys(keys: &[u16], doubles: &[f64]) -> Result<TransverseMercator> {
    let lookup = KeyLookup::new(keys, doubles)?;

    if lookup.short(GT_MODEL_TYPE_GEO_KEY)? != MODEL_TYPE_PROJECTED {
        return Err(ConversionError::InvalidCrs("raster is not in a projected CRS".to_string()));
    }
    let transform = lookup.short(PROJ_COORD_TRANS_GEO_KEY)?;
    if transform != CT_TRANSVERSE_MERCATOR {
        return Err(ConversionError::InvalidCrs(format!(
            "unsupported coordinate transformation {transform}"
        )));
    }

    let geographic = lookup.short(GEOGRAPHIC_TYPE_GEO_KEY)?;
    let ellipsoid = Ellipsoid::from_geographic_epsg(geographic).ok_or_else(|| {
        ConversionError::InvalidCrs(format!("unsupported geographic CRS {geographic}"))
    })?;
    let unit = lookup.short(PROJ_LINEAR_UNITS_GEO_KEY)?;
    let units = LinearUnit::from_epsg(unit)
        .ok_or_else(|| ConversionError::InvalidCrs(format!("unsupported linear unit {unit}")))?;

    let mut towgs84 = [0.0; 7];
    if let Ok(shift) = lookup.doubles(GEOG_TOWGS84_GEO_KEY) {
        if shift.len() != 3 && shift.len() != 7 {
            return Err(ConversionError::InvalidCrs(format!(
                "TOWGS84 needs 3 or 7 terms, got {}",
                shift.len()
            )));
        }
        towgs84[..shift.len()].copy_from_slice(shift);
    }

    Ok(TransverseMercator {
        lat_0: lookup.double(PROJ_NAT_ORIGIN_LAT_GEO_KEY)?,
        lon_0: lookup.double(PROJ_NAT_ORIGIN_LONG_GEO_KEY)?,
        scale_factor: lookup.double(PROJ_SCALE_AT_NAT_ORIGIN_GEO_KEY)?,
        false_easting: lookup.double(PROJ_FALSE_EASTING_GEO_KEY)?,
        false_northing: lookup.double(PROJ_FALSE_NORTHING_GEO_KEY)?,
        ellipsoid,
        towgs84,
        units,
    })
}
