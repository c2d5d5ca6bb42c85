//! Reader for the `|||` delimited grid payload.
//!
//! A payload is two JSON fragments joined by [`SEGMENT_DELIMITER`]:
//!
//! ```text
//! [[1.0,2.0],[3.0,4.0]]|||[100000.5, 50000.25]
//! ```
//!
//! The first fragment is a JSON array with its outer brackets stripped; the
//! reader restores them before parsing. The second fragment is the raster
//! origin `[minX, maxY]`.

use std::borrow::Cow;

use ndarray::{ArrayD, IxDyn};
use serde_json::Value;
use tracing::debug;

use crate::raster_pipeline::common::error::{ConversionError, Result};
use crate::raster_pipeline::payload::reader::PayloadReader;
use crate::raster_pipeline::payload::types::{GridPayload, SEGMENT_DELIMITER};

/// Number of segments a well-formed payload splits into.
const EXPECTED_SEGMENTS: usize = 2;

// longest first so `-Infinity` is not split around `Infinity`
const NON_FINITE_LITERALS: [&str; 3] = ["-Infinity", "Infinity", "NaN"];

/// Payload reader backed by `serde_json` and `ndarray`.
pub struct DelimitedPayloadReader;

impl PayloadReader for DelimitedPayloadReader {
    fn read_payload(&self, text: &str) -> Result<GridPayload> {
        debug!("Reading delimited payload, {} bytes", text.len());

        let segments: Vec<&str> = text.split(SEGMENT_DELIMITER).collect();
        if segments.len() != EXPECTED_SEGMENTS {
            return Err(ConversionError::DelimiterCount(segments.len()));
        }

        let grid = parse_grid(segments[0])?;
        let origin = parse_origin(segments[1])?;

        debug!(min_x = origin.0, max_y = origin.1, shape = ?grid.shape(), "Payload decoded");

        Ok(GridPayload { grid, origin })
    }
}

fn parse_grid(fragment: &str) -> Result<ArrayD<f64>> {
    let wrapped = format!("[{}]", quote_non_finite(fragment));
    let nested = parse_json(&wrapped, "grid")?;

    let shape = infer_shape(&nested);
    let mut values = Vec::with_capacity(shape.iter().product());
    flatten_into(&nested, &shape, &mut String::new(), &mut values)?;

    Ok(ArrayD::from_shape_vec(IxDyn(&shape), values)?)
}

fn parse_origin(fragment: &str) -> Result<(f64, f64)> {
    let Value::Array(coords) = parse_json(&quote_non_finite(fragment), "origin")? else {
        return Err(ConversionError::JsonError {
            segment: "origin",
            message: "expected an array of two numbers".to_string(),
        });
    };

    match coords.as_slice() {
        [min_x, max_y] => Ok((scalar_value(min_x, "[0]")?, scalar_value(max_y, "[1]")?)),
        other => Err(ConversionError::InvalidOrigin(other.len())),
    }
}

fn parse_json(text: &str, segment: &'static str) -> Result<Value> {
    serde_json::from_str(text).map_err(|e| ConversionError::JsonError {
        segment,
        message: e.to_string(),
    })
}

/// Bare `NaN`, `Infinity` and `-Infinity` tokens are accepted by lenient JSON
/// readers but not by `serde_json`. Quote them so they reach
/// [`scalar_value`] as strings; text inside existing strings is left alone.
fn quote_non_finite(fragment: &str) -> Cow<'_, str> {
    if !NON_FINITE_LITERALS.iter().any(|literal| fragment.contains(literal)) {
        return Cow::Borrowed(fragment);
    }

    let mut quoted = String::with_capacity(fragment.len() + 8);
    let mut rest = fragment;
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = rest.chars().next() {
        if !in_string {
            if let Some(literal) = NON_FINITE_LITERALS.iter().find(|l| rest.starts_with(**l)) {
                quoted.push('"');
                quoted.push_str(literal);
                quoted.push('"');
                rest = &rest[literal.len()..];
                continue;
            }
            in_string = c == '"';
        } else if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            in_string = false;
        }

        quoted.push(c);
        rest = &rest[c.len_utf8()..];
    }

    Cow::Owned(quoted)
}

/// Shape implied by following the first element down each nesting level.
fn infer_shape(value: &Value) -> Vec<usize> {
    let mut shape = Vec::new();
    let mut current = value;
    while let Value::Array(items) = current {
        shape.push(items.len());
        match items.first() {
            Some(first) => current = first,
            None => break,
        }
    }
    shape
}

/// Row-major flatten that rejects anything not matching `shape`.
fn flatten_into(value: &Value, shape: &[usize], path: &mut String, out: &mut Vec<f64>) -> Result<()> {
    let Some((&len, rest)) = shape.split_first() else {
        out.push(scalar_value(value, path)?);
        return Ok(());
    };

    let Value::Array(items) = value else {
        return Err(ragged(path, format!("array of {len}"), describe(value)));
    };
    if items.len() != len {
        return Err(ragged(
            path,
            format!("array of {len}"),
            format!("array of {}", items.len()),
        ));
    }

    for (index, item) in items.iter().enumerate() {
        let mark = path.len();
        path.push_str(&format!("[{index}]"));
        flatten_into(item, rest, path, out)?;
        path.truncate(mark);
    }
    Ok(())
}

/// Float64 value of a grid leaf, converted the way a dense float64 array
/// constructor converts it.
fn scalar_value(value: &Value, path: &str) -> Result<f64> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| ConversionError::NonNumericValue {
            path: display_path(path),
            value: n.to_string(),
        }),
        Value::Bool(flag) => Ok(if *flag { 1.0 } else { 0.0 }),
        Value::String(text) => text.trim().parse::<f64>().map_err(|_| ConversionError::NonNumericValue {
            path: display_path(path),
            value: value.to_string(),
        }),
        // missing samples become NaN
        Value::Null => Ok(f64::NAN),
        Value::Array(_) => Err(ragged(path, "number".to_string(), describe(value))),
        Value::Object(_) => Err(ConversionError::NonNumericValue {
            path: display_path(path),
            value: value.to_string(),
        }),
    }
}

fn ragged(path: &str, expected: String, found: String) -> ConversionError {
    ConversionError::RaggedGrid {
        path: display_path(path),
        expected,
        found,
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Array(items) => format!("array of {}", items.len()),
        Value::Number(_) => "number".to_string(),
        Value::Null => "null".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::String(_) => "string".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "root".to_string()
    } else {
        path.to_string()
    }
}
