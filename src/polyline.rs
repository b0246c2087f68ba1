//! Polyline representation for route geometries.
//!
//! Segments keep the provider's encoded string untouched; this module decodes
//! it into coordinates when a consumer wants to draw or measure the path.
//! Encoding follows the Google polyline algorithm at precision 5, which is
//! what OSRM returns for `geometries=polyline`.

use serde::{Deserialize, Serialize};

use crate::error::PolylineError;

const PRECISION: f64 = 1e5;

/// A polyline representing a route geometry as decoded coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<(f64, f64)>,
}

impl Polyline {
    /// Creates a new Polyline from decoded (latitude, longitude) points.
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    /// Two-point path, used for legs without provider geometry.
    pub fn straight(from: (f64, f64), to: (f64, f64)) -> Self {
        Self::new(vec![from, to])
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn into_points(self) -> Vec<(f64, f64)> {
        self.points
    }

    /// Decode an encoded polyline string.
    pub fn decode(encoded: &str) -> Result<Self, PolylineError> {
        let bytes = encoded.as_bytes();
        let mut points = Vec::new();
        let mut position = 0;
        let (mut lat, mut lng) = (0i64, 0i64);

        while position < bytes.len() {
            lat = accumulate(lat, next_value(bytes, &mut position)?, position)?;
            lng = accumulate(lng, next_value(bytes, &mut position)?, position)?;
            points.push((lat as f64 / PRECISION, lng as f64 / PRECISION));
        }

        Ok(Self { points })
    }

    /// Encode the points back into the compact string form.
    ///
    /// Coordinates are clamped to the 32-bit range of the format; non-finite
    /// values encode as zero.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        let (mut prev_lat, mut prev_lng) = (0i64, 0i64);
        for &(lat, lng) in &self.points {
            let lat = to_fixed(lat);
            let lng = to_fixed(lng);
            push_value(&mut out, lat - prev_lat);
            push_value(&mut out, lng - prev_lng);
            prev_lat = lat;
            prev_lng = lng;
        }
        out
    }
}

/// Largest shift of a 5-bit chunk; encoded values fit in 32 bits.
const MAX_SHIFT: u32 = 30;

fn to_fixed(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    let limit = f64::from(i32::MAX);
    (value * PRECISION).round().clamp(-limit, limit) as i64
}

fn accumulate(total: i64, delta: i64, position: usize) -> Result<i64, PolylineError> {
    total
        .checked_add(delta)
        .filter(|sum| i32::try_from(*sum).is_ok())
        .ok_or(PolylineError::Overflow { position })
}

fn next_value(bytes: &[u8], position: &mut usize) -> Result<i64, PolylineError> {
    let mut result: i64 = 0;
    let mut shift = 0;
    loop {
        let Some(&byte) = bytes.get(*position) else {
            return Err(PolylineError::Truncated(*position));
        };
        if !(63..=126).contains(&byte) {
            return Err(PolylineError::InvalidByte {
                byte,
                position: *position,
            });
        }
        if shift > MAX_SHIFT {
            return Err(PolylineError::Overflow { position: *position });
        }
        *position += 1;
        let chunk = i64::from(byte - 63);
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }
    Ok(if result & 1 == 1 { !(result >> 1) } else { result >> 1 })
}

fn push_value(out: &mut String, value: i64) {
    let mut value = if value < 0 { !(value << 1) } else { value << 1 };
    while value >= 0x20 {
        out.push(char::from((0x20 | (value & 0x1f)) as u8 + 63));
        value >>= 5;
    }
    out.push(char::from(value as u8 + 63));
}
