//! Encoded polyline format (signed deltas, 5-bit chunks offset by 63).

use thiserror::Error;

use crate::coordinate::Coordinate;

pub const DEFAULT_PRECISION: u32 = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolylineError {
    #[error("Unexpected end of encoded polyline at byte {position}")]
    UnexpectedEnd { position: usize },

    #[error("Invalid character {byte:#04x} in encoded polyline at byte {position}")]
    InvalidCharacter { position: usize, byte: u8 },

    #[error("Encoded value overflows at byte {position}")]
    Overflow { position: usize },
}

pub fn decode(encoded: &str) -> Result<Vec<Coordinate>, PolylineError> {
    decode_with_precision(encoded, DEFAULT_PRECISION)
}

pub fn decode_with_precision(
    encoded: &str,
    precision: u32,
) -> Result<Vec<Coordinate>, PolylineError> {
    let factor = 10_f64.powi(precision as i32);
    let bytes = encoded.as_bytes();

    let mut coordinates = Vec::new();
    let mut position = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while position < bytes.len() {
        lat = lat.wrapping_add(next_value(bytes, &mut position)?);
        lng = lng.wrapping_add(next_value(bytes, &mut position)?);

        coordinates.push(Coordinate::new(lat as f64 / factor, lng as f64 / factor));
    }

    Ok(coordinates)
}

fn next_value(bytes: &[u8], position: &mut usize) -> Result<i64, PolylineError> {
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        let Some(&byte) = bytes.get(*position) else {
            return Err(PolylineError::UnexpectedEnd {
                position: *position,
            });
        };

        if !(63..=126).contains(&byte) {
            return Err(PolylineError::InvalidCharacter {
                position: *position,
                byte,
            });
        }

        if shift > 60 {
            return Err(PolylineError::Overflow {
                position: *position,
            });
        }

        let chunk = (byte - 63) as i64;
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        *position += 1;

        if chunk < 0x20 {
            break;
        }
    }

    if result & 1 == 1 {
        Ok(!(result >> 1))
    } else {
        Ok(result >> 1)
    }
}

pub fn encode(coordinates: &[Coordinate]) -> String {
    encode_with_precision(coordinates, DEFAULT_PRECISION)
}

pub fn encode_with_precision(coordinates: &[Coordinate], precision: u32) -> String {
    let factor = 10_f64.powi(precision as i32);
    let mut encoded = String::with_capacity(coordinates.len() * 8);

    let mut previous_lat: i64 = 0;
    let mut previous_lng: i64 = 0;

    for coordinate in coordinates {
        let lat = (coordinate.lat * factor).round() as i64;
        let lng = (coordinate.lng * factor).round() as i64;

        push_value(&mut encoded, lat - previous_lat);
        push_value(&mut encoded, lng - previous_lng);

        previous_lat = lat;
        previous_lng = lng;
    }

    encoded
}

fn push_value(encoded: &mut String, value: i64) {
    let mut value = if value < 0 { !(value << 1) } else { value << 1 };

    while value >= 0x20 {
        encoded.push((((value & 0x1f) | 0x20) as u8 + 63) as char);
        value >>= 5;
    }

    encoded.push((value as u8 + 63) as char);
}
