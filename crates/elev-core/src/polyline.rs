//! Point compression for elevation service requests.
//!
//! Coordinates are fixed to 5 decimal places, delta coded against the
//! previous point, zigzag mapped with 32-bit semantics, paired into a single
//! index and written as base-32 digits (least significant first, bit 5 set on
//! every digit but the last). The service decodes this bit for bit, so all
//! arithmetic here is explicit fixed-width integer math.

use crate::models::Coordinate;
use thiserror::Error;

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";
const SCALE: f64 = 100_000.0;
const CONTINUATION: u128 = 32;
/// Two 32-bit zigzag values pair into at most 67 bits, i.e. 14 digits.
const MAX_DIGITS: u32 = 14;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolylineError {
    #[error("invalid character '{ch}' at offset {offset}")]
    InvalidCharacter { ch: char, offset: usize },
    #[error("encoded value is truncated")]
    Truncated,
    #[error("encoded value at offset {offset} overflows")]
    Overflow { offset: usize },
}

fn to_fixed(deg: f64) -> i32 {
    (deg * SCALE).round() as i32
}

/// A coordinate at codec precision, as `(lat, lon)` in 1e-5 degree units.
pub fn fixed(point: &Coordinate) -> (i32, i32) {
    (to_fixed(point.lat), to_fixed(point.lon))
}

fn zigzag(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

fn unzigzag(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

/// Encode a coordinate sequence. An empty sequence encodes to an empty string.
///
/// A point identical (at 1e-5 degrees) to its predecessor produces an index of
/// zero and therefore no digits.
pub fn encode(points: &[Coordinate]) -> String {
    let mut out = String::with_capacity(points.len() * 6);
    let mut prev_lat: i32 = 0;
    let mut prev_lon: i32 = 0;

    for point in points {
        let (lat, lon) = fixed(point);
        let dy = u128::from(zigzag(lat.wrapping_sub(prev_lat)));
        let dx = u128::from(zigzag(lon.wrapping_sub(prev_lon)));
        prev_lat = lat;
        prev_lon = lon;

        let mut index = ((dy + dx) * (dy + dx + 1)) / 2 + dy;
        while index > 0 {
            let mut rem = index & 31;
            index = (index - rem) / 32;
            if index > 0 {
                rem += CONTINUATION;
            }
            out.push(char::from(ALPHABET[rem as usize]));
        }
    }

    out
}

fn digit_value(byte: u8) -> Option<u128> {
    ALPHABET.iter().position(|&c| c == byte).map(|pos| pos as u128)
}

/// Decode an encoded string back into coordinates.
///
/// Points that were dropped during encoding (zero index) cannot be recovered.
pub fn decode(encoded: &str) -> Result<Vec<Coordinate>, PolylineError> {
    let mut points = Vec::new();
    let mut lat: i32 = 0;
    let mut lon: i32 = 0;
    let mut bytes = encoded.bytes().enumerate().peekable();

    while bytes.peek().is_some() {
        let mut index: u128 = 0;
        let mut digits = 0u32;
        loop {
            let Some((offset, byte)) = bytes.next() else {
                return Err(PolylineError::Truncated);
            };
            let value = digit_value(byte).ok_or(PolylineError::InvalidCharacter {
                ch: char::from(byte),
                offset,
            })?;
            if digits >= MAX_DIGITS {
                return Err(PolylineError::Overflow { offset });
            }
            index |= (value & 31) << (5 * digits);
            digits += 1;
            if value < CONTINUATION {
                break;
            }
        }

        let diagonal = triangular_root(index);
        let dy = index - diagonal * (diagonal + 1) / 2;
        let dx = diagonal - dy;
        lat = lat.wrapping_add(unzigzag(dy as u32));
        lon = lon.wrapping_add(unzigzag(dx as u32));
        points.push(Coordinate::new(f64::from(lat) / SCALE, f64::from(lon) / SCALE));
    }

    Ok(points)
}

/// Largest `d` with `d * (d + 1) / 2 <= index`.
fn triangular_root(index: u128) -> u128 {
    // f64 is only a first guess; indices above 2^53 lose precision.
    let mut d = (((8.0 * index as f64 + 1.0).sqrt() - 1.0) / 2.0) as u128;
    while d > 0 && d * (d + 1) / 2 > index {
        d -= 1;
    }
    while (d + 1) * (d + 2) / 2 <= index {
        d += 1;
    }
    d
}
