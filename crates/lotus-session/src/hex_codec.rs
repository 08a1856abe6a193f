//! Hex codec helpers for the §6 P2P payload encoding: compressed points
//! and scalars as lowercase, fixed-length, `0x`-free hex strings. Factored
//! out of the payload types (§4.6.4's `nonce-share`/`partial-sig-share`
//! both need it) rather than reimplemented per message type.

use lotus_primitives::{Point, Scalar};

use crate::error::SessionError;

fn validate_hex_shape(s: &str, expected_bytes: usize) -> Result<(), SessionError> {
    if s.len() != expected_bytes * 2 {
        return Err(SessionError::Validation(format!(
            "expected {} hex chars ({expected_bytes} bytes), got {}",
            expected_bytes * 2,
            s.len()
        )));
    }
    if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(SessionError::Validation(format!(
            "{s} is not valid hex"
        )));
    }
    if s.bytes().any(|b| b.is_ascii_uppercase()) {
        return Err(SessionError::Validation(format!(
            "{s} must be lowercase hex"
        )));
    }
    Ok(())
}

pub fn encode_point(point: &Point) -> String {
    hex::encode(point.to_compressed())
}

pub fn decode_point(s: &str) -> Result<Point, SessionError> {
    validate_hex_shape(s, 33)?;
    let bytes = hex::decode(s).map_err(|e| SessionError::Validation(e.to_string()))?;
    let mut arr = [0u8; 33];
    arr.copy_from_slice(&bytes);
    Ok(Point::from_compressed(&arr)?)
}

pub fn encode_scalar(scalar: &Scalar) -> String {
    hex::encode(scalar.to_bytes())
}

pub fn decode_scalar(s: &str) -> Result<Scalar, SessionError> {
    validate_hex_shape(s, 32)?;
    let bytes = hex::decode(s).map_err(|e| SessionError::Validation(e.to_string()))?;
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&bytes);
    Ok(Scalar::from_bytes_checked(&arr)?)
}

pub fn encode_digest(digest: &[u8; 32]) -> String {
    hex::encode(digest)
}

pub fn decode_digest(s: &str) -> Result<[u8; 32], SessionError> {
    validate_hex_shape(s, 32)?;
    let bytes = hex::decode(s).map_err(|e| SessionError::Validation(e.to_string()))?;
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}
