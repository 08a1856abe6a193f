//! Bitcoin-compatible variable-length integer (CompactSize) encoding (§6).

use crate::error::PrimitivesError;

pub fn encode(value: u64) -> Vec<u8> {
    if value < 0xfd {
        vec![value as u8]
    } else if value <= 0xffff {
        let mut out = vec![0xfd];
        out.extend_from_slice(&(value as u16).to_le_bytes());
        out
    } else if value <= 0xffff_ffff {
        let mut out = vec![0xfe];
        out.extend_from_slice(&(value as u32).to_le_bytes());
        out
    } else {
        let mut out = vec![0xff];
        out.extend_from_slice(&value.to_le_bytes());
        out
    }
}

/// Decode a varint, returning the value and the number of bytes consumed.
pub fn decode(bytes: &[u8]) -> Result<(u64, usize), PrimitivesError> {
    let first = *bytes
        .first()
        .ok_or_else(|| PrimitivesError::InvalidEncoding("empty varint".into()))?;
    match first {
        0xfd => {
            let slice = bytes
                .get(1..3)
                .ok_or_else(|| PrimitivesError::InvalidEncoding("truncated varint".into()))?;
            Ok((u16::from_le_bytes(slice.try_into().unwrap()) as u64, 3))
        }
        0xfe => {
            let slice = bytes
                .get(1..5)
                .ok_or_else(|| PrimitivesError::InvalidEncoding("truncated varint".into()))?;
            Ok((u32::from_le_bytes(slice.try_into().unwrap()) as u64, 5))
        }
        0xff => {
            let slice = bytes
                .get(1..9)
                .ok_or_else(|| PrimitivesError::InvalidEncoding("truncated varint".into()))?;
            Ok((u64::from_le_bytes(slice.try_into().unwrap()), 9))
        }
        n => Ok((n as u64, 1)),
    }
}

/// Prefix `data` with its varint-encoded length.
pub fn encode_with_len_prefix(data: &[u8]) -> Vec<u8> {
    let mut out = encode(data.len() as u64);
    out.extend_from_slice(data);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_small() {
        for v in [0u64, 1, 252, 253, 254, 0xffff, 0x1_0000, u32::MAX as u64, u64::MAX] {
            let encoded = encode(v);
            let (decoded, len) = decode(&encoded).unwrap();
            assert_eq!(decoded, v);
            assert_eq!(len, encoded.len());
        }
    }

    #[test]
    fn decode_rejects_truncated() {
        assert!(decode(&[0xfd, 0x01]).is_err());
        assert!(decode(&[]).is_err());
    }
}
