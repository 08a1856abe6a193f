//! Address-format type byte for Taproot outputs (§3).
//!
//! Full base58check/XAddress base32 encoding is outside this crate's
//! scope; this module exposes only the type byte and payload a host
//! address encoder needs to embed.

use lotus_primitives::Point;

/// Address type byte identifying a Taproot commitment, shared by both
/// legacy base58check and XAddress base32 address formats.
pub const TAPROOT_ADDRESS_TYPE: u8 = 2;

/// The payload a host address encoder embeds alongside
/// [`TAPROOT_ADDRESS_TYPE`]: the 33-byte compressed commitment key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaprootAddressPayload {
    pub commitment: [u8; 33],
}

impl TaprootAddressPayload {
    pub fn new(commitment: &Point) -> Self {
        TaprootAddressPayload {
            commitment: commitment.to_compressed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotus_primitives::Scalar;

    #[test]
    fn payload_carries_compressed_commitment() {
        let sk = Scalar::from_bytes_nonzero(&[0x03; 32]).unwrap();
        let commitment = Point::from_scalar_mul_generator(&sk);
        let payload = TaprootAddressPayload::new(&commitment);
        assert_eq!(payload.commitment, commitment.to_compressed());
    }
}
