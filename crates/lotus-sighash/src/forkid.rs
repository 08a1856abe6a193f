//! BIP143-style FORKID sighash digest (§4.4.1).

use lotus_primitives::{sha256d, varint, Transaction};

use crate::error::SighashError;
use crate::sighash_type::{Algorithm, BaseType, SighashTypeInfo};

const ZERO_HASH: [u8; 32] = [0u8; 32];

/// Compute the FORKID (BIP143-style) sighash digest for input `index`.
pub fn sighash_forkid(
    tx: &Transaction,
    index: usize,
    subscript: &[u8],
    value_sats: u64,
    sighash_type: SighashTypeInfo,
) -> Result<[u8; 32], SighashError> {
    debug_assert_eq!(sighash_type.algorithm, Algorithm::ForkId);
    let input = tx
        .inputs
        .get(index)
        .ok_or(SighashError::InputIndexOutOfRange(index))?;

    let hash_prevouts = if sighash_type.anyone_can_pay {
        ZERO_HASH
    } else {
        let mut buf = Vec::with_capacity(tx.inputs.len() * 36);
        for input in &tx.inputs {
            input.prev_output.serialize(&mut buf);
        }
        sha256d(&buf)
    };

    let hash_sequence = if sighash_type.anyone_can_pay {
        ZERO_HASH
    } else {
        let mut buf = Vec::with_capacity(tx.inputs.len() * 4);
        for input in &tx.inputs {
            buf.extend_from_slice(&input.sequence.to_le_bytes());
        }
        sha256d(&buf)
    };

    let hash_outputs = match sighash_type.base_type {
        BaseType::All => {
            let mut buf = Vec::new();
            for output in &tx.outputs {
                output.serialize(&mut buf);
            }
            sha256d(&buf)
        }
        BaseType::Single => match tx.outputs.get(index) {
            Some(output) => {
                let mut buf = Vec::new();
                output.serialize(&mut buf);
                sha256d(&buf)
            }
            None => ZERO_HASH,
        },
        BaseType::None => ZERO_HASH,
    };

    let mut buf = Vec::new();
    buf.extend_from_slice(&tx.version.to_le_bytes());
    buf.extend_from_slice(&hash_prevouts);
    buf.extend_from_slice(&hash_sequence);
    input.prev_output.serialize(&mut buf);
    buf.extend_from_slice(&varint::encode_with_len_prefix(subscript));
    buf.extend_from_slice(&value_sats.to_le_bytes());
    buf.extend_from_slice(&input.sequence.to_le_bytes());
    buf.extend_from_slice(&hash_outputs);
    buf.extend_from_slice(&tx.locktime.to_le_bytes());
    let signed_type = sighash_type.raw as i8 as i32;
    buf.extend_from_slice(&signed_type.to_le_bytes());

    Ok(sha256d(&buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sighash_type::{SIGHASH_ALL, SIGHASH_FORKID};
    use lotus_primitives::{OutPoint, TxIn, TxOut};

    fn sample_tx() -> Transaction {
        Transaction {
            version: 2,
            inputs: vec![TxIn {
                prev_output: OutPoint {
                    prev_txid: [1u8; 32],
                    prev_index: 0,
                },
                script_sig: Vec::new(),
                sequence: 0xffff_ffff,
            }],
            outputs: vec![TxOut {
                value_sats: 100_000,
                script: vec![0x62, 0x51, 0x21],
            }],
            locktime: 0,
        }
    }

    #[test]
    fn is_deterministic() {
        let tx = sample_tx();
        let info = SighashTypeInfo::decode(SIGHASH_ALL | SIGHASH_FORKID).unwrap();
        let a = sighash_forkid(&tx, 0, &[], 100_000, info).unwrap();
        let b = sighash_forkid(&tx, 0, &[], 100_000, info).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn anyonecanpay_zeroes_prevouts_and_sequence() {
        let tx = sample_tx();
        let info_plain = SighashTypeInfo::decode(SIGHASH_ALL | SIGHASH_FORKID).unwrap();
        let info_acp =
            SighashTypeInfo::decode(SIGHASH_ALL | SIGHASH_FORKID | 0x80).unwrap();
        let a = sighash_forkid(&tx, 0, &[], 100_000, info_plain).unwrap();
        let b = sighash_forkid(&tx, 0, &[], 100_000, info_acp).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn out_of_range_index_rejected() {
        let tx = sample_tx();
        let info = SighashTypeInfo::decode(SIGHASH_ALL | SIGHASH_FORKID).unwrap();
        assert!(sighash_forkid(&tx, 5, &[], 100_000, info).is_err());
    }
}
