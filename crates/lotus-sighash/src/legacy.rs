//! Pre-FORKID legacy sighash, kept only for backward compatibility (§4.4).

use lotus_primitives::{sha256d, Transaction, TxIn, TxOut};

use crate::error::SighashError;
use crate::sighash_type::{Algorithm, BaseType, SighashTypeInfo};

/// Sentinel digest historically returned when SIGHASH_SINGLE is used
/// without a matching output and ANYONECANPAY is not set.
const SINGLE_NO_OUTPUT_SENTINEL: [u8; 32] = {
    let mut bytes = [0u8; 32];
    bytes[0] = 1;
    bytes
};

/// Compute the legacy (pre-FORKID) sighash digest for input `index`.
///
/// Blanks every other input's `scriptSig`, substitutes `subscript` for
/// the signed input, and applies the base-type output/sequence rules
/// before double-hashing.
pub fn sighash_legacy(
    tx: &Transaction,
    index: usize,
    subscript: &[u8],
    sighash_type: SighashTypeInfo,
) -> Result<[u8; 32], SighashError> {
    debug_assert_eq!(sighash_type.algorithm, Algorithm::Legacy);
    if index >= tx.inputs.len() {
        return Err(SighashError::InputIndexOutOfRange(index));
    }
    if sighash_type.base_type == BaseType::Single && index >= tx.outputs.len() {
        return Ok(SINGLE_NO_OUTPUT_SENTINEL);
    }

    let mut inputs: Vec<TxIn> = tx
        .inputs
        .iter()
        .enumerate()
        .map(|(i, input)| TxIn {
            prev_output: input.prev_output,
            script_sig: if i == index {
                subscript.to_vec()
            } else {
                Vec::new()
            },
            sequence: if i != index
                && matches!(sighash_type.base_type, BaseType::None | BaseType::Single)
            {
                0
            } else {
                input.sequence
            },
        })
        .collect();

    let mut outputs: Vec<TxOut> = tx.outputs.clone();
    match sighash_type.base_type {
        BaseType::None => outputs.clear(),
        BaseType::Single => {
            outputs.truncate(index + 1);
            for output in outputs.iter_mut().take(index) {
                output.value_sats = u64::MAX;
                output.script.clear();
            }
        }
        BaseType::All => {}
    }

    if sighash_type.anyone_can_pay {
        inputs = vec![inputs[index].clone()];
    }

    let modified = Transaction {
        version: tx.version,
        inputs,
        outputs,
        locktime: tx.locktime,
    };

    let mut buf = modified.serialize();
    let signed_type = sighash_type.raw as i8 as i32;
    buf.extend_from_slice(&signed_type.to_le_bytes());
    Ok(sha256d(&buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sighash_type::{SIGHASH_ALL, SIGHASH_SINGLE};
    use lotus_primitives::OutPoint;

    fn sample_tx() -> Transaction {
        Transaction {
            version: 1,
            inputs: vec![
                TxIn {
                    prev_output: OutPoint {
                        prev_txid: [1u8; 32],
                        prev_index: 0,
                    },
                    script_sig: vec![0xde],
                    sequence: 0xffff_ffff,
                },
                TxIn {
                    prev_output: OutPoint {
                        prev_txid: [2u8; 32],
                        prev_index: 0,
                    },
                    script_sig: vec![0xad],
                    sequence: 0xffff_ffff,
                },
            ],
            outputs: vec![TxOut {
                value_sats: 100_000,
                script: vec![0x76, 0xa9],
            }],
            locktime: 0,
        }
    }

    #[test]
    fn is_deterministic() {
        let tx = sample_tx();
        let info = SighashTypeInfo::decode(SIGHASH_ALL).unwrap();
        let a = sighash_legacy(&tx, 0, &[0x51], info).unwrap();
        let b = sighash_legacy(&tx, 0, &[0x51], info).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn single_without_matching_output_returns_sentinel() {
        let tx = sample_tx();
        let info = SighashTypeInfo::decode(SIGHASH_SINGLE).unwrap();
        let digest = sighash_legacy(&tx, 1, &[], info).unwrap();
        assert_eq!(digest, SINGLE_NO_OUTPUT_SENTINEL);
    }

    #[test]
    fn blanking_other_scriptsigs_changes_digest() {
        let tx = sample_tx();
        let info = SighashTypeInfo::decode(SIGHASH_ALL).unwrap();
        let a = sighash_legacy(&tx, 0, &[0x51], info).unwrap();
        let b = sighash_legacy(&tx, 0, &[0x52], info).unwrap();
        assert_ne!(a, b);
    }
}
