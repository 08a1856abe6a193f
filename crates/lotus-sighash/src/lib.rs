//! Per-input transaction signature digests (component C4): SIGHASH type
//! decoding plus the legacy, FORKID, and LOTUS merkle-tree digest
//! algorithms.

pub mod error;
pub mod forkid;
pub mod legacy;
pub mod lotus;
pub mod sighash_type;

pub use error::SighashError;
pub use forkid::sighash_forkid;
pub use legacy::sighash_legacy;
pub use lotus::sighash_lotus;
pub use sighash_type::{Algorithm, BaseType, SighashTypeInfo};

use lotus_primitives::{Transaction, TxOut};

/// Script-interpreter verification flags relevant to sighash selection.
/// `fork_id` gates SIGHASH_LOTUS the same way it gates SIGHASH_FORKID in
/// the host chain's consensus rules.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VerificationFlags {
    pub fork_id: bool,
}

/// Everything the LOTUS algorithm needs beyond the common inputs.
#[derive(Clone, Debug, Default)]
pub struct LotusExtras<'a> {
    pub spent_outputs: &'a [TxOut],
    pub executed_script_hash: Option<[u8; 32]>,
    pub codeseparator_pos: Option<u32>,
}

/// Compute the signature digest for `tx` input `index` against
/// `subscript`/`value_sats`, dispatching on the algorithm bits of
/// `sighash_type` (§4.4). SIGHASH_LOTUS additionally requires
/// `flags.fork_id` and one spent output per transaction input.
pub fn compute_sighash(
    tx: &Transaction,
    index: usize,
    subscript: &[u8],
    value_sats: u64,
    raw_sighash_type: u8,
    flags: VerificationFlags,
    lotus_extras: LotusExtras<'_>,
) -> Result<[u8; 32], SighashError> {
    let info = SighashTypeInfo::decode(raw_sighash_type)?;
    match info.algorithm {
        Algorithm::Lotus => {
            if !flags.fork_id {
                return Err(SighashError::InvalidSighashType(
                    "SIGHASH_LOTUS requires the FORKID verification flag".into(),
                ));
            }
            if lotus_extras.spent_outputs.len() != tx.inputs.len() {
                return Err(SighashError::SpentOutputsMismatch);
            }
            sighash_lotus(
                tx,
                index,
                lotus_extras.spent_outputs,
                info,
                lotus_extras.executed_script_hash,
                lotus_extras.codeseparator_pos,
            )
        }
        Algorithm::ForkId => sighash_forkid(tx, index, subscript, value_sats, info),
        Algorithm::Legacy => sighash_legacy(tx, index, subscript, info),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sighash_type::{SIGHASH_ALL, SIGHASH_FORKID, SIGHASH_LOTUS};
    use lotus_primitives::{OutPoint, TxIn};

    fn sample_tx() -> (Transaction, Vec<TxOut>) {
        let tx = Transaction {
            version: 2,
            inputs: vec![TxIn {
                prev_output: OutPoint {
                    prev_txid: [4u8; 32],
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
        };
        let spent_outputs = vec![TxOut {
            value_sats: 100_000,
            script: vec![0xaa],
        }];
        (tx, spent_outputs)
    }

    #[test]
    fn dispatches_to_forkid() {
        let (tx, _) = sample_tx();
        let digest = compute_sighash(
            &tx,
            0,
            &[],
            100_000,
            SIGHASH_ALL | SIGHASH_FORKID,
            VerificationFlags { fork_id: true },
            LotusExtras::default(),
        )
        .unwrap();
        assert_eq!(digest.len(), 32);
    }

    #[test]
    fn dispatches_to_lotus_with_flag_and_spent_outputs() {
        let (tx, spent_outputs) = sample_tx();
        let digest = compute_sighash(
            &tx,
            0,
            &[],
            100_000,
            SIGHASH_ALL | SIGHASH_LOTUS,
            VerificationFlags { fork_id: true },
            LotusExtras {
                spent_outputs: &spent_outputs,
                executed_script_hash: None,
                codeseparator_pos: None,
            },
        )
        .unwrap();
        assert_eq!(digest.len(), 32);
    }

    #[test]
    fn lotus_without_forkid_flag_rejected() {
        let (tx, spent_outputs) = sample_tx();
        let result = compute_sighash(
            &tx,
            0,
            &[],
            100_000,
            SIGHASH_ALL | SIGHASH_LOTUS,
            VerificationFlags { fork_id: false },
            LotusExtras {
                spent_outputs: &spent_outputs,
                executed_script_hash: None,
                codeseparator_pos: None,
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn lotus_without_matching_spent_outputs_rejected() {
        let (tx, _) = sample_tx();
        let result = compute_sighash(
            &tx,
            0,
            &[],
            100_000,
            SIGHASH_ALL | SIGHASH_LOTUS,
            VerificationFlags { fork_id: true },
            LotusExtras::default(),
        );
        assert_eq!(result, Err(SighashError::SpentOutputsMismatch));
    }
}
