//! LOTUS merkle-tree sighash digest (§4.4.2).
//!
//! Deprecated on consensus but still computed for backward compatibility;
//! callers should prefer [`crate::forkid::sighash_forkid`] for new scripts.

use lotus_primitives::{merkle_root, sha256d, TxOut};
use lotus_primitives::Transaction;

use crate::error::SighashError;
use crate::sighash_type::{Algorithm, BaseType, SighashTypeInfo};

fn serialized_output_hash(output: &TxOut) -> [u8; 32] {
    let mut buf = Vec::new();
    output.serialize(&mut buf);
    sha256d(&buf)
}

fn merkle_of_outputs(outputs: &[TxOut]) -> ([u8; 32], u8) {
    let leaves: Vec<[u8; 32]> = outputs.iter().map(serialized_output_hash).collect();
    merkle_root(&leaves)
}

fn merkle_of_inputs(tx: &Transaction) -> ([u8; 32], u8) {
    let leaves: Vec<[u8; 32]> = tx
        .inputs
        .iter()
        .map(|input| {
            let mut buf = Vec::with_capacity(40);
            input.prev_output.serialize(&mut buf);
            buf.extend_from_slice(&input.sequence.to_le_bytes());
            sha256d(&buf)
        })
        .collect();
    merkle_root(&leaves)
}

/// Compute the LOTUS merkle-tree sighash digest for input `index`.
///
/// `spent_outputs` must have exactly one entry per transaction input.
/// `executed_script_hash`/`codeseparator_pos` are only present when the
/// spending script used `OP_CODESEPARATOR` / `OP_EXEC`.
pub fn sighash_lotus(
    tx: &Transaction,
    index: usize,
    spent_outputs: &[TxOut],
    sighash_type: SighashTypeInfo,
    executed_script_hash: Option<[u8; 32]>,
    codeseparator_pos: Option<u32>,
) -> Result<[u8; 32], SighashError> {
    debug_assert_eq!(sighash_type.algorithm, Algorithm::Lotus);

    if spent_outputs.len() != tx.inputs.len() {
        return Err(SighashError::SpentOutputsMismatch);
    }
    let input = tx
        .inputs
        .get(index)
        .ok_or(SighashError::InputIndexOutOfRange(index))?;
    let spent_output = &spent_outputs[index];

    let mut buf = Vec::new();

    // 1. sighash_type, 4 bytes LE.
    buf.extend_from_slice(&(sighash_type.raw as u32).to_le_bytes());

    // 2. Per-input hash.
    let spend_type: u8 = if executed_script_hash.is_some() { 2 } else { 0 };
    let mut per_input = Vec::new();
    per_input.push(spend_type);
    input.prev_output.serialize(&mut per_input);
    per_input.extend_from_slice(&input.sequence.to_le_bytes());
    spent_output.serialize(&mut per_input);
    buf.extend_from_slice(&sha256d(&per_input));

    // 3. Executed script hash, if present.
    if let Some(script_hash) = executed_script_hash {
        let pos = codeseparator_pos.unwrap_or(0);
        buf.extend_from_slice(&pos.to_le_bytes());
        buf.extend_from_slice(&script_hash);
    }

    // 4. Spent-outputs commitment, unless ANYONECANPAY.
    if !sighash_type.anyone_can_pay {
        let (spent_outputs_root, _) = merkle_of_outputs(spent_outputs);
        let total_input_value: u64 = spent_outputs.iter().map(|o| o.value_sats).sum();
        buf.extend_from_slice(&(index as u32).to_le_bytes());
        buf.extend_from_slice(&spent_outputs_root);
        buf.extend_from_slice(&total_input_value.to_le_bytes());
    }

    // 5. Total output value, for base type ALL.
    if sighash_type.base_type == BaseType::All {
        let total_output_value: u64 = tx.outputs.iter().map(|o| o.value_sats).sum();
        buf.extend_from_slice(&total_output_value.to_le_bytes());
    }

    // 6. Version.
    buf.extend_from_slice(&tx.version.to_le_bytes());

    // 7. Inputs commitment, unless ANYONECANPAY.
    if !sighash_type.anyone_can_pay {
        let (inputs_root, inputs_height) = merkle_of_inputs(tx);
        buf.extend_from_slice(&inputs_root);
        buf.push(inputs_height);
    }

    // 8. Base-type tail.
    match sighash_type.base_type {
        BaseType::All => {
            let (outputs_root, outputs_height) = merkle_of_outputs(&tx.outputs);
            buf.extend_from_slice(&outputs_root);
            buf.push(outputs_height);
        }
        BaseType::Single => {
            let output = tx
                .outputs
                .get(index)
                .ok_or(SighashError::SingleMissingOutput)?;
            buf.extend_from_slice(&serialized_output_hash(output));
        }
        BaseType::None => {}
    }

    // 9. Locktime.
    buf.extend_from_slice(&tx.locktime.to_le_bytes());

    let mut digest = sha256d(&buf);
    digest.reverse();
    Ok(digest)
}
