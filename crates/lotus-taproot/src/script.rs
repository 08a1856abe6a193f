//! P2TR script classification, construction, and extraction (§3, §4.3, §6).

use lotus_primitives::Point;

use crate::error::TaprootError;

/// `OP_SCRIPTTYPE`.
const OP_SCRIPTTYPE: u8 = 0x62;
/// `OP_1`.
const OP_1: u8 = 0x51;
/// Push-33-bytes opcode.
const PUSH_33: u8 = 0x21;
/// Push-32-bytes opcode, used for the optional state push.
const PUSH_32: u8 = 0x20;

const SCRIPT_LEN_NO_STATE: usize = 36;
const SCRIPT_LEN_WITH_STATE: usize = 69;

/// Build `OP_SCRIPTTYPE OP_1 0x21 <commitment> [0x20 <state>]`.
pub fn build_script(commitment: &Point, state: Option<[u8; 32]>) -> Vec<u8> {
    let mut out = Vec::with_capacity(SCRIPT_LEN_WITH_STATE);
    out.push(OP_SCRIPTTYPE);
    out.push(OP_1);
    out.push(PUSH_33);
    out.extend_from_slice(&commitment.to_compressed());
    if let Some(state) = state {
        out.push(PUSH_32);
        out.extend_from_slice(&state);
    }
    out
}

/// Classify `script` as a P2TR output, returning the commitment key and
/// optional state. Accepts byte-for-byte only the 36-byte or 69-byte
/// forms; anything else is `NotTaproot`.
pub fn classify(script: &[u8]) -> Result<(Point, Option<[u8; 32]>), TaprootError> {
    match script.len() {
        SCRIPT_LEN_NO_STATE => classify_prefix(script).map(|commitment| (commitment, None)),
        SCRIPT_LEN_WITH_STATE => {
            let commitment = classify_prefix(&script[..SCRIPT_LEN_NO_STATE])?;
            if script[SCRIPT_LEN_NO_STATE] != PUSH_32 {
                return Err(TaprootError::NotTaproot);
            }
            let mut state = [0u8; 32];
            state.copy_from_slice(&script[SCRIPT_LEN_NO_STATE + 1..]);
            Ok((commitment, Some(state)))
        }
        _ => Err(TaprootError::NotTaproot),
    }
}

fn classify_prefix(script: &[u8]) -> Result<Point, TaprootError> {
    if script.len() != SCRIPT_LEN_NO_STATE
        || script[0] != OP_SCRIPTTYPE
        || script[1] != OP_1
        || script[2] != PUSH_33
    {
        return Err(TaprootError::NotTaproot);
    }
    let mut key_bytes = [0u8; 33];
    key_bytes.copy_from_slice(&script[3..36]);
    Point::from_compressed(&key_bytes).map_err(|_| TaprootError::NotTaproot)
}
