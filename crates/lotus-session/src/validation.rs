//! Byzantine validation pipeline (§4.6.5): the four checks every inbound
//! message passes through before it reaches the session state machine,
//! plus the fault classification used to apply a reputation penalty.

use crate::message::{Message, PROTOCOL_ID};
use crate::reputation::FaultClass;
use crate::{SessionConfig, SessionError};

/// §4.6.5 step 1: every expected field is of the declared type and
/// non-empty where required, and the message isn't oversized. Hex-shape
/// validation of individual payload fields happens in `hex_codec` at
/// decode time (step 2, "deserialization").
pub fn validate_structure(msg: &Message, config: &SessionConfig) -> Result<(), SessionError> {
    if msg.from.is_empty() {
        return Err(SessionError::Validation("message `from` is empty".into()));
    }
    if msg.message_id.is_empty() {
        return Err(SessionError::Validation(
            "message `message_id` is empty".into(),
        ));
    }
    if let Some(protocol) = &msg.protocol {
        if protocol != PROTOCOL_ID {
            return Err(SessionError::Validation(format!(
                "unrecognized protocol tag {protocol}"
            )));
        }
    }
    msg.check_size(config.max_message_size_bytes)?;
    Ok(())
}

/// Maps a validation failure to the reputation-penalty class it should
/// incur (§4.6.5 step 5 / §4.6.7). Transient network errors never
/// penalize the sender — they're not attributable to it.
pub fn fault_class_for(error: &SessionError) -> Option<FaultClass> {
    match error {
        SessionError::ByzantineFault { .. } => Some(FaultClass::Byzantine),
        SessionError::Validation(_) | SessionError::Protocol(_) | SessionError::MessageTooLarge { .. } => {
            Some(FaultClass::Malformed)
        }
        _ => None,
    }
}
