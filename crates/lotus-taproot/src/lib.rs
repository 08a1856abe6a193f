//! Taproot commitments: script trees, key tweaking, control blocks, and
//! P2TR script classification (component C3).

pub mod address;
pub mod control_block;
pub mod error;
pub mod leaf;
pub mod script;
pub mod tree;
pub mod tweak;

pub use address::{TaprootAddressPayload, TAPROOT_ADDRESS_TYPE};
pub use control_block::ControlBlock;
pub use error::TaprootError;
pub use leaf::{TapLeaf, DEFAULT_LEAF_VERSION};
pub use script::{build_script, classify};
pub use tree::{fold_merkle_path, LeafWithPath, TapTree};
pub use tweak::{compute_tweak, tweaked_privkey, tweaked_pubkey, ZERO_MERKLE_ROOT};
