//! How the bytes handed to the verifier relate to what was signed

use serde::{Deserialize, Serialize};

/// Length of a keccak-256 digest
pub const KECCAK_256_LEN: usize = 32;

/// Form of the message passed to verification
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// The message as transmitted; ECDSA verification hashes it with keccak-256 first
    #[default]
    Raw,
    /// A keccak-256 digest that ECDSA verification uses as-is
    Keccak256Hash,
}
