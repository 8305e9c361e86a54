//! Core types for sigcore
//!
//! Declared keys, the signature pairs attached to a transaction, their expanded form, and the
//! node-level configuration shared by the crypto crates.

pub mod config;
pub mod key;
pub mod message;
pub mod signature;

pub use config::{ConfigError, EngineConfig, LoggingConfig, SigcoreConfig, VerificationConfig};
pub use key::{
    ContractId, Key, KeyKind, KeyList, ThresholdKey, ECDSA_COMPRESSED_KEY_LEN,
    ECDSA_UNCOMPRESSED_KEY_LEN, ED25519_KEY_LEN,
};
pub use message::{MessageType, KECCAK_256_LEN};
pub use signature::{
    EvmAlias, ExpandedSignaturePair, SignatureKind, SignaturePair, EVM_ALIAS_LEN,
};
