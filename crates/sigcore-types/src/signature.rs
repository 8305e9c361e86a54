//! Signature pairs as submitted with a transaction, and their expanded form

use crate::key::{Key, ECDSA_COMPRESSED_KEY_LEN, ED25519_KEY_LEN};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Size of an EVM address
pub const EVM_ALIAS_LEN: usize = 20;

/// Signature scheme declared by a signature pair
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignatureKind {
    Ed25519,
    EcdsaSecp256k1,
}

impl SignatureKind {
    /// Length of a prefix that spells out the complete public key of this kind
    pub fn full_prefix_len(&self) -> usize {
        match self {
            SignatureKind::Ed25519 => ED25519_KEY_LEN,
            SignatureKind::EcdsaSecp256k1 => ECDSA_COMPRESSED_KEY_LEN,
        }
    }
}

/// A public-key prefix and the signature claimed for the key it identifies
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SignaturePair {
    /// Leading bytes of the signer's public key; empty means "ignore this pair"
    pub pub_key_prefix: Vec<u8>,
    pub kind: SignatureKind,
    pub signature: Vec<u8>,
}

impl SignaturePair {
    pub fn ed25519(pub_key_prefix: impl Into<Vec<u8>>, signature: impl Into<Vec<u8>>) -> Self {
        Self {
            pub_key_prefix: pub_key_prefix.into(),
            kind: SignatureKind::Ed25519,
            signature: signature.into(),
        }
    }

    pub fn ecdsa_secp256k1(
        pub_key_prefix: impl Into<Vec<u8>>,
        signature: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            pub_key_prefix: pub_key_prefix.into(),
            kind: SignatureKind::EcdsaSecp256k1,
            signature: signature.into(),
        }
    }

    /// True when the prefix is the complete public key for the declared kind
    pub fn is_full_prefix(&self) -> bool {
        self.pub_key_prefix.len() == self.kind.full_prefix_len()
    }
}

impl fmt::Debug for SignaturePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignaturePair")
            .field("prefix", &hex::encode(&self.pub_key_prefix))
            .field("kind", &self.kind)
            .field("signature", &hex::encode(&self.signature))
            .finish()
    }
}

/// 20-byte EVM address derived from an uncompressed secp256k1 public key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvmAlias([u8; EVM_ALIAS_LEN]);

impl EvmAlias {
    pub fn new(bytes: [u8; EVM_ALIAS_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse from a slice, returning `None` unless it is exactly 20 bytes
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        bytes.try_into().ok().map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; EVM_ALIAS_LEN] {
        &self.0
    }
}

impl fmt::Display for EvmAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// A declared key resolved to the signature and key material needed to verify it
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExpandedSignaturePair {
    pub key: Key,
    /// Decompressed SEC1 bytes for ECDSA keys, the raw key for ED25519
    pub key_bytes: Vec<u8>,
    pub evm_alias: Option<EvmAlias>,
    pub sig_pair: SignaturePair,
}

impl ExpandedSignaturePair {
    pub fn kind(&self) -> SignatureKind {
        self.sig_pair.kind
    }

    pub fn signature(&self) -> &[u8] {
        &self.sig_pair.signature
    }
}
