//! Parsed key material using static enum dispatch

use ed25519_dalek::{SigningKey as Ed25519PrivKey, VerifyingKey as Ed25519PubKey};
use k256::ecdsa::{SigningKey as Secp256k1PrivKey, VerifyingKey as Secp256k1PubKey};
use sigcore_types::{Key, SignatureKind, ED25519_KEY_LEN};

use crate::signature::SignatureError;

/// All supported public key types
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PublicKey {
    Secp256k1(Secp256k1PubKey),
    Ed25519(Ed25519PubKey),
}

/// All supported private key types
#[derive(Clone, Debug)]
pub enum PrivateKey {
    Secp256k1(Secp256k1PrivKey),
    Ed25519(Ed25519PrivKey),
}

impl PublicKey {
    /// Parse raw key bytes of the given kind.
    ///
    /// Secp256k1 accepts any SEC1 encoding (33-byte compressed or 65-byte uncompressed).
    pub fn from_raw(kind: SignatureKind, bytes: &[u8]) -> Result<Self, SignatureError> {
        match kind {
            SignatureKind::EcdsaSecp256k1 => {
                let key = Secp256k1PubKey::from_sec1_bytes(bytes)
                    .map_err(|e| SignatureError::InvalidPublicKey(e.to_string()))?;
                Ok(PublicKey::Secp256k1(key))
            }
            SignatureKind::Ed25519 => {
                let raw: &[u8; ED25519_KEY_LEN] = bytes.try_into().map_err(|_| {
                    SignatureError::InvalidPublicKey(format!(
                        "ed25519 key must be {ED25519_KEY_LEN} bytes, got {}",
                        bytes.len()
                    ))
                })?;
                let key = Ed25519PubKey::from_bytes(raw)
                    .map_err(|e| SignatureError::InvalidPublicKey(e.to_string()))?;
                Ok(PublicKey::Ed25519(key))
            }
        }
    }

    pub fn kind(&self) -> SignatureKind {
        match self {
            PublicKey::Secp256k1(_) => SignatureKind::EcdsaSecp256k1,
            PublicKey::Ed25519(_) => SignatureKind::Ed25519,
        }
    }

    /// Raw bytes as a transaction declares them (compressed for secp256k1)
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            PublicKey::Secp256k1(key) => key.to_encoded_point(true).as_bytes().to_vec(),
            PublicKey::Ed25519(key) => key.as_bytes().to_vec(),
        }
    }

    /// The declared [`Key`] for this public key
    pub fn to_key(&self) -> Key {
        match self {
            PublicKey::Secp256k1(key) => {
                let mut raw = [0u8; 33];
                raw.copy_from_slice(key.to_encoded_point(true).as_bytes());
                Key::EcdsaSecp256k1(raw)
            }
            PublicKey::Ed25519(key) => Key::Ed25519(key.to_bytes()),
        }
    }
}

impl PrivateKey {
    /// ED25519 key from a 32-byte seed
    pub fn ed25519_from_seed(seed: &[u8; 32]) -> Self {
        PrivateKey::Ed25519(Ed25519PrivKey::from_bytes(seed))
    }

    /// Secp256k1 key from a 32-byte scalar
    pub fn secp256k1_from_bytes(bytes: &[u8; 32]) -> Result<Self, SignatureError> {
        let key = Secp256k1PrivKey::from_slice(bytes)
            .map_err(|e| SignatureError::SigningFailed(e.to_string()))?;
        Ok(PrivateKey::Secp256k1(key))
    }

    /// Get the corresponding public key
    pub fn public_key(&self) -> PublicKey {
        match self {
            PrivateKey::Secp256k1(key) => PublicKey::Secp256k1(*key.verifying_key()),
            PrivateKey::Ed25519(key) => PublicKey::Ed25519(key.verifying_key()),
        }
    }
}
