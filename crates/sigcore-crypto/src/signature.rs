//! Signature primitives
//!
//! ED25519 signs the message itself. Secp256k1 signs a 32-byte Keccak-256 digest and carries the
//! 64-byte compact `r || s` encoding.

use crate::codec::keccak256;
use crate::keys::{PrivateKey, PublicKey};
use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use signature::{Signer, Verifier};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("verification failed")]
    VerificationFailed,
}

/// Sign a message. Secp256k1 keys sign the Keccak-256 digest of `message`.
pub fn sign_message(key: &PrivateKey, message: &[u8]) -> Result<Vec<u8>, SignatureError> {
    match key {
        PrivateKey::Secp256k1(_) => sign_prehash(key, &keccak256(message)),
        PrivateKey::Ed25519(k) => {
            use ed25519_dalek::Signature;
            let sig: Signature = k.sign(message);
            Ok(sig.to_bytes().to_vec())
        }
    }
}

/// Sign bytes that are already a digest. ED25519 has no prehash mode and signs them as is.
pub fn sign_prehash(key: &PrivateKey, digest: &[u8]) -> Result<Vec<u8>, SignatureError> {
    match key {
        PrivateKey::Secp256k1(k) => {
            use k256::ecdsa::Signature;
            let sig: Signature = k
                .sign_prehash(digest)
                .map_err(|e| SignatureError::SigningFailed(e.to_string()))?;
            Ok(sig.to_bytes().to_vec())
        }
        PrivateKey::Ed25519(_) => sign_message(key, digest),
    }
}

/// Verify `signature` over `signed_bytes`.
///
/// For secp256k1 `signed_bytes` is the 32-byte digest that was signed.
pub fn verify_signature(
    key: &PublicKey,
    signed_bytes: &[u8],
    signature: &[u8],
) -> Result<(), SignatureError> {
    match key {
        PublicKey::Secp256k1(k) => {
            use k256::ecdsa::Signature;
            let sig =
                Signature::from_slice(signature).map_err(|_| SignatureError::VerificationFailed)?;
            k.verify_prehash(signed_bytes, &sig)
                .map_err(|_| SignatureError::VerificationFailed)?;
            Ok(())
        }
        PublicKey::Ed25519(k) => {
            use ed25519_dalek::Signature;
            let sig = Signature::from_bytes(
                signature
                    .try_into()
                    .map_err(|_| SignatureError::VerificationFailed)?,
            );
            k.verify(signed_bytes, &sig)
                .map_err(|_| SignatureError::VerificationFailed)?;
            Ok(())
        }
    }
}
