//! Signature expansion and verification for sigcore
//!
//! [`SignatureExpander`] turns the signature pairs of a transaction into
//! [`ExpandedSignaturePair`](sigcore_types::ExpandedSignaturePair)s, guided by the keys that must
//! sign. [`SignatureVerifier`] submits those to a [`CryptoEngine`] and hands back one
//! [`SignatureVerificationFuture`] per key.

pub mod codec;
pub mod engine;
pub mod expander;
pub mod future;
pub mod key_tree;
pub mod keys;
pub mod signature;
pub mod verifier;

pub use codec::{keccak256, KeyCodec, Secp256k1Codec};
pub use engine::{
    AsyncCryptoEngine, CryptoEngine, HandleOutcome, Segment, TransactionSignature,
    VerificationHandle, VerificationStatus,
};
pub use expander::SignatureExpander;
pub use future::{SignatureVerification, SignatureVerificationFuture};
pub use key_tree::leaves_of;
pub use keys::{PrivateKey, PublicKey};
pub use signature::{sign_message, sign_prehash, verify_signature, SignatureError};
pub use verifier::SignatureVerifier;
