//! Submission of expanded signatures to the crypto engine

use crate::codec::{KeyCodec, Secp256k1Codec};
use crate::engine::{kind_label, CryptoEngine, TransactionSignature};
use crate::future::SignatureVerificationFuture;
use sigcore_errors::{Error, Result};
use sigcore_telemetry::metrics::record_submitted;
use sigcore_types::{ExpandedSignaturePair, Key, MessageType, SignatureKind, KECCAK_256_LEN};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Starts asynchronous verification of expanded signature pairs
#[derive(Clone)]
pub struct SignatureVerifier {
    engine: Arc<dyn CryptoEngine>,
    codec: Arc<dyn KeyCodec>,
}

impl SignatureVerifier {
    pub fn new(engine: Arc<dyn CryptoEngine>) -> Self {
        Self::with_codec(engine, Arc::new(Secp256k1Codec))
    }

    pub fn with_codec(engine: Arc<dyn CryptoEngine>, codec: Arc<dyn KeyCodec>) -> Self {
        Self { engine, codec }
    }

    /// Submit every pair for verification against `message`.
    ///
    /// ED25519 pairs are checked over `message` itself. ECDSA pairs are checked over its
    /// Keccak-256 digest, or over `message` directly when it already is one
    /// ([`MessageType::Keccak256Hash`]). The returned futures are keyed by the pair's key; when
    /// two pairs share a key the later one in iteration order is kept.
    #[instrument(skip_all, fields(pairs = pairs.len(), message_type = ?message_type))]
    pub fn verify(
        &self,
        message: &[u8],
        pairs: &HashSet<ExpandedSignaturePair>,
        message_type: MessageType,
    ) -> Result<HashMap<Key, SignatureVerificationFuture>> {
        if message_type == MessageType::Keccak256Hash && message.len() != KECCAK_256_LEN {
            return Err(Error::InvalidMessageLength {
                expected: KECCAK_256_LEN,
                actual: message.len(),
            });
        }

        let mut futures = HashMap::with_capacity(pairs.len());
        if pairs.is_empty() {
            return Ok(futures);
        }

        let needs_digest = message_type == MessageType::Raw
            && pairs.iter().any(|p| p.kind() == SignatureKind::EcdsaSecp256k1);
        let digest = needs_digest.then(|| self.codec.keccak256(message));
        let ecdsa_bytes: &[u8] = digest.as_ref().map_or(message, |d| d.as_slice());

        let mut submitted: Vec<SignatureVerificationFuture> = Vec::with_capacity(pairs.len());
        for pair in pairs {
            let kind = pair.kind();
            let signed_bytes = match kind {
                SignatureKind::Ed25519 => message,
                SignatureKind::EcdsaSecp256k1 => ecdsa_bytes,
            };
            let request =
                TransactionSignature::pack(kind, signed_bytes, pair.signature(), &pair.key_bytes);

            let future = SignatureVerificationFuture::for_pair(pair);
            let handle = match self.engine.submit(request) {
                Ok(handle) => handle,
                Err(e) => {
                    warn!(
                        error = %e,
                        submitted = submitted.len(),
                        "engine refused verification request"
                    );
                    for earlier in &submitted {
                        earlier.cancel(true);
                    }
                    return Err(e.into());
                }
            };
            // fresh futures are still pending, so the handle is always bound
            let attached = future.attach(handle);
            debug_assert!(attached);
            record_submitted(kind_label(kind));

            submitted.push(future.clone());
            if futures.insert(pair.key.clone(), future).is_some() {
                debug!(key = ?pair.key, "replaced verification for repeated key");
            }
        }

        debug!(submitted = submitted.len(), "signature verifications submitted");
        Ok(futures)
    }

    /// [`verify`](Self::verify) for a message that is not pre-hashed
    pub fn verify_raw(
        &self,
        message: &[u8],
        pairs: &HashSet<ExpandedSignaturePair>,
    ) -> Result<HashMap<Key, SignatureVerificationFuture>> {
        self.verify(message, pairs, MessageType::Raw)
    }
}
