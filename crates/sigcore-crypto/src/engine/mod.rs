//! Crypto engine boundary
//!
//! The verifier hands each signature to a [`CryptoEngine`] as a [`TransactionSignature`]: one
//! contiguous buffer holding the signed bytes, the signature and the public key. The engine
//! answers with a [`VerificationHandle`] that it completes later from its own threads.

mod runtime;

pub use runtime::AsyncCryptoEngine;

use sigcore_errors::EngineError;
use sigcore_types::SignatureKind;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Accepts verification requests and resolves them asynchronously
pub trait CryptoEngine: Send + Sync {
    /// Queue `request` for verification. Only refusal is synchronous.
    fn submit(&self, request: TransactionSignature) -> Result<VerificationHandle, EngineError>;
}

/// Location of one field inside a request buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub offset: usize,
    pub len: usize,
}

impl Segment {
    pub fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    fn end(&self) -> Option<usize> {
        self.offset.checked_add(self.len)
    }
}

/// A single verification request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionSignature {
    contents: Vec<u8>,
    kind: SignatureKind,
    message: Segment,
    signature: Segment,
    public_key: Segment,
}

impl TransactionSignature {
    /// Wrap an existing buffer, checking every segment lies inside it
    pub fn new(
        contents: Vec<u8>,
        kind: SignatureKind,
        message: Segment,
        signature: Segment,
        public_key: Segment,
    ) -> Result<Self, EngineError> {
        for (name, segment) in [
            ("message", message),
            ("signature", signature),
            ("public_key", public_key),
        ] {
            match segment.end() {
                Some(end) if end <= contents.len() => {}
                _ => {
                    return Err(EngineError::InvalidSegment {
                        segment: name,
                        offset: segment.offset,
                        length: segment.len,
                        buffer_len: contents.len(),
                    })
                }
            }
        }

        Ok(Self {
            contents,
            kind,
            message,
            signature,
            public_key,
        })
    }

    /// Lay out `signed_bytes || signature || public_key` in a fresh buffer
    pub fn pack(
        kind: SignatureKind,
        signed_bytes: &[u8],
        signature: &[u8],
        public_key: &[u8],
    ) -> Self {
        let mut contents =
            Vec::with_capacity(signed_bytes.len() + signature.len() + public_key.len());
        contents.extend_from_slice(signed_bytes);
        contents.extend_from_slice(signature);
        contents.extend_from_slice(public_key);

        let message = Segment::new(0, signed_bytes.len());
        let signature = Segment::new(message.offset + message.len, signature.len());
        let public_key = Segment::new(signature.offset + signature.len, public_key.len());

        Self {
            contents,
            kind,
            message,
            signature,
            public_key,
        }
    }

    pub fn kind(&self) -> SignatureKind {
        self.kind
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    pub fn message(&self) -> &[u8] {
        self.slice(self.message)
    }

    pub fn signature(&self) -> &[u8] {
        self.slice(self.signature)
    }

    pub fn public_key(&self) -> &[u8] {
        self.slice(self.public_key)
    }

    fn slice(&self, segment: Segment) -> &[u8] {
        &self.contents[segment.offset..segment.offset + segment.len]
    }
}

/// Metric label for a signature kind
pub(crate) fn kind_label(kind: SignatureKind) -> &'static str {
    match kind {
        SignatureKind::Ed25519 => "ED25519",
        SignatureKind::EcdsaSecp256k1 => "ECDSA_SECP256K1",
    }
}

/// Result of a completed verification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VerificationStatus {
    Valid,
    Invalid,
}

/// How a handle finished
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandleOutcome {
    Completed(VerificationStatus),
    Cancelled,
}

#[derive(Debug)]
enum HandleState {
    Pending,
    Done(HandleOutcome),
}

#[derive(Debug)]
struct HandleInner {
    state: Mutex<HandleState>,
    cond: Condvar,
}

/// Completion slot shared between an engine and whoever waits on a request.
///
/// Finishes exactly once, either with a status or by cancellation. Later attempts are ignored.
#[derive(Clone, Debug)]
pub struct VerificationHandle {
    inner: Arc<HandleInner>,
}

impl Default for VerificationHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl VerificationHandle {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(HandleInner {
                state: Mutex::new(HandleState::Pending),
                cond: Condvar::new(),
            }),
        }
    }

    /// Record the verification result. Returns false if the handle already finished.
    pub fn complete(&self, status: VerificationStatus) -> bool {
        self.finish(HandleOutcome::Completed(status))
    }

    /// Cancel the request. Returns false if the handle already finished.
    pub fn cancel(&self) -> bool {
        self.finish(HandleOutcome::Cancelled)
    }

    /// The verification result, absent until completed
    pub fn status(&self) -> Option<VerificationStatus> {
        match self.outcome() {
            Some(HandleOutcome::Completed(status)) => Some(status),
            _ => None,
        }
    }

    pub fn outcome(&self) -> Option<HandleOutcome> {
        match *self.lock() {
            HandleState::Pending => None,
            HandleState::Done(outcome) => Some(outcome),
        }
    }

    /// True once completed or cancelled
    pub fn is_complete(&self) -> bool {
        self.outcome().is_some()
    }

    pub fn is_cancelled(&self) -> bool {
        self.outcome() == Some(HandleOutcome::Cancelled)
    }

    /// Block until the handle finishes, or until `timeout` elapses (`None`)
    pub fn wait(&self, timeout: Option<Duration>) -> Option<HandleOutcome> {
        let guard = self.lock();
        let pending = |state: &mut HandleState| matches!(state, HandleState::Pending);
        let guard = match timeout {
            None => self
                .inner
                .cond
                .wait_while(guard, pending)
                .unwrap_or_else(PoisonError::into_inner),
            Some(timeout) => {
                self.inner
                    .cond
                    .wait_timeout_while(guard, timeout, pending)
                    .unwrap_or_else(PoisonError::into_inner)
                    .0
            }
        };
        match *guard {
            HandleState::Pending => None,
            HandleState::Done(outcome) => Some(outcome),
        }
    }

    fn finish(&self, outcome: HandleOutcome) -> bool {
        let mut state = self.lock();
        if !matches!(*state, HandleState::Pending) {
            return false;
        }
        *state = HandleState::Done(outcome);
        drop(state);
        self.inner.cond.notify_all();
        true
    }

    fn lock(&self) -> MutexGuard<'_, HandleState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_pack_layout() {
        let request = TransactionSignature::pack(
            SignatureKind::Ed25519,
            b"message",
            &[0xaa; 64],
            &[0xbb; 32],
        );
        assert_eq!(request.contents().len(), 7 + 64 + 32);
        assert_eq!(request.message(), b"message");
        assert_eq!(request.signature(), &[0xaa; 64]);
        assert_eq!(request.public_key(), &[0xbb; 32]);
        assert_eq!(request.kind(), SignatureKind::Ed25519);
    }

    #[test]
    fn test_new_validates_segments() {
        let contents = vec![0u8; 10];
        let ok = TransactionSignature::new(
            contents.clone(),
            SignatureKind::Ed25519,
            Segment::new(0, 4),
            Segment::new(4, 4),
            Segment::new(8, 2),
        );
        assert!(ok.is_ok());

        let err = TransactionSignature::new(
            contents.clone(),
            SignatureKind::Ed25519,
            Segment::new(0, 4),
            Segment::new(4, 7),
            Segment::new(8, 2),
        );
        assert_eq!(
            err,
            Err(EngineError::InvalidSegment {
                segment: "signature",
                offset: 4,
                length: 7,
                buffer_len: 10,
            })
        );

        let overflow = TransactionSignature::new(
            contents,
            SignatureKind::Ed25519,
            Segment::new(0, 1),
            Segment::new(1, 1),
            Segment::new(usize::MAX, 2),
        );
        assert!(matches!(
            overflow,
            Err(EngineError::InvalidSegment { segment: "public_key", .. })
        ));
    }

    #[test]
    fn test_handle_completes_once() {
        let handle = VerificationHandle::new();
        assert_eq!(handle.status(), None);
        assert!(!handle.is_complete());

        assert!(handle.complete(VerificationStatus::Valid));
        assert!(!handle.complete(VerificationStatus::Invalid));
        assert!(!handle.cancel());
        assert_eq!(handle.status(), Some(VerificationStatus::Valid));
        assert!(handle.is_complete());
        assert!(!handle.is_cancelled());
    }

    #[test]
    fn test_cancelled_handle_is_never_completed() {
        let handle = VerificationHandle::new();
        assert!(handle.cancel());
        assert!(!handle.complete(VerificationStatus::Valid));
        assert_eq!(handle.status(), None);
        assert_eq!(handle.outcome(), Some(HandleOutcome::Cancelled));
    }

    #[test]
    fn test_wait_times_out_while_pending() {
        let handle = VerificationHandle::new();
        assert_eq!(handle.wait(Some(Duration::from_millis(20))), None);
    }

    #[test]
    fn test_wait_wakes_on_completion() {
        let handle = VerificationHandle::new();
        let completer = handle.clone();
        let worker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            completer.complete(VerificationStatus::Invalid);
        });

        assert_eq!(
            handle.wait(None),
            Some(HandleOutcome::Completed(VerificationStatus::Invalid))
        );
        worker.join().unwrap();
    }
}
