//! Pending result of one signature verification

use crate::engine::{HandleOutcome, VerificationHandle, VerificationStatus};
use sigcore_errors::{Error, Result};
use sigcore_telemetry::metrics::{record_cancelled, record_resolved};
use sigcore_types::{EvmAlias, ExpandedSignaturePair, Key};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Outcome of a resolved verification
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureVerification {
    pub key: Key,
    pub key_bytes: Vec<u8>,
    pub evm_alias: Option<EvmAlias>,
    passed: bool,
}

impl SignatureVerification {
    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn failed(&self) -> bool {
        !self.passed
    }
}

#[derive(Debug)]
enum FutureState {
    /// Created, no engine handle yet
    Pending,
    Submitted(VerificationHandle),
    Resolved(bool),
    Cancelled,
}

impl FutureState {
    fn is_terminal(&self) -> bool {
        matches!(self, FutureState::Resolved(_) | FutureState::Cancelled)
    }
}

#[derive(Debug)]
struct Inner {
    key: Key,
    key_bytes: Vec<u8>,
    evm_alias: Option<EvmAlias>,
    state: Mutex<FutureState>,
    cond: Condvar,
}

/// Handle on a verification submitted to the crypto engine.
///
/// Clones share state. Terminal transitions happen under one lock, so exactly one of
/// resolution or cancellation wins.
#[derive(Clone, Debug)]
pub struct SignatureVerificationFuture {
    inner: Arc<Inner>,
}

impl SignatureVerificationFuture {
    pub fn new(key: Key, key_bytes: Vec<u8>, evm_alias: Option<EvmAlias>) -> Self {
        Self {
            inner: Arc::new(Inner {
                key,
                key_bytes,
                evm_alias,
                state: Mutex::new(FutureState::Pending),
                cond: Condvar::new(),
            }),
        }
    }

    pub fn for_pair(pair: &ExpandedSignaturePair) -> Self {
        Self::new(pair.key.clone(), pair.key_bytes.clone(), pair.evm_alias)
    }

    pub fn key(&self) -> &Key {
        &self.inner.key
    }

    pub fn evm_alias(&self) -> Option<&EvmAlias> {
        self.inner.evm_alias.as_ref()
    }

    /// Bind the engine handle. A future cancelled in the meantime cancels the handle instead.
    pub fn attach(&self, handle: VerificationHandle) -> bool {
        let mut state = self.lock();
        match *state {
            FutureState::Pending => {
                *state = FutureState::Submitted(handle);
                drop(state);
                self.inner.cond.notify_all();
                true
            }
            FutureState::Cancelled => {
                drop(state);
                handle.cancel();
                false
            }
            _ => false,
        }
    }

    /// Cancel the verification.
    ///
    /// Returns false if the future already finished. A submitted request is also cancelled at
    /// the engine; the future is cancelled whether or not the engine still could stop it.
    /// `may_interrupt_if_running` is only logged: a check already running always finishes and
    /// its result is dropped.
    pub fn cancel(&self, may_interrupt_if_running: bool) -> bool {
        let mut state = self.lock();
        let handle = match &*state {
            FutureState::Resolved(_) | FutureState::Cancelled => return false,
            FutureState::Pending => None,
            FutureState::Submitted(handle) => Some(handle.clone()),
        };
        *state = FutureState::Cancelled;
        drop(state);
        self.inner.cond.notify_all();

        if let Some(handle) = handle {
            let stopped = handle.cancel();
            trace!(stopped, may_interrupt_if_running, "cancelled engine request");
        }
        debug!(key = ?self.inner.key, "signature verification cancelled");
        record_cancelled();
        true
    }

    pub fn is_cancelled(&self) -> bool {
        let mut state = self.lock();
        observe(&mut state);
        matches!(*state, FutureState::Cancelled)
    }

    pub fn is_done(&self) -> bool {
        let mut state = self.lock();
        observe(&mut state);
        state.is_terminal()
    }

    /// Block until the verification resolves or is cancelled
    pub fn get(&self) -> Result<SignatureVerification> {
        self.wait_until(None)
    }

    /// Like [`get`](Self::get), failing with [`Error::Timeout`] once `timeout` has elapsed
    pub fn get_timeout(&self, timeout: Duration) -> Result<SignatureVerification> {
        self.wait_until(Some(Instant::now() + timeout))
    }

    fn wait_until(&self, deadline: Option<Instant>) -> Result<SignatureVerification> {
        loop {
            let mut state = self.lock();
            observe(&mut state);
            let handle = match &*state {
                FutureState::Resolved(passed) => return Ok(self.verification(*passed)),
                FutureState::Cancelled => return Err(Error::Cancelled),
                FutureState::Submitted(handle) => Some(handle.clone()),
                FutureState::Pending => None,
            };

            let Some(handle) = handle else {
                // wait for attach or cancel
                let pending = |s: &mut FutureState| matches!(s, FutureState::Pending);
                match remaining(deadline)? {
                    None => drop(
                        self.inner
                            .cond
                            .wait_while(state, pending)
                            .unwrap_or_else(PoisonError::into_inner),
                    ),
                    Some(timeout) => drop(
                        self.inner
                            .cond
                            .wait_timeout_while(state, timeout, pending)
                            .unwrap_or_else(PoisonError::into_inner),
                    ),
                }
                continue;
            };
            drop(state);

            // the engine handle has its own lock; never hold ours while blocked on it
            if handle.wait(remaining(deadline)?).is_none() {
                return Err(Error::Timeout);
            }
        }
    }

    fn verification(&self, passed: bool) -> SignatureVerification {
        SignatureVerification {
            key: self.inner.key.clone(),
            key_bytes: self.inner.key_bytes.clone(),
            evm_alias: self.inner.evm_alias,
            passed,
        }
    }

    fn lock(&self) -> MutexGuard<'_, FutureState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Move a submitted future to its terminal state once the engine handle has finished
fn observe(state: &mut FutureState) {
    let FutureState::Submitted(handle) = &*state else {
        return;
    };
    match handle.outcome() {
        Some(HandleOutcome::Completed(status)) => {
            let passed = status == VerificationStatus::Valid;
            record_resolved(passed);
            *state = FutureState::Resolved(passed);
        }
        Some(HandleOutcome::Cancelled) => *state = FutureState::Cancelled,
        None => {}
    }
}

/// Time left before `deadline`; `Ok(None)` means unbounded
fn remaining(deadline: Option<Instant>) -> Result<Option<Duration>> {
    match deadline {
        None => Ok(None),
        Some(deadline) => {
            let now = Instant::now();
            if now >= deadline {
                Err(Error::Timeout)
            } else {
                Ok(Some(deadline - now))
            }
        }
    }
}
