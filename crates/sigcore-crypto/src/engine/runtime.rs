//! Default engine: verification on a tokio blocking pool

use super::{
    kind_label, CryptoEngine, TransactionSignature, VerificationHandle, VerificationStatus,
};
use crate::keys::PublicKey;
use crate::signature::verify_signature;
use sigcore_errors::EngineError;
use sigcore_telemetry::metrics::observe_verification_time;
use sigcore_types::EngineConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tokio::runtime::{Builder, Handle, Runtime};
use tracing::{debug, info, instrument, trace};

/// [`CryptoEngine`] that verifies on the blocking threads of a tokio runtime.
///
/// Requests whose task never runs (the runtime shut down first) cancel their handle, so a
/// waiter is never left hanging on an engine that has gone away.
pub struct AsyncCryptoEngine {
    runtime: Option<Runtime>,
    handle: Handle,
    shut_down: AtomicBool,
}

impl AsyncCryptoEngine {
    /// Start a dedicated multi-thread runtime sized by `config`
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        // tokio panics on zero-sized pools
        if config.worker_threads == 0 {
            return Err(EngineError::Startup(
                "worker_threads must be positive".to_string(),
            ));
        }
        if config.max_blocking_threads == 0 {
            return Err(EngineError::Startup(
                "max_blocking_threads must be positive".to_string(),
            ));
        }

        let runtime = Builder::new_multi_thread()
            .worker_threads(config.worker_threads)
            .max_blocking_threads(config.max_blocking_threads)
            .thread_name(config.thread_name.clone())
            .enable_all()
            .build()
            .map_err(|e| EngineError::Startup(e.to_string()))?;

        info!(
            worker_threads = config.worker_threads,
            max_blocking_threads = config.max_blocking_threads,
            "crypto engine started"
        );

        Ok(Self {
            handle: runtime.handle().clone(),
            runtime: Some(runtime),
            shut_down: AtomicBool::new(false),
        })
    }

    /// Run on a runtime owned by someone else
    pub fn from_handle(handle: Handle) -> Self {
        Self {
            runtime: None,
            handle,
            shut_down: AtomicBool::new(false),
        }
    }

    /// Stop accepting requests. Work already queued still runs.
    pub fn shutdown(&self) {
        if !self.shut_down.swap(true, Ordering::SeqCst) {
            info!("crypto engine shutting down");
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }
}

impl CryptoEngine for AsyncCryptoEngine {
    #[instrument(skip_all, fields(kind = kind_label(request.kind())))]
    fn submit(&self, request: TransactionSignature) -> Result<VerificationHandle, EngineError> {
        if self.is_shut_down() {
            return Err(EngineError::ShutDown);
        }

        let handle = VerificationHandle::new();
        let guard = CancelOnDrop(handle.clone());
        self.handle.spawn_blocking(move || {
            let guard = guard;
            let handle = &guard.0;
            if handle.is_complete() {
                trace!("request cancelled before verification started");
                return;
            }
            let status = verify_request(&request);
            if !handle.complete(status) {
                trace!("verification finished after cancellation, result dropped");
            }
        });

        debug!("verification request queued");
        Ok(handle)
    }
}

impl Drop for AsyncCryptoEngine {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// Cancels the handle unless the task completed it first
struct CancelOnDrop(VerificationHandle);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// Check one request. Undecodable keys or signatures are simply invalid.
pub(crate) fn verify_request(request: &TransactionSignature) -> VerificationStatus {
    let start = Instant::now();
    let kind = request.kind();
    let status = match PublicKey::from_raw(kind, request.public_key()) {
        Ok(key) => match verify_signature(&key, request.message(), request.signature()) {
            Ok(()) => VerificationStatus::Valid,
            Err(_) => VerificationStatus::Invalid,
        },
        Err(e) => {
            debug!(error = %e, "public key rejected");
            VerificationStatus::Invalid
        }
    };
    observe_verification_time(kind_label(kind), start.elapsed().as_secs_f64());
    status
}
