//! sigcore: signature expansion and verification core for ledger transaction processing.
//!
//! The workspace crates are re-exported here. [`SignatureCore`] wires them together from a
//! [`SigcoreConfig`]: one crypto engine shared by an expander and a verifier.

pub use sigcore_crypto as crypto;
pub use sigcore_errors as errors;
pub use sigcore_log as log;
pub use sigcore_telemetry as telemetry;
pub use sigcore_types as types;

pub use sigcore_crypto::{
    AsyncCryptoEngine, CryptoEngine, SignatureExpander, SignatureVerification,
    SignatureVerificationFuture, SignatureVerifier,
};
pub use sigcore_errors::{Error, Result};
pub use sigcore_types::{
    ExpandedSignaturePair, Key, MessageType, SigcoreConfig, SignatureKind, SignaturePair,
};

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Expander and verifier sharing one engine
pub struct SignatureCore {
    config: SigcoreConfig,
    engine: Arc<AsyncCryptoEngine>,
    expander: SignatureExpander,
    verifier: SignatureVerifier,
}

impl SignatureCore {
    /// Validate `config` and start the crypto engine it describes
    pub fn from_config(config: SigcoreConfig) -> Result<Self> {
        config.validate()?;
        if let Err(e) = sigcore_telemetry::init() {
            warn!(error = %e, "metrics unavailable");
        }
        let engine = Arc::new(AsyncCryptoEngine::new(&config.engine)?);
        let verifier = SignatureVerifier::new(engine.clone());

        info!(
            message_type = ?config.verification.message_type,
            timeout_ms = config.verification.default_timeout_ms,
            "signature core ready"
        );

        Ok(Self {
            config,
            engine,
            expander: SignatureExpander::new(),
            verifier,
        })
    }

    /// Load configuration from the default location and start
    pub fn load() -> Result<Self> {
        Self::from_config(SigcoreConfig::load()?)
    }

    pub fn config(&self) -> &SigcoreConfig {
        &self.config
    }

    pub fn engine(&self) -> &Arc<AsyncCryptoEngine> {
        &self.engine
    }

    pub fn expander(&self) -> &SignatureExpander {
        &self.expander
    }

    pub fn verifier(&self) -> &SignatureVerifier {
        &self.verifier
    }

    /// Verify with the configured message type
    pub fn verify(
        &self,
        message: &[u8],
        pairs: &HashSet<ExpandedSignaturePair>,
    ) -> Result<HashMap<Key, SignatureVerificationFuture>> {
        self.verifier
            .verify(message, pairs, self.config.verification.message_type)
    }

    /// Wait on `future` for the configured default timeout
    pub fn resolve(&self, future: &SignatureVerificationFuture) -> Result<SignatureVerification> {
        future.get_timeout(self.default_timeout())
    }

    pub fn default_timeout(&self) -> Duration {
        self.config.default_timeout()
    }
}

/// Install the global subscriber described by the logging section of `config`
pub fn init_logging(config: &SigcoreConfig) -> Result<()> {
    sigcore_log::init_tracing_with_level(&config.logging.level, config.logging.json)
        .map_err(|e| Error::Config(format!("logging: {e}")))
}
