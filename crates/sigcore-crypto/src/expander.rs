//! Signature expansion
//!
//! Transactions carry signature pairs whose public keys may be abbreviated to a prefix. Expansion
//! resolves each usable pair against the full key it belongs to and produces
//! [`ExpandedSignaturePair`]s ready for verification. All entry points add to a caller-owned
//! set, so repeated keys collapse to a single entry.

use crate::codec::{KeyCodec, Secp256k1Codec};
use crate::key_tree::leaves_of;
use sigcore_errors::Result;
use sigcore_telemetry::metrics::record_expanded;
use sigcore_types::{EvmAlias, ExpandedSignaturePair, Key, SignatureKind, SignaturePair};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Expands signature pairs into verifiable form
#[derive(Clone)]
pub struct SignatureExpander {
    codec: Arc<dyn KeyCodec>,
}

impl Default for SignatureExpander {
    fn default() -> Self {
        Self::new()
    }
}

impl SignatureExpander {
    pub fn new() -> Self {
        Self::with_codec(Arc::new(Secp256k1Codec))
    }

    pub fn with_codec(codec: Arc<dyn KeyCodec>) -> Self {
        Self { codec }
    }

    /// Expand every pair whose prefix is a complete public key, ignoring any key structure
    pub fn expand_full_prefixes(
        &self,
        sig_pairs: &[SignaturePair],
        out: &mut HashSet<ExpandedSignaturePair>,
    ) {
        let mut added = 0;
        for pair in sig_pairs {
            if pair.pub_key_prefix.is_empty() || !pair.is_full_prefix() {
                continue;
            }
            let key = match full_prefix_key(pair) {
                Some(key) => key,
                None => continue,
            };
            if let Some(expanded) = self.expand_leaf(&key, pair) {
                if out.insert(expanded) {
                    added += 1;
                }
            }
        }
        debug!(pairs = sig_pairs.len(), added, "expanded full-prefix signatures");
        record_expanded("full_prefix", added);
    }

    /// Expand the pairs that sign for the primitive leaves of `key`.
    ///
    /// Each leaf takes the first pair, in order, whose kind matches and whose non-empty prefix is
    /// a leading slice of the leaf's raw bytes. Leaves without such a pair are skipped.
    pub fn expand_for_key(
        &self,
        key: &Key,
        sig_pairs: &[SignaturePair],
        out: &mut HashSet<ExpandedSignaturePair>,
    ) -> Result<()> {
        let leaves = leaves_of(key)?;
        let mut added = 0;
        for leaf in &leaves {
            let Some(pair) = sig_pairs.iter().find(|pair| prefix_matches(leaf, pair)) else {
                debug!(leaf = ?leaf, "no signature pair for key");
                continue;
            };
            if let Some(expanded) = self.expand_leaf(leaf, pair) {
                if out.insert(expanded) {
                    added += 1;
                }
            }
        }
        debug!(leaves = leaves.len(), added, "expanded signatures for key");
        record_expanded("key", added);
        Ok(())
    }

    /// Expand the full-prefix ECDSA pair whose EVM address equals `alias`.
    ///
    /// Accounts with a 20-byte alias and no key yet are "hollow"; the only key that can sign for
    /// them is the one hashing to that alias. Aliases of any other length expand to nothing.
    pub fn expand_for_hollow_account(
        &self,
        alias: &[u8],
        sig_pairs: &[SignaturePair],
        out: &mut HashSet<ExpandedSignaturePair>,
    ) {
        let Some(alias) = EvmAlias::from_slice(alias) else {
            debug!(len = alias.len(), "alias is not an EVM address, nothing to expand");
            return;
        };

        let mut added = 0;
        for pair in sig_pairs {
            if pair.kind != SignatureKind::EcdsaSecp256k1 || !pair.is_full_prefix() {
                continue;
            }
            let Some(key) = full_prefix_key(pair) else {
                continue;
            };
            match self.expand_leaf(&key, pair) {
                Some(expanded) if expanded.evm_alias == Some(alias) => {
                    if out.insert(expanded) {
                        added += 1;
                    }
                }
                _ => {}
            }
        }
        debug!(alias = %alias, added, "expanded signatures for hollow account");
        record_expanded("hollow_account", added);
    }

    fn expand_leaf(&self, leaf: &Key, pair: &SignaturePair) -> Option<ExpandedSignaturePair> {
        match leaf {
            Key::Ed25519(raw) => Some(ExpandedSignaturePair {
                key: leaf.clone(),
                key_bytes: raw.to_vec(),
                evm_alias: None,
                sig_pair: pair.clone(),
            }),
            Key::EcdsaSecp256k1(raw) => {
                let decoded = self.codec.decompress_secp256k1(raw).and_then(|uncompressed| {
                    let alias = self.codec.derive_evm_alias(&uncompressed)?;
                    Ok((uncompressed, alias))
                });
                match decoded {
                    Ok((uncompressed, alias)) => Some(ExpandedSignaturePair {
                        key: leaf.clone(),
                        key_bytes: uncompressed,
                        evm_alias: Some(alias),
                        sig_pair: pair.clone(),
                    }),
                    Err(e) => {
                        warn!(
                            key = %hex::encode(raw),
                            error = %e,
                            "skipping undecodable secp256k1 key"
                        );
                        None
                    }
                }
            }
            _ => None,
        }
    }
}

fn full_prefix_key(pair: &SignaturePair) -> Option<Key> {
    let key = match pair.kind {
        SignatureKind::Ed25519 => Key::ed25519_from_slice(&pair.pub_key_prefix),
        SignatureKind::EcdsaSecp256k1 => Key::ecdsa_from_slice(&pair.pub_key_prefix),
    };
    key.ok()
}

/// Whether `pair` may sign for the primitive key `leaf`
pub(crate) fn prefix_matches(leaf: &Key, pair: &SignaturePair) -> bool {
    let (Some(kind), Some(raw)) = (leaf.signature_kind(), leaf.raw_bytes()) else {
        return false;
    };
    let prefix = &pair.pub_key_prefix;
    pair.kind == kind && !prefix.is_empty() && prefix.len() <= raw.len() && raw.starts_with(prefix)
}
