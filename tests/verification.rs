use ed25519_dalek::SigningKey as Ed25519SigningKey;
use k256::ecdsa::SigningKey as Secp256k1SigningKey;
use rand::rngs::OsRng;
use sha3::{Digest, Keccak256};
use sigcore::crypto::{sign_message, sign_prehash, PrivateKey};
use sigcore::{Error, Key, MessageType, SigcoreConfig, SignatureCore, SignaturePair};
use std::collections::HashSet;
use std::time::Duration;
use tempfile::tempdir;

const WAIT: Duration = Duration::from_secs(10);

fn core() -> SignatureCore {
    let _ = sigcore::log::init_tracing_test();
    SignatureCore::from_config(SigcoreConfig::default()).unwrap()
}

fn ed25519_signer() -> PrivateKey {
    PrivateKey::Ed25519(Ed25519SigningKey::generate(&mut OsRng))
}

fn secp256k1_signer() -> PrivateKey {
    PrivateKey::Secp256k1(Secp256k1SigningKey::random(&mut OsRng))
}

fn declared(signer: &PrivateKey) -> Key {
    signer.public_key().to_key()
}

fn prefix(signer: &PrivateKey, len: usize) -> Vec<u8> {
    signer.public_key().to_bytes()[..len].to_vec()
}

#[test]
fn test_mixed_key_list_verifies() {
    let core = core();
    let message = b"crypto transfer 0.0.1001 -> 0.0.1002";
    let ed = ed25519_signer();
    let ecdsa = secp256k1_signer();
    let other = secp256k1_signer();
    let key = Key::key_list([declared(&ed), declared(&ecdsa), declared(&other)]);

    let pairs = vec![
        SignaturePair::ed25519(prefix(&ed, 6), sign_message(&ed, message).unwrap()),
        SignaturePair::ecdsa_secp256k1(prefix(&ecdsa, 33), sign_message(&ecdsa, message).unwrap()),
        SignaturePair::ecdsa_secp256k1(prefix(&other, 33), sign_message(&other, message).unwrap()),
    ];

    let mut expanded = HashSet::new();
    core.expander()
        .expand_for_key(&key, &pairs, &mut expanded)
        .unwrap();
    assert_eq!(expanded.len(), 3);

    let futures = core.verify(message, &expanded).unwrap();
    assert_eq!(futures.len(), 3);
    for future in futures.values() {
        assert!(core.resolve(future).unwrap().passed());
    }

    for signer in [&ecdsa, &other] {
        let result = futures[&declared(signer)].get().unwrap();
        assert!(result.evm_alias.is_some());
        assert_eq!(result.key_bytes.len(), 65);
    }
    assert!(futures[&declared(&ed)].get().unwrap().evm_alias.is_none());

    let metrics = sigcore::telemetry::registry().encode_to_string().unwrap();
    assert!(metrics.contains("sig_submitted_total"));
    assert!(metrics.contains("sig_resolved_total"));
}

#[test]
fn test_wrong_message_fails_verification() {
    let core = core();
    let signer = ed25519_signer();
    let pairs = vec![SignaturePair::ed25519(
        prefix(&signer, 32),
        sign_message(&signer, b"signed").unwrap(),
    )];

    let mut expanded = HashSet::new();
    core.expander().expand_full_prefixes(&pairs, &mut expanded);
    let futures = core.verifier().verify_raw(b"tampered", &expanded).unwrap();

    let result = futures[&declared(&signer)].get_timeout(WAIT).unwrap();
    assert!(!result.passed());
}

#[test]
fn test_prehashed_ecdsa_message() {
    let core = core();
    let signer = secp256k1_signer();
    let digest: [u8; 32] = Keccak256::digest(b"ethereum transaction rlp").into();
    let pairs = vec![SignaturePair::ecdsa_secp256k1(
        prefix(&signer, 33),
        sign_prehash(&signer, &digest).unwrap(),
    )];

    let mut expanded = HashSet::new();
    core.expander().expand_full_prefixes(&pairs, &mut expanded);

    let futures = core
        .verifier()
        .verify(&digest, &expanded, MessageType::Keccak256Hash)
        .unwrap();
    assert!(futures[&declared(&signer)].get_timeout(WAIT).unwrap().passed());

    // hashing the digest again yields different signed bytes
    let futures = core.verifier().verify_raw(&digest, &expanded).unwrap();
    assert!(!futures[&declared(&signer)].get_timeout(WAIT).unwrap().passed());

    assert_eq!(
        core.verifier()
            .verify(&digest[..31], &expanded, MessageType::Keccak256Hash)
            .unwrap_err(),
        Error::InvalidMessageLength {
            expected: 32,
            actual: 31
        }
    );
}

#[test]
fn test_hollow_account_signed_by_alias_key() {
    let core = core();
    let signer = secp256k1_signer();
    let uncompressed = match signer.public_key() {
        sigcore::crypto::PublicKey::Secp256k1(key) => key.to_encoded_point(false),
        _ => unreachable!(),
    };
    let hash = Keccak256::digest(&uncompressed.as_bytes()[1..]);
    let alias = &hash[12..];

    let message = b"lazy create";
    let pairs = vec![
        SignaturePair::ecdsa_secp256k1(prefix(&signer, 33), sign_message(&signer, message).unwrap()),
        SignaturePair::ed25519(vec![1u8; 32], vec![0u8; 64]),
    ];

    let mut expanded = HashSet::new();
    core.expander()
        .expand_for_hollow_account(alias, &pairs, &mut expanded);
    assert_eq!(expanded.len(), 1);

    let futures = core.verify(message, &expanded).unwrap();
    let result = futures[&declared(&signer)].get_timeout(WAIT).unwrap();
    assert!(result.passed());
    assert_eq!(result.evm_alias.unwrap().as_bytes().as_slice(), alias);
}

#[test]
fn test_cancel_before_resolution_observed() {
    let core = core();
    let signer = ed25519_signer();
    let message = b"cancel me";
    let pairs = vec![SignaturePair::ed25519(
        prefix(&signer, 32),
        sign_message(&signer, message).unwrap(),
    )];
    let mut expanded = HashSet::new();
    core.expander().expand_full_prefixes(&pairs, &mut expanded);

    let futures = core.verify(message, &expanded).unwrap();
    let future = &futures[&declared(&signer)];
    if future.cancel(true) {
        assert!(future.is_cancelled());
        assert_eq!(future.get(), Err(Error::Cancelled));
    } else {
        // the engine already resolved and the future observed it
        assert!(future.get().unwrap().passed());
    }
    assert!(future.is_done());
    assert!(!future.cancel(true));
}

#[test]
fn test_unsupported_key_in_tree() {
    let core = core();
    let signer = ed25519_signer();
    let key = Key::threshold(1, [declared(&signer), Key::Rsa3072(vec![0u8; 384])]);
    let mut expanded = HashSet::new();
    let err = core
        .expander()
        .expand_for_key(&key, &[], &mut expanded)
        .unwrap_err();
    assert_eq!(err, Error::UnsupportedKeyKind("RSA_3072".to_string()));
}

#[test]
fn test_core_from_config_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[engine]\nworker_threads = 1\n\n[verification]\nmessage_type = \"keccak256_hash\"\n",
    )
    .unwrap();

    let config = SigcoreConfig::load_layered(Some(&path)).unwrap();
    assert_eq!(config.verification.message_type, MessageType::Keccak256Hash);

    let core = SignatureCore::from_config(config).unwrap();
    assert_eq!(core.config().engine.worker_threads, 1);
    assert!(core.verify(b"short", &HashSet::new()).is_err());
}

#[test]
fn test_invalid_config_rejected() {
    let mut config = SigcoreConfig::default();
    config.engine.max_blocking_threads = 0;
    assert!(matches!(
        SignatureCore::from_config(config),
        Err(Error::Config(_))
    ));
}
