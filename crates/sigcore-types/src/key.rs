//! Key representations using static enum dispatch
//!
//! A [`Key`] is the structure a transaction declares as its signing requirement. Leaves carry
//! raw public-key bytes; `KeyList` and `ThresholdKey` nest arbitrarily deep and may repeat the
//! same leaf at several positions.

use crate::signature::SignatureKind;
use sigcore_errors::{Error, Result};
use std::fmt;

/// Raw size of an ED25519 public key
pub const ED25519_KEY_LEN: usize = 32;
/// Raw size of a compressed secp256k1 public key
pub const ECDSA_COMPRESSED_KEY_LEN: usize = 33;
/// Raw size of an uncompressed SEC1 secp256k1 public key (`0x04 || X || Y`)
pub const ECDSA_UNCOMPRESSED_KEY_LEN: usize = 65;

/// All key kinds a transaction may declare
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Ed25519([u8; ED25519_KEY_LEN]),
    EcdsaSecp256k1([u8; ECDSA_COMPRESSED_KEY_LEN]),
    KeyList(KeyList),
    ThresholdKey(ThresholdKey),
    Rsa3072(Vec<u8>),
    Ecdsa384(Vec<u8>),
    ContractId(ContractId),
    DelegatableContractId(ContractId),
    Unset,
}

/// Ordered list of keys; all of them must sign
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeyList {
    pub keys: Vec<Key>,
}

/// M-of-N composite key
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ThresholdKey {
    pub threshold: u32,
    pub keys: KeyList,
}

/// Identifier of a contract acting as a key
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ContractId {
    pub shard: u64,
    pub realm: u64,
    pub num: u64,
}

/// Discriminant of [`Key`], used for diagnostics
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Ed25519,
    EcdsaSecp256k1,
    KeyList,
    ThresholdKey,
    Rsa3072,
    Ecdsa384,
    ContractId,
    DelegatableContractId,
    Unset,
}

impl KeyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyKind::Ed25519 => "ED25519",
            KeyKind::EcdsaSecp256k1 => "ECDSA_SECP256K1",
            KeyKind::KeyList => "KEY_LIST",
            KeyKind::ThresholdKey => "THRESHOLD_KEY",
            KeyKind::Rsa3072 => "RSA_3072",
            KeyKind::Ecdsa384 => "ECDSA_384",
            KeyKind::ContractId => "CONTRACT_ID",
            KeyKind::DelegatableContractId => "DELEGATABLE_CONTRACT_ID",
            KeyKind::Unset => "UNSET",
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Key {
    /// Build an ED25519 key from a slice, checking its length
    pub fn ed25519_from_slice(bytes: &[u8]) -> Result<Self> {
        let raw = bytes.try_into().map_err(|_| {
            Error::InvalidKey(format!(
                "ed25519 key must be {ED25519_KEY_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Key::Ed25519(raw))
    }

    /// Build a compressed secp256k1 key from a slice, checking its length
    pub fn ecdsa_from_slice(bytes: &[u8]) -> Result<Self> {
        let raw = bytes.try_into().map_err(|_| {
            Error::InvalidKey(format!(
                "compressed secp256k1 key must be {ECDSA_COMPRESSED_KEY_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Key::EcdsaSecp256k1(raw))
    }

    /// Convenience constructor for a key list
    pub fn key_list<I: IntoIterator<Item = Key>>(keys: I) -> Self {
        Key::KeyList(KeyList::new(keys))
    }

    /// Convenience constructor for a threshold key
    pub fn threshold<I: IntoIterator<Item = Key>>(threshold: u32, keys: I) -> Self {
        Key::ThresholdKey(ThresholdKey {
            threshold,
            keys: KeyList::new(keys),
        })
    }

    pub fn kind(&self) -> KeyKind {
        match self {
            Key::Ed25519(_) => KeyKind::Ed25519,
            Key::EcdsaSecp256k1(_) => KeyKind::EcdsaSecp256k1,
            Key::KeyList(_) => KeyKind::KeyList,
            Key::ThresholdKey(_) => KeyKind::ThresholdKey,
            Key::Rsa3072(_) => KeyKind::Rsa3072,
            Key::Ecdsa384(_) => KeyKind::Ecdsa384,
            Key::ContractId(_) => KeyKind::ContractId,
            Key::DelegatableContractId(_) => KeyKind::DelegatableContractId,
            Key::Unset => KeyKind::Unset,
        }
    }

    /// True for the leaf kinds that carry a signature-verifiable public key
    pub fn is_primitive(&self) -> bool {
        matches!(self, Key::Ed25519(_) | Key::EcdsaSecp256k1(_))
    }

    /// Raw public-key bytes of a primitive key
    pub fn raw_bytes(&self) -> Option<&[u8]> {
        match self {
            Key::Ed25519(raw) => Some(raw),
            Key::EcdsaSecp256k1(raw) => Some(raw),
            _ => None,
        }
    }

    /// The signature kind that can sign for this key, if it is primitive
    pub fn signature_kind(&self) -> Option<SignatureKind> {
        match self {
            Key::Ed25519(_) => Some(SignatureKind::Ed25519),
            Key::EcdsaSecp256k1(_) => Some(SignatureKind::EcdsaSecp256k1),
            _ => None,
        }
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Ed25519(raw) => write!(f, "Ed25519({})", hex::encode(raw)),
            Key::EcdsaSecp256k1(raw) => write!(f, "EcdsaSecp256k1({})", hex::encode(raw)),
            Key::KeyList(list) => f.debug_tuple("KeyList").field(&list.keys).finish(),
            Key::ThresholdKey(t) => f
                .debug_struct("ThresholdKey")
                .field("threshold", &t.threshold)
                .field("keys", &t.keys.keys)
                .finish(),
            Key::Rsa3072(raw) => write!(f, "Rsa3072({})", hex::encode(raw)),
            Key::Ecdsa384(raw) => write!(f, "Ecdsa384({})", hex::encode(raw)),
            Key::ContractId(id) => write!(f, "ContractId({id})"),
            Key::DelegatableContractId(id) => write!(f, "DelegatableContractId({id})"),
            Key::Unset => f.write_str("Unset"),
        }
    }
}

impl KeyList {
    pub fn new<I: IntoIterator<Item = Key>>(keys: I) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_constructors_check_length() {
        assert!(Key::ed25519_from_slice(&[1u8; 32]).is_ok());
        assert!(matches!(
            Key::ed25519_from_slice(&[1u8; 31]),
            Err(Error::InvalidKey(_))
        ));
        assert!(Key::ecdsa_from_slice(&[2u8; 33]).is_ok());
        assert!(matches!(
            Key::ecdsa_from_slice(&[2u8; 32]),
            Err(Error::InvalidKey(_))
        ));
    }

    #[test]
    fn test_value_equality_across_tree_positions() {
        let a = Key::Ed25519([7u8; 32]);
        let nested = Key::threshold(1, [Key::key_list([a.clone()])]);
        let Key::ThresholdKey(t) = &nested else {
            panic!("expected threshold key");
        };
        let Key::KeyList(list) = &t.keys.keys[0] else {
            panic!("expected key list");
        };
        assert_eq!(list.keys[0], a);
    }

    #[test]
    fn test_raw_bytes_only_for_primitives() {
        assert_eq!(Key::Ed25519([1u8; 32]).raw_bytes().map(<[u8]>::len), Some(32));
        assert_eq!(
            Key::EcdsaSecp256k1([2u8; 33]).raw_bytes().map(<[u8]>::len),
            Some(33)
        );
        assert!(Key::key_list([]).raw_bytes().is_none());
        assert!(Key::Rsa3072(vec![1, 2, 3]).raw_bytes().is_none());
        assert!(Key::Unset.signature_kind().is_none());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Key::Ed25519([0u8; 32]).kind().to_string(), "ED25519");
        assert_eq!(
            Key::ContractId(ContractId::default()).kind().as_str(),
            "CONTRACT_ID"
        );
        assert_eq!(Key::threshold(2, []).kind(), KeyKind::ThresholdKey);
    }

    #[test]
    fn test_debug_is_hex() {
        let key = Key::Ed25519([0xab; 32]);
        assert!(format!("{key:?}").starts_with("Ed25519(abab"));
    }
}
