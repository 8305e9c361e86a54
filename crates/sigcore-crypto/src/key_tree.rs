//! Flattening of nested key structures into their primitive leaves

use sigcore_errors::{Error, Result};
use sigcore_types::Key;
use std::collections::HashSet;

/// Distinct primitive leaves of `key` in first-seen depth-first order.
///
/// `KeyList` and `ThresholdKey` are walked without applying thresholds. Any other non-primitive
/// kind anywhere in the tree fails the whole walk.
pub fn leaves_of(key: &Key) -> Result<Vec<&Key>> {
    let mut leaves = Vec::new();
    let mut seen = HashSet::new();
    collect(key, &mut leaves, &mut seen)?;
    Ok(leaves)
}

fn collect<'a>(
    key: &'a Key,
    leaves: &mut Vec<&'a Key>,
    seen: &mut HashSet<&'a Key>,
) -> Result<()> {
    match key {
        Key::Ed25519(_) | Key::EcdsaSecp256k1(_) => {
            if seen.insert(key) {
                leaves.push(key);
            }
        }
        Key::KeyList(list) => {
            for child in &list.keys {
                collect(child, leaves, seen)?;
            }
        }
        Key::ThresholdKey(threshold) => {
            for child in &threshold.keys.keys {
                collect(child, leaves, seen)?;
            }
        }
        other => return Err(Error::UnsupportedKeyKind(other.kind().to_string())),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigcore_types::ContractId;

    fn ed(b: u8) -> Key {
        Key::Ed25519([b; 32])
    }

    fn ecdsa(b: u8) -> Key {
        let mut raw = [b; 33];
        raw[0] = 0x02;
        Key::EcdsaSecp256k1(raw)
    }

    #[test]
    fn test_single_leaf() {
        let key = ed(1);
        assert_eq!(leaves_of(&key).unwrap(), vec![&key]);
    }

    #[test]
    fn test_nested_order_is_depth_first() {
        let key = Key::key_list([
            ed(1),
            Key::threshold(1, [ecdsa(2), Key::key_list([ed(3)])]),
            ed(4),
        ]);
        let leaves = leaves_of(&key).unwrap();
        assert_eq!(leaves, vec![&ed(1), &ecdsa(2), &ed(3), &ed(4)]);
    }

    #[test]
    fn test_duplicates_keep_first_position() {
        let key = Key::key_list([ed(1), ed(2), Key::threshold(1, [ed(1), ed(1)]), ed(2)]);
        assert_eq!(leaves_of(&key).unwrap(), vec![&ed(1), &ed(2)]);
    }

    #[test]
    fn test_threshold_with_repeated_key_yields_one_leaf() {
        let key = Key::threshold(1, [ed(7), ed(7)]);
        assert_eq!(leaves_of(&key).unwrap().len(), 1);
    }

    #[test]
    fn test_empty_structures() {
        assert!(leaves_of(&Key::key_list([])).unwrap().is_empty());
        assert!(leaves_of(&Key::threshold(0, [])).unwrap().is_empty());
    }

    #[test]
    fn test_unsupported_kinds_fail() {
        let unsupported = [
            Key::Rsa3072(vec![1, 2, 3]),
            Key::Ecdsa384(vec![4, 5]),
            Key::ContractId(ContractId::default()),
            Key::DelegatableContractId(ContractId::default()),
            Key::Unset,
        ];
        for key in unsupported {
            let nested = Key::key_list([ed(1), Key::threshold(1, [key.clone()])]);
            assert_eq!(
                leaves_of(&nested),
                Err(Error::UnsupportedKeyKind(key.kind().to_string()))
            );
        }
    }
}
