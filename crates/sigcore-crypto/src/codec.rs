//! Key encoding helpers: secp256k1 decompression, EVM alias derivation and Keccak-256

use k256::elliptic_curve::sec1::ToEncodedPoint;
use sha3::{Digest, Keccak256};
use sigcore_errors::{Error, Result};
use sigcore_types::{
    EvmAlias, ECDSA_COMPRESSED_KEY_LEN, ECDSA_UNCOMPRESSED_KEY_LEN, EVM_ALIAS_LEN, KECCAK_256_LEN,
};

/// Key transformations needed by expansion and verification
pub trait KeyCodec: Send + Sync {
    /// Decompress a 33-byte SEC1 key into its 65-byte uncompressed form
    fn decompress_secp256k1(&self, compressed: &[u8; ECDSA_COMPRESSED_KEY_LEN]) -> Result<Vec<u8>>;

    /// Last 20 bytes of the Keccak-256 hash of the key's X and Y coordinates.
    ///
    /// Accepts the 65-byte SEC1 encoding or the bare 64 coordinate bytes.
    fn derive_evm_alias(&self, uncompressed: &[u8]) -> Result<EvmAlias>;

    fn keccak256(&self, data: &[u8]) -> [u8; KECCAK_256_LEN];
}

/// [`KeyCodec`] backed by `k256` and `sha3`
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1Codec;

impl KeyCodec for Secp256k1Codec {
    fn decompress_secp256k1(&self, compressed: &[u8; ECDSA_COMPRESSED_KEY_LEN]) -> Result<Vec<u8>> {
        let key = k256::PublicKey::from_sec1_bytes(compressed)
            .map_err(|e| Error::InvalidKey(format!("secp256k1 point: {e}")))?;
        Ok(key.to_encoded_point(false).as_bytes().to_vec())
    }

    fn derive_evm_alias(&self, uncompressed: &[u8]) -> Result<EvmAlias> {
        let coordinates = match uncompressed.len() {
            ECDSA_UNCOMPRESSED_KEY_LEN if uncompressed[0] == 0x04 => &uncompressed[1..],
            64 => uncompressed,
            len => {
                return Err(Error::InvalidKey(format!(
                    "expected an uncompressed secp256k1 key, got {len} bytes"
                )))
            }
        };

        let hash = keccak256(coordinates);
        let mut alias = [0u8; EVM_ALIAS_LEN];
        alias.copy_from_slice(&hash[KECCAK_256_LEN - EVM_ALIAS_LEN..]);
        Ok(EvmAlias::new(alias))
    }

    fn keccak256(&self, data: &[u8]) -> [u8; KECCAK_256_LEN] {
        keccak256(data)
    }
}

pub fn keccak256(data: &[u8]) -> [u8; KECCAK_256_LEN] {
    Keccak256::digest(data).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{PrivateKey, PublicKey};

    #[test]
    fn test_keccak_empty_input() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_decompress_matches_k256_encoding() {
        let public = PrivateKey::secp256k1_from_bytes(&[3u8; 32])
            .unwrap()
            .public_key();
        let compressed: [u8; 33] = public.to_bytes().try_into().unwrap();

        let uncompressed = Secp256k1Codec.decompress_secp256k1(&compressed).unwrap();
        assert_eq!(uncompressed.len(), ECDSA_UNCOMPRESSED_KEY_LEN);
        assert_eq!(uncompressed[0], 0x04);
        assert_eq!(&uncompressed[1..33], &compressed[1..]);

        let PublicKey::Secp256k1(inner) = public else {
            panic!("expected secp256k1");
        };
        assert_eq!(uncompressed, inner.to_encoded_point(false).as_bytes());
    }

    #[test]
    fn test_decompress_rejects_off_curve_points() {
        let mut bogus = [0xffu8; 33];
        bogus[0] = 0x02;
        assert!(matches!(
            Secp256k1Codec.decompress_secp256k1(&bogus),
            Err(Error::InvalidKey(_))
        ));
    }

    #[test]
    fn test_evm_alias_of_generator_point() {
        // private key 1 has the well known address 0x7e5f...bdf
        let mut scalar = [0u8; 32];
        scalar[31] = 1;
        let public = PrivateKey::secp256k1_from_bytes(&scalar)
            .unwrap()
            .public_key();
        let compressed: [u8; 33] = public.to_bytes().try_into().unwrap();
        let uncompressed = Secp256k1Codec.decompress_secp256k1(&compressed).unwrap();

        let alias = Secp256k1Codec.derive_evm_alias(&uncompressed).unwrap();
        assert_eq!(
            alias.to_string(),
            "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );

        let bare = Secp256k1Codec.derive_evm_alias(&uncompressed[1..]).unwrap();
        assert_eq!(bare, alias);
    }

    #[test]
    fn test_evm_alias_rejects_compressed_input() {
        assert!(Secp256k1Codec.derive_evm_alias(&[0x02; 33]).is_err());
        let mut wrong_tag = [0u8; 65];
        wrong_tag[0] = 0x02;
        assert!(Secp256k1Codec.derive_evm_alias(&wrong_tag).is_err());
    }
}
