use hmac_sha512::sha384 as hmac_sha384;
use rand::RngCore;
use zeroize::Zeroize;

use crate::alg::HashStrength;

/// Shortest secret accepted for HMAC algorithms, in bytes
pub const MIN_HMAC_KEY_LENGTH: usize = 12;

/// A symmetric secret for HS256/HS384/HS512.
#[derive(Clone)]
pub struct HMACKey {
    raw_key: Vec<u8>,
}

impl Drop for HMACKey {
    fn drop(&mut self) {
        self.raw_key.zeroize();
    }
}

impl std::fmt::Debug for HMACKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HMACKey")
            .field("len", &self.raw_key.len())
            .finish()
    }
}

impl HMACKey {
    /// Create a HMAC key from a byte slice.
    pub fn from_bytes(raw_key: &[u8]) -> Self {
        HMACKey {
            raw_key: raw_key.to_vec(),
        }
    }

    /// Convert the HMAC key to a byte slice.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.raw_key.clone()
    }

    /// Generate a random HMAC key.
    pub fn generate() -> Self {
        let mut raw_key = vec![0u8; 32];
        rand::thread_rng().fill_bytes(&mut raw_key);
        HMACKey { raw_key }
    }

    pub fn len(&self) -> usize {
        self.raw_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw_key.is_empty()
    }

    pub(crate) fn authentication_tag(&self, hash: HashStrength, authenticated: &[u8]) -> Vec<u8> {
        match hash {
            HashStrength::SHA256 => hmac_sha256::HMAC::mac(authenticated, &self.raw_key).to_vec(),
            HashStrength::SHA384 => hmac_sha384::HMAC::mac(authenticated, &self.raw_key).to_vec(),
            HashStrength::SHA512 => {
                hmac_sha512::HMAC::mac(authenticated, &self.raw_key).to_vec()
            }
        }
    }
}

impl AsRef<[u8]> for HMACKey {
    /// Get the raw key, as a byte slice
    fn as_ref(&self) -> &[u8] {
        &self.raw_key
    }
}

#[cfg(test)]
mod tests {
    use ct_codecs::{Encoder, Hex};

    use super::*;

    #[test]
    fn tag_lengths() {
        let key = HMACKey::generate();
        assert_eq!(key.len(), 32);
        assert_eq!(key.authentication_tag(HashStrength::SHA256, b"m").len(), 32);
        assert_eq!(key.authentication_tag(HashStrength::SHA384, b"m").len(), 48);
        assert_eq!(key.authentication_tag(HashStrength::SHA512, b"m").len(), 64);
    }

    #[test]
    fn rfc4231_test_case_2() {
        let key = HMACKey::from_bytes(b"Jefe");
        let tag = key.authentication_tag(
            HashStrength::SHA256,
            b"what do ya want for nothing?",
        );
        assert_eq!(
            Hex::encode_to_string(tag).unwrap(),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }
}
