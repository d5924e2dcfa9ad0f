use std::sync::Arc;

use crate::alg::{AlgorithmId, KeyFamily};
use crate::error::*;
use crate::header::Header;
use crate::key::SharedKey;

/// A signature algorithm bound to a key.
///
/// The binding is checked once, at construction: the key family must match
/// the algorithm family, and the key must be strong enough. Verification is
/// gated by the algorithm identity, not only by the key: an `RS384` instance
/// never accepts a signature computed for `RS256`, even over the same key.
#[derive(Debug, Clone)]
pub struct Algorithm {
    id: AlgorithmId,
    key: SharedKey,
    key_id: Option<String>,
}

impl Algorithm {
    /// Bind `id` to `key`.
    ///
    /// Fails with `FamilyMismatch` if the key belongs to another family, or
    /// `KeyTooWeak` if the key is below the accepted size.
    pub fn new(id: AlgorithmId, key: impl Into<SharedKey>) -> Result<Self, Error> {
        let key = key.into();
        key.check_compatibility(id)?;
        Ok(Algorithm {
            id,
            key,
            key_id: None,
        })
    }

    /// Set the key identifier advertised in the "kid" header of signed tokens
    pub fn with_key_id(mut self, key_id: impl ToString) -> Self {
        self.key_id = Some(key_id.to_string());
        self
    }

    pub fn id(&self) -> AlgorithmId {
        self.id
    }

    pub fn key_family(&self) -> KeyFamily {
        self.id.family()
    }

    pub fn key(&self) -> &SharedKey {
        &self.key
    }

    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    /// Bind the same algorithm to the verification key derived from this one
    pub fn public_algorithm(&self) -> Result<Self, Error> {
        let pk = self.key.public_key()?;
        Ok(Algorithm {
            id: self.id,
            key: Arc::new(pk),
            key_id: self.key_id.clone(),
        })
    }

    /// The header that tokens signed with this algorithm carry
    pub fn header(&self) -> Header {
        let header = Header::new(self.id);
        match &self.key_id {
            Some(key_id) => header.with_key_id(key_id),
            None => header,
        }
    }

    /// Sign a message.
    ///
    /// HMAC tags are deterministic. RSA PKCS#1 v1.5 and P-521 signatures are
    /// deterministic; PSS, P-256 and P-384 signatures are randomized.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, Error> {
        self.key.sign(self.id, message)
    }

    /// Verify a signature over a message.
    ///
    /// Returns `false` if the signature doesn't match, including when it has
    /// the wrong size or encoding for this algorithm.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool, Error> {
        self.key.verify(self.id, message, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::*;
    use crate::key::KeyMaterial;

    fn construction_error(id: AlgorithmId, key: &SharedKey) -> JoseError {
        match Algorithm::new(id, key.clone()).unwrap_err().downcast::<JoseError>() {
            Ok(e) => e,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    #[test]
    fn create_rsa_algorithms() {
        let key = KeyMaterial::generate_rsa(1024).unwrap().shared();
        let algorithms: Vec<Algorithm> = [
            AlgorithmId::RS256,
            AlgorithmId::RS384,
            AlgorithmId::RS512,
            AlgorithmId::PS256,
        ]
        .iter()
        .map(|id| Algorithm::new(*id, key.clone()).unwrap())
        .collect();
        assert!(matches!(
            construction_error(AlgorithmId::HS256, &key),
            JoseError::FamilyMismatch
        ));
        assert!(matches!(
            construction_error(AlgorithmId::ES384, &key),
            JoseError::FamilyMismatch
        ));
        assert_eq!(Arc::strong_count(&key), 1 + algorithms.len());
    }

    #[test]
    fn rsa_size_checked_at_construction() {
        let e = [0x01, 0x00, 0x01];
        let mut n = vec![0xffu8; 128];
        n[0] = 0x7f;
        for n in [vec![0xffu8; 64], n].iter() {
            let pk = RSAPublicKey::from_components(n, &e).unwrap();
            assert!(pk.modulus_bits() < MIN_RSA_MODULUS_BITS);
            let key = KeyMaterial::from(pk).shared();
            assert!(matches!(
                construction_error(AlgorithmId::RS256, &key),
                JoseError::KeyTooWeak
            ));
            assert!(matches!(
                construction_error(AlgorithmId::PS256, &key),
                JoseError::KeyTooWeak
            ));
        }
        let pk = RSAPublicKey::from_components(&[0xffu8; 128], &e).unwrap();
        assert!(Algorithm::new(AlgorithmId::RS256, KeyMaterial::from(pk)).is_ok());
    }

    #[test]
    fn create_hmac_algorithms() {
        let key = KeyMaterial::from(HMACKey::from_bytes(b"your-256-bit-secret")).shared();
        assert!(Algorithm::new(AlgorithmId::HS256, key.clone()).is_ok());
        assert!(matches!(
            construction_error(AlgorithmId::RS256, &key),
            JoseError::FamilyMismatch
        ));
        let weak = KeyMaterial::from(HMACKey::from_bytes(b"")).shared();
        assert!(matches!(
            construction_error(AlgorithmId::HS512, &weak),
            JoseError::KeyTooWeak
        ));
    }

    #[test]
    fn create_ec_algorithms() {
        let key = KeyMaterial::generate_ec(ECCurve::P521).shared();
        assert!(Algorithm::new(AlgorithmId::ES512, key.clone()).is_ok());
        assert!(matches!(
            construction_error(AlgorithmId::ES256, &key),
            JoseError::FamilyMismatch
        ));
        assert!(matches!(
            construction_error(AlgorithmId::HS512, &key),
            JoseError::FamilyMismatch
        ));
    }

    #[test]
    fn hmac_is_deterministic() {
        let alg = Algorithm::new(
            AlgorithmId::HS384,
            KeyMaterial::from(HMACKey::from_bytes(b"your-256-bit-secret")),
        )
        .unwrap();
        let tag = alg.sign(b"message").unwrap();
        assert_eq!(tag, alg.sign(b"message").unwrap());
        assert!(alg.verify(b"message", &tag).unwrap());
        assert!(!alg.verify(b"message", &tag[1..]).unwrap());
    }

    #[test]
    fn algorithm_identity_gates_verification() {
        let key = KeyMaterial::generate_rsa(1024).unwrap().shared();
        let rs256 = Algorithm::new(AlgorithmId::RS256, key.clone()).unwrap();
        let rs384 = Algorithm::new(AlgorithmId::RS384, key.clone()).unwrap();
        let rs256_pub = rs256.public_algorithm().unwrap();
        let rs384_pub = rs384.public_algorithm().unwrap();
        let signature = rs256.sign(b"message").unwrap();
        assert!(rs256_pub.verify(b"message", &signature).unwrap());
        assert!(!rs384_pub.verify(b"message", &signature).unwrap());
    }

    #[test]
    fn public_algorithm_cannot_sign() {
        let alg = Algorithm::new(AlgorithmId::ES256, KeyMaterial::generate_ec(ECCurve::P256))
            .unwrap()
            .with_key_id("k1");
        let public = alg.public_algorithm().unwrap();
        assert_eq!(public.key_id(), Some("k1"));
        assert!(public.sign(b"m").is_err());
        let signature = alg.sign(b"m").unwrap();
        assert!(public.verify(b"m", &signature).unwrap());
    }
}
