use std::sync::Arc;

use crate::alg::{AlgorithmId, KeyFamily};
use crate::algorithms::*;
use crate::common::timingsafe_eq;
use crate::error::*;

/// Key material shared between algorithm instances
pub type SharedKey = Arc<KeyMaterial>;

/// A key, tagged with its cryptographic family.
///
/// Key material is immutable once built. Wrap it in a `SharedKey` to bind the
/// same key to several algorithms.
#[derive(Debug)]
pub enum KeyMaterial {
    HMAC(HMACKey),
    RSAKeyPair(RSAKeyPair),
    RSAPublicKey(RSAPublicKey),
    ECKeyPair(ECKeyPair),
    ECPublicKey(ECPublicKey),
}

impl KeyMaterial {
    /// Generate a random 256-bit HMAC secret
    pub fn generate_hmac() -> Self {
        KeyMaterial::HMAC(HMACKey::generate())
    }

    /// Generate an RSA key pair; fails with `KeyTooWeak` below 1024 bits
    pub fn generate_rsa(modulus_bits: usize) -> Result<Self, Error> {
        Ok(KeyMaterial::RSAKeyPair(RSAKeyPair::generate(modulus_bits)?))
    }

    pub fn generate_ec(curve: ECCurve) -> Self {
        KeyMaterial::ECKeyPair(ECKeyPair::generate(curve))
    }

    pub fn family(&self) -> KeyFamily {
        match self {
            KeyMaterial::HMAC(_) => KeyFamily::HMAC,
            KeyMaterial::RSAKeyPair(_) | KeyMaterial::RSAPublicKey(_) => KeyFamily::RSA,
            KeyMaterial::ECKeyPair(_) | KeyMaterial::ECPublicKey(_) => KeyFamily::EC,
        }
    }

    /// `true` if this key can produce signatures
    pub fn can_sign(&self) -> bool {
        !matches!(
            self,
            KeyMaterial::RSAPublicKey(_) | KeyMaterial::ECPublicKey(_)
        )
    }

    /// Derive the verification key.
    ///
    /// A symmetric secret is its own verification key.
    pub fn public_key(&self) -> Result<KeyMaterial, Error> {
        let pk = match self {
            KeyMaterial::HMAC(key) => KeyMaterial::HMAC(key.clone()),
            KeyMaterial::RSAKeyPair(key_pair) => KeyMaterial::RSAPublicKey(key_pair.public_key()?),
            KeyMaterial::RSAPublicKey(pk) => KeyMaterial::RSAPublicKey(pk.clone()),
            KeyMaterial::ECKeyPair(key_pair) => KeyMaterial::ECPublicKey(key_pair.public_key()),
            KeyMaterial::ECPublicKey(pk) => {
                KeyMaterial::ECPublicKey(ECPublicKey::from_bytes(pk.curve(), &pk.to_bytes())?)
            }
        };
        Ok(pk)
    }

    pub fn shared(self) -> SharedKey {
        Arc::new(self)
    }

    /// Check that this key can be used with `alg`
    pub(crate) fn check_compatibility(&self, alg: AlgorithmId) -> Result<(), Error> {
        ensure!(self.family() == alg.family(), JoseError::FamilyMismatch);
        match self {
            KeyMaterial::HMAC(key) => {
                ensure!(key.len() >= MIN_HMAC_KEY_LENGTH, JoseError::KeyTooWeak);
            }
            KeyMaterial::RSAKeyPair(key_pair) => {
                ensure!(
                    key_pair.modulus_bits() >= MIN_RSA_MODULUS_BITS,
                    JoseError::KeyTooWeak
                );
            }
            KeyMaterial::RSAPublicKey(pk) => {
                ensure!(
                    pk.modulus_bits() >= MIN_RSA_MODULUS_BITS,
                    JoseError::KeyTooWeak
                );
            }
            KeyMaterial::ECKeyPair(key_pair) => {
                ensure!(
                    key_pair.curve().algorithm() == alg,
                    JoseError::FamilyMismatch
                );
            }
            KeyMaterial::ECPublicKey(pk) => {
                ensure!(pk.curve().algorithm() == alg, JoseError::FamilyMismatch);
            }
        }
        Ok(())
    }

    pub(crate) fn sign(&self, alg: AlgorithmId, authenticated: &[u8]) -> Result<Vec<u8>, Error> {
        match self {
            KeyMaterial::HMAC(key) => Ok(key.authentication_tag(alg.hash(), authenticated)),
            KeyMaterial::RSAKeyPair(key_pair) => key_pair.sign(alg, authenticated),
            KeyMaterial::ECKeyPair(key_pair) => key_pair.sign(authenticated),
            KeyMaterial::RSAPublicKey(_) | KeyMaterial::ECPublicKey(_) => {
                bail!(JoseError::PrivateKeyRequired)
            }
        }
    }

    pub(crate) fn verify(
        &self,
        alg: AlgorithmId,
        authenticated: &[u8],
        signature: &[u8],
    ) -> Result<bool, Error> {
        match self {
            KeyMaterial::HMAC(key) => Ok(timingsafe_eq(
                &key.authentication_tag(alg.hash(), authenticated),
                signature,
            )),
            KeyMaterial::RSAKeyPair(key_pair) => key_pair.verify(alg, authenticated, signature),
            KeyMaterial::RSAPublicKey(pk) => pk.verify(alg, authenticated, signature),
            KeyMaterial::ECKeyPair(key_pair) => key_pair.verify(authenticated, signature),
            KeyMaterial::ECPublicKey(pk) => pk.verify(authenticated, signature),
        }
    }
}

impl From<HMACKey> for KeyMaterial {
    fn from(key: HMACKey) -> Self {
        KeyMaterial::HMAC(key)
    }
}

impl From<RSAKeyPair> for KeyMaterial {
    fn from(key_pair: RSAKeyPair) -> Self {
        KeyMaterial::RSAKeyPair(key_pair)
    }
}

impl From<RSAPublicKey> for KeyMaterial {
    fn from(pk: RSAPublicKey) -> Self {
        KeyMaterial::RSAPublicKey(pk)
    }
}

impl From<ECKeyPair> for KeyMaterial {
    fn from(key_pair: ECKeyPair) -> Self {
        KeyMaterial::ECKeyPair(key_pair)
    }
}

impl From<ECPublicKey> for KeyMaterial {
    fn from(pk: ECPublicKey) -> Self {
        KeyMaterial::ECPublicKey(pk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn families_and_derivation() {
        let hmac = KeyMaterial::generate_hmac();
        assert_eq!(hmac.family(), KeyFamily::HMAC);
        assert!(hmac.public_key().unwrap().can_sign());

        let rsa = KeyMaterial::generate_rsa(1024).unwrap();
        assert_eq!(rsa.family(), KeyFamily::RSA);
        assert!(rsa.can_sign());
        let rsa_pk = rsa.public_key().unwrap();
        assert_eq!(rsa_pk.family(), KeyFamily::RSA);
        assert!(!rsa_pk.can_sign());

        let ec = KeyMaterial::generate_ec(ECCurve::P384);
        let ec_pk = ec.public_key().unwrap();
        assert_eq!(ec_pk.family(), KeyFamily::EC);
        assert!(!ec_pk.can_sign());
        assert!(ec_pk.public_key().is_ok());
    }

    #[test]
    fn public_keys_cannot_sign() {
        let rsa_pk = KeyMaterial::generate_rsa(1024).unwrap().public_key().unwrap();
        let err = rsa_pk.sign(AlgorithmId::RS256, b"m").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<JoseError>(),
            Some(JoseError::PrivateKeyRequired)
        ));
    }

    #[test]
    fn compatibility() {
        let ec = KeyMaterial::generate_ec(ECCurve::P256);
        assert!(ec.check_compatibility(AlgorithmId::ES256).is_ok());
        assert!(ec.check_compatibility(AlgorithmId::ES384).is_err());
        assert!(ec.check_compatibility(AlgorithmId::RS256).is_err());

        let weak = KeyMaterial::from(HMACKey::from_bytes(b"short"));
        let err = weak.check_compatibility(AlgorithmId::HS256).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<JoseError>(),
            Some(JoseError::KeyTooWeak)
        ));
    }
}
