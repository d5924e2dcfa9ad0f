#[cfg(any(feature = "pure-rust", target_arch = "wasm32", target_arch = "wasm64"))]
use superboring as boring;

use boring::bn::BigNum;
use boring::hash::MessageDigest;
use boring::pkey::{HasPublic, PKey, Private, Public};
use boring::rsa::{Padding, Rsa};
use boring::sign::{Signer, Verifier};
use ct_codecs::{Base64UrlSafeNoPadding, Encoder};
use hmac_sha1_compact::Hash as SHA1;
use hmac_sha256::Hash as SHA256;

use crate::alg::{AlgorithmId, HashStrength};
use crate::error::*;

/// Smallest RSA modulus accepted, in bits.
///
/// 1024-bit moduli are weak; new keys should be at least 2048 bits.
pub const MIN_RSA_MODULUS_BITS: usize = 1024;

#[derive(Debug, Clone)]
pub struct RSAPublicKey(Rsa<Public>);

impl AsRef<Rsa<Public>> for RSAPublicKey {
    fn as_ref(&self) -> &Rsa<Public> {
        &self.0
    }
}

pub struct RSAPublicKeyComponents {
    pub n: Vec<u8>,
    pub e: Vec<u8>,
}

impl RSAPublicKey {
    pub fn from_der(der: &[u8]) -> Result<Self, Error> {
        let rsa_pk = Rsa::<Public>::public_key_from_der(der)
            .or_else(|_| Rsa::<Public>::public_key_from_der_pkcs1(der))?;
        Ok(RSAPublicKey(rsa_pk))
    }

    pub fn from_pem(pem: &str) -> Result<Self, Error> {
        let pem = pem.trim();
        let rsa_pk = Rsa::<Public>::public_key_from_pem(pem.as_bytes())
            .or_else(|_| Rsa::<Public>::public_key_from_pem_pkcs1(pem.as_bytes()))?;
        Ok(RSAPublicKey(rsa_pk))
    }

    pub fn from_components(n: &[u8], e: &[u8]) -> Result<Self, Error> {
        let n = BigNum::from_slice(n)?;
        let e = BigNum::from_slice(e)?;
        let rsa_pk = Rsa::<Public>::from_public_components(n, e)?;
        Ok(RSAPublicKey(rsa_pk))
    }

    pub fn to_der(&self) -> Result<Vec<u8>, Error> {
        self.0.public_key_to_der().map_err(Into::into)
    }

    pub fn to_pem(&self) -> Result<String, Error> {
        let bytes = self.0.public_key_to_pem()?;
        let pem = String::from_utf8(bytes)?;
        Ok(pem)
    }

    pub fn to_components(&self) -> RSAPublicKeyComponents {
        let n = self.0.n().to_vec();
        let e = self.0.e().to_vec();
        RSAPublicKeyComponents { n, e }
    }

    pub fn modulus_bits(&self) -> usize {
        self.0.n().num_bits() as usize
    }

    pub fn sha1_thumbprint(&self) -> Result<String, Error> {
        Ok(Base64UrlSafeNoPadding::encode_to_string(SHA1::hash(
            &self.to_der()?,
        ))?)
    }

    pub fn sha256_thumbprint(&self) -> Result<String, Error> {
        Ok(Base64UrlSafeNoPadding::encode_to_string(SHA256::hash(
            &self.to_der()?,
        ))?)
    }

    pub(crate) fn verify(
        &self,
        alg: AlgorithmId,
        authenticated: &[u8],
        signature: &[u8],
    ) -> Result<bool, Error> {
        let pkey = PKey::from_rsa(self.0.clone())?;
        verify_with_pkey(&pkey, alg, authenticated, signature)
    }
}

#[derive(Debug, Clone)]
pub struct RSAKeyPair {
    rsa_sk: Rsa<Private>,
}

impl AsRef<Rsa<Private>> for RSAKeyPair {
    fn as_ref(&self) -> &Rsa<Private> {
        &self.rsa_sk
    }
}

impl RSAKeyPair {
    pub(crate) fn from_rsa(rsa_sk: Rsa<Private>) -> Result<Self, Error> {
        if !(rsa_sk.check_key()?) {
            bail!(JoseError::InternalError("invalid RSA key pair".to_string()));
        }
        Ok(RSAKeyPair { rsa_sk })
    }

    pub fn from_der(der: &[u8]) -> Result<Self, Error> {
        Self::from_rsa(Rsa::<Private>::private_key_from_der(der)?)
    }

    pub fn from_pem(pem: &str) -> Result<Self, Error> {
        let pem = pem.trim();
        Self::from_rsa(Rsa::<Private>::private_key_from_pem(pem.as_bytes())?)
    }

    pub fn to_der(&self) -> Result<Vec<u8>, Error> {
        self.rsa_sk.private_key_to_der().map_err(Into::into)
    }

    pub fn to_pem(&self) -> Result<String, Error> {
        let bytes = self.rsa_sk.private_key_to_pem()?;
        let pem = String::from_utf8(bytes)?;
        Ok(pem)
    }

    /// Derive the public key
    pub fn public_key(&self) -> Result<RSAPublicKey, Error> {
        let rsa_pk = Rsa::<Public>::from_public_components(
            self.rsa_sk.n().to_owned()?,
            self.rsa_sk.e().to_owned()?,
        )?;
        Ok(RSAPublicKey(rsa_pk))
    }

    /// Generate a new key pair.
    ///
    /// Moduli smaller than `MIN_RSA_MODULUS_BITS` are rejected with `KeyTooWeak`.
    pub fn generate(modulus_bits: usize) -> Result<Self, Error> {
        ensure!(
            modulus_bits >= MIN_RSA_MODULUS_BITS,
            JoseError::KeyTooWeak
        );
        let rsa_sk = Rsa::<Private>::generate(modulus_bits as _)?;
        Ok(RSAKeyPair { rsa_sk })
    }

    pub fn modulus_bits(&self) -> usize {
        self.rsa_sk.n().num_bits() as usize
    }

    pub(crate) fn sign(&self, alg: AlgorithmId, authenticated: &[u8]) -> Result<Vec<u8>, Error> {
        let pkey = PKey::from_rsa(self.rsa_sk.clone())?;
        let mut signer = Signer::new(message_digest(alg.hash()), &pkey)?;
        signer.set_rsa_padding(padding_scheme(alg))?;
        signer.update(authenticated)?;
        Ok(signer.sign_to_vec()?)
    }

    pub(crate) fn verify(
        &self,
        alg: AlgorithmId,
        authenticated: &[u8],
        signature: &[u8],
    ) -> Result<bool, Error> {
        let pkey = PKey::from_rsa(self.rsa_sk.clone())?;
        verify_with_pkey(&pkey, alg, authenticated, signature)
    }
}

fn message_digest(hash: HashStrength) -> MessageDigest {
    match hash {
        HashStrength::SHA256 => MessageDigest::sha256(),
        HashStrength::SHA384 => MessageDigest::sha384(),
        HashStrength::SHA512 => MessageDigest::sha512(),
    }
}

fn padding_scheme(alg: AlgorithmId) -> Padding {
    if alg.is_pss() {
        Padding::PKCS1_PSS
    } else {
        Padding::PKCS1
    }
}

fn verify_with_pkey<T: HasPublic>(
    pkey: &PKey<T>,
    alg: AlgorithmId,
    authenticated: &[u8],
    signature: &[u8],
) -> Result<bool, Error> {
    let mut verifier = Verifier::new(message_digest(alg.hash()), pkey)?;
    verifier.set_rsa_padding(padding_scheme(alg))?;
    verifier.update(authenticated)?;
    // A signature that cannot be decoded with this key is a mismatch, not a failure
    Ok(verifier.verify(signature).unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsa_gen_invalid_size() {
        let err = RSAKeyPair::generate(1023).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<JoseError>(),
            Some(JoseError::KeyTooWeak)
        ));
        assert!(RSAKeyPair::generate(512).is_err());
    }

    #[test]
    fn rsa_gen_smallest_size() {
        let key_pair = RSAKeyPair::generate(1024).unwrap();
        assert_eq!(key_pair.modulus_bits(), 1024);
        assert_eq!(key_pair.public_key().unwrap().modulus_bits(), 1024);
    }

    #[test]
    fn pem_and_components() {
        let key_pair = RSAKeyPair::generate(1024).unwrap();
        let pem = key_pair.to_pem().unwrap();
        let key_pair2 = RSAKeyPair::from_pem(&pem).unwrap();
        assert_eq!(key_pair2.to_der().unwrap(), key_pair.to_der().unwrap());

        let pk = key_pair.public_key().unwrap();
        let pk2 = RSAPublicKey::from_pem(&pk.to_pem().unwrap()).unwrap();
        let components = pk2.to_components();
        let pk3 = RSAPublicKey::from_components(&components.n, &components.e).unwrap();
        assert_eq!(pk3.to_der().unwrap(), pk.to_der().unwrap());
        assert_eq!(
            pk3.sha256_thumbprint().unwrap(),
            pk.sha256_thumbprint().unwrap()
        );
        assert_eq!(pk.sha1_thumbprint().unwrap().len(), 27);
    }

    #[test]
    fn sign_verify_paddings() {
        let key_pair = RSAKeyPair::generate(1024).unwrap();
        let pk = key_pair.public_key().unwrap();
        for alg in [AlgorithmId::RS256, AlgorithmId::PS384, AlgorithmId::RS512].iter() {
            let signature = key_pair.sign(*alg, b"message").unwrap();
            assert_eq!(signature.len(), 128);
            assert!(pk.verify(*alg, b"message", &signature).unwrap());
            assert!(key_pair.verify(*alg, b"message", &signature).unwrap());
            assert!(!pk.verify(*alg, b"messagf", &signature).unwrap());
            assert!(!pk.verify(*alg, b"message", &signature[1..]).unwrap());
        }
    }
}
