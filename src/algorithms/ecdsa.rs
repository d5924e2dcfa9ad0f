use std::convert::TryFrom;
use std::fmt;

use p256::ecdsa::signature::{DigestVerifier as _, RandomizedDigestSigner as _};
use p256::pkcs8::{DecodePrivateKey as _, DecodePublicKey as _};
use p256::pkcs8::{EncodePrivateKey as _, EncodePublicKey as _};
use p521::ecdsa::signature::{Signer as _, Verifier as _};

use crate::alg::AlgorithmId;
use crate::error::*;

/// NIST curve backing an EC key
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ECCurve {
    P256,
    P384,
    P521,
}

impl ECCurve {
    /// The algorithm that signs with this curve
    pub fn algorithm(&self) -> AlgorithmId {
        match self {
            ECCurve::P256 => AlgorithmId::ES256,
            ECCurve::P384 => AlgorithmId::ES384,
            ECCurve::P521 => AlgorithmId::ES512,
        }
    }

    /// Size of a raw `r || s` signature
    pub fn signature_length(&self) -> usize {
        match self {
            ECCurve::P256 => 64,
            ECCurve::P384 => 96,
            ECCurve::P521 => 132,
        }
    }
}

impl fmt::Display for ECCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ECCurve::P256 => "P-256",
            ECCurve::P384 => "P-384",
            ECCurve::P521 => "P-521",
        };
        f.write_str(name)
    }
}

/// An EC public key, for ES256/ES384/ES512 verification.
pub enum ECPublicKey {
    P256(p256::ecdsa::VerifyingKey),
    P384(p384::ecdsa::VerifyingKey),
    P521(p521::ecdsa::VerifyingKey),
}

impl fmt::Debug for ECPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ECPublicKey").field(&self.curve()).finish()
    }
}

impl ECPublicKey {
    /// Import a SEC1-encoded (compressed or uncompressed) public key
    pub fn from_bytes(curve: ECCurve, raw: &[u8]) -> Result<Self, Error> {
        let pk = match curve {
            ECCurve::P256 => ECPublicKey::P256(
                p256::ecdsa::VerifyingKey::from_sec1_bytes(raw)
                    .map_err(|_| JoseError::InternalError("invalid P-256 public key".into()))?,
            ),
            ECCurve::P384 => ECPublicKey::P384(
                p384::ecdsa::VerifyingKey::from_sec1_bytes(raw)
                    .map_err(|_| JoseError::InternalError("invalid P-384 public key".into()))?,
            ),
            ECCurve::P521 => ECPublicKey::P521(
                p521::ecdsa::VerifyingKey::from_sec1_bytes(raw)
                    .map_err(|_| JoseError::InternalError("invalid P-521 public key".into()))?,
            ),
        };
        Ok(pk)
    }

    /// Import a P-256 or P-384 public key from a SPKI PEM document
    pub fn from_pem(pem: &str) -> Result<Self, Error> {
        let pem = pem.trim();
        if let Ok(pk) = p256::ecdsa::VerifyingKey::from_public_key_pem(pem) {
            return Ok(ECPublicKey::P256(pk));
        }
        let pk = p384::ecdsa::VerifyingKey::from_public_key_pem(pem)
            .map_err(|_| JoseError::InternalError("unsupported EC public key".into()))?;
        Ok(ECPublicKey::P384(pk))
    }

    pub fn to_pem(&self) -> Result<String, Error> {
        let pem = match self {
            ECPublicKey::P256(pk) => {
                p256::PublicKey::from(*pk).to_public_key_pem(Default::default())
            }
            ECPublicKey::P384(pk) => {
                p384::PublicKey::from(*pk).to_public_key_pem(Default::default())
            }
            ECPublicKey::P521(_) => bail!(JoseError::InternalError(
                "PEM export is not supported for P-521 keys".into()
            )),
        };
        Ok(pem.map_err(|_| JoseError::InternalError("PEM encoding failed".into()))?)
    }

    /// Compressed SEC1 encoding
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            ECPublicKey::P256(pk) => pk.to_encoded_point(true).as_bytes().to_vec(),
            ECPublicKey::P384(pk) => pk.to_encoded_point(true).as_bytes().to_vec(),
            ECPublicKey::P521(pk) => pk.to_encoded_point(true).as_bytes().to_vec(),
        }
    }

    pub fn curve(&self) -> ECCurve {
        match self {
            ECPublicKey::P256(_) => ECCurve::P256,
            ECPublicKey::P384(_) => ECCurve::P384,
            ECPublicKey::P521(_) => ECCurve::P521,
        }
    }

    /// A signature that isn't a raw `r || s` pair for this curve doesn't verify
    pub(crate) fn verify(&self, authenticated: &[u8], signature: &[u8]) -> Result<bool, Error> {
        let valid = match self {
            ECPublicKey::P256(pk) => {
                let ecdsa_signature = match p256::ecdsa::Signature::try_from(signature) {
                    Ok(ecdsa_signature) => ecdsa_signature,
                    Err(_) => return Ok(false),
                };
                let mut digest = hmac_sha256::Hash::new();
                digest.update(authenticated);
                pk.verify_digest(digest, &ecdsa_signature).is_ok()
            }
            ECPublicKey::P384(pk) => {
                let ecdsa_signature = match p384::ecdsa::Signature::try_from(signature) {
                    Ok(ecdsa_signature) => ecdsa_signature,
                    Err(_) => return Ok(false),
                };
                let mut digest = hmac_sha512::sha384::Hash::new();
                digest.update(authenticated);
                pk.verify_digest(digest, &ecdsa_signature).is_ok()
            }
            ECPublicKey::P521(pk) => {
                let ecdsa_signature = match p521::ecdsa::Signature::from_slice(signature) {
                    Ok(ecdsa_signature) => ecdsa_signature,
                    Err(_) => return Ok(false),
                };
                pk.verify(authenticated, &ecdsa_signature).is_ok()
            }
        };
        Ok(valid)
    }
}

/// An EC key pair, for ES256/ES384/ES512 signing.
pub enum ECKeyPair {
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
    P521(p521::ecdsa::SigningKey),
}

impl fmt::Debug for ECKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ECKeyPair").field(&self.curve()).finish()
    }
}

impl ECKeyPair {
    pub fn generate(curve: ECCurve) -> Self {
        let mut rng = rand::thread_rng();
        match curve {
            ECCurve::P256 => ECKeyPair::P256(p256::ecdsa::SigningKey::random(&mut rng)),
            ECCurve::P384 => ECKeyPair::P384(p384::ecdsa::SigningKey::random(&mut rng)),
            ECCurve::P521 => ECKeyPair::P521(p521::ecdsa::SigningKey::random(&mut rng)),
        }
    }

    /// Import a raw secret scalar
    pub fn from_bytes(curve: ECCurve, raw: &[u8]) -> Result<Self, Error> {
        let key_pair = match curve {
            ECCurve::P256 => ECKeyPair::P256(
                p256::ecdsa::SigningKey::from_slice(raw).map_err(|_| invalid_secret_key(curve))?,
            ),
            ECCurve::P384 => ECKeyPair::P384(
                p384::ecdsa::SigningKey::from_slice(raw).map_err(|_| invalid_secret_key(curve))?,
            ),
            ECCurve::P521 => ECKeyPair::P521(
                p521::ecdsa::SigningKey::from_slice(raw).map_err(|_| invalid_secret_key(curve))?,
            ),
        };
        Ok(key_pair)
    }

    /// Import a P-256 or P-384 key pair from a PKCS#8 PEM document
    pub fn from_pem(pem: &str) -> Result<Self, Error> {
        let pem = pem.trim();
        if let Ok(sk) = p256::ecdsa::SigningKey::from_pkcs8_pem(pem) {
            return Ok(ECKeyPair::P256(sk));
        }
        let sk = p384::ecdsa::SigningKey::from_pkcs8_pem(pem)
            .map_err(|_| JoseError::InternalError("unsupported EC key pair".into()))?;
        Ok(ECKeyPair::P384(sk))
    }

    pub fn to_pem(&self) -> Result<String, Error> {
        let pem = match self {
            ECKeyPair::P256(sk) => p256::SecretKey::from(*sk.as_nonzero_scalar())
                .to_pkcs8_pem(Default::default())
                .map(|pem| pem.to_string()),
            ECKeyPair::P384(sk) => p384::SecretKey::from(*sk.as_nonzero_scalar())
                .to_pkcs8_pem(Default::default())
                .map(|pem| pem.to_string()),
            ECKeyPair::P521(_) => bail!(JoseError::InternalError(
                "PEM export is not supported for P-521 keys".into()
            )),
        };
        Ok(pem.map_err(|_| JoseError::InternalError("PEM encoding failed".into()))?)
    }

    /// Raw secret scalar
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            ECKeyPair::P256(sk) => sk.to_bytes().to_vec(),
            ECKeyPair::P384(sk) => sk.to_bytes().to_vec(),
            ECKeyPair::P521(sk) => sk.to_bytes().to_vec(),
        }
    }

    pub fn curve(&self) -> ECCurve {
        match self {
            ECKeyPair::P256(_) => ECCurve::P256,
            ECKeyPair::P384(_) => ECCurve::P384,
            ECKeyPair::P521(_) => ECCurve::P521,
        }
    }

    pub fn public_key(&self) -> ECPublicKey {
        match self {
            ECKeyPair::P256(sk) => ECPublicKey::P256(*sk.verifying_key()),
            ECKeyPair::P384(sk) => ECPublicKey::P384(*sk.verifying_key()),
            ECKeyPair::P521(sk) => ECPublicKey::P521(p521::ecdsa::VerifyingKey::from(sk)),
        }
    }

    /// P-256 and P-384 signatures are randomized, P-521 signatures are deterministic (RFC 6979).
    pub(crate) fn sign(&self, authenticated: &[u8]) -> Result<Vec<u8>, Error> {
        let mut rng = rand::thread_rng();
        let signature = match self {
            ECKeyPair::P256(sk) => {
                let mut digest = hmac_sha256::Hash::new();
                digest.update(authenticated);
                let signature: p256::ecdsa::Signature = sk.sign_digest_with_rng(&mut rng, digest);
                signature.to_vec()
            }
            ECKeyPair::P384(sk) => {
                let mut digest = hmac_sha512::sha384::Hash::new();
                digest.update(authenticated);
                let signature: p384::ecdsa::Signature = sk.sign_digest_with_rng(&mut rng, digest);
                signature.to_vec()
            }
            ECKeyPair::P521(sk) => {
                let signature: p521::ecdsa::Signature = sk.sign(authenticated);
                signature.to_vec()
            }
        };
        Ok(signature)
    }

    pub(crate) fn verify(&self, authenticated: &[u8], signature: &[u8]) -> Result<bool, Error> {
        self.public_key().verify(authenticated, signature)
    }
}

fn invalid_secret_key(curve: ECCurve) -> JoseError {
    JoseError::InternalError(format!("invalid {} secret key", curve))
}
