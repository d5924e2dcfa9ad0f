use std::fmt;
use std::str::FromStr;

use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::*;

/// Class of cryptographic primitive behind a signature scheme
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyFamily {
    HMAC,
    RSA,
    EC,
}

impl fmt::Display for KeyFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyFamily::HMAC => "HMAC",
            KeyFamily::RSA => "RSA",
            KeyFamily::EC => "EC",
        };
        f.write_str(name)
    }
}

/// Hash function strength used by an algorithm
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HashStrength {
    SHA256,
    SHA384,
    SHA512,
}

impl HashStrength {
    /// Size of a digest, also the size of an HMAC tag, in bytes
    pub fn digest_length(&self) -> usize {
        match self {
            HashStrength::SHA256 => 32,
            HashStrength::SHA384 => 48,
            HashStrength::SHA512 => 64,
        }
    }
}

/// JWS algorithm identifier ("alg")
///
/// `none` is not part of this set.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AlgorithmId {
    HS256,
    HS384,
    HS512,
    RS256,
    RS384,
    RS512,
    ES256,
    ES384,
    ES512,
    PS256,
    PS384,
    PS512,
}

impl AlgorithmId {
    pub const ALL: [AlgorithmId; 12] = [
        AlgorithmId::HS256,
        AlgorithmId::HS384,
        AlgorithmId::HS512,
        AlgorithmId::RS256,
        AlgorithmId::RS384,
        AlgorithmId::RS512,
        AlgorithmId::ES256,
        AlgorithmId::ES384,
        AlgorithmId::ES512,
        AlgorithmId::PS256,
        AlgorithmId::PS384,
        AlgorithmId::PS512,
    ];

    /// The name used in the "alg" header parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            AlgorithmId::HS256 => "HS256",
            AlgorithmId::HS384 => "HS384",
            AlgorithmId::HS512 => "HS512",
            AlgorithmId::RS256 => "RS256",
            AlgorithmId::RS384 => "RS384",
            AlgorithmId::RS512 => "RS512",
            AlgorithmId::ES256 => "ES256",
            AlgorithmId::ES384 => "ES384",
            AlgorithmId::ES512 => "ES512",
            AlgorithmId::PS256 => "PS256",
            AlgorithmId::PS384 => "PS384",
            AlgorithmId::PS512 => "PS512",
        }
    }

    pub fn family(&self) -> KeyFamily {
        match self {
            AlgorithmId::HS256 | AlgorithmId::HS384 | AlgorithmId::HS512 => KeyFamily::HMAC,
            AlgorithmId::RS256
            | AlgorithmId::RS384
            | AlgorithmId::RS512
            | AlgorithmId::PS256
            | AlgorithmId::PS384
            | AlgorithmId::PS512 => KeyFamily::RSA,
            AlgorithmId::ES256 | AlgorithmId::ES384 | AlgorithmId::ES512 => KeyFamily::EC,
        }
    }

    pub fn hash(&self) -> HashStrength {
        match self {
            AlgorithmId::HS256 | AlgorithmId::RS256 | AlgorithmId::ES256 | AlgorithmId::PS256 => {
                HashStrength::SHA256
            }
            AlgorithmId::HS384 | AlgorithmId::RS384 | AlgorithmId::ES384 | AlgorithmId::PS384 => {
                HashStrength::SHA384
            }
            AlgorithmId::HS512 | AlgorithmId::RS512 | AlgorithmId::ES512 | AlgorithmId::PS512 => {
                HashStrength::SHA512
            }
        }
    }

    /// RSASSA-PSS rather than RSASSA-PKCS1-v1_5
    pub fn is_pss(&self) -> bool {
        matches!(
            self,
            AlgorithmId::PS256 | AlgorithmId::PS384 | AlgorithmId::PS512
        )
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlgorithmId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlgorithmId::ALL
            .iter()
            .find(|alg| alg.as_str() == s)
            .copied()
            .ok_or_else(|| JoseError::UnknownAlgorithm(s.to_string()).into())
    }
}

impl Serialize for AlgorithmId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AlgorithmId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(DeError::custom)
    }
}
