use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::alg::AlgorithmId;
use crate::error::*;

/// The only accepted signature type ("typ")
pub const JWT_TYPE: &str = "JWT";

/// A validated JOSE header.
///
/// `typ` is always `"JWT"` and `alg` always a known algorithm: a `Header`
/// cannot be decoded otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    #[serde(rename = "typ")]
    signature_type: String,

    #[serde(rename = "alg")]
    algorithm: AlgorithmId,

    #[serde(rename = "kid", skip_serializing_if = "Option::is_none")]
    key_id: Option<String>,

    #[serde(rename = "cty", skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,
}

impl Header {
    pub fn new(algorithm: AlgorithmId) -> Self {
        Header {
            signature_type: JWT_TYPE.to_string(),
            algorithm,
            key_id: None,
            content_type: None,
        }
    }

    pub fn with_key_id(mut self, key_id: impl ToString) -> Self {
        self.key_id = Some(key_id.to_string());
        self
    }

    pub fn with_content_type(mut self, content_type: impl ToString) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    /// Decode and validate a JSON header.
    pub fn decode(json: &str) -> Result<Self, Error> {
        Self::decode_slice(json.as_bytes())
    }

    pub(crate) fn decode_slice(json: &[u8]) -> Result<Self, Error> {
        let fields: Map<String, Value> =
            serde_json::from_slice(json).map_err(|_| JoseError::MalformedJson)?;
        Self::from_fields(&fields)
    }

    fn from_fields(fields: &Map<String, Value>) -> Result<Self, Error> {
        let signature_type = match fields.get("typ") {
            None => bail!(JoseError::MissingTyp),
            Some(Value::String(typ)) if typ == JWT_TYPE => typ.clone(),
            Some(_) => bail!(JoseError::InvalidTyp),
        };
        let algorithm = match fields.get("alg") {
            None => bail!(JoseError::MissingAlg),
            Some(Value::String(alg)) => alg.parse()?,
            Some(other) => bail!(JoseError::UnknownAlgorithm(other.to_string())),
        };
        let key_id = optional_string(fields, "kid")?;
        let content_type = optional_string(fields, "cty")?;

        Ok(Header {
            signature_type,
            algorithm,
            key_id,
            content_type,
        })
    }

    /// Serialize the header, "typ" first
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    /// The signature type ("typ")
    pub fn signature_type(&self) -> &str {
        &self.signature_type
    }

    /// The algorithm ("alg")
    ///
    /// This information is unprotected until the signature has been verified.
    pub fn algorithm(&self) -> AlgorithmId {
        self.algorithm
    }

    /// The key identifier ("kid")
    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    /// The content type ("cty")
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}

impl<'de> Deserialize<'de> for Header {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        Header::from_fields(&fields).map_err(DeError::custom)
    }
}

fn optional_string(fields: &Map<String, Value>, name: &str) -> Result<Option<String>, Error> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => bail!(JoseError::MalformedJson),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(json: &str) -> JoseError {
        match Header::decode(json).unwrap_err().downcast::<JoseError>() {
            Ok(e) => e,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    #[test]
    fn header_decode_valid() {
        let header = Header::decode(r#"{"typ":"JWT","alg":"RS256"}"#).unwrap();
        assert_eq!(header.signature_type(), "JWT");
        assert_eq!(header.algorithm(), AlgorithmId::RS256);
        assert_eq!(header.key_id(), None);
    }

    #[test]
    fn header_decode_all_algorithms() {
        for alg in AlgorithmId::ALL.iter() {
            let json = format!(r#"{{"typ":"JWT","alg":"{}"}}"#, alg);
            let header = Header::decode(&json).unwrap();
            assert_eq!(header.algorithm(), *alg);
            assert_eq!(header.to_json().unwrap(), json);
        }
    }

    #[test]
    fn header_decode_invalid_typ() {
        assert!(matches!(
            kind(r#"{"typ":"Jwt","alg":"RS256"}"#),
            JoseError::InvalidTyp
        ));
        assert!(matches!(
            kind(r#"{"typ":1,"alg":"RS256"}"#),
            JoseError::InvalidTyp
        ));
    }

    #[test]
    fn header_invalid_json() {
        assert!(matches!(
            kind(r#"{,"alg":"RS256"}"#),
            JoseError::MalformedJson
        ));
        assert!(matches!(kind(r#"["JWT"]"#), JoseError::MalformedJson));
        assert!(matches!(kind(""), JoseError::MalformedJson));
    }

    #[test]
    fn header_no_typ() {
        assert!(matches!(kind(r#"{"alg":"RS256"}"#), JoseError::MissingTyp));
        assert!(matches!(kind(r#"{"alg":"BB6"}"#), JoseError::MissingTyp));
    }

    #[test]
    fn header_no_alg() {
        assert!(matches!(kind(r#"{"typ":"JWT"}"#), JoseError::MissingAlg));
    }

    #[test]
    fn header_invalid_alg() {
        assert!(matches!(
            kind(r#"{"typ":"JWT","alg":"BBs"}"#),
            JoseError::UnknownAlgorithm(_)
        ));
        assert!(matches!(
            kind(r#"{"typ":"JWT","alg":"none"}"#),
            JoseError::UnknownAlgorithm(_)
        ));
        assert!(matches!(
            kind(r#"{"typ":"JWT","alg":256}"#),
            JoseError::UnknownAlgorithm(_)
        ));
    }

    #[test]
    fn header_optional_fields() {
        let header = Header::new(AlgorithmId::ES384)
            .with_key_id("key-1")
            .with_content_type("JWT");
        let json = header.to_json().unwrap();
        assert_eq!(json, r#"{"typ":"JWT","alg":"ES384","kid":"key-1","cty":"JWT"}"#);
        assert_eq!(Header::decode(&json).unwrap(), header);
    }

    #[test]
    fn header_serde_validates() {
        let header: Header = serde_json::from_str(r#"{"typ":"JWT","alg":"HS512","kid":"k"}"#).unwrap();
        assert_eq!(header.algorithm(), AlgorithmId::HS512);
        assert_eq!(header.key_id(), Some("k"));

        for json in [
            r#"{"typ":"Jwt","alg":"RS256"}"#,
            r#"{"typ":"JWT"}"#,
            r#"{"typ":"JWT","alg":"none"}"#,
            r#"{"alg":"RS256"}"#,
            r#"{"typ":"JWT","alg":"RS256","kid":1}"#,
        ]
        .iter()
        {
            assert!(serde_json::from_str::<Header>(json).is_err(), "{}", json);
        }
    }
}
