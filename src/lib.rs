#![forbid(unsafe_code)]

//! A JOSE/JWS library: signs, parses and verifies compact-serialized tokens
//! with HMAC, RSA and elliptic-curve algorithms.
//!
//! ```ignore
//! use jose_simple::prelude::*;
//!
//! let key = KeyMaterial::generate_hmac().shared();
//! let algorithm = Algorithm::new(AlgorithmId::HS256, key)?;
//! let claims = Claims::create(Duration::from_hours(2)).with_issuer("example app");
//! let token = Jws::sign_bearer(&claims, &algorithm)?;
//!
//! let jws = Jws::parse(&token)?;
//! jws.verify_with(&algorithm, |claims| claims.check().iss("example app"))?;
//! ```

pub mod alg;
pub mod algorithm;
pub mod algorithms;
pub mod bearer;
pub mod claims;
pub mod common;
pub mod error;
pub mod header;
pub mod jws;
pub mod key;
pub mod loader;

pub use coarsetime;
pub use serde;

pub mod prelude {
    pub use crate::alg::*;
    pub use crate::algorithm::*;
    pub use crate::algorithms::*;
    pub use crate::bearer::*;
    pub use crate::claims::*;
    pub use crate::common::*;
    pub use crate::error::{error_kind, Error, JoseError};
    pub use crate::header::*;
    pub use crate::jws::*;
    pub use crate::key::*;
    pub use crate::loader::*;
    pub use coarsetime::{self, Clock, Duration, UnixTimeStamp};
    pub use serde::{Deserialize, Serialize};
}
