//! httpcheck domain - core types
//!
//! Cookie jar, multipart envelopes, body payloads and configuration used by
//! the `httpcheck` crate. Nothing here touches the network.

pub mod auth;
pub mod config;
pub mod cookie;
pub mod error;
pub mod multipart;
pub mod payload;

pub use auth::{BEARER_PREFIX, basic_auth_value, bearer_auth_value};
pub use config::{CheckerConfig, RedirectMode};
pub use cookie::{Cookie, CookieJar, SameSite};
pub use error::{DomainError, DomainResult};
pub use multipart::{
    BOUNDARY, FieldPart, FilePart, FormPart, MultipartBody, MultipartEnvelope, build_multipart,
};
pub use payload::{JsonComparison, Payload, compare_json, encode_json, encode_xml};
