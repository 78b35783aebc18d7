use serde::{Deserialize, Serialize};

/// `aud` may be a single string or a list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

/// Verified JWT payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>, // subject, as issued by the identity provider
    pub exp: u64,            // expires at (unix timestamp)
    #[serde(default)]
    pub iat: Option<u64>,    // issued at
    pub iss: String,         // issuer
    pub aud: Audience,       // audience
    #[serde(default)]
    pub permissions: Option<Vec<String>>, // granted scopes, absent on tokens without RBAC
}
