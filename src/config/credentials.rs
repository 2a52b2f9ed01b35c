//! Caller-identity credentials resolved from configuration.
//!
//! The token is attached to every backend request. How it is obtained is
//! outside this crate; we only keep it out of logs.

use std::fmt;

use super::types::ApiConfig;

/// How the caller token is presented to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthType {
    /// `x-api-key: <token>`
    ApiKey,
    /// `authorization: Bearer <token>`
    Bearer,
    /// Anonymous requests.
    None,
}

impl AuthType {
    /// Case-insensitive; anything unrecognized means `Bearer`.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("api_key") {
            AuthType::ApiKey
        } else if s.eq_ignore_ascii_case("none") {
            AuthType::None
        } else {
            AuthType::Bearer
        }
    }
}

/// Token holder whose formatting never reveals the token.
#[derive(Clone)]
pub struct SecureString(String);

impl SecureString {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// The raw token, for building request headers only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

const MASK: &str = "••••••••";

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecureString").field(&format_args!("{}", MASK)).finish()
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}

impl ApiConfig {
    pub fn auth_type(&self) -> AuthType {
        AuthType::parse(&self.auth_type_str)
    }

    /// Resolve the configured token, ignoring empty values.
    pub fn credential(&self) -> Option<SecureString> {
        if self.auth_type() == AuthType::None {
            return None;
        }
        self.auth_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .map(|token| SecureString::new(token.to_string()))
    }
}

/// Build the caller-identity header for `api`, if any.
///
/// Returns `(header_name, header_value)`.
pub fn build_auth_header(api: &ApiConfig) -> Option<(&'static str, String)> {
    let credential = api.credential()?;
    match api.auth_type() {
        AuthType::ApiKey => Some(("x-api-key", credential.expose().to_string())),
        AuthType::Bearer => Some(("authorization", format!("Bearer {}", credential.expose()))),
        AuthType::None => None,
    }
}
