//! Okta API token handling
//!
//! The token only ever leaves this type through [`ApiKey::authorization_header`].
//! Debug and Display output are redacted so a key cannot end up in logs or
//! in a printed result.

use std::fmt;

/// Environment variable holding the API token
pub const API_KEY_ENV: &str = "OKTA_API_KEY";

/// Scheme prefix Okta expects for API tokens
const AUTH_SCHEME: &str = "SSWS";

/// An Okta API token
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into().trim().to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value for the `Authorization` header
    pub fn authorization_header(&self) -> String {
        format!("{} {}", AUTH_SCHEME, self.0)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_header_uses_ssws() {
        let key = ApiKey::new("00abc");
        assert_eq!(key.authorization_header(), "SSWS 00abc");
    }

    #[test]
    fn test_key_is_redacted() {
        let key = ApiKey::new("00abc");
        assert_eq!(format!("{:?}", key), "ApiKey(***)");
        assert_eq!(key.to_string(), "***");
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        assert!(ApiKey::new("  \n").is_empty());
        assert_eq!(ApiKey::new(" k \n").authorization_header(), "SSWS k");
    }
}
