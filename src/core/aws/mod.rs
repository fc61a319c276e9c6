//! AWS REST clients for the storage and CDN seams.
//!
//! Requests are signed with Signature Version 4 using credentials read once
//! from the environment and handed to each client explicitly.

pub mod cloudfront;
pub mod s3;
pub mod sigv4;

pub use cloudfront::CloudFrontClient;
pub use s3::S3Client;

use crate::error::{Error, Result};

pub const ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";

#[derive(Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Credentials {
    /// Read ambient credentials. Returns `None` unless both the key id and
    /// the secret are set and non-empty.
    pub fn from_env() -> Option<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Some(Self {
            access_key_id: var(ACCESS_KEY_ID)?,
            secret_access_key: var(SECRET_ACCESS_KEY)?,
            session_token: var(SESSION_TOKEN),
        })
    }
}

/// Credentials are resolved lazily so commands that never call AWS don't
/// need them.
pub(crate) fn require_credentials(credentials: &Option<Credentials>) -> Result<&Credentials> {
    credentials.as_ref().ok_or_else(|| {
        Error::config_missing_key(ACCESS_KEY_ID, None)
            .with_hint(format!("Export {} and {} before deploying", ACCESS_KEY_ID, SECRET_ACCESS_KEY))
    })
}

pub(crate) fn blocking_client() -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(None::<std::time::Duration>)
        .build()
        .map_err(|e| Error::internal_unexpected(format!("HTTP client setup failed: {}", e)))
}

/// Escape text for inclusion in an XML element.
pub(crate) fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_is_a_config_error() {
        let err = require_credentials(&None).unwrap_err();
        assert_eq!(err.code.as_str(), "config.missing_key");
        assert!(err.message.contains(ACCESS_KEY_ID));
    }

    #[test]
    fn debug_redacts_secrets() {
        let creds = Credentials {
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "super-secret".to_string(),
            session_token: Some("token".to_string()),
        };
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("AKIDEXAMPLE"));
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("\"token\""));
    }

    #[test]
    fn xml_escape_handles_markup() {
        assert_eq!(xml_escape("a<b>&c"), "a&lt;b&gt;&amp;c");
    }
}
