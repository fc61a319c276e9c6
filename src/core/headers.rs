//! Per-artifact HTTP header derivation.

use serde::Serialize;

/// Directory the build tool uses for content-hashed assets.
pub const FINGERPRINT_DIR: &str = "_next";

/// Extensions treated as long-lived static assets.
pub const FINGERPRINTED_EXTENSIONS: [&str; 11] = [
    "js", "css", "png", "jpg", "jpeg", "webp", "svg", "ico", "json", "woff", "woff2",
];

pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Pages: always revalidate so a deploy is visible immediately.
    Revalidate,
    /// Fingerprinted assets: cache for a year.
    Immutable,
    /// Everything else: five minutes.
    Short,
}

impl CachePolicy {
    pub fn header_value(self) -> &'static str {
        match self {
            CachePolicy::Revalidate => "public, max-age=0, must-revalidate",
            CachePolicy::Immutable => "public, max-age=31536000, immutable",
            CachePolicy::Short => "public, max-age=300",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectHeaders {
    pub content_type: String,
    pub cache_control: String,
}

fn extension(relative_path: &str) -> Option<&str> {
    let name = relative_path.rsplit('/').next().unwrap_or(relative_path);
    name.rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}

/// Cache policy for a `/`-separated path relative to the output root.
pub fn cache_policy(relative_path: &str) -> CachePolicy {
    let ext = extension(relative_path);

    if ext == Some("html") {
        return CachePolicy::Revalidate;
    }

    let in_fingerprint_dir = relative_path
        .split('/')
        .rev()
        .skip(1)
        .any(|component| component == FINGERPRINT_DIR);
    let fingerprinted_ext = ext.is_some_and(|e| FINGERPRINTED_EXTENSIONS.contains(&e));

    if in_fingerprint_dir || fingerprinted_ext {
        CachePolicy::Immutable
    } else {
        CachePolicy::Short
    }
}

pub fn content_type(relative_path: &str) -> String {
    mime_guess::from_path(relative_path)
        .first_raw()
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string()
}

pub fn derive(relative_path: &str) -> ObjectHeaders {
    ObjectHeaders {
        content_type: content_type(relative_path),
        cache_control: cache_policy(relative_path).header_value().to_string(),
    }
}
