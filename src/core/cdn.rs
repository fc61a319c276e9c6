//! CDN cache invalidation.

use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::env::Settings;
use crate::error::Result;

/// Path pattern submitted with every invalidation.
pub const INVALIDATE_ALL: &str = "/*";

pub trait CdnProvider {
    /// Submit an invalidation and return the provider-assigned id.
    fn create_invalidation(
        &self,
        distribution_id: &str,
        paths: &[&str],
        caller_reference: &str,
    ) -> Result<String>;
}

#[derive(Debug, Clone, Serialize)]
pub struct InvalidateReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalidation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caller_reference: Option<String>,
    pub dry_run: bool,
    pub skipped: bool,
}

/// Idempotency token for an invalidation: the current Unix time in seconds.
pub fn caller_reference() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
        .to_string()
}

/// Invalidate every path on the configured distribution.
///
/// An unconfigured distribution is a no-op, not an error.
pub fn invalidate(
    settings: &Settings,
    cdn: &dyn CdnProvider,
    caller_reference: &str,
) -> Result<InvalidateReport> {
    let distribution = settings.distribution_id.as_str();
    if distribution.is_empty() {
        crate::log_status!("invalidate", "no CLOUDFRONT_DISTRIBUTION_ID set; skipping invalidate");
        return Ok(InvalidateReport {
            distribution_id: None,
            invalidation_id: None,
            caller_reference: None,
            dry_run: settings.dry_run,
            skipped: true,
        });
    }

    if settings.dry_run {
        crate::log_status!("invalidate", "[DRY] CloudFront invalidate {} {}", distribution, INVALIDATE_ALL);
        return Ok(InvalidateReport {
            distribution_id: Some(distribution.to_string()),
            invalidation_id: None,
            caller_reference: Some(caller_reference.to_string()),
            dry_run: true,
            skipped: false,
        });
    }

    let id = cdn.create_invalidation(distribution, &[INVALIDATE_ALL], caller_reference)?;
    crate::log_status!("invalidate", "created CloudFront invalidation: {}", id);

    Ok(InvalidateReport {
        distribution_id: Some(distribution.to_string()),
        invalidation_id: Some(id),
        caller_reference: Some(caller_reference.to_string()),
        dry_run: false,
        skipped: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_reference_is_integer_seconds() {
        let reference = caller_reference();
        assert!(reference.parse::<u64>().unwrap() > 1_600_000_000);
    }
}
