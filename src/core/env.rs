//! Environment resolution.
//!
//! Settings come from two sources: the live process environment and an
//! optional `.env` overlay in the working directory. A name present in the
//! live environment always wins, even when its value is empty.

use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

pub const PROJECT_DIR: &str = "NEXTJS_DIR";
pub const FORECAST_API_BASE: &str = "FORECAST_API_BASE";
pub const MONTE_API_BASE: &str = "MONTE_API_BASE";
pub const PORTFOLIO_API_BASE: &str = "PORTFOLIO_API_BASE";
pub const PUBLIC_PORTFOLIO_API: &str = "NEXT_PUBLIC_PORTFOLIO_API";
pub const REGION: &str = "AWS_REGION";
pub const BUCKET: &str = "S3_BUCKET";
pub const PREFIX: &str = "S3_PREFIX";
pub const DISTRIBUTION_ID: &str = "CLOUDFRONT_DISTRIBUTION_ID";
pub const DRY_RUN: &str = "DRY_RUN";
pub const SKIP_INSTALL: &str = "SKIP_NPM_CI";
pub const STRICT_VERIFY: &str = "STRICT_VERIFY";

/// Every setting name the resolver reads, in declaration order.
pub const SETTING_NAMES: [&str; 12] = [
    PROJECT_DIR,
    FORECAST_API_BASE,
    MONTE_API_BASE,
    PORTFOLIO_API_BASE,
    PUBLIC_PORTFOLIO_API,
    REGION,
    BUCKET,
    PREFIX,
    DISTRIBUTION_ID,
    DRY_RUN,
    SKIP_INSTALL,
    STRICT_VERIFY,
];

pub const OVERLAY_FILE: &str = ".env";

/// Region assumed by the storage provider when none is configured.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Resolved configuration for a single run.
///
/// Empty strings mean "not configured"; each stage decides whether that is
/// fatal or a reason to skip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub project_dir: String,
    pub forecast_api_base: String,
    pub monte_api_base: String,
    pub portfolio_api_base: String,
    pub public_portfolio_api: String,
    pub region: String,
    pub bucket: String,
    pub prefix: String,
    pub distribution_id: String,
    pub dry_run: bool,
    pub skip_install: bool,
    pub strict_verify: bool,
}

impl Settings {
    /// Resolve settings from the live environment and a file overlay.
    pub fn resolve(live: &HashMap<String, String>, overlay: &HashMap<String, String>) -> Self {
        let lookup = |name: &str| -> String {
            live.get(name)
                .or_else(|| overlay.get(name))
                .cloned()
                .unwrap_or_default()
        };
        let flag = |name: &str| lookup(name).trim().eq_ignore_ascii_case("true");

        Self {
            project_dir: lookup(PROJECT_DIR),
            forecast_api_base: lookup(FORECAST_API_BASE),
            monte_api_base: lookup(MONTE_API_BASE),
            portfolio_api_base: lookup(PORTFOLIO_API_BASE),
            public_portfolio_api: lookup(PUBLIC_PORTFOLIO_API),
            region: lookup(REGION),
            bucket: lookup(BUCKET),
            prefix: lookup(PREFIX),
            distribution_id: lookup(DISTRIBUTION_ID),
            dry_run: flag(DRY_RUN),
            skip_install: flag(SKIP_INSTALL),
            strict_verify: flag(STRICT_VERIFY),
        }
    }

    pub fn region_or_default(&self) -> &str {
        if self.region.is_empty() {
            DEFAULT_REGION
        } else {
            &self.region
        }
    }

    /// API base embedded into the static build: explicit override first,
    /// then the general portfolio API.
    pub fn public_api(&self) -> Option<&str> {
        [&self.public_portfolio_api, &self.portfolio_api_base]
            .into_iter()
            .map(|s| s.as_str())
            .find(|s| !s.is_empty())
    }
}

/// Snapshot the live process environment, restricted to known names.
pub fn live_environment() -> HashMap<String, String> {
    SETTING_NAMES
        .iter()
        .filter_map(|name| std::env::var(name).ok().map(|v| (name.to_string(), v)))
        .collect()
}

/// Read a dotenv overlay. Missing files yield an empty map; malformed ones
/// are logged and ignored.
pub fn read_overlay(path: &Path) -> HashMap<String, String> {
    if !path.exists() {
        return HashMap::new();
    }

    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(e) => {
            crate::log_status!("env", "ignoring {}: {}", path.display(), e);
            return HashMap::new();
        }
    };

    let mut values = HashMap::new();
    for item in iter {
        match item {
            Ok((key, value)) => {
                // First definition in the file wins, matching dotenv semantics.
                values.entry(key).or_insert(value);
            }
            Err(e) => {
                crate::log_status!("env", "skipping malformed line in {}: {}", path.display(), e);
            }
        }
    }
    values
}

/// Resolve settings for this process: live environment over `./.env`.
pub fn load() -> Settings {
    Settings::resolve(&live_environment(), &read_overlay(Path::new(OVERLAY_FILE)))
}
