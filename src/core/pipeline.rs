//! Stage composition.
//!
//! Every external collaborator is held in [`Services`] so the whole
//! pipeline can run against test doubles.

use serde::Serialize;
use std::path::Path;

use crate::aws::{CloudFrontClient, Credentials, S3Client};
use crate::build::{self, BuildReport, OUTPUT_DIR};
use crate::cdn::{self, CdnProvider, InvalidateReport};
use crate::env::Settings;
use crate::error::{Error, Result};
use crate::health::{self, HealthReport, VerifyOutcome};
use crate::http::{HttpJsonClient, JsonSource};
use crate::snapshot::{self, SnapshotReport};
use crate::storage::ObjectStore;
use crate::sync::{self, SyncOptions, SyncReport};
use crate::utils::command::{ProcessRunner, SystemRunner};

/// What `all` does when verification comes back degraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyPolicy {
    /// Log and carry on to build and deploy.
    Continue,
    /// Stop before building.
    Abort,
}

impl VerifyPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        if settings.strict_verify {
            VerifyPolicy::Abort
        } else {
            VerifyPolicy::Continue
        }
    }
}

pub struct Services {
    pub http: Box<dyn JsonSource>,
    pub runner: Box<dyn ProcessRunner>,
    pub storage: Box<dyn ObjectStore>,
    pub cdn: Box<dyn CdnProvider>,
}

impl Services {
    /// Live implementations. One storage client is built, signed for the
    /// resolved region.
    pub fn live(settings: &Settings) -> Result<Self> {
        let credentials = Credentials::from_env();
        Ok(Self {
            http: Box::new(HttpJsonClient::new()?),
            runner: Box::new(SystemRunner),
            storage: Box::new(S3Client::new(settings.region_or_default(), credentials.clone())?),
            cdn: Box::new(CloudFrontClient::new(credentials)?),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AllReport {
    pub verify: HealthReport,
    pub verify_policy: VerifyPolicy,
    pub build: BuildReport,
    pub sync: SyncReport,
    pub invalidate: InvalidateReport,
}

pub fn verify(settings: &Settings, services: &Services) -> HealthReport {
    health::verify(settings, services.http.as_ref())
}

pub fn build(settings: &Settings, services: &Services) -> Result<BuildReport> {
    build::run(settings, services.runner.as_ref())
}

/// Sync an existing build output. Fails when nothing has been built yet.
pub fn deploy(settings: &Settings, services: &Services) -> Result<SyncReport> {
    let out = build::output_dir(settings)?;
    if !out.is_dir() {
        return Err(Error::config_invalid_value(
            crate::env::PROJECT_DIR,
            Some(settings.project_dir.clone()),
            format!("No ./{} found. Run 'build' first.", OUTPUT_DIR),
        )
        .with_hint("Run 'launchpad build' before 'launchpad deploy'"));
    }
    sync_dir(settings, services, &out)
}

fn sync_dir(settings: &Settings, services: &Services, out: &Path) -> Result<SyncReport> {
    let options = SyncOptions::from_settings(settings)?;
    sync::sync(services.storage.as_ref(), out, &options)
}

pub fn invalidate(settings: &Settings, services: &Services) -> Result<InvalidateReport> {
    cdn::invalidate(settings, services.cdn.as_ref(), &cdn::caller_reference())
}

pub fn tiles(settings: &Settings, services: &Services, dir: &Path) -> Result<SnapshotReport> {
    snapshot::fetch_tiles(settings, services.http.as_ref(), dir)
}

/// verify → build → sync → invalidate. Only verification may be non-fatal.
pub fn run_all(settings: &Settings, services: &Services, policy: VerifyPolicy) -> Result<AllReport> {
    let verify = verify(settings, services);
    if verify.outcome == VerifyOutcome::Degraded {
        match policy {
            VerifyPolicy::Continue => {
                crate::log_status!("all", "verify had failures; continuing...");
            }
            VerifyPolicy::Abort => return Err(Error::verify_failed(verify.failed_names())),
        }
    }

    let build = build(settings, services)?;
    let sync = sync_dir(settings, services, Path::new(&build.output_dir))?;
    let invalidate = invalidate(settings, services)?;

    Ok(AllReport {
        verify,
        verify_policy: policy,
        build,
        sync,
        invalidate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_policy_follows_strict_flag() {
        assert_eq!(VerifyPolicy::from_settings(&Settings::default()), VerifyPolicy::Continue);

        let strict = Settings {
            strict_verify: true,
            ..Settings::default()
        };
        assert_eq!(VerifyPolicy::from_settings(&strict), VerifyPolicy::Abort);
    }
}
