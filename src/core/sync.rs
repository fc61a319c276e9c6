//! Upload a build output tree to object storage.
//!
//! Every run re-uploads every file. Nothing is diffed and stale remote
//! objects are left in place.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::env::{self, Settings, DEFAULT_REGION};
use crate::error::{Error, Result};
use crate::headers;
use crate::storage::{object_key, BucketProbe, ObjectStore, PutObject};
use crate::utils::io;

/// Progress is logged after this many successful uploads.
pub const PROGRESS_EVERY: usize = 50;

/// A regular file under the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// `/`-separated path relative to the output root.
    pub relative_path: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub bucket: String,
    pub prefix: String,
    pub dry_run: bool,
}

impl SyncOptions {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        if settings.bucket.is_empty() {
            return Err(Error::config_missing_key(env::BUCKET, None));
        }
        Ok(Self {
            bucket: settings.bucket.clone(),
            prefix: settings.prefix.trim_matches('/').to_string(),
            dry_run: settings.dry_run,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannedUpload {
    pub key: String,
    pub content_type: String,
    pub cache_control: String,
    pub size: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub bucket: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub prefix: String,
    pub region: String,
    pub dry_run: bool,
    pub bucket_created: bool,
    pub uploaded: usize,
    /// Every upload, performed or (in dry-run) planned, in walk order.
    pub planned: Vec<PlannedUpload>,
}

/// List every regular file under `root`, sorted by relative path.
pub fn collect_artifacts(root: &Path) -> Result<Vec<Artifact>> {
    let mut artifacts = Vec::new();
    walk_recursive(root, root, &mut artifacts)
        .map_err(|e| Error::internal_io(e.to_string(), Some(format!("walk {}", root.display()))))?;
    artifacts.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(artifacts)
}

fn walk_recursive(root: &Path, dir: &Path, artifacts: &mut Vec<Artifact>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        // Symlinked directories are not descended into; symlinked files are kept.
        if entry.file_type()?.is_dir() {
            walk_recursive(root, &path, artifacts)?;
        } else if path.is_file() {
            let relative_path = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            artifacts.push(Artifact {
                relative_path,
                path,
            });
        }
    }
    Ok(())
}

/// Whether a progress line is due after `uploaded` successful uploads.
pub fn progress_due(uploaded: usize) -> bool {
    uploaded > 0 && uploaded % PROGRESS_EVERY == 0
}

/// Location constraint to send when creating a bucket in `region`.
pub fn location_constraint(region: &str) -> Option<&str> {
    if region == DEFAULT_REGION {
        None
    } else {
        Some(region)
    }
}

/// Make sure the bucket exists. Returns whether a creation was issued (or,
/// in dry-run, would have been).
pub fn ensure_bucket(store: &dyn ObjectStore, options: &SyncOptions) -> Result<bool> {
    match store.head_bucket(&options.bucket)? {
        BucketProbe::Exists => {
            crate::log_status!("sync", "bucket exists: s3://{}", options.bucket);
            Ok(false)
        }
        BucketProbe::Missing => {
            crate::log_status!("sync", "creating bucket: {}", options.bucket);
            if options.dry_run {
                crate::log_status!("sync", "[DRY] skipped bucket creation for {}", options.bucket);
            } else {
                store.create_bucket(&options.bucket, location_constraint(store.region()))?;
            }
            Ok(true)
        }
    }
}

/// Upload every file under `out_dir`, aborting on the first failure.
pub fn sync(store: &dyn ObjectStore, out_dir: &Path, options: &SyncOptions) -> Result<SyncReport> {
    let bucket_created = ensure_bucket(store, options)?;
    let artifacts = collect_artifacts(out_dir)?;

    let mut uploaded = 0;
    let mut planned = Vec::with_capacity(artifacts.len());

    for artifact in &artifacts {
        let key = object_key(&options.prefix, &artifact.relative_path);
        let derived = headers::derive(&artifact.relative_path);

        if options.dry_run {
            crate::log_status!(
                "sync",
                "[DRY] PUT s3://{}/{} ({}, {})",
                options.bucket,
                key,
                derived.content_type,
                derived.cache_control
            );
            let size = std::fs::metadata(&artifact.path).map(|m| m.len() as usize).unwrap_or(0);
            planned.push(PlannedUpload {
                key,
                content_type: derived.content_type,
                cache_control: derived.cache_control,
                size,
            });
            continue;
        }

        let body = io::read_bytes(&artifact.path, "read artifact")?;
        let object = PutObject {
            bucket: options.bucket.clone(),
            key,
            content_type: derived.content_type,
            cache_control: derived.cache_control,
            body,
        };
        store.put_object(&object)?;

        uploaded += 1;
        if progress_due(uploaded) {
            crate::log_status!("sync", "uploaded {} files...", uploaded);
        }

        planned.push(PlannedUpload {
            size: object.body.len(),
            key: object.key,
            content_type: object.content_type,
            cache_control: object.cache_control,
        });
    }

    crate::log_status!("sync", "uploaded total: {}", uploaded);

    Ok(SyncReport {
        bucket: options.bucket.clone(),
        prefix: options.prefix.clone(),
        region: store.region().to_string(),
        dry_run: options.dry_run,
        bucket_created,
        uploaded,
        planned,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn location_constraint_omitted_for_default_region() {
        assert_eq!(location_constraint("us-east-1"), None);
        assert_eq!(location_constraint("eu-west-1"), Some("eu-west-1"));
    }

    #[test]
    fn collect_artifacts_uses_relative_slash_paths() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("_next/static")).unwrap();
        fs::write(dir.path().join("index.html"), "<html>").unwrap();
        fs::write(dir.path().join("_next/static/app.js"), "js").unwrap();

        let artifacts = collect_artifacts(dir.path()).unwrap();
        let paths: Vec<&str> = artifacts.iter().map(|a| a.relative_path.as_str()).collect();
        assert_eq!(paths, vec!["_next/static/app.js", "index.html"]);
    }

    #[test]
    fn progress_is_logged_every_fifty_uploads() {
        assert!(!progress_due(0));
        assert!(!progress_due(49));
        assert!(progress_due(50));
        assert!(!progress_due(51));
        assert!(progress_due(100));
    }

    #[cfg(unix)]
    #[test]
    fn collect_artifacts_skips_symlinked_directories() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("robots.txt"), "User-agent: *").unwrap();
        fs::write(dir.path().join("real.txt"), "x").unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("loop")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("alias.txt")).unwrap();

        let artifacts = collect_artifacts(dir.path()).unwrap();
        let paths: Vec<&str> = artifacts.iter().map(|a| a.relative_path.as_str()).collect();
        assert_eq!(paths, vec!["alias.txt", "real.txt", "robots.txt"]);
    }

    #[test]
    fn options_require_bucket() {
        let err = SyncOptions::from_settings(&Settings::default()).unwrap_err();
        assert!(err.message.contains("S3_BUCKET"));
    }

    #[test]
    fn options_trim_prefix_slashes() {
        let settings = Settings {
            bucket: "site".to_string(),
            prefix: "/v2/".to_string(),
            ..Settings::default()
        };
        assert_eq!(SyncOptions::from_settings(&settings).unwrap().prefix, "v2");
    }
}
