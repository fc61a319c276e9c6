//! Local snapshots of the portfolio API and the placeholder tile.

use serde::Serialize;
use serde_json::Value;
use std::path::Path;

use crate::env::{self, Settings};
use crate::error::{Error, Result};
use crate::http::{join_url, JsonSource};
use crate::utils::io;

pub const SNAPSHOT_DIR: &str = "snapshots";
pub const TILES_FILE: &str = "tiles.json";
pub const STATUS_FILE: &str = "status.json";

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotReport {
    pub tiles_path: String,
    pub status_path: String,
}

/// Fetch `/tiles` and `/status` from the portfolio API and write them under
/// `dir`, replacing any previous snapshot.
pub fn fetch_tiles(settings: &Settings, source: &dyn JsonSource, dir: &Path) -> Result<SnapshotReport> {
    let base = settings.portfolio_api_base.trim_end_matches('/');
    if base.is_empty() {
        return Err(Error::config_missing_key(env::PORTFOLIO_API_BASE, None));
    }

    let tiles = source.get_json(&join_url(base, "/tiles"))?;
    let status = source.get_json(&join_url(base, "/status"))?;

    io::ensure_dir(dir, "create snapshot dir")?;
    let tiles_path = dir.join(TILES_FILE);
    let status_path = dir.join(STATUS_FILE);
    write_pretty(&tiles_path, &tiles)?;
    write_pretty(&status_path, &status)?;

    crate::log_status!(
        "tiles",
        "wrote {} and {}",
        tiles_path.display(),
        status_path.display()
    );

    Ok(SnapshotReport {
        tiles_path: tiles_path.display().to_string(),
        status_path: status_path.display().to_string(),
    })
}

fn write_pretty(path: &Path, value: &Value) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| Error::internal_json(e.to_string(), Some(path.display().to_string())))?;
    io::write_file(path, &rendered, "write snapshot")
}

/// Tile shown while the sentiment model has no live data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceholderTile {
    pub group: &'static str,
    pub tile: &'static str,
    pub label: &'static str,
    pub value: Option<f64>,
    pub display: &'static str,
    pub window: &'static str,
    pub status: &'static str,
    pub foot: &'static str,
    pub updated_at: Option<String>,
}

pub fn placeholder_tile() -> PlaceholderTile {
    PlaceholderTile {
        group: "sentiment",
        tile: "placeholder",
        label: "SENTIMENT",
        value: None,
        display: "TRAINING IN PROGRESS",
        window: "",
        status: "paused",
        foot: "",
        updated_at: None,
    }
}
