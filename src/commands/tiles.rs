use clap::Args;
use launchpad::pipeline::{self, Services};
use launchpad::snapshot::{SnapshotReport, SNAPSHOT_DIR};
use std::path::Path;

use crate::commands::{load_settings, CmdResult, GlobalArgs};

#[derive(Args)]
pub struct TilesArgs {}

pub fn run(_args: TilesArgs, _global: &GlobalArgs) -> CmdResult<SnapshotReport> {
    let settings = load_settings();
    let services = Services::live(&settings)?;
    Ok((pipeline::tiles(&settings, &services, Path::new(SNAPSHOT_DIR))?, 0))
}
