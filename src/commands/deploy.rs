use clap::Args;
use launchpad::pipeline::{self, Services};
use launchpad::sync::SyncReport;

use crate::commands::{load_settings, CmdResult, GlobalArgs};

#[derive(Args)]
pub struct DeployArgs {}

pub fn run(_args: DeployArgs, _global: &GlobalArgs) -> CmdResult<SyncReport> {
    let settings = load_settings();
    let services = Services::live(&settings)?;
    Ok((pipeline::deploy(&settings, &services)?, 0))
}
