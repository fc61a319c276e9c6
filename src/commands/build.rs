use clap::Args;
use launchpad::build::BuildReport;
use launchpad::pipeline::{self, Services};

use crate::commands::{load_settings, CmdResult, GlobalArgs};

#[derive(Args)]
pub struct BuildArgs {}

pub fn run(_args: BuildArgs, _global: &GlobalArgs) -> CmdResult<BuildReport> {
    let settings = load_settings();
    let services = Services::live(&settings)?;
    Ok((pipeline::build(&settings, &services)?, 0))
}
