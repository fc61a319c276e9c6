use clap::Args;
use launchpad::cdn::InvalidateReport;
use launchpad::pipeline::{self, Services};

use crate::commands::{load_settings, CmdResult, GlobalArgs};

#[derive(Args)]
pub struct InvalidateArgs {}

pub fn run(_args: InvalidateArgs, _global: &GlobalArgs) -> CmdResult<InvalidateReport> {
    let settings = load_settings();
    let services = Services::live(&settings)?;
    Ok((pipeline::invalidate(&settings, &services)?, 0))
}
