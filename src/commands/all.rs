use clap::Args;
use launchpad::pipeline::{self, AllReport, Services, VerifyPolicy};

use crate::commands::{load_settings, CmdResult, GlobalArgs};

#[derive(Args)]
pub struct AllArgs {}

pub fn run(_args: AllArgs, _global: &GlobalArgs) -> CmdResult<AllReport> {
    let settings = load_settings();
    let policy = VerifyPolicy::from_settings(&settings);

    let services = Services::live(&settings)?;
    Ok((pipeline::run_all(&settings, &services, policy)?, 0))
}
