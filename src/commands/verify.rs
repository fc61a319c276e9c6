use clap::Args;
use launchpad::health::HealthReport;
use launchpad::pipeline::{self, Services};

use crate::commands::{load_settings, CmdResult, GlobalArgs};

#[derive(Args)]
pub struct VerifyArgs {}

pub fn run(_args: VerifyArgs, _global: &GlobalArgs) -> CmdResult<HealthReport> {
    let settings = load_settings();
    let services = Services::live(&settings)?;
    let report = pipeline::verify(&settings, &services);

    let exit_code = if report.outcome.is_healthy() { 0 } else { 2 };
    Ok((report, exit_code))
}
