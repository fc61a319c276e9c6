use clap::Args;
use launchpad::snapshot::{placeholder_tile, PlaceholderTile};

use crate::commands::CmdResult;

#[derive(Args)]
pub struct PlaceholderArgs {}

pub fn run(_args: PlaceholderArgs) -> CmdResult<PlaceholderTile> {
    Ok((placeholder_tile(), 0))
}
