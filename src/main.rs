use clap::{Parser, Subcommand};

use commands::GlobalArgs;

mod commands;
mod output;

use commands::{all, build, deploy, invalidate, placeholder, tiles, verify};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "launchpad")]
#[command(version = VERSION)]
#[command(about = "Verify, build and publish the static dashboard site")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the health of the backing APIs
    Verify(verify::VerifyArgs),
    /// Build the static export
    Build(build::BuildArgs),
    /// Upload an existing build to the bucket
    Deploy(deploy::DeployArgs),
    /// Invalidate the CDN distribution
    Invalidate(invalidate::InvalidateArgs),
    /// verify, build, deploy and invalidate in order
    All(all::AllArgs),
    /// Snapshot the portfolio tiles and status locally
    Tiles(tiles::TilesArgs),
    /// Print the placeholder sentiment tile
    Placeholder(placeholder::PlaceholderArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let global = GlobalArgs {};

    let (json_result, exit_code) = commands::run_json(cli.command, &global);
    if let Err(err) = output::print_json_result(json_result) {
        launchpad::log_status!("launchpad", "{}", err);
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
