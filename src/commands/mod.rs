pub type CmdResult<T> = launchpad::Result<(T, i32)>;

pub(crate) struct GlobalArgs {}

/// Resolve settings once per run: live environment first, then `./.env`.
pub(crate) fn load_settings() -> launchpad::Settings {
    launchpad::env::load()
}

pub mod all;
pub mod build;
pub mod deploy;
pub mod invalidate;
pub mod placeholder;
pub mod tiles;
pub mod verify;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args))
    };
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (launchpad::Result<serde_json::Value>, i32) {
    match command {
        // Commands that never read settings
        crate::Commands::Placeholder(args) => dispatch!(args, placeholder),

        crate::Commands::Verify(args) => dispatch!(args, global, verify),
        crate::Commands::Build(args) => dispatch!(args, global, build),
        crate::Commands::Deploy(args) => dispatch!(args, global, deploy),
        crate::Commands::Invalidate(args) => dispatch!(args, global, invalidate),
        crate::Commands::All(args) => dispatch!(args, global, all),
        crate::Commands::Tiles(args) => dispatch!(args, global, tiles),
    }
}
