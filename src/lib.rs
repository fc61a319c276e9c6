/// Macro for prefixed status logging to stderr.
///
/// Usage:
/// ```ignore
/// log_status!("sync", "uploaded {} files...", count);
/// log_status!("invalidate", "created CloudFront invalidation: {}", id);
/// ```
#[macro_export]
macro_rules! log_status {
    ($prefix:expr, $($arg:tt)*) => {
        eprintln!(concat!("[", $prefix, "] {}"), format_args!($($arg)*));
    };
}

pub mod core;
pub mod utils;

// Re-export everything from core for ergonomic library use
// Users can write `launchpad::sync` instead of `launchpad::core::sync`
pub use core::*;
pub use utils::*;
