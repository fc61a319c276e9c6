// Public modules
pub mod aws;
pub mod build;
pub mod cdn;
pub mod env;
pub mod env_file;
pub mod error;
pub mod headers;
pub mod health;
pub mod http;
pub mod pipeline;
pub mod snapshot;
pub mod storage;
pub mod sync;

// Re-export common types for convenience
pub use env::Settings;
pub use error::{Error, ErrorCode, Result};
