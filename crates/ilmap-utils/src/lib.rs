//! # ilmap Utilities
//!
//! Shared logging and configuration for the ilmap workspace.
//!
//! Logging is built on `tracing`; configuration is read from environment
//! variables so a hosting debugger can tune symbol loading without code
//! changes.

pub mod config;
pub mod logging;

// Re-export commonly used items for convenience
pub use config::{ConfigError, SymbolSettings};
pub use logging::{
    default_log_path, init_file_logging, init_logging, init_logging_with_level, LogFormat, LogLevel, LoggingError,
    LoggingGuard,
};
pub use tracing::{debug, error, info, trace, warn};
