//! # dieindex utilities
//!
//! Logging setup shared by the `dieindex` binary and by tests that want to
//! see what the index is doing.

pub mod logging;

pub use logging::{init_logging, init_logging_with, LogFile, LogFormat, LogLevel, LogSettings, LoggingError};
pub use tracing::{debug, error, info, trace, warn};
