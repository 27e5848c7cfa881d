//! # Error Types
//!
//! Errors for the parts of the crate that talk to the outside world.
//!
//! The in-memory index itself has no error channel: invariant violations are
//! assertions, and misses are empty results. Loading an object file, walking
//! its DWARF, and parsing configuration can fail, and those failures are
//! reported through [`IndexError`].
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for index construction
///
/// ## Error Categories
///
/// 1. **Input errors**: InvalidArgument, ObjectParse
/// 2. **DWARF errors**: Dwarf (malformed or unsupported debug info)
/// 3. **Configuration errors**: InvalidConfig
/// 4. **I/O errors**: Io (reading the object file, etc.)
#[derive(Error, Debug)]
pub enum IndexError
{
    /// Invalid argument passed to an index or scanner function
    ///
    /// Examples:
    /// - An address that cannot be parsed
    /// - A shard count of zero
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration value could not be understood
    ///
    /// Raised while reading `DIEINDEX_*` environment variables or when a
    /// scheduler cannot be built in the current context (for example the
    /// tokio scheduler outside a runtime).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The file is not an object file `object` understands
    #[error("Failed to parse object file {}: {details}", path.display())]
    ObjectParse
    {
        /// Path of the file that failed to parse
        path: PathBuf,
        /// Parser message
        details: String,
    },

    /// DWARF decoding failed
    ///
    /// The context names the operation that was running, e.g.
    /// "reading .debug_info unit header".
    #[error("DWARF error while {context}: {source}")]
    Dwarf
    {
        /// What the scanner was doing
        context: &'static str,
        /// Underlying gimli error
        #[source]
        source: gimli::Error,
    },

    /// I/O error (for file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IndexError
{
    /// Wrap a gimli error with the operation that produced it.
    pub fn dwarf(context: &'static str, source: gimli::Error) -> Self
    {
        IndexError::Dwarf { context, source }
    }
}

/// Convenience type alias for `Result<T, IndexError>`
///
/// ```rust
/// use dieindex_core::error::IndexResult;
/// fn foo() -> IndexResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type IndexResult<T> = std::result::Result<T, IndexError>;
