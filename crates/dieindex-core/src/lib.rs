//! # dieindex-core
//!
//! A "cooked" index over DWARF debugging information entries: a flat,
//! sorted, language-aware table of every named DIE in an object file, built
//! for fast name lookup, prefix completion, and address-to-unit mapping.
//!
//! This crate provides:
//! - The index itself ([`index::CookedIndex`]) and its multi-shard wrapper
//!   ([`index::CookedIndexVector`])
//! - Name canonicalization for C, C++ and GNAT-encoded Ada names
//! - Pluggable schedulers for background finalization
//! - A DWARF scanner that builds the index from an object file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dieindex_core::config::IndexConfig;
//! use dieindex_core::scanner;
//!
//! let config = IndexConfig::from_env()?;
//! let index = scanner::scan_file("/usr/bin/true", &config, config.index_options()?)?;
//! for entry in index.find("main", false) {
//!     println!("{} at {}", entry.full_name(), entry.die_offset());
//! }
//! # Ok::<(), dieindex_core::error::IndexError>(())
//! ```

pub mod addrmap;
pub mod canonical;
pub mod config;
pub mod error;
pub mod index;
pub mod prelude;
pub mod scanner;
pub mod task;
pub mod types;

pub use error::{IndexError, IndexResult};
pub use index::{CookedIndex, CookedIndexVector, IndexOptions};
