//! # Types
//!
//! Plain value types shared by the index, the scanner, and consumers.
//!
//! These types keep DWARF-level concepts (DIE offsets, source languages,
//! address ranges) strongly typed so the rest of the crate never passes raw
//! `u64`s or language codes around.

pub mod address;
pub mod die;
pub mod flags;
pub mod language;
pub mod unit;

// Re-export all public types
pub use address::{Address, AddressRange};
pub use die::DieOffset;
pub use flags::EntryFlags;
pub use language::Language;
pub use unit::{CompileUnit, UnitId};
