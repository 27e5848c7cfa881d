//! The cooked index: a sorted, canonicalized name index over DWARF DIEs.
//!
//! - [`compare`]: the three name orderings the index is built around
//! - [`IndexEntry`] / [`EntryRef`]: what is stored, and what queries hand out
//! - [`CookedIndex`]: one shard, built by the scanner then finalized
//! - [`CookedIndexVector`]: all shards of one object file

mod ada;
mod compare;
mod cooked;
mod dump;
mod entry;
mod names;
mod vector;

pub use compare::{compare, CompareMode};
pub use cooked::{CookedIndex, EntryRange, FinalizedIndex, IndexOptions};
pub use entry::{EntryId, EntryRef, IndexEntry};
pub use names::{IndexName, StringPool};
pub use vector::{CompositeRange, CookedIndexVector};
