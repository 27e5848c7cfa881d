//! Common module for library exports

pub use crate::addrmap::AddressMap;
pub use crate::canonical::{DefaultCanonicalizer, NameCanonicalizer};
pub use crate::config::{IndexConfig, MemoStrategy, SchedulerKind};
pub use crate::error::{IndexError, IndexResult};
pub use crate::index::{
    compare, CompareMode, CookedIndex, CookedIndexVector, EntryId, EntryRef, IndexName, IndexOptions, StringPool,
};
pub use crate::task::{InlineScheduler, Scheduler, ThreadScheduler, TokioScheduler};
pub use crate::types::{Address, AddressRange, CompileUnit, DieOffset, EntryFlags, Language, UnitId};
