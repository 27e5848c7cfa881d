//! # Configuration
//!
//! Knobs for building an index, read from the environment and overridable
//! by the CLI.
//!
//! ## Environment Variables
//!
//! - `DIEINDEX_MEMO`: canonical-name memoization (`identity` or `content`, default: `identity`)
//! - `DIEINDEX_SCHEDULER`: where finalization runs (`inline`, `thread` or `tokio`, default: `thread`)
//! - `DIEINDEX_SHARDS`: number of independently built indices (default: available parallelism, at most 8)

use std::env;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{IndexError, IndexResult};
use crate::index::IndexOptions;
use crate::task::{InlineScheduler, Scheduler, ThreadScheduler, TokioScheduler};

const MAX_DEFAULT_SHARDS: usize = 8;

/// Key used to memoize C/C++ canonical names during finalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemoStrategy
{
    /// Key on the identity of the interned raw name (fast; needs interning).
    #[default]
    Identity,
    /// Key on the text of the raw name (works without interning).
    Content,
}

impl FromStr for MemoStrategy
{
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "identity" | "pointer" => Ok(MemoStrategy::Identity),
            "content" | "text" => Ok(MemoStrategy::Content),
            _ => Err(IndexError::InvalidConfig(format!(
                "Unknown memo strategy: {s}. Use 'identity' or 'content'"
            ))),
        }
    }
}

/// Which [`Scheduler`] runs background finalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchedulerKind
{
    /// Run on the calling thread.
    Inline,
    /// One named OS thread per job.
    #[default]
    Thread,
    /// Tokio's blocking pool; requires an entered runtime.
    Tokio,
}

impl SchedulerKind
{
    /// Instantiate the scheduler.
    ///
    /// ## Errors
    ///
    /// Returns [`IndexError::InvalidConfig`] for `Tokio` when no runtime is entered.
    pub fn build(self) -> IndexResult<Arc<dyn Scheduler>>
    {
        Ok(match self {
            SchedulerKind::Inline => Arc::new(InlineScheduler),
            SchedulerKind::Thread => Arc::new(ThreadScheduler::default()),
            SchedulerKind::Tokio => Arc::new(TokioScheduler::current().ok_or_else(|| {
                IndexError::InvalidConfig("tokio scheduler requires a running tokio runtime".to_string())
            })?),
        })
    }
}

impl FromStr for SchedulerKind
{
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "inline" | "sync" => Ok(SchedulerKind::Inline),
            "thread" | "threads" => Ok(SchedulerKind::Thread),
            "tokio" => Ok(SchedulerKind::Tokio),
            _ => Err(IndexError::InvalidConfig(format!(
                "Unknown scheduler: {s}. Use 'inline', 'thread', or 'tokio'"
            ))),
        }
    }
}

/// Settings for scanning an object file into a [`CookedIndexVector`](crate::index::CookedIndexVector).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConfig
{
    pub memo: MemoStrategy,
    pub scheduler: SchedulerKind,
    /// Number of shards; each shard is scanned and finalized independently.
    pub shards: NonZeroUsize,
}

impl Default for IndexConfig
{
    fn default() -> Self
    {
        let parallelism = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
        Self {
            memo: MemoStrategy::default(),
            scheduler: SchedulerKind::default(),
            shards: NonZeroUsize::new(parallelism.min(MAX_DEFAULT_SHARDS)).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl IndexConfig
{
    /// Defaults overridden by `DIEINDEX_*` environment variables.
    ///
    /// ## Errors
    ///
    /// Returns [`IndexError::InvalidConfig`] when a variable is set to a value
    /// that cannot be parsed.
    pub fn from_env() -> IndexResult<Self>
    {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    ///
    /// ## Errors
    ///
    /// Returns [`IndexError::InvalidConfig`] on unparsable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> IndexResult<Self>
    {
        let mut config = Self::default();

        if let Some(memo) = lookup("DIEINDEX_MEMO") {
            config.memo = memo.parse()?;
        }
        if let Some(scheduler) = lookup("DIEINDEX_SCHEDULER") {
            config.scheduler = scheduler.parse()?;
        }
        if let Some(shards) = lookup("DIEINDEX_SHARDS") {
            config.shards = parse_shards(&shards)?;
        }

        Ok(config)
    }

    /// Index options carrying this configuration's scheduler and memo strategy.
    ///
    /// ## Errors
    ///
    /// Fails when the scheduler cannot be built, see [`SchedulerKind::build`].
    pub fn index_options(&self) -> IndexResult<IndexOptions>
    {
        Ok(IndexOptions::new(self.scheduler.build()?).with_memo(self.memo))
    }
}

/// Parse a positive shard count.
///
/// ## Errors
///
/// Returns [`IndexError::InvalidConfig`] for zero or non-numeric input.
pub fn parse_shards(value: &str) -> IndexResult<NonZeroUsize>
{
    value
        .trim()
        .parse::<NonZeroUsize>()
        .map_err(|err| IndexError::InvalidConfig(format!("Invalid shard count {value:?}: {err}")))
}
