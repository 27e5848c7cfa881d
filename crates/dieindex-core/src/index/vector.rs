//! Aggregation of per-shard indices.
//!
//! The scanner builds one [`CookedIndex`] per shard. The vector takes
//! ownership of all of them, starts their finalize jobs (which then run
//! concurrently), and answers queries across every shard.

use std::iter::FusedIterator;
use std::sync::Arc;

use tracing::debug;

use super::cooked::{CookedIndex, EntryRange};
use super::entry::EntryRef;
use crate::addrmap::AddressMap;
use crate::types::{Address, CompileUnit, EntryFlags};

/// A set of finalized (or finalizing) cooked indices.
#[derive(Debug)]
pub struct CookedIndexVector
{
    shards: Vec<CookedIndex>,
}

impl CookedIndexVector
{
    /// Take ownership of `shards` and finalize each of them.
    ///
    /// Finalize only schedules work, so this returns without waiting.
    ///
    /// ## Panics
    ///
    /// Panics if any shard was already finalized.
    pub fn new(mut shards: Vec<CookedIndex>) -> Self
    {
        for shard in &mut shards {
            shard.finalize();
        }
        debug!(shards = shards.len(), "scheduled cooked index finalization");
        Self { shards }
    }

    pub fn shards(&self) -> &[CookedIndex]
    {
        &self.shards
    }

    /// Block until every shard is finalized.
    pub fn wait(&self)
    {
        for shard in &self.shards {
            shard.wait();
        }
    }

    /// Number of searchable entries across all shards. Blocks.
    pub fn len(&self) -> usize
    {
        self.shards.iter().map(CookedIndex::len).sum()
    }

    pub fn is_empty(&self) -> bool
    {
        self.len() == 0
    }

    /// First shard's unit covering `address`. Never blocks.
    pub fn lookup(&self, address: Address) -> Option<&Arc<CompileUnit>>
    {
        self.shards.iter().find_map(|shard| shard.lookup(address))
    }

    /// Matches from every shard, shard by shard.
    pub fn find(&self, name: &str, completing: bool) -> CompositeRange<'_>
    {
        CompositeRange::new(self.shards.iter().map(|shard| shard.find(name, completing)).collect())
    }

    /// Every searchable entry, shard by shard. Each shard's run is sorted.
    pub fn all_entries(&self) -> CompositeRange<'_>
    {
        CompositeRange::new(self.shards.iter().map(CookedIndex::all_entries).collect())
    }

    /// The program's entry point across all shards.
    ///
    /// The first main found wins unless it was only inferred from its name
    /// and a later shard has one explicitly flagged `IS_MAIN`.
    pub fn get_main(&self) -> Option<EntryRef<'_>>
    {
        let mut result: Option<EntryRef<'_>> = None;
        for candidate in self.shards.iter().filter_map(CookedIndex::get_main) {
            match result {
                None => result = Some(candidate),
                Some(current)
                    if !current.flags().contains(EntryFlags::IS_MAIN)
                        && candidate.flags().contains(EntryFlags::IS_MAIN) =>
                {
                    result = Some(candidate);
                }
                Some(_) => {}
            }
        }
        result
    }

    /// Address maps of every shard, in shard order.
    pub fn address_maps(&self) -> impl Iterator<Item = &AddressMap> + '_
    {
        self.shards.iter().map(CookedIndex::address_map)
    }
}

/// Lazy concatenation of per-shard [`EntryRange`]s.
#[derive(Debug, Clone)]
pub struct CompositeRange<'a>
{
    ranges: Vec<EntryRange<'a>>,
    current: usize,
}

impl<'a> CompositeRange<'a>
{
    fn new(ranges: Vec<EntryRange<'a>>) -> Self
    {
        Self { ranges, current: 0 }
    }

    /// Remaining per-shard ranges.
    pub fn ranges(&self) -> &[EntryRange<'a>]
    {
        &self.ranges[self.current..]
    }
}

impl<'a> Iterator for CompositeRange<'a>
{
    type Item = EntryRef<'a>;

    fn next(&mut self) -> Option<Self::Item>
    {
        while let Some(range) = self.ranges.get_mut(self.current) {
            if let Some(entry) = range.next() {
                return Some(entry);
            }
            self.current += 1;
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>)
    {
        let remaining = self.ranges().iter().map(ExactSizeIterator::len).sum();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CompositeRange<'_> {}

impl FusedIterator for CompositeRange<'_> {}
