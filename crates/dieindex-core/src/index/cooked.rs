//! # Cooked Index
//!
//! A sorted, canonicalized index over the named DIEs of one group of compile
//! units.
//!
//! ## Lifecycle
//!
//! 1. **Build**: the scanner calls [`CookedIndex::add`] for every named DIE
//!    (parents before children) and [`CookedIndex::add_address_range`] for
//!    every range a unit covers. Single producer, no locking.
//! 2. **Finalize**: [`CookedIndex::finalize`] moves the entries into a job on
//!    the index's [`Scheduler`] and returns immediately. The job computes
//!    canonical names, rebuilds Ada scopes, and sorts.
//! 3. **Query**: [`find`](CookedIndex::find), [`get_main`](CookedIndex::get_main)
//!    and [`all_entries`](CookedIndex::all_entries) block until the job is
//!    done; [`lookup`](CookedIndex::lookup) only touches the address map and
//!    never blocks.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use gimli::DwTag;
use tracing::debug;

use super::ada::{self, GnatNamespaces};
use super::compare::{compare, CompareMode};
use super::entry::{EntryId, EntryRef, IndexEntry};
use super::names::{IndexName, NameMemo};
use crate::addrmap::AddressMap;
use crate::canonical::{DefaultCanonicalizer, NameCanonicalizer};
use crate::config::MemoStrategy;
use crate::task::{self, InlineScheduler, Scheduler, TaskHandle, ThreadScheduler};
use crate::types::{Address, AddressRange, CompileUnit, DieOffset, EntryFlags, Language};

/// Collaborators injected into a [`CookedIndex`].
#[derive(Debug, Clone)]
pub struct IndexOptions
{
    pub scheduler: Arc<dyn Scheduler>,
    pub canonicalizer: Arc<dyn NameCanonicalizer>,
    pub memo: MemoStrategy,
}

impl IndexOptions
{
    /// Options finalizing on `scheduler` with the default canonicalizer.
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self
    {
        Self {
            scheduler,
            canonicalizer: Arc::new(DefaultCanonicalizer),
            memo: MemoStrategy::default(),
        }
    }

    /// Finalize synchronously inside `finalize()`.
    pub fn inline() -> Self
    {
        Self::new(Arc::new(InlineScheduler))
    }

    #[must_use]
    pub fn with_canonicalizer(mut self, canonicalizer: Arc<dyn NameCanonicalizer>) -> Self
    {
        self.canonicalizer = canonicalizer;
        self
    }

    #[must_use]
    pub fn with_memo(mut self, memo: MemoStrategy) -> Self
    {
        self.memo = memo;
        self
    }
}

impl Default for IndexOptions
{
    fn default() -> Self
    {
        Self::new(Arc::new(ThreadScheduler::default()))
    }
}

/// Index over the named DIEs of one shard.
pub struct CookedIndex
{
    entries: Vec<IndexEntry>,
    main: Option<EntryId>,
    address_map: AddressMap,
    options: IndexOptions,
    finalized: Option<TaskHandle<FinalizedIndex>>,
}

impl CookedIndex
{
    #[must_use]
    pub fn new(options: IndexOptions) -> Self
    {
        Self {
            entries: Vec::new(),
            main: None,
            address_map: AddressMap::new(),
            options,
            finalized: None,
        }
    }

    /// Record a named DIE and return its handle.
    ///
    /// The entry's canonical name stays unset until finalize. The main entry
    /// is updated on the way: an explicit `IS_MAIN` always takes over, while
    /// a non-Ada entry literally named `main` is adopted only if no main has
    /// been seen yet.
    ///
    /// ## Panics
    ///
    /// Panics if the index was already finalized or `parent` was not returned
    /// by an earlier `add` on this index.
    pub fn add(
        &mut self,
        die_offset: DieOffset,
        tag: DwTag,
        flags: EntryFlags,
        name: Arc<str>,
        parent: Option<EntryId>,
        unit: &Arc<CompileUnit>,
    ) -> EntryId
    {
        assert!(self.finalized.is_none(), "entry {name:?} added to a finalized cooked index");
        if let Some(parent) = parent {
            assert!(
                parent.index() < self.entries.len(),
                "entry {name:?} references unknown parent {parent}"
            );
        }

        let id = EntryId::from_index(self.entries.len());
        let is_main_name = &*name == "main";
        self.entries
            .push(IndexEntry::new(die_offset, tag, flags, name, parent, Arc::clone(unit)));

        if flags.contains(EntryFlags::IS_MAIN) {
            self.main = Some(id);
        } else if unit.language() != Language::Ada && self.main.is_none() && is_main_name {
            self.main = Some(id);
        }

        id
    }

    /// Record that `unit` covers `range`.
    ///
    /// Address ranges are part of the build phase but are not touched by
    /// finalize, so they may be added until the index is dropped.
    pub fn add_address_range(&mut self, range: AddressRange, unit: &Arc<CompileUnit>)
    {
        self.address_map.insert(range, Arc::clone(unit));
    }

    /// Number of entries added so far (excluding synthesized ones).
    pub fn len(&self) -> usize
    {
        match &self.finalized {
            Some(handle) => handle.wait().order.len(),
            None => self.entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool
    {
        self.len() == 0
    }

    /// Start finalizing on the configured scheduler and return without waiting.
    ///
    /// ## Panics
    ///
    /// Panics if called twice.
    pub fn finalize(&mut self)
    {
        assert!(self.finalized.is_none(), "cooked index finalized twice");

        let finalizer = Finalizer {
            entries: std::mem::take(&mut self.entries),
            main: self.main,
            canonicalizer: Arc::clone(&self.options.canonicalizer),
            memo: self.options.memo,
        };
        self.finalized = Some(task::submit(self.options.scheduler.as_ref(), move || finalizer.run()));
    }

    /// Whether finalize has been started.
    pub fn is_finalizing(&self) -> bool
    {
        self.finalized.is_some()
    }

    /// Whether the finalize job has completed, without blocking.
    pub fn is_finalized(&self) -> bool
    {
        self.finalized.as_ref().is_some_and(TaskHandle::is_complete)
    }

    /// Block until finalize has completed and return the result.
    ///
    /// ## Panics
    ///
    /// Panics if [`finalize`](Self::finalize) was never called, or if the
    /// finalize job failed.
    pub fn wait(&self) -> &FinalizedIndex
    {
        match &self.finalized {
            Some(handle) => handle.wait(),
            None => panic!("cooked index queried before finalize"),
        }
    }

    /// Entries whose canonical name matches `name`.
    ///
    /// With `completing` the name is treated as a prefix; otherwise it must
    /// match exactly, ignoring ASCII case, with any template argument list on
    /// the entry side allowed. Blocks until finalize is done.
    pub fn find(&self, name: &str, completing: bool) -> EntryRange<'_>
    {
        self.wait().find(name, completing)
    }

    /// Compile unit covering `address`, if any. Never blocks.
    pub fn lookup(&self, address: Address) -> Option<&Arc<CompileUnit>>
    {
        self.address_map.lookup(address)
    }

    /// The program's entry point, if one was seen. Blocks until finalize is done.
    pub fn get_main(&self) -> Option<EntryRef<'_>>
    {
        let index = self.wait();
        index.main.map(|id| EntryRef::new(index, id))
    }

    /// Every searchable entry in sorted order. Blocks until finalize is done.
    pub fn all_entries(&self) -> EntryRange<'_>
    {
        let index = self.wait();
        EntryRange::new(index, &index.order)
    }

    pub fn address_map(&self) -> &AddressMap
    {
        &self.address_map
    }
}

impl fmt::Debug for CookedIndex
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("CookedIndex")
            .field("pending_entries", &self.entries.len())
            .field("main", &self.main)
            .field("address_map", &self.address_map)
            .field("finalized", &self.finalized)
            .finish_non_exhaustive()
    }
}

/// State of a [`CookedIndex`] after finalize.
#[derive(Debug)]
pub struct FinalizedIndex
{
    /// Arena: entries in creation order, synthesized Ada namespaces last.
    entries: Vec<IndexEntry>,
    /// Searchable entries sorted by [`CompareMode::Sort`].
    order: Vec<EntryId>,
    main: Option<EntryId>,
    /// Side table of every string created while finalizing.
    synthesized: Vec<Arc<str>>,
}

impl FinalizedIndex
{
    pub(crate) fn entry(&self, id: EntryId) -> &IndexEntry
    {
        &self.entries[id.index()]
    }

    /// Handle for `id`; ids come from `add` on the same index.
    pub fn get(&self, id: EntryId) -> Option<EntryRef<'_>>
    {
        (id.index() < self.entries.len()).then(|| EntryRef::new(self, id))
    }

    /// Total arena size, including synthesized namespace entries.
    pub fn arena_len(&self) -> usize
    {
        self.entries.len()
    }

    /// Strings synthesized while finalizing (canonical names, Ada components).
    pub fn synthesized_names(&self) -> &[Arc<str>]
    {
        &self.synthesized
    }

    fn canonical(&self, id: EntryId) -> &str
    {
        self.entry(id).sort_name()
    }

    fn find(&self, name: &str, completing: bool) -> EntryRange<'_>
    {
        let mode = if completing {
            CompareMode::Complete
        } else {
            CompareMode::Match
        };

        let lower = self
            .order
            .partition_point(|&id| compare(self.canonical(id), name, mode) == Ordering::Less);
        let upper = lower
            + self.order[lower..].partition_point(|&id| compare(self.canonical(id), name, mode) != Ordering::Greater);

        EntryRange::new(self, &self.order[lower..upper])
    }
}

/// Contiguous run of sorted entries from one index.
#[derive(Clone)]
pub struct EntryRange<'a>
{
    index: &'a FinalizedIndex,
    ids: std::slice::Iter<'a, EntryId>,
}

impl<'a> EntryRange<'a>
{
    fn new(index: &'a FinalizedIndex, ids: &'a [EntryId]) -> Self
    {
        Self { index, ids: ids.iter() }
    }

    /// Remaining entries as a slice of ids.
    pub fn ids(&self) -> &'a [EntryId]
    {
        self.ids.as_slice()
    }
}

impl<'a> Iterator for EntryRange<'a>
{
    type Item = EntryRef<'a>;

    fn next(&mut self) -> Option<Self::Item>
    {
        self.ids.next().map(|&id| EntryRef::new(self.index, id))
    }

    fn size_hint(&self) -> (usize, Option<usize>)
    {
        self.ids.size_hint()
    }
}

impl DoubleEndedIterator for EntryRange<'_>
{
    fn next_back(&mut self) -> Option<Self::Item>
    {
        self.ids.next_back().map(|&id| EntryRef::new(self.index, id))
    }
}

impl ExactSizeIterator for EntryRange<'_> {}

impl fmt::Debug for EntryRange<'_>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// The finalize job: everything it needs, moved out of the index.
struct Finalizer
{
    entries: Vec<IndexEntry>,
    main: Option<EntryId>,
    canonicalizer: Arc<dyn NameCanonicalizer>,
    memo: MemoStrategy,
}

impl Finalizer
{
    fn run(self) -> FinalizedIndex
    {
        let started = Instant::now();
        let Finalizer {
            mut entries,
            main,
            canonicalizer,
            memo,
        } = self;

        let added = entries.len();
        debug!(entries = added, "finalizing cooked index");

        let mut seen_names = NameMemo::new(memo);
        let mut namespaces = GnatNamespaces::default();
        let mut synthesized = Vec::new();

        // Synthesized namespaces are appended past `added` with their
        // canonical name already set, so only the scanned entries are visited.
        for index in 0..added {
            let id = EntryId::from_index(index);
            let entry = &entries[index];
            assert!(entry.canonical.is_none(), "entry {id} canonicalized twice");

            let language = entry.unit.language();
            let canonical = if entry.flags.contains(EntryFlags::IS_LINKAGE) {
                IndexName::Pooled(Arc::clone(&entry.name))
            } else if language == Language::Ada {
                match ada::reconstruct(&mut entries, id, &mut namespaces, canonicalizer.as_ref(), &mut synthesized) {
                    Some(tail) => IndexName::Synthesized(tail),
                    None => IndexName::Pooled(Arc::clone(&entries[index].name)),
                }
            } else if language.is_c_family() {
                let raw = Arc::clone(&entry.name);
                seen_names.get_or_insert_with(&raw, || match canonicalizer.canonicalize(language, &raw) {
                    Some(canonical) => {
                        let canonical: Arc<str> = Arc::from(canonical);
                        synthesized.push(Arc::clone(&canonical));
                        IndexName::Synthesized(canonical)
                    }
                    None => IndexName::Pooled(Arc::clone(&raw)),
                })
            } else {
                IndexName::Pooled(Arc::clone(&entry.name))
            };

            entries[index].canonical = Some(canonical);
        }

        entries.shrink_to_fit();
        synthesized.shrink_to_fit();

        let mut order: Vec<EntryId> = (0..added).map(EntryId::from_index).collect();
        order.sort_by(|&a, &b| entries[a.index()].sort_cmp(&entries[b.index()]));

        debug_assert!(entries.iter().all(|entry| entry.canonical.is_some()));
        debug!(
            entries = added,
            namespaces = entries.len() - added,
            namespace_names = namespaces.len(),
            memoized = seen_names.len(),
            synthesized = synthesized.len(),
            elapsed_us = started.elapsed().as_micros(),
            "cooked index finalized"
        );

        FinalizedIndex {
            entries,
            order,
            main,
            synthesized,
        }
    }
}
