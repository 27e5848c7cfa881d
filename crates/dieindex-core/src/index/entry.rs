//! Index entries and the borrowed view handed to consumers.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use gimli::DwTag;

use super::compare::{compare, CompareMode};
use super::cooked::FinalizedIndex;
use super::names::IndexName;
use crate::types::{CompileUnit, DieOffset, EntryFlags};

/// Stable handle of an entry inside one [`CookedIndex`](super::CookedIndex).
///
/// Ids are arena positions. Finalizing sorts a separate permutation, so an
/// id returned by `add` stays valid for the lifetime of the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(u32);

impl EntryId
{
    pub(crate) fn from_index(index: usize) -> Self
    {
        let raw = u32::try_from(index).unwrap_or_else(|_| panic!("cooked index exceeds {} entries", u32::MAX));
        EntryId(raw)
    }

    pub(crate) fn index(self) -> usize
    {
        self.0 as usize
    }

    pub fn as_u32(self) -> u32
    {
        self.0
    }
}

impl fmt::Display for EntryId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "#{}", self.0)
    }
}

/// One named DIE.
#[derive(Debug, Clone)]
pub struct IndexEntry
{
    pub(crate) die_offset: DieOffset,
    pub(crate) tag: DwTag,
    pub(crate) flags: EntryFlags,
    pub(crate) name: Arc<str>,
    /// Unset until finalize; set exactly once there.
    pub(crate) canonical: Option<IndexName>,
    /// Lexically enclosing entry. Rewritten at most once, by Ada reconstruction.
    pub(crate) parent: Option<EntryId>,
    pub(crate) unit: Arc<CompileUnit>,
}

impl IndexEntry
{
    pub(crate) fn new(
        die_offset: DieOffset,
        tag: DwTag,
        flags: EntryFlags,
        name: Arc<str>,
        parent: Option<EntryId>,
        unit: Arc<CompileUnit>,
    ) -> Self
    {
        Self {
            die_offset,
            tag,
            flags,
            name,
            canonical: None,
            parent,
            unit,
        }
    }

    pub fn die_offset(&self) -> DieOffset
    {
        self.die_offset
    }

    pub fn tag(&self) -> DwTag
    {
        self.tag
    }

    pub fn flags(&self) -> EntryFlags
    {
        self.flags
    }

    /// Raw name as found in the debug info.
    pub fn name(&self) -> &str
    {
        &self.name
    }

    /// Canonical name, `None` before finalize.
    pub fn canonical(&self) -> Option<&IndexName>
    {
        self.canonical.as_ref()
    }

    pub fn parent(&self) -> Option<EntryId>
    {
        self.parent
    }

    pub fn unit(&self) -> &Arc<CompileUnit>
    {
        &self.unit
    }

    /// Name used for ordering: the canonical name once set, the raw name before.
    pub(crate) fn sort_name(&self) -> &str
    {
        self.canonical.as_deref().unwrap_or(&self.name)
    }

    /// Physical ordering of entries: [`CompareMode::Sort`] on canonical names.
    pub fn sort_cmp(&self, other: &IndexEntry) -> Ordering
    {
        compare(self.sort_name(), other.sort_name(), CompareMode::Sort)
    }
}

/// Borrowed view of a finalized entry.
///
/// This is what queries return. It can walk to its parent and rebuild the
/// qualified name without copying anything out of the index.
#[derive(Clone, Copy)]
pub struct EntryRef<'a>
{
    index: &'a FinalizedIndex,
    id: EntryId,
}

impl<'a> EntryRef<'a>
{
    pub(crate) fn new(index: &'a FinalizedIndex, id: EntryId) -> Self
    {
        Self { index, id }
    }

    pub fn id(&self) -> EntryId
    {
        self.id
    }

    /// The underlying entry record.
    pub fn entry(&self) -> &'a IndexEntry
    {
        self.index.entry(self.id)
    }

    pub fn name(&self) -> &'a str
    {
        &self.entry().name
    }

    /// Canonical display name.
    pub fn canonical(&self) -> &'a str
    {
        self.entry().sort_name()
    }

    pub fn tag(&self) -> DwTag
    {
        self.entry().tag
    }

    pub fn flags(&self) -> EntryFlags
    {
        self.entry().flags
    }

    pub fn die_offset(&self) -> DieOffset
    {
        self.entry().die_offset
    }

    pub fn unit(&self) -> &'a Arc<CompileUnit>
    {
        &self.entry().unit
    }

    pub fn parent(&self) -> Option<EntryRef<'a>>
    {
        self.entry().parent.map(|id| EntryRef::new(self.index, id))
    }

    /// Fully qualified name.
    ///
    /// Linkage names and top-level entries are returned as-is, as are names
    /// from languages without reconstructable scopes. Otherwise every ancestor
    /// is written outermost first, each followed by the unit language's
    /// separator (`::` or `.`).
    ///
    /// ```rust
    /// use std::sync::Arc;
    ///
    /// use dieindex_core::index::{CookedIndex, IndexOptions};
    /// use dieindex_core::types::{CompileUnit, DieOffset, EntryFlags, Language, UnitId};
    ///
    /// let unit = Arc::new(CompileUnit::new(UnitId(0), 0, Language::Cpp));
    /// let mut index = CookedIndex::new(IndexOptions::inline());
    /// let ns = index.add(DieOffset(0x10), gimli::DW_TAG_namespace, EntryFlags::empty(), "Foo".into(), None, &unit);
    /// index.add(DieOffset(0x20), gimli::DW_TAG_subprogram, EntryFlags::empty(), "Bar".into(), Some(ns), &unit);
    /// index.finalize();
    ///
    /// let bar = index.find("bar", false).next().unwrap();
    /// assert_eq!(bar.full_name(), "Foo::Bar");
    /// ```
    pub fn full_name(&self) -> Cow<'a, str>
    {
        let canonical = self.canonical();
        if self.flags().contains(EntryFlags::IS_LINKAGE) {
            return Cow::Borrowed(canonical);
        }
        let Some(parent) = self.parent() else {
            return Cow::Borrowed(canonical);
        };
        let Some(separator) = self.unit().language().scope_separator() else {
            return Cow::Borrowed(canonical);
        };

        let mut scratch = String::new();
        parent.write_scope(&mut scratch, separator);
        scratch.push_str(canonical);
        Cow::Owned(scratch)
    }

    /// Append this entry's scope (ancestors first), then its own name and `separator`.
    fn write_scope(&self, out: &mut String, separator: &str)
    {
        if let Some(parent) = self.parent() {
            parent.write_scope(out, separator);
        }
        out.push_str(self.canonical());
        out.push_str(separator);
    }
}

impl PartialEq for EntryRef<'_>
{
    fn eq(&self, other: &Self) -> bool
    {
        std::ptr::eq(self.index, other.index) && self.id == other.id
    }
}

impl Eq for EntryRef<'_> {}

impl fmt::Debug for EntryRef<'_>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("EntryRef")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("canonical", &self.canonical())
            .field("tag", &self.tag())
            .field("flags", &self.flags())
            .field("die_offset", &self.die_offset())
            .finish()
    }
}

impl fmt::Display for EntryRef<'_>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(&self.full_name())
    }
}
