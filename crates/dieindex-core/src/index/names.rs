//! Name storage for index entries.
//!
//! Two kinds of strings flow through the index:
//!
//! - raw DIE names, which alias the debug-info string pool and are shared by
//!   every entry carrying the same name, and
//! - synthesized names (canonicalized C++ names, decoded Ada components) that
//!   the index creates itself during finalize.
//!
//! [`IndexName`] keeps the two apart so diagnostics and memory accounting can
//! tell them apart, while both deref to `str`.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::config::MemoStrategy;

/// A name held by an index entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexName
{
    /// Alias of a string owned by the debug-info string pool.
    Pooled(Arc<str>),
    /// String created by the index while finalizing.
    Synthesized(Arc<str>),
}

impl IndexName
{
    pub fn as_str(&self) -> &str
    {
        match self {
            IndexName::Pooled(name) | IndexName::Synthesized(name) => name,
        }
    }

    pub fn is_synthesized(&self) -> bool
    {
        matches!(self, IndexName::Synthesized(_))
    }
}

impl Deref for IndexName
{
    type Target = str;

    fn deref(&self) -> &str
    {
        self.as_str()
    }
}

impl AsRef<str> for IndexName
{
    fn as_ref(&self) -> &str
    {
        self.as_str()
    }
}

impl fmt::Display for IndexName
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.as_str())
    }
}

/// Interner standing in for the debug-info string pool.
///
/// Every distinct name is stored once; interning the same text again hands
/// back the same allocation. This is the guarantee identity-keyed
/// memoization relies on.
#[derive(Debug, Default)]
pub struct StringPool
{
    strings: HashSet<Arc<str>>,
}

impl StringPool
{
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Return the shared copy of `name`, creating it on first use.
    pub fn intern(&mut self, name: &str) -> Arc<str>
    {
        if let Some(existing) = self.strings.get(name) {
            return Arc::clone(existing);
        }
        let interned: Arc<str> = Arc::from(name);
        self.strings.insert(Arc::clone(&interned));
        interned
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize
    {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.strings.is_empty()
    }
}

/// Canonical names already computed during one finalize pass.
///
/// With [`MemoStrategy::Identity`] the key is the address of the raw name's
/// allocation, which is only sound because raw names come from a
/// [`StringPool`] (identical names share storage) and the entries keep every
/// key alive for the whole pass. [`MemoStrategy::Content`] hashes the text
/// instead; it costs a string hash per entry but gives the same results when
/// the producer does not intern.
pub(crate) enum NameMemo
{
    Identity(HashMap<usize, IndexName>),
    Content(HashMap<Arc<str>, IndexName>),
}

impl NameMemo
{
    pub(crate) fn new(strategy: MemoStrategy) -> Self
    {
        match strategy {
            MemoStrategy::Identity => NameMemo::Identity(HashMap::new()),
            MemoStrategy::Content => NameMemo::Content(HashMap::new()),
        }
    }

    /// Canonical name for `raw`, computing it with `compute` on first sight.
    pub(crate) fn get_or_insert_with(&mut self, raw: &Arc<str>, compute: impl FnOnce() -> IndexName) -> IndexName
    {
        match self {
            NameMemo::Identity(seen) => {
                let key = Arc::as_ptr(raw).cast::<u8>() as usize;
                seen.entry(key).or_insert_with(compute).clone()
            }
            NameMemo::Content(seen) => seen.entry(Arc::clone(raw)).or_insert_with(compute).clone(),
        }
    }

    pub(crate) fn len(&self) -> usize
    {
        match self {
            NameMemo::Identity(seen) => seen.len(),
            NameMemo::Content(seen) => seen.len(),
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_pool_shares_storage()
    {
        let mut pool = StringPool::new();
        let a = pool.intern("main");
        let b = pool.intern("main");
        let c = pool.intern("other");

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_identity_memo_keys_on_allocation()
    {
        let mut memo = NameMemo::new(MemoStrategy::Identity);
        let first: Arc<str> = Arc::from("foo");
        let copy: Arc<str> = Arc::from("foo");

        let a = memo.get_or_insert_with(&first, || IndexName::Synthesized(Arc::from("one")));
        let b = memo.get_or_insert_with(&first, || IndexName::Synthesized(Arc::from("two")));
        let c = memo.get_or_insert_with(&copy, || IndexName::Synthesized(Arc::from("three")));

        assert_eq!(a.as_str(), "one");
        assert_eq!(b.as_str(), "one");
        assert_eq!(c.as_str(), "three");
        assert_eq!(memo.len(), 2);
    }

    #[test]
    fn test_content_memo_keys_on_text()
    {
        let mut memo = NameMemo::new(MemoStrategy::Content);
        let first: Arc<str> = Arc::from("foo");
        let copy: Arc<str> = Arc::from("foo");

        let a = memo.get_or_insert_with(&first, || IndexName::Synthesized(Arc::from("one")));
        let b = memo.get_or_insert_with(&copy, || IndexName::Synthesized(Arc::from("two")));

        assert_eq!(a, b);
        assert_eq!(memo.len(), 1);
    }
}
