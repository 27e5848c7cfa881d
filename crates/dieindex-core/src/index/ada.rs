//! GNAT nested-name reconstruction.
//!
//! GNAT emits fully qualified names (`pkg__child__proc`) as a single flat DIE
//! name. To give such entries a real scope chain, finalize decodes the name,
//! keeps the last component as the entry's canonical name, and points the
//! entry at a chain of synthesized namespace entries for the leading
//! components.

use std::collections::HashMap;
use std::sync::Arc;

use smallvec::SmallVec;

use super::entry::{EntryId, IndexEntry};
use super::names::IndexName;
use crate::canonical::NameCanonicalizer;
use crate::types::EntryFlags;

/// Most recently synthesized namespace entry per component name.
///
/// Keys are lower-cased component text, since Ada names are case
/// insensitive. A slot is reused by any later entry of the same unit that
/// names the component, whatever comes before it in that name; an entry from
/// another unit replaces it. The table lives for one finalize pass.
#[derive(Debug, Default)]
pub(crate) struct GnatNamespaces
{
    slots: HashMap<String, EntryId>,
}

impl GnatNamespaces
{
    pub(crate) fn len(&self) -> usize
    {
        self.slots.len()
    }
}

/// Rebuild the scope of the Ada entry `id`.
///
/// Returns the trailing component to use as the canonical name, or `None`
/// when the name does not decode, in which case the entry is left untouched.
/// Every string created here is also recorded in `synthesized`.
pub(crate) fn reconstruct(
    entries: &mut Vec<IndexEntry>,
    id: EntryId,
    namespaces: &mut GnatNamespaces,
    canonicalizer: &dyn NameCanonicalizer,
    synthesized: &mut Vec<Arc<str>>,
) -> Option<Arc<str>>
{
    let decoded = canonicalizer.ada_decode(&entries[id.index()].name);
    if decoded.is_empty() {
        return None;
    }

    let mut components: SmallVec<[&str; 4]> = decoded.split('.').collect();
    if components.iter().any(|component| component.is_empty()) {
        return None;
    }
    let tail = components.pop()?;

    let die_offset = entries[id.index()].die_offset;
    let unit = Arc::clone(&entries[id.index()].unit);

    let mut parent = None;
    for component in components {
        let key = component.to_lowercase();
        let reusable = namespaces
            .slots
            .get(&key)
            .copied()
            .filter(|&candidate| entries[candidate.index()].unit.id() == unit.id());

        let namespace = if let Some(existing) = reusable {
            existing
        } else {
            let name: Arc<str> = Arc::from(component);
            synthesized.push(Arc::clone(&name));

            let mut entry = IndexEntry::new(
                die_offset,
                gimli::DW_TAG_namespace,
                EntryFlags::empty(),
                Arc::clone(&name),
                parent,
                Arc::clone(&unit),
            );
            entry.canonical = Some(IndexName::Synthesized(name));

            let created = EntryId::from_index(entries.len());
            entries.push(entry);
            namespaces.slots.insert(key, created);
            created
        };

        parent = Some(namespace);
    }

    entries[id.index()].parent = parent;

    let tail: Arc<str> = Arc::from(tail);
    synthesized.push(Arc::clone(&tail));
    Some(tail)
}
