//! Tests for GNAT nested-name reconstruction

use std::sync::Arc;

use dieindex_core::canonical::NameCanonicalizer;
use dieindex_core::index::{CookedIndex, EntryRef, IndexOptions};
use dieindex_core::types::{CompileUnit, DieOffset, EntryFlags, Language, UnitId};
use gimli::{DW_TAG_namespace, DW_TAG_subprogram, DW_TAG_variable};

fn ada_unit(id: u32) -> Arc<CompileUnit>
{
    Arc::new(CompileUnit::new(UnitId(id), 0, Language::Ada))
}

fn scope_chain(entry: EntryRef<'_>) -> Vec<String>
{
    let mut chain = Vec::new();
    let mut current = entry.parent();
    while let Some(parent) = current {
        chain.push(parent.canonical().to_string());
        current = parent.parent();
    }
    chain.reverse();
    chain
}

#[test]
fn test_reconstructs_scope_chain()
{
    let cu = ada_unit(0);
    let mut index = CookedIndex::new(IndexOptions::inline());
    index.add(DieOffset(0x40), DW_TAG_subprogram, EntryFlags::empty(), "pkg__sub__entity".into(), None, &cu);
    index.finalize();

    let entity = index.find("entity", false).next().unwrap();
    assert_eq!(entity.name(), "pkg__sub__entity");
    assert_eq!(entity.canonical(), "entity");
    assert_eq!(entity.full_name(), "pkg.sub.entity");
    assert_eq!(scope_chain(entity), vec!["pkg", "sub"]);

    let sub = entity.parent().unwrap();
    assert_eq!(sub.tag(), DW_TAG_namespace);
    assert_eq!(sub.die_offset(), DieOffset(0x40));
    assert!(sub.flags().is_empty());
    assert!(sub.entry().canonical().unwrap().is_synthesized());

    // Synthesized namespaces hang off the entry but are not searchable.
    assert!(index.find("pkg", false).next().is_none());
    assert_eq!(index.all_entries().len(), 1);
    assert_eq!(index.wait().arena_len(), 3);
}

#[test]
fn test_reuses_namespaces_within_unit()
{
    let cu = ada_unit(0);
    let mut index = CookedIndex::new(IndexOptions::inline());
    index.add(DieOffset(0x40), DW_TAG_subprogram, EntryFlags::empty(), "pkg__sub__entity".into(), None, &cu);
    index.add(DieOffset(0x80), DW_TAG_variable, EntryFlags::empty(), "pkg__sub__other".into(), None, &cu);
    index.finalize();

    let entity = index.find("entity", false).next().unwrap();
    let other = index.find("other", false).next().unwrap();
    assert_eq!(entity.parent(), other.parent());
    assert_eq!(entity.parent().unwrap().parent(), other.parent().unwrap().parent());
    assert_eq!(other.full_name(), "pkg.sub.other");
    assert_eq!(index.wait().arena_len(), 4);
}

#[test]
fn test_namespaces_are_not_shared_across_units()
{
    let first = ada_unit(0);
    let second = ada_unit(1);
    let mut index = CookedIndex::new(IndexOptions::inline());
    index.add(DieOffset(0x40), DW_TAG_subprogram, EntryFlags::empty(), "pkg__a".into(), None, &first);
    index.add(DieOffset(0x80), DW_TAG_subprogram, EntryFlags::empty(), "pkg__b".into(), None, &second);
    index.finalize();

    let a = index.find("a", false).next().unwrap();
    let b = index.find("b", false).next().unwrap();
    assert_ne!(a.parent(), b.parent());
    assert_eq!(b.parent().unwrap().unit().id(), UnitId(1));
    assert_eq!(b.full_name(), "pkg.b");
}

#[test]
fn test_component_slot_is_shared_within_unit()
{
    let cu = ada_unit(0);
    let mut index = CookedIndex::new(IndexOptions::inline());
    index.add(DieOffset(1), DW_TAG_subprogram, EntryFlags::empty(), "outer__util__f".into(), None, &cu);
    index.add(DieOffset(2), DW_TAG_subprogram, EntryFlags::empty(), "util__g".into(), None, &cu);
    index.finalize();

    let f = index.find("f", false).next().unwrap();
    let g = index.find("g", false).next().unwrap();
    assert_eq!(f.full_name(), "outer.util.f");
    // `util` was already created for this unit, so `g` hangs off the same one.
    assert_eq!(g.full_name(), "outer.util.g");
    assert_eq!(f.parent(), g.parent());
    assert_eq!(index.wait().arena_len(), 4);
}

#[test]
fn test_empty_components_fall_back_to_raw()
{
    let cu = ada_unit(0);
    let mut index = CookedIndex::new(IndexOptions::inline());
    let parent = index.add(DieOffset(1), DW_TAG_namespace, EntryFlags::empty(), "scope".into(), None, &cu);
    index.add(DieOffset(2), DW_TAG_variable, EntryFlags::empty(), "foo__".into(), Some(parent), &cu);
    index.add(DieOffset(3), DW_TAG_variable, EntryFlags::empty(), "__bar".into(), None, &cu);
    index.finalize();

    let foo = index.find("foo__", false).next().unwrap();
    assert_eq!(foo.canonical(), "foo__");
    assert_eq!(foo.full_name(), "scope.foo__");
    let bar = index.find("__bar", false).next().unwrap();
    assert!(bar.parent().is_none());
    // Nothing synthesized for either name.
    assert_eq!(index.wait().arena_len(), 3);
}

#[test]
fn test_undecodable_names_fall_back_to_raw()
{
    let cu = ada_unit(0);
    let mut index = CookedIndex::new(IndexOptions::inline());
    let parent = index.add(DieOffset(1), DW_TAG_namespace, EntryFlags::empty(), "Scope".into(), None, &cu);
    index.add(DieOffset(2), DW_TAG_variable, EntryFlags::empty(), "Mixed_Case".into(), Some(parent), &cu);
    index.finalize();

    let entry = index.find("mixed_case", false).next().unwrap();
    assert_eq!(entry.canonical(), "Mixed_Case");
    assert!(!entry.entry().canonical().unwrap().is_synthesized());
    // No rewrite: the scanner-provided parent is kept.
    assert_eq!(entry.full_name(), "Scope.Mixed_Case");
}

#[test]
fn test_single_component_clears_parent()
{
    let cu = ada_unit(0);
    let mut index = CookedIndex::new(IndexOptions::inline());
    let parent = index.add(DieOffset(1), DW_TAG_namespace, EntryFlags::empty(), "Scope".into(), None, &cu);
    index.add(DieOffset(2), DW_TAG_subprogram, EntryFlags::empty(), "_ada_hello".into(), Some(parent), &cu);
    index.finalize();

    let hello = index.find("hello", false).next().unwrap();
    assert!(hello.parent().is_none());
    assert_eq!(hello.full_name(), "hello");
}

#[test]
fn test_linkage_names_skip_reconstruction()
{
    let cu = ada_unit(0);
    let mut index = CookedIndex::new(IndexOptions::inline());
    index.add(DieOffset(1), DW_TAG_subprogram, EntryFlags::IS_LINKAGE, "pkg__proc".into(), None, &cu);
    index.finalize();

    let entry = index.find("pkg__proc", false).next().unwrap();
    assert!(entry.parent().is_none());
    assert_eq!(index.wait().arena_len(), 1);
}

#[derive(Debug)]
struct FixedDecoder;

impl NameCanonicalizer for FixedDecoder
{
    fn canonicalize(&self, _language: Language, _raw: &str) -> Option<String>
    {
        None
    }

    fn ada_decode(&self, raw: &str) -> String
    {
        match raw {
            "encoded_entity" => "pkg.sub.Entity".to_string(),
            "encoded_other" => "PKG.Sub.Other".to_string(),
            _ => String::new(),
        }
    }
}

#[test]
fn test_component_lookup_is_case_insensitive()
{
    let cu = ada_unit(0);
    let options = IndexOptions::inline().with_canonicalizer(Arc::new(FixedDecoder));
    let mut index = CookedIndex::new(options);
    index.add(DieOffset(1), DW_TAG_subprogram, EntryFlags::empty(), "encoded_entity".into(), None, &cu);
    index.add(DieOffset(2), DW_TAG_subprogram, EntryFlags::empty(), "encoded_other".into(), None, &cu);
    index.finalize();

    let entity = index.find("Entity", false).next().unwrap();
    let other = index.find("Other", false).next().unwrap();
    assert_eq!(entity.canonical(), "Entity");
    assert_eq!(entity.full_name(), "pkg.sub.Entity");
    // The namespaces created for the first name are reused, spelling included.
    assert_eq!(other.full_name(), "pkg.sub.Other");
    assert_eq!(entity.parent(), other.parent());

    let synthesized: Vec<&str> = index.wait().synthesized_names().iter().map(|s| &**s).collect();
    assert_eq!(synthesized, vec!["pkg", "sub", "Entity", "Other"]);
}
