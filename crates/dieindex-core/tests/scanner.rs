//! Scanner tests against the test executable itself
//!
//! Test binaries are built with debug info on Linux, so the running test
//! executable is a convenient real-world input.

#![cfg(target_os = "linux")]

use std::num::NonZeroUsize;

use dieindex_core::config::{IndexConfig, MemoStrategy, SchedulerKind};
use dieindex_core::index::{CookedIndexVector, IndexOptions};
use dieindex_core::scanner::{self, DebugImage};
use dieindex_core::types::Language;

/// A function with an unmistakable name to look for.
#[inline(never)]
pub fn dieindex_scanner_probe_function() -> u32
{
    std::hint::black_box(42)
}

fn scan(shards: usize, scheduler: SchedulerKind) -> Option<CookedIndexVector>
{
    let exe = std::env::current_exe().ok()?;
    let image = DebugImage::open(&exe).ok()?;
    if !image.has_debug_info() {
        return None;
    }

    let config = IndexConfig {
        memo: MemoStrategy::Identity,
        scheduler,
        shards: NonZeroUsize::new(shards)?,
    };
    let options = config.index_options().ok()?;
    Some(scanner::scan_image(&image, &config, options).expect("scan test executable"))
}

#[test]
fn test_scan_finds_rust_function()
{
    assert_eq!(dieindex_scanner_probe_function(), 42);
    let Some(index) = scan(2, SchedulerKind::Thread) else {
        return;
    };

    let matches: Vec<_> = index.find("dieindex_scanner_probe_function", false).collect();
    assert!(!matches.is_empty());
    let entry = matches[0];
    assert_eq!(entry.tag(), gimli::DW_TAG_subprogram);
    assert_eq!(entry.unit().language(), Language::Rust);
    assert!(entry.full_name().ends_with("::dieindex_scanner_probe_function"));
}

#[test]
fn test_shard_count_does_not_change_results()
{
    let (Some(one), Some(many)) = (scan(1, SchedulerKind::Inline), scan(4, SchedulerKind::Thread)) else {
        return;
    };

    assert_eq!(one.len(), many.len());
    let mut a: Vec<String> = one.find("dieindex_scanner", true).map(|e| e.full_name().into_owned()).collect();
    let mut b: Vec<String> = many.find("dieindex_scanner", true).map(|e| e.full_name().into_owned()).collect();
    a.sort();
    b.sort();
    assert_eq!(a, b);
}

#[test]
fn test_addresses_map_to_units()
{
    let Some(index) = scan(2, SchedulerKind::Inline) else {
        return;
    };

    let Some((range, unit)) = index
        .address_maps()
        .flat_map(|map| map.ranges().map(|(range, unit)| (range, unit.clone())).collect::<Vec<_>>())
        .next()
    else {
        return;
    };
    assert_eq!(index.lookup(range.start).map(|u| u.id()), Some(unit.id()));
}

#[test]
fn test_scan_with_explicit_options()
{
    let Ok(exe) = std::env::current_exe() else {
        return;
    };
    let config = IndexConfig {
        shards: NonZeroUsize::MIN,
        ..IndexConfig::default()
    };
    let Ok(index) = scanner::scan_file(&exe, &config, IndexOptions::inline()) else {
        return;
    };
    index.wait();
    assert!(index.shards().len() <= 1);
}
