//! Address-to-unit map.
//!
//! Maps half-open address ranges to the compile unit that covers them. Ranges
//! never overlap inside the map: when a new range overlaps existing ones, only
//! the uncovered gaps are inserted, so the first unit to claim an address
//! keeps it.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::types::{Address, AddressRange, CompileUnit};

#[derive(Debug, Clone)]
struct Span
{
    end: Address,
    unit: Arc<CompileUnit>,
}

/// Non-overlapping ranges keyed by start address.
#[derive(Default, Clone)]
pub struct AddressMap
{
    spans: BTreeMap<Address, Span>,
}

impl AddressMap
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Claim `range` for `unit`, leaving already-claimed addresses alone.
    ///
    /// Empty ranges are ignored.
    pub fn insert(&mut self, range: AddressRange, unit: Arc<CompileUnit>)
    {
        if range.is_empty() {
            return;
        }

        let mut gaps = Vec::new();
        let mut cursor = range.start;

        // A span starting before `range` may still reach into it.
        if let Some((_, span)) = self.spans.range(..range.start).next_back() {
            if span.end > cursor {
                cursor = span.end;
            }
        }

        for (&start, span) in self.spans.range(range.start..range.end) {
            if start > cursor {
                gaps.push(AddressRange::new(cursor, start));
            }
            if span.end > cursor {
                cursor = span.end;
            }
        }
        if cursor < range.end {
            gaps.push(AddressRange::new(cursor, range.end));
        }

        for gap in gaps {
            self.spans.insert(
                gap.start,
                Span {
                    end: gap.end,
                    unit: Arc::clone(&unit),
                },
            );
        }
    }

    /// Unit covering `address`, if any.
    pub fn lookup(&self, address: Address) -> Option<&Arc<CompileUnit>>
    {
        let (_, span) = self.spans.range(..=address).next_back()?;
        (address < span.end).then_some(&span.unit)
    }

    /// Every stored range in address order.
    pub fn ranges(&self) -> impl Iterator<Item = (AddressRange, &Arc<CompileUnit>)> + '_
    {
        self.spans
            .iter()
            .map(|(&start, span)| (AddressRange::new(start, span.end), &span.unit))
    }

    pub fn len(&self) -> usize
    {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.spans.is_empty()
    }
}

impl fmt::Debug for AddressMap
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_map()
            .entries(self.ranges().map(|(range, unit)| (range, unit.id())))
            .finish()
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::types::{Language, UnitId};

    fn unit(id: u32) -> Arc<CompileUnit>
    {
        Arc::new(CompileUnit::new(UnitId(id), u64::from(id) * 0x100, Language::C))
    }

    fn range(start: u64, end: u64) -> AddressRange
    {
        AddressRange::new(Address::from(start), Address::from(end))
    }

    #[test]
    fn test_lookup_respects_half_open_ranges()
    {
        let mut map = AddressMap::new();
        map.insert(range(0x1000, 0x1100), unit(1));

        assert!(map.lookup(Address::from(0xfff)).is_none());
        assert_eq!(map.lookup(Address::from(0x1000)).map(|u| u.id()), Some(UnitId(1)));
        assert_eq!(map.lookup(Address::from(0x10ff)).map(|u| u.id()), Some(UnitId(1)));
        assert!(map.lookup(Address::from(0x1100)).is_none());
    }

    #[test]
    fn test_first_writer_keeps_overlap()
    {
        let mut map = AddressMap::new();
        map.insert(range(0x1000, 0x2000), unit(1));
        map.insert(range(0x0800, 0x2800), unit(2));

        assert_eq!(map.lookup(Address::from(0x0900)).map(|u| u.id()), Some(UnitId(2)));
        assert_eq!(map.lookup(Address::from(0x1800)).map(|u| u.id()), Some(UnitId(1)));
        assert_eq!(map.lookup(Address::from(0x2000)).map(|u| u.id()), Some(UnitId(2)));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn test_fill_gap_between_ranges()
    {
        let mut map = AddressMap::new();
        map.insert(range(0x10, 0x20), unit(1));
        map.insert(range(0x30, 0x40), unit(1));
        map.insert(range(0x00, 0x50), unit(2));

        let ranges: Vec<_> = map.ranges().map(|(r, u)| (r.start.value(), r.end.value(), u.id().0)).collect();
        assert_eq!(
            ranges,
            vec![(0x00, 0x10, 2), (0x10, 0x20, 1), (0x20, 0x30, 2), (0x30, 0x40, 1), (0x40, 0x50, 2)]
        );
    }

    #[test]
    fn test_empty_and_fully_covered_ranges_are_ignored()
    {
        let mut map = AddressMap::new();
        map.insert(range(0x10, 0x10), unit(1));
        assert!(map.is_empty());

        map.insert(range(0x10, 0x40), unit(1));
        map.insert(range(0x20, 0x30), unit(2));
        assert_eq!(map.len(), 1);
        assert_eq!(map.lookup(Address::from(0x25)).map(|u| u.id()), Some(UnitId(1)));
    }
}
