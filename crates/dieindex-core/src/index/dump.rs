//! Diagnostic dump of a [`CookedIndexVector`].
//!
//! Entries are identified by `shard:id`, which is stable for the lifetime of
//! the vector and means the same thing in every run over the same input.

use std::io::{self, Write};

use super::entry::EntryRef;
use super::vector::CookedIndexVector;

impl CookedIndexVector
{
    /// Write every entry, the main entry and every address map to `out`.
    ///
    /// Blocks until all shards are finalized.
    pub fn dump<W: Write>(&self, out: &mut W) -> io::Result<()>
    {
        self.wait();

        writeln!(out, "  entries:")?;
        writeln!(out)?;

        let mut position = 0usize;
        for (shard_index, shard) in self.shards().iter().enumerate() {
            for entry in shard.all_entries() {
                writeln!(out, "    [{position}] {}", Handle(shard_index, entry))?;
                writeln!(out, "    name:       {}", entry.name())?;
                writeln!(out, "    canonical:  {}", entry.canonical())?;
                writeln!(out, "    qualified:  {}", entry.full_name())?;
                writeln!(out, "    DWARF tag:  {}", entry.tag())?;
                writeln!(out, "    flags:      {}", entry.flags())?;
                writeln!(out, "    DIE offset: {}", entry.die_offset())?;
                match entry.parent() {
                    Some(parent) => writeln!(out, "    parent:     {} [{}]", Handle(shard_index, parent), parent.name())?,
                    None => writeln!(out, "    parent:     none")?,
                }
                writeln!(out)?;
                position += 1;
            }
        }

        match self.get_main() {
            Some(main) => {
                let shard_index = self
                    .shards()
                    .iter()
                    .position(|shard| shard.get_main() == Some(main))
                    .unwrap_or_default();
                writeln!(out, "  main: {} [{}]", Handle(shard_index, main), main.name())?;
            }
            None => writeln!(out, "  main: none")?,
        }
        writeln!(out)?;

        writeln!(out, "  address maps:")?;
        writeln!(out)?;
        for (shard_index, map) in self.address_maps().enumerate() {
            writeln!(out, "    [{shard_index}] {} ranges", map.len())?;
            writeln!(out)?;
            for (range, unit) in map.ranges() {
                writeln!(out, "      [{range}] unit {}", unit)?;
            }
            writeln!(out)?;
        }

        Ok(())
    }
}

/// `shard:id` label of an entry.
struct Handle<'a>(usize, EntryRef<'a>);

impl std::fmt::Display for Handle<'_>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        write!(f, "(entry {}:{})", self.0, self.1.id().as_u32())
    }
}
