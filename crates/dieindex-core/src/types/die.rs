//! DIE offset type.

use std::fmt;

/// Byte offset of a Debugging Information Entry within `.debug_info`.
///
/// This is the identity key of an index entry: it is assigned once when the
/// scanner discovers the DIE and never changes afterwards. Synthesized Ada
/// namespace entries reuse the offset of the DIE they were derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DieOffset(pub u64);

impl DieOffset
{
    /// Raw section offset.
    pub const fn value(self) -> u64
    {
        self.0
    }
}

impl From<u64> for DieOffset
{
    fn from(offset: u64) -> Self
    {
        DieOffset(offset)
    }
}

impl fmt::Display for DieOffset
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:x}", self.0)
    }
}
