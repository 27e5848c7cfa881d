//! Memory address types.

use std::fmt;
use std::str::FromStr;

use crate::error::IndexError;

/// Strongly typed target address
///
/// This wrapper around `u64` keeps addresses from being mixed up with DIE
/// offsets, sizes, or counts, which are all `u64`s in DWARF as well.
///
/// ## Example
///
/// ```rust
/// use dieindex_core::types::Address;
///
/// let addr: Address = "0x1000".parse().unwrap();
/// assert_eq!(addr.value(), 0x1000);
/// assert_eq!(addr.to_string(), "0x0000000000001000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(u64);

impl Address
{
    /// Create a new address from a `u64` value
    ///
    /// This is equivalent to `Address::from(value)` but can be used in const contexts.
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    /// Get the raw `u64` value of this address
    pub const fn value(self) -> u64
    {
        self.0
    }
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl FromStr for Address
{
    type Err = IndexError;

    /// Parse `0x`-prefixed hex or plain decimal.
    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        let trimmed = s.trim();
        let parsed = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => trimmed.parse::<u64>(),
        };
        parsed
            .map(Address)
            .map_err(|err| IndexError::InvalidArgument(format!("invalid address {s:?}: {err}")))
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:016x}", self.0)
    }
}

/// Half-open address range `[start, end)`.
///
/// DWARF `DW_AT_low_pc`/`DW_AT_high_pc` pairs and range-list entries are both
/// half-open, so this is the only shape the address map deals with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressRange
{
    /// First address covered by the range
    pub start: Address,
    /// First address past the end of the range
    pub end: Address,
}

impl AddressRange
{
    /// Build a range from raw bounds.
    pub fn new(start: impl Into<Address>, end: impl Into<Address>) -> Self
    {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Whether the range covers no address at all.
    pub fn is_empty(&self) -> bool
    {
        self.end <= self.start
    }

    /// Whether `address` lies inside the range.
    pub fn contains(&self, address: Address) -> bool
    {
        address >= self.start && address < self.end
    }

    /// Number of bytes covered.
    pub fn size(&self) -> u64
    {
        self.end.value().saturating_sub(self.start.value())
    }
}

impl fmt::Display for AddressRange
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
