//! Compile unit metadata.

use std::fmt;

use super::Language;

/// Identifier of a compile unit within one scanned object file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "#{}", self.0)
    }
}

/// Per-unit data that index entries point back to.
///
/// Entries share their unit through an `Arc<CompileUnit>`; the unit is never
/// mutated once the scanner has created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileUnit
{
    id: UnitId,
    offset: u64,
    name: Option<String>,
    language: Language,
}

impl CompileUnit
{
    /// Create a unit record.
    pub fn new(id: UnitId, offset: u64, language: Language) -> Self
    {
        Self {
            id,
            offset,
            name: None,
            language,
        }
    }

    /// Attach the unit's `DW_AT_name`.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self
    {
        self.name = Some(name.into());
        self
    }

    pub fn id(&self) -> UnitId
    {
        self.id
    }

    /// Offset of the unit header in `.debug_info`.
    pub fn offset(&self) -> u64
    {
        self.offset
    }

    pub fn name(&self) -> Option<&str>
    {
        self.name.as_deref()
    }

    pub fn language(&self) -> Language
    {
        self.language
    }
}

impl fmt::Display for CompileUnit
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match &self.name {
            Some(name) => write!(f, "{} {} ({})", self.id, name, self.language),
            None => write!(f, "{} <unnamed> ({})", self.id, self.language),
        }
    }
}
