//! Index entry flags.

use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// Structural flags attached to an index entry.
    ///
    /// Flags are fixed when the entry is added. `IS_MAIN` additionally makes
    /// the entry the index's main entry, overriding any name-based guess.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EntryFlags: u8
    {
        /// Explicitly marked as the program entry point (`DW_AT_main_subprogram`).
        const IS_MAIN = 1 << 0;
        /// Not externally visible.
        const IS_STATIC = 1 << 1;
        /// Scoped enumeration (`enum class`); enumerators live inside it.
        const IS_ENUM_CLASS = 1 << 2;
        /// Entry was created from a linkage name and is already fully qualified.
        const IS_LINKAGE = 1 << 3;
        /// Type declaration without a definition.
        const IS_TYPE_DECLARATION = 1 << 4;
    }
}

impl fmt::Display for EntryFlags
{
    /// Renders each set bit by its symbolic name, e.g. `IS_MAIN | IS_STATIC`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        if self.is_empty() {
            return write!(f, "0");
        }

        let mut first = true;
        for (name, _) in self.iter_names() {
            if !first {
                f.write_str(" | ")?;
            }
            f.write_str(name)?;
            first = false;
        }
        Ok(())
    }
}
