//! Source language of a compile unit.

use std::fmt;

use gimli::DwLang;

/// Source language, as far as the index cares about it.
///
/// The language decides how a unit's names are canonicalized and how
/// qualified names are put back together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language
{
    /// C (any standard revision).
    C,
    /// C++ (any standard revision).
    Cpp,
    /// Rust.
    Rust,
    /// Go.
    Go,
    /// D.
    D,
    /// Ada, compiled by GNAT.
    Ada,
    /// Fortran.
    Fortran,
    /// Anything else, including units with no `DW_AT_language`.
    #[default]
    Unknown,
}

impl Language
{
    /// Map a `DW_AT_language` value.
    pub fn from_dw_lang(lang: DwLang) -> Self
    {
        match lang {
            // C17 is 0x2c.
            gimli::DW_LANG_C89 | gimli::DW_LANG_C | gimli::DW_LANG_C99 | gimli::DW_LANG_C11 | DwLang(0x002c) => Language::C,
            gimli::DW_LANG_C_plus_plus
            | gimli::DW_LANG_C_plus_plus_03
            | gimli::DW_LANG_C_plus_plus_11
            | gimli::DW_LANG_C_plus_plus_14
            | gimli::DW_LANG_C_plus_plus_17
            | gimli::DW_LANG_C_plus_plus_20 => Language::Cpp,
            gimli::DW_LANG_Rust => Language::Rust,
            gimli::DW_LANG_Go => Language::Go,
            gimli::DW_LANG_D => Language::D,
            // Ada2005 and Ada2012 are 0x2e and 0x2f.
            gimli::DW_LANG_Ada83 | gimli::DW_LANG_Ada95 | DwLang(0x002e) | DwLang(0x002f) => Language::Ada,
            gimli::DW_LANG_Fortran77
            | gimli::DW_LANG_Fortran90
            | gimli::DW_LANG_Fortran95
            | gimli::DW_LANG_Fortran03
            | gimli::DW_LANG_Fortran08 => Language::Fortran,
            _ => Language::Unknown,
        }
    }

    /// Separator used to rebuild qualified names, or `None` when the language
    /// does not have reconstructable scopes.
    pub fn scope_separator(self) -> Option<&'static str>
    {
        match self {
            Language::Cpp | Language::Rust => Some("::"),
            Language::Go | Language::D | Language::Ada => Some("."),
            Language::C | Language::Fortran | Language::Unknown => None,
        }
    }

    /// Whether names from this language go through the C-family canonicalizer.
    pub fn is_c_family(self) -> bool
    {
        matches!(self, Language::C | Language::Cpp)
    }
}

impl fmt::Display for Language
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let label = match self {
            Language::C => "c",
            Language::Cpp => "c++",
            Language::Rust => "rust",
            Language::Go => "go",
            Language::D => "d",
            Language::Ada => "ada",
            Language::Fortran => "fortran",
            Language::Unknown => "unknown",
        };
        write!(f, "{label}")
    }
}
