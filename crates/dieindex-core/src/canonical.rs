//! Per-language name canonicalization.
//!
//! The index only needs two pure functions from the outside world: a C/C++
//! canonicalizer that turns a DIE name into its stable display form, and a
//! GNAT decoder that turns an encoded Ada name into its dotted source form.
//! [`NameCanonicalizer`] is the seam; [`DefaultCanonicalizer`] is a
//! self-contained implementation good enough for compiler-emitted names.

use std::fmt;

use crate::types::Language;

/// Pure name transforms consulted while finalizing an index.
pub trait NameCanonicalizer: Send + Sync + fmt::Debug
{
    /// Canonical form of a C or C++ name, or `None` when `raw` is already
    /// canonical (or cannot be parsed), in which case the raw name is used.
    fn canonicalize(&self, language: Language, raw: &str) -> Option<String>;

    /// Decode a GNAT-encoded name into its dotted form.
    ///
    /// Returns an empty string when `raw` is not a GNAT encoding.
    fn ada_decode(&self, raw: &str) -> String;
}

/// Built-in canonicalizer.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultCanonicalizer;

impl NameCanonicalizer for DefaultCanonicalizer
{
    fn canonicalize(&self, language: Language, raw: &str) -> Option<String>
    {
        let canonical = match language {
            Language::Cpp => canonicalize_cpp(raw),
            Language::C => canonicalize_c(raw),
            _ => return None,
        };
        (canonical != raw && !canonical.is_empty()).then_some(canonical)
    }

    fn ada_decode(&self, raw: &str) -> String
    {
        ada_decode(raw)
    }
}

fn is_ident(c: char) -> bool
{
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Normalize spacing in a C++ name.
///
/// Whitespace survives only between two identifier characters
/// (`unsigned int`), commas are followed by one space, and consecutive
/// closing angle brackets are kept apart (`A<B<int> >`) so they never read as
/// a shift operator.
pub fn canonicalize_cpp(raw: &str) -> String
{
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;

    for c in raw.trim().chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }

        let prev = out.chars().next_back();
        if pending_space && prev.is_some_and(is_ident) && is_ident(c) {
            out.push(' ');
        }
        pending_space = false;

        match c {
            ',' => out.push_str(", "),
            '>' if prev == Some('>') && !out.ends_with("operator>") => out.push_str(" >"),
            _ => out.push(c),
        }
    }

    out
}

/// Collapse whitespace runs in a C name.
pub fn canonicalize_c(raw: &str) -> String
{
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode a GNAT-encoded Ada name.
///
/// ```rust
/// use dieindex_core::canonical::ada_decode;
///
/// assert_eq!(ada_decode("pkg__child__proc"), "pkg.child.proc");
/// assert_eq!(ada_decode("_ada_main_proc"), "main_proc");
/// assert_eq!(ada_decode("pkg__counter__2"), "pkg.counter");
/// assert_eq!(ada_decode("NotEncoded"), "");
/// assert_eq!(ada_decode("pkg__"), "");
/// ```
pub fn ada_decode(raw: &str) -> String
{
    let mut name = raw.strip_prefix("_ada_").unwrap_or(raw);

    // Type and object suffixes such as `___XVE`.
    if let Some(pos) = name.find("___") {
        name = &name[..pos];
    }

    name = strip_numeric_suffix(name);

    if name.is_empty() || name.chars().any(|c| c.is_uppercase() || c.is_whitespace()) {
        return String::new();
    }

    let decoded = name.replace("__", ".");
    if decoded.split('.').any(str::is_empty) {
        return String::new();
    }
    decoded
}

/// Drop a trailing `__N`, `$N` or `.N` disambiguation suffix.
fn strip_numeric_suffix(name: &str) -> &str
{
    let digits = name.len() - name.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 || digits == name.len() {
        return name;
    }

    let head = &name[..name.len() - digits];
    for marker in ["__", "$", "."] {
        if let Some(stripped) = head.strip_suffix(marker) {
            if !stripped.is_empty() {
                return stripped;
            }
        }
    }
    name
}
