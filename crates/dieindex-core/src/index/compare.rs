//! Name ordering used by the cooked index.
//!
//! All three modes share one walk over the two names: ASCII case is folded
//! and `<` is remapped to sort just below a space, so a bare name sorts
//! immediately before any of its template instantiations. The modes only
//! differ in what happens when the second name runs out first:
//!
//! - [`CompareMode::Sort`] never treats a shorter name as equal, which keeps
//!   the physical order a strict order.
//! - [`CompareMode::Match`] treats `name<...>` as equal to `name`, so an exact
//!   lookup of a bare name finds every instantiation.
//! - [`CompareMode::Complete`] treats any longer name as equal to its prefix.
//!
//! Names that are equal under `Match` or `Complete` are always contiguous
//! under `Sort`, which is what lets `find` binary-search a sort-ordered
//! sequence with the query modes.

use std::cmp::Ordering;

/// How [`compare`] resolves a mismatch at the end of the second name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareMode
{
    /// Ordering used to physically sort index entries.
    Sort,
    /// Exact lookup; a template argument list may follow the query.
    Match,
    /// Prefix lookup for completion.
    Complete,
}

/// Value `<` is folded to: just below `' '`.
const TEMPLATE_OPEN: u8 = 0x1f;

/// Folded value of the byte at `index`, `0` past the end of the name.
fn munge(name: &[u8], index: usize) -> u8
{
    match name.get(index) {
        None => 0,
        Some(b'<') => TEMPLATE_OPEN,
        Some(&c) => c.to_ascii_lowercase(),
    }
}

/// Compare two entry names under `mode`.
///
/// `a` is the stored (entry) name and `b` the query; the relation is not
/// symmetric in `Match` and `Complete` modes.
///
/// ```rust
/// use std::cmp::Ordering;
///
/// use dieindex_core::index::{compare, CompareMode};
///
/// assert_eq!(compare("name<int>", "name", CompareMode::Match), Ordering::Equal);
/// assert_eq!(compare("name", "name<int>", CompareMode::Match), Ordering::Less);
/// assert_eq!(compare("Namespace", "name", CompareMode::Complete), Ordering::Equal);
/// ```
pub fn compare(a: &str, b: &str, mode: CompareMode) -> Ordering
{
    let (a, b) = (a.as_bytes(), b.as_bytes());

    let mut i = 0;
    while i < a.len() && i < b.len() && munge(a, i) == munge(b, i) {
        i += 1;
    }

    let c1 = munge(a, i);
    let c2 = munge(b, i);

    if c1 == c2 {
        return Ordering::Equal;
    }

    // A query that ends where the entry continues still matches when
    // completing, or when the entry continues with a template argument list.
    if (mode == CompareMode::Complete || (mode == CompareMode::Match && c1 == TEMPLATE_OPEN)) && c2 == 0 {
        return Ordering::Equal;
    }

    c1.cmp(&c2)
}

#[cfg(test)]
mod tests
{
    use super::*;

    const MATCH: CompareMode = CompareMode::Match;
    const SORT: CompareMode = CompareMode::Sort;
    const COMPLETE: CompareMode = CompareMode::Complete;

    #[test]
    fn test_identical_names_are_equal()
    {
        assert_eq!(compare("abcd", "abcd", MATCH), Ordering::Equal);
        assert_eq!(compare("abcd", "abcd", COMPLETE), Ordering::Equal);
        assert_eq!(compare("abcd", "abcd", SORT), Ordering::Equal);
    }

    #[test]
    fn test_case_is_folded()
    {
        assert_eq!(compare("abcd", "ABCDE", MATCH), Ordering::Less);
        assert_eq!(compare("ABCDE", "abcd", MATCH), Ordering::Greater);
        assert_eq!(compare("abcd", "ABCDE", COMPLETE), Ordering::Less);
        assert_eq!(compare("ABCDE", "abcd", COMPLETE), Ordering::Equal);
        assert_eq!(compare("FooBar", "foobar", MATCH), Ordering::Equal);
    }

    #[test]
    fn test_template_suffix_matches_bare_name()
    {
        assert_eq!(compare("name", "name<>", MATCH), Ordering::Less);
        assert_eq!(compare("name<>", "name", MATCH), Ordering::Equal);
        assert_eq!(compare("name", "name<>", COMPLETE), Ordering::Less);
        assert_eq!(compare("name<>", "name", COMPLETE), Ordering::Equal);
    }

    #[test]
    fn test_inside_template_arguments_is_lexical()
    {
        assert_eq!(compare("name<arg>", "name<arg>", MATCH), Ordering::Equal);
        assert_eq!(compare("name<arg>", "name<ag>", MATCH), Ordering::Greater);
        assert_eq!(compare("name<arg>", "name<arg>", COMPLETE), Ordering::Equal);
        assert_eq!(compare("name<arg>", "name<ag>", COMPLETE), Ordering::Greater);
    }

    #[test]
    fn test_nested_templates()
    {
        assert_eq!(compare("name<arg<more>>", "name<arg<more>>", MATCH), Ordering::Equal);
        assert_eq!(compare("name", "name<arg<more>>", MATCH), Ordering::Less);
        assert_eq!(compare("name<arg<more>>", "name", MATCH), Ordering::Equal);
        assert_eq!(compare("name<arg<more>>", "name<arg<", MATCH), Ordering::Greater);
        assert_eq!(compare("name<arg<more>>", "name<arg<", COMPLETE), Ordering::Equal);
    }

    #[test]
    fn test_empty_names()
    {
        assert_eq!(compare("", "abcd", MATCH), Ordering::Less);
        assert_eq!(compare("", "abcd", COMPLETE), Ordering::Less);
        assert_eq!(compare("abcd", "", MATCH), Ordering::Greater);
        assert_eq!(compare("abcd", "", COMPLETE), Ordering::Equal);
        assert_eq!(compare("", "", MATCH), Ordering::Equal);
    }

    #[test]
    fn test_sort_places_instantiations_next_to_bare_name()
    {
        assert_eq!(compare("func", "func<type>", SORT), Ordering::Less);
        assert_eq!(compare("func<type>", "func1", SORT), Ordering::Less);
        assert_eq!(compare("func<type>", "func", SORT), Ordering::Greater);
    }

    #[test]
    fn test_sort_is_antisymmetric_and_transitive()
    {
        let names = ["", "a", "A<b>", "a<c>", "a1", "ab", "b", "func", "func<int>", "FUNC<long>", "func1", "z"];

        for x in names {
            for y in names {
                assert_eq!(compare(x, y, SORT), compare(y, x, SORT).reverse(), "{x:?} vs {y:?}");
                for z in names {
                    if compare(x, y, SORT) == Ordering::Less && compare(y, z, SORT) == Ordering::Less {
                        assert_eq!(compare(x, z, SORT), Ordering::Less, "{x:?} < {y:?} < {z:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_match_classes_are_contiguous_under_sort()
    {
        let mut names = vec!["func1", "func<long>", "fund", "func", "FUNC<int>", "fun", "func<a<b>>"];
        names.sort_by(|a, b| compare(a, b, SORT));

        let hits: Vec<usize> = names
            .iter()
            .enumerate()
            .filter(|(_, name)| compare(name, "func", MATCH) == Ordering::Equal)
            .map(|(i, _)| i)
            .collect();

        assert_eq!(hits.len(), 4);
        assert_eq!(hits.last().unwrap() - hits.first().unwrap() + 1, hits.len());
    }
}
