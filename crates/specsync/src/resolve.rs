//! Identifier sanitization and collision-free name resolution.
//!
//! Free-text feature and scenario names become snake_case Rust identifiers
//! and deterministic output file names. The [`NameResolver`] holds the one
//! piece of shared mutable state in the pipeline: the set of names already
//! handed out during the current run.

use std::collections::HashSet;

use camino::{Utf8Path, Utf8PathBuf};
use convert_case::{Case, Casing};

use crate::error::ResolveError;

/// Suffix attempts before declaring a collision unresolvable.
const MAX_SUFFIX_ATTEMPTS: usize = 1000;

/// Rust keywords that are invalid as identifiers.
const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use", "where",
    "while", "async", "await", "dyn", "union", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// Sanitize free text into a snake_case identifier candidate.
///
/// Characters outside the ASCII alphanumeric set become word separators,
/// words join in snake_case, and a leading digit or a Rust keyword gains a
/// `_` prefix. Text with no alphanumeric content sanitizes to the empty
/// string, which callers must treat as an error.
///
/// # Examples
///
/// ```
/// assert_eq!(specsync::sanitize("Add two numbers"), "add_two_numbers");
/// assert_eq!(specsync::sanitize("AddTwoNumbers"), "add_two_numbers");
/// assert_eq!(specsync::sanitize("123 go"), "_123_go");
/// assert_eq!(specsync::sanitize("match"), "_match");
/// assert_eq!(specsync::sanitize("!!!"), "");
/// ```
#[must_use]
pub fn sanitize(input: &str) -> String {
    let spaced: String = input
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    let mut ident = spaced.to_case(Case::Snake);
    if ident.is_empty() {
        return ident;
    }
    let starts_with_digit = ident.chars().next().is_some_and(|c| c.is_ascii_digit());
    if starts_with_digit || RUST_KEYWORDS.contains(&ident.as_str()) {
        ident.insert(0, '_');
    }
    ident
}

/// Collision-aware resolver for identifiers and output paths.
///
/// Uniqueness is a cross-feature invariant, so one resolver instance spans
/// a whole run; the pipeline guards it with a mutex.
#[derive(Debug, Default)]
pub struct NameResolver {
    used: HashSet<String>,
}

impl NameResolver {
    /// Create an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a unique identifier from free text.
    ///
    /// Collisions gain numeric suffixes (`_2`, `_3`, ...) deterministically
    /// in first-seen order.
    ///
    /// # Errors
    ///
    /// [`ResolveError::EmptyIdentifier`] when the text sanitizes to
    /// nothing, and [`ResolveError::CollisionUnresolvable`] when no free
    /// suffix exists within the retry bound.
    pub fn resolve_ident(&mut self, raw: &str) -> Result<String, ResolveError> {
        let base = sanitize(raw);
        if base.is_empty() {
            return Err(ResolveError::EmptyIdentifier {
                name: raw.to_string(),
            });
        }
        self.claim(&base)
    }

    /// Derive a unique output path `<dir>/<stem>.<ext>` from free text.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::resolve_ident`].
    pub fn resolve_path(
        &mut self,
        dir: &Utf8Path,
        raw: &str,
        extension: &str,
    ) -> Result<Utf8PathBuf, ResolveError> {
        let base = sanitize(raw);
        if base.is_empty() {
            return Err(ResolveError::EmptyIdentifier {
                name: raw.to_string(),
            });
        }
        let stem = self.claim(&format!("{base}.{extension}"))?;
        let stem = stem
            .strip_suffix(&format!(".{extension}"))
            .unwrap_or(&stem)
            .to_string();
        Ok(dir.join(format!("{stem}.{extension}")))
    }

    fn claim(&mut self, base: &str) -> Result<String, ResolveError> {
        if self.used.insert(base.to_string()) {
            return Ok(base.to_string());
        }
        for n in 2..=MAX_SUFFIX_ATTEMPTS {
            let candidate = suffixed(base, n);
            if self.used.insert(candidate.clone()) {
                return Ok(candidate);
            }
        }
        Err(ResolveError::CollisionUnresolvable {
            base: base.to_string(),
            attempts: MAX_SUFFIX_ATTEMPTS,
        })
    }
}

/// Insert a numeric suffix before the extension when one is present.
fn suffixed(base: &str, n: usize) -> String {
    match base.split_once('.') {
        Some((stem, ext)) => format!("{stem}_{n}.{ext}"),
        None => format!("{base}_{n}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Add two numbers", "add_two_numbers")]
    #[case("AddTwoNumbers", "add_two_numbers")]
    #[case("Crème—brûlée", "cr_me_br_l_e")]
    #[case("123 go", "_123_go")]
    #[case("type", "_type")]
    #[case("a--b__c", "a_b_c")]
    fn sanitizes_free_text(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize(input), expected);
    }

    #[test]
    fn sanitize_of_symbol_soup_is_empty() {
        assert_eq!(sanitize("!!! ---"), "");
    }

    #[test]
    fn collisions_gain_suffixes_in_first_seen_order() {
        let mut resolver = NameResolver::new();
        assert_eq!(resolver.resolve_ident("Add").unwrap(), "add");
        assert_eq!(resolver.resolve_ident("add").unwrap(), "add_2");
        assert_eq!(resolver.resolve_ident("Add!").unwrap(), "add_3");
    }

    #[test]
    fn empty_identifier_is_an_error() {
        let mut resolver = NameResolver::new();
        assert_eq!(
            resolver.resolve_ident("∅∅∅"),
            Err(ResolveError::EmptyIdentifier {
                name: "∅∅∅".into()
            })
        );
    }

    #[test]
    fn paths_are_unique_per_run() {
        let mut resolver = NameResolver::new();
        let dir = Utf8Path::new("out");
        let first = resolver.resolve_path(dir, "Calculator", "feature").unwrap();
        let second = resolver.resolve_path(dir, "calculator", "feature").unwrap();
        assert_eq!(first, Utf8PathBuf::from("out/calculator.feature"));
        assert_eq!(second, Utf8PathBuf::from("out/calculator_2.feature"));
    }

    #[test]
    fn idents_and_paths_do_not_collide_with_each_other() {
        let mut resolver = NameResolver::new();
        let ident = resolver.resolve_ident("report").unwrap();
        let path = resolver
            .resolve_path(Utf8Path::new("out"), "report", "rs")
            .unwrap();
        assert_eq!(ident, "report");
        assert_eq!(path, Utf8PathBuf::from("out/report.rs"));
    }
}
