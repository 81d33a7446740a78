//! Title-to-slug derivation.
//!
//! # Responsibility
//! - Derive URL-safe identifiers from human-readable titles and names.
//!
//! # Invariants
//! - Output is lowercase ASCII alphanumerics separated by single hyphens.
//! - Output never starts or ends with a hyphen.
//! - No uniqueness is enforced here; two titles may share one slug.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

static NON_ALNUM_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug separator regex"));

/// Derives a slug from `title`.
///
/// Diacritics are stripped through NFD decomposition, every run of
/// characters outside `[a-z0-9]` collapses to one hyphen, and edge hyphens
/// are trimmed. Titles with no alphanumeric content yield an empty string.
pub fn slugify(title: &str) -> String {
    let folded: String = title
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .collect::<String>()
        .to_lowercase();
    let hyphenated = NON_ALNUM_RUN_RE.replace_all(&folded, "-");
    hyphenated.trim_matches('-').to_string()
}
