//! Entry name derivation
//!
//! Category names arrive decorated with emoji, punctuation, mixed case
//! and mixed scripts. Entry names must be flat channel-name material, so
//! the category name is normalized into a slug and prefixed.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::NamingOverrides;

/// Prefix every generated index entry name carries.
pub const ENTRY_PREFIX: &str = "sm-";

static SYMBOL_RUNS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r##"[ !"#$%&'()*+,\-./:;<=>?@\[\\\]^_`{|}~]+"##).expect("invalid symbol pattern")
});

static ALLOWED_CHAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{Hiragana}\p{Katakana}\p{Han}\p{Latin}\d～ー]")
        .expect("invalid allowed-char pattern")
});

/// Derive the index entry name for a category.
pub fn entry_name(category_name: &str, overrides: &NamingOverrides) -> String {
    let base = match overrides.strip_through {
        Some(sep) => match category_name.split_once(sep) {
            Some((_, rest)) => rest,
            None => category_name,
        },
        None => category_name,
    };
    format!("{ENTRY_PREFIX}{}", slug(base))
}

/// Collapse symbol runs to `-`, drop everything outside the allowed
/// scripts (Hiragana, Katakana, Han, Latin, digits, `ー`, `～`), and
/// lower-case the rest.
pub fn slug(input: &str) -> String {
    let replaced = SYMBOL_RUNS.replace_all(input, "-");
    let mut buf = [0u8; 4];
    replaced
        .chars()
        .filter(|&c| c == '-' || ALLOWED_CHAR.is_match(c.encode_utf8(&mut buf)))
        .collect::<String>()
        .to_lowercase()
}
