//! Per-target escaping of text embedded in generated scripts
//!
//! Each placeholder class has its own function; generators never splice
//! raw definition text into script source. Unembeddable input is folded
//! into something representable rather than rejected, so the emitted
//! script always parses.

use std::sync::LazyLock;

use regex::Regex;

/// Wrap `s` in single quotes for POSIX-family shells, escaping embedded
/// quotes the `'\''` way.
pub fn sh_single_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

static ZSH_SPECIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^\w\s.,()-])").expect("valid pattern"));

/// Backslash-escape zsh metacharacters in description text. The safe
/// set is deliberately small; everything else gets a backslash.
pub fn zsh_escape(s: &str) -> String {
    ZSH_SPECIAL.replace_all(s, r"\$1").into_owned()
}

/// A candidate word for a tcsh `(...)` list. Whitespace, parentheses
/// and quotes cannot be represented inside the list and fold to `_`.
pub fn tcsh_word(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_whitespace() || matches!(c, '(' | ')' | '\'' | '"' | '`') {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Build one tcsh `complete` pattern entry, picking a separator that
/// does not occur in the selector or body.
pub fn tcsh_pattern(kind: &str, selector: &str, body: &str) -> String {
    const SEPARATORS: [char; 4] = ['/', '@', '%', ','];
    let sep = SEPARATORS
        .iter()
        .copied()
        .find(|s| !selector.contains(*s) && !body.contains(*s))
        .unwrap_or('/');
    format!("{kind}{sep}{selector}{sep}{body}{sep}")
}
