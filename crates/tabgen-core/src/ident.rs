//! Shell identifier naming
//!
//! Command paths map to shell identifiers by folding every character
//! outside `[A-Za-z0-9_]` to `_`. Folding is many-to-one (`sub/cmd` and
//! `sub:cmd` both become `sub_cmd`); the walker rejects definitions where
//! two distinct paths collapse to the same identifier instead of letting
//! one silently shadow the other.

/// Fold a token into identifier-safe form.
pub fn fold(token: &str) -> String {
    token
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Identifier for the node reached by `path` (command tokens below the
/// root), hung off `prefix`.
pub fn shell_ident(prefix: &str, path: &[String]) -> String {
    let mut ident = String::from(prefix);
    for segment in path {
        ident.push('_');
        ident.push_str(&fold(segment));
    }
    ident
}

/// Default root identifier prefix for a program name.
pub fn root_prefix(prog: &str) -> String {
    format!("_tabgen_{}", fold(prog))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_passthrough() {
        assert_eq!(fold("send"), "send");
        assert_eq!(fold("a_b_9"), "a_b_9");
    }

    #[test]
    fn test_fold_punctuation() {
        assert_eq!(fold("sub-cmd"), "sub_cmd");
        assert_eq!(fold("sub/cmd"), "sub_cmd");
        assert_eq!(fold("sub:cmd"), "sub_cmd");
        assert_eq!(fold("a.b c"), "a_b_c");
    }

    #[test]
    fn test_fold_non_ascii() {
        assert_eq!(fold("naïve"), "na_ve");
    }

    #[test]
    fn test_shell_ident() {
        assert_eq!(shell_ident("_tabgen_git", &[]), "_tabgen_git");
        assert_eq!(
            shell_ident("_tabgen_git", &["remote".into(), "add-url".into()]),
            "_tabgen_git_remote_add_url"
        );
    }

    #[test]
    fn test_root_prefix() {
        assert_eq!(root_prefix("greeter"), "_tabgen_greeter");
        assert_eq!(root_prefix("my.app"), "_tabgen_my_app");
    }
}
