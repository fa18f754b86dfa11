//! Text helpers for parsing commands and composing Markdown replies.

use std::sync::OnceLock;

use regex::Regex;

pub(crate) const ALIAS_PREFIX: &str = "@";

fn alias_regex() -> &'static Regex {
    static ALIAS: OnceLock<Regex> = OnceLock::new();
    ALIAS.get_or_init(|| Regex::new(r"@[a-zA-Z0-9_]+").expect("alias regex is valid"))
}

/// All `@alias` occurrences in the text, in order of appearance.
pub(crate) fn find_aliases(text: &str) -> Vec<String> {
    alias_regex()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Prepends `@` unless the name already starts with it.
pub(crate) fn with_alias_prefix(name: &str) -> String {
    if name.starts_with(ALIAS_PREFIX) {
        name.to_string()
    } else {
        format!("{}{}", ALIAS_PREFIX, name)
    }
}

/// Removes every `@` so that echoing names back does not ping anyone.
pub(crate) fn remove_users_pings(s: &str) -> String {
    s.replace(ALIAS_PREFIX, "")
}

/// Escapes underscores for Telegram Markdown.
pub(crate) fn escape_underscores(s: &str) -> String {
    s.replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_aliases() {
        assert_eq!(
            find_aliases("There is a reference to @some_students and @kek, @kek!"),
            vec!["@some_students", "@kek", "@kek"]
        );
        assert!(find_aliases("There is a reference to nobody").is_empty());
        assert!(find_aliases("mail me at @").is_empty());
    }

    #[test]
    fn test_with_alias_prefix() {
        assert_eq!(with_alias_prefix("blah"), "@blah");
        assert_eq!(with_alias_prefix("@blah"), "@blah");
    }

    #[test]
    fn test_remove_users_pings() {
        assert_eq!(remove_users_pings("@a, @b"), "a, b");
    }

    #[test]
    fn test_escape_underscores() {
        assert_eq!(escape_underscores("@some_user_1"), "@some\\_user\\_1");
    }
}
