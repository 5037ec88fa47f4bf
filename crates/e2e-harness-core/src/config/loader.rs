//! Typed lookups over an ambient snapshot.
//!
//! Keeps the primary-then-aliases fallback chain in one place instead of
//! repeating `or_else` at every call site.

use crate::ambient::AmbientEnv;

fn lookup<'a>(env: &'a AmbientEnv, primary: &str, aliases: &[&str]) -> Option<&'a str> {
    env.get(primary)
        .or_else(|| aliases.iter().find_map(|a| env.get(a)))
}

/// Read the primary key or its aliases, falling back to `default` when unset or empty.
pub fn env_or<F>(env: &AmbientEnv, primary: &str, aliases: &[&str], default: F) -> String
where
    F: FnOnce() -> String,
{
    lookup(env, primary, aliases)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .unwrap_or_else(default)
}

/// Read the primary key or its aliases. Blank values count as unset.
pub fn env_optional(env: &AmbientEnv, primary: &str, aliases: &[&str]) -> Option<String> {
    lookup(env, primary, aliases).and_then(|s| {
        let s = s.trim();
        if s.is_empty() {
            None
        } else {
            Some(s.to_string())
        }
    })
}

/// Parse a boolean: 0/false/no/off are false, anything else that is set is true.
pub fn env_bool(env: &AmbientEnv, primary: &str, aliases: &[&str], default: bool) -> bool {
    match lookup(env, primary, aliases) {
        Some(s) => !matches!(
            s.trim().to_lowercase().as_str(),
            "0" | "false" | "no" | "off"
        ),
        None => default,
    }
}

/// Whitespace separated list. `None` when unset or blank.
pub fn env_list(env: &AmbientEnv, primary: &str, aliases: &[&str]) -> Option<Vec<String>> {
    env_optional(env, primary, aliases)
        .map(|s| s.split_whitespace().map(String::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_prefers_primary_then_alias() {
        let env = AmbientEnv::from_pairs([("ALIAS", "from-alias")]);
        assert_eq!(env_or(&env, "PRIMARY", &["ALIAS"], || "d".into()), "from-alias");

        let env = AmbientEnv::from_pairs([("PRIMARY", "p"), ("ALIAS", "a")]);
        assert_eq!(env_or(&env, "PRIMARY", &["ALIAS"], || "d".into()), "p");

        let env = AmbientEnv::from_pairs([("PRIMARY", "")]);
        assert_eq!(env_or(&env, "PRIMARY", &[], || "d".into()), "d");
    }

    #[test]
    fn test_env_optional_blank_is_none() {
        let env = AmbientEnv::from_pairs([("K", "   ")]);
        assert_eq!(env_optional(&env, "K", &[]), None);
        let env = AmbientEnv::from_pairs([("K", " v ")]);
        assert_eq!(env_optional(&env, "K", &[]).as_deref(), Some("v"));
    }

    #[test]
    fn test_env_bool() {
        let env = AmbientEnv::from_pairs([("A", "off"), ("B", "1"), ("C", "yes")]);
        assert!(!env_bool(&env, "A", &[], true));
        assert!(env_bool(&env, "B", &[], false));
        assert!(env_bool(&env, "C", &[], false));
        assert!(env_bool(&env, "MISSING", &[], true));
    }

    #[test]
    fn test_env_list_splits_on_whitespace() {
        let env = AmbientEnv::from_pairs([("L", "pip>=20.0,<21.3  wheel\tsetuptools")]);
        assert_eq!(
            env_list(&env, "L", &[]).unwrap(),
            vec!["pip>=20.0,<21.3", "wheel", "setuptools"]
        );
    }
}
