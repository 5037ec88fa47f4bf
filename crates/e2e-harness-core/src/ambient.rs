//! Immutable snapshot of the inherited process environment.
//!
//! The harness never edits the real process environment. It captures it once,
//! reads configuration from the snapshot, and clones it into fresh mappings
//! that are handed to child processes.

use std::collections::BTreeMap;

use crate::platform::Platform;

/// Environment mapping passed to child processes.
pub type EnvMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmbientEnv {
    vars: EnvMap,
}

impl AmbientEnv {
    /// Snapshot the current process environment. Entries that are not valid
    /// UTF-8 are skipped.
    pub fn capture() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Value of the search-path variable, honoring the platform's key rules.
    pub fn path_value(&self, platform: &dyn Platform) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| platform.is_path_key(k))
            .map(|(_, v)| v.as_str())
    }

    /// A fresh, owned copy of the mapping. The snapshot itself stays untouched.
    pub fn to_env_map(&self) -> EnvMap {
        self.vars.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Posix, Windows};

    #[test]
    fn test_path_value_exact_on_posix() {
        let env = AmbientEnv::from_pairs([("Path", "/a"), ("HOME", "/home/u")]);
        assert_eq!(env.path_value(&Posix), None);
        let env = AmbientEnv::from_pairs([("PATH", "/a:/b")]);
        assert_eq!(env.path_value(&Posix), Some("/a:/b"));
    }

    #[test]
    fn test_path_value_case_insensitive_on_windows() {
        let env = AmbientEnv::from_pairs([("Path", r"C:\a;C:\b")]);
        assert_eq!(env.path_value(&Windows), Some(r"C:\a;C:\b"));
    }

    #[test]
    fn test_to_env_map_is_independent_copy() {
        let env = AmbientEnv::from_pairs([("A", "1")]);
        let mut copy = env.to_env_map();
        copy.insert("A".into(), "2".into());
        assert_eq!(env.get("A"), Some("1"));
    }
}
