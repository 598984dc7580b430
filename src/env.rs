//! Environment snapshot used during discovery.
//!
//! All environment and home-directory lookups go through a snapshot taken
//! when the discoverer is built. Tests inject a synthetic snapshot instead
//! of mutating process state.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A captured view of the variables and home directory that discovery
/// consults.
#[derive(Debug, Clone)]
pub struct EnvSnapshot {
    home: Option<PathBuf>,
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    /// Capture the live process environment.
    pub fn from_os() -> Self {
        Self {
            home: dirs::home_dir(),
            vars: std::env::vars().collect(),
        }
    }

    /// An empty environment with only a home directory. Intended for tests
    /// and sandboxed callers.
    pub fn bare(home: impl Into<PathBuf>) -> Self {
        Self {
            home: Some(home.into()),
            vars: HashMap::new(),
        }
    }

    /// Add or replace a variable.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Look up a variable.
    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// The user's home directory, if one is known.
    pub fn home(&self) -> Option<&Path> {
        self.home.as_deref()
    }
}

impl Default for EnvSnapshot {
    fn default() -> Self {
        Self::from_os()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_snapshot_has_no_vars() {
        let env = EnvSnapshot::bare("/home/nobody");
        assert_eq!(env.home(), Some(Path::new("/home/nobody")));
        assert_eq!(env.var("XDG_CONFIG_HOME"), None);
    }

    #[test]
    fn set_overrides_and_adds() {
        let env = EnvSnapshot::bare("/home/nobody")
            .set("XDG_CONFIG_HOME", "/tmp/cfg")
            .set("XDG_CONFIG_HOME", "/tmp/cfg2");
        assert_eq!(env.var("XDG_CONFIG_HOME"), Some("/tmp/cfg2"));
    }
}
