//! The XDG base-directory variable table.
//!
//! For each base kind (cache, config, data, state) this records, per
//! platform, the environment variable to honor, the optional
//! colon-separated `*_DIRS` companion (POSIX only), the system-wide root
//! locations, and the defaults relative to the user's home.
//!
//! The built-in table mirrors the freedesktop base-directory spec. Hosts
//! may patch it by dropping an `xdg.yml` into one of the strict override
//! locations; unreadable or malformed override files are skipped.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::env::EnvSnapshot;
use crate::merge::deep_merge;

/// Directory name used for the variable-table override files.
pub const META_DIR: &str = "xdg-project-conf";

/// The four XDG base kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XdgBase {
    /// Non-essential cached data.
    Cache,
    /// Configuration files.
    Config,
    /// User data files.
    Data,
    /// State that should persist between restarts.
    State,
}

impl XdgBase {
    /// Key used for this base in override files.
    pub fn key(self) -> &'static str {
        match self {
            XdgBase::Cache => "cache",
            XdgBase::Config => "config",
            XdgBase::Data => "data",
            XdgBase::State => "state",
        }
    }
}

impl std::fmt::Display for XdgBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// One platform's view of an XDG base variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XdgVar {
    /// Environment variable holding the user location.
    #[serde(default)]
    pub var: String,
    /// Companion variable holding extra locations, path-separator joined.
    #[serde(default)]
    pub dirs: Option<String>,
    /// System-wide root locations.
    #[serde(default)]
    pub root: Vec<String>,
    /// Defaults relative to home, used when `var` is unset.
    #[serde(default, rename = "default")]
    pub defaults: Vec<String>,
}

/// Platform-suited pair of XDG variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformXdg {
    /// Windows flavor.
    #[serde(default)]
    pub win: XdgVar,
    /// POSIX flavor.
    #[serde(default)]
    pub posix: XdgVar,
}

impl PlatformXdg {
    /// The variable for the platform this crate was compiled for.
    pub fn active(&self) -> &XdgVar {
        #[cfg(windows)]
        {
            &self.win
        }
        #[cfg(not(windows))]
        {
            &self.posix
        }
    }
}

fn var(
    name: &str,
    dirs: Option<&str>,
    root: &[&str],
    defaults: &[&str],
) -> XdgVar {
    XdgVar {
        var: name.to_string(),
        dirs: dirs.map(str::to_string),
        root: root.iter().map(|s| s.to_string()).collect(),
        defaults: defaults.iter().map(|s| s.to_string()).collect(),
    }
}

/// The built-in variable table. The Windows system root honors
/// `%PROGRAMDATA%` when the snapshot carries it.
pub fn builtin(base: XdgBase, env: &EnvSnapshot) -> PlatformXdg {
    let program_data = env.var("PROGRAMDATA").unwrap_or("C:/ProgramData");
    let win_root: &[&str] = &[program_data];
    match base {
        XdgBase::Cache => PlatformXdg {
            win: var("LOCALAPPDATA", None, win_root, &["AppData/Local"]),
            posix: var("XDG_CACHE_HOME", None, &["/var/cache"], &[".cache"]),
        },
        XdgBase::Config => PlatformXdg {
            win: var("APPDATA", None, win_root, &["AppData/Roaming"]),
            posix: var(
                "XDG_CONFIG_HOME",
                Some("XDG_CONFIG_DIRS"),
                &["/etc/xdg", "/etc"],
                &[".config"],
            ),
        },
        XdgBase::Data => PlatformXdg {
            win: var("APPDATA", None, win_root, &["AppData/Roaming"]),
            posix: var(
                "XDG_DATA_HOME",
                Some("XDG_DATA_DIRS"),
                &["/usr/local/share", "/usr/share"],
                &[".local/share"],
            ),
        },
        XdgBase::State => PlatformXdg {
            win: var("LOCALAPPDATA", None, win_root, &["AppData/Local"]),
            posix: var("XDG_STATE_HOME", None, &["/var/lib"], &[".local/state"]),
        },
    }
}

/// Strict locations searched for `xdg.yml` overrides, least dominant first.
pub fn override_locations(env: &EnvSnapshot) -> Vec<PathBuf> {
    let tail = PathBuf::from(META_DIR).join("xdg.yml");
    let mut locations = Vec::new();

    #[cfg(windows)]
    {
        if let Some(appdata) = env.var("APPDATA") {
            locations.push(PathBuf::from(appdata).join(&tail));
        }
        let local = env
            .var("LOCALAPPDATA")
            .map(PathBuf::from)
            .or_else(|| env.home().map(|h| h.join("AppData/Local")));
        if let Some(local) = local {
            locations.push(local.join(&tail));
        }
    }

    #[cfg(not(windows))]
    {
        locations.push(PathBuf::from("/etc").join(&tail));
        locations.push(PathBuf::from("/etc/xdg").join(&tail));
        let config_home = env
            .var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env.home().map(|h| h.join(".config")));
        if let Some(config_home) = config_home {
            locations.push(config_home.join(&tail));
        }
    }

    locations
}

/// Resolve the variable table for `base`, applying any host overrides.
///
/// Each patch must still deserialize as a variable table after merging;
/// a patch that does not is dropped on its own, leaving patches from the
/// other override files in effect.
pub fn variables(base: XdgBase, env: &EnvSnapshot) -> PlatformXdg {
    let fallback = builtin(base, env);
    let Ok(mut value) = serde_json::to_value(&fallback) else {
        return fallback;
    };

    for location in override_locations(env) {
        let Ok(text) = std::fs::read_to_string(&location) else {
            continue;
        };
        match serde_yaml::from_str::<HashMap<String, serde_json::Value>>(&text) {
            Ok(mut patches) => {
                if let Some(patch) = patches.remove(base.key()) {
                    let merged = deep_merge(value.clone(), patch);
                    match serde_json::from_value::<PlatformXdg>(merged.clone()) {
                        Ok(_) => {
                            debug!(path = %location.display(), base = %base, "applying xdg override");
                            value = merged;
                        }
                        Err(err) => {
                            warn!(path = %location.display(), %err, "ignoring type-invalid xdg override");
                        }
                    }
                }
            }
            Err(err) => {
                warn!(path = %location.display(), %err, "ignoring malformed xdg override");
            }
        }
    }

    serde_json::from_value(value).unwrap_or(fallback)
}
