//! Platform-suited project configuration discovery.
//!
//! Locates "the" configuration for a named project by searching a
//! deterministic, dominance-ordered list of candidate locations (explicit
//! overrides, rc-file environment variables, ancestor directories, user and
//! system XDG base directories, shipped defaults), then reads whichever
//! of those exist and optionally superimposes them by precedence. Files may
//! be YAML, JSON, TOML, or INI; reading auto-detects the format with a
//! graceful fallback chain.
//!
//! ## Example
//!
//! ```no_run
//! use xdg_project_conf::{ConfigDiscovery, DiscoverOptions};
//!
//! # fn main() -> xdg_project_conf::Result<()> {
//! let discovery = ConfigDiscovery::new("myproj");
//! let merged = discovery.read_merged(&DiscoverOptions::new().trace_cwd())?;
//! if let Some(editor) = merged.get("editor") {
//!     println!("editor: {editor}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Directory-level discovery for the other base kinds (cache, data, state)
//! is available through [`BaseDiscovery`].

pub mod base;
pub mod config;
pub mod env;
pub mod error;
pub mod formats;
pub mod fs;
pub mod merge;
pub mod xdg;

pub use base::{AncestorMarkers, AncestorTrace, BaseDiscovery, DiscoverOptions, Locations};
pub use config::ConfigDiscovery;
pub use env::EnvSnapshot;
pub use error::{ConfigError, Result};
pub use formats::{ConfigFormat, Mapping, WriteMode};
pub use fs::AccessMode;
pub use merge::{deep_merge, deep_merge_all};
pub use xdg::XdgBase;
