//! XDG base-directory discovery for a named project.
//!
//! Produces dominance-ordered candidate directories for one of the four
//! base kinds: explicit override first, then traced ancestors, discouraged
//! home-dotfile locations (opt-in), user XDG locations, system roots, and
//! shipped defaults last. Candidates are filtered by accessibility, never
//! reordered.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::env::EnvSnapshot;
use crate::fs::{AccessMode, fs_access, is_mount};
use crate::xdg::{self, PlatformXdg, XdgBase};

/// Marker files steering the ancestor walk.
#[derive(Debug, Clone)]
pub struct AncestorMarkers {
    /// A directory containing one of these is collected while walking up.
    pub inherit: Vec<String>,
    /// A directory containing one of these is the workspace root; the walk
    /// stops there and includes it.
    pub root: Vec<String>,
}

impl Default for AncestorMarkers {
    fn default() -> Self {
        Self {
            inherit: Vec::new(),
            root: [".git", "Cargo.toml", "pyproject.toml", "setup.cfg", "setup.py"]
                .map(str::to_string)
                .to_vec(),
        }
    }
}

/// Result of walking a directory's ancestry.
#[derive(Debug, Clone, Default)]
pub struct AncestorTrace {
    /// Collected directories, most dominant (deepest) first.
    pub dirs: Vec<PathBuf>,
    /// The workspace root, when a root marker terminated the walk.
    pub workspace_root: Option<PathBuf>,
}

/// Candidate directories grouped by origin.
#[derive(Debug, Clone)]
pub struct Locations {
    /// Discouraged `~/<project>` and `~/.<project>`.
    pub improper: Vec<PathBuf>,
    /// User XDG locations.
    pub user: Vec<PathBuf>,
    /// System-wide root locations.
    pub root: Vec<PathBuf>,
    /// Shipped-defaults directory, if configured.
    pub shipped: Vec<PathBuf>,
}

/// Options controlling a discovery pass.
#[derive(Debug, Clone, Default)]
pub struct DiscoverOptions {
    /// Explicit override location, included unchecked and most dominant.
    pub custom: Option<PathBuf>,
    /// Start directory for the ancestor walk.
    pub trace: Option<PathBuf>,
    /// Include the discouraged home-dotfile locations.
    pub improper: bool,
    /// Return least dominant first instead.
    pub dominant_last: bool,
    /// Accessibility requirement override for this pass.
    pub access: Option<AccessMode>,
    /// Config-file stem (file-level discovery only; default `config`).
    pub cname: Option<String>,
    /// Extension filter for write candidates (file-level discovery only).
    pub ext: Vec<String>,
}

impl DiscoverOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an explicit override location.
    pub fn custom(mut self, path: impl Into<PathBuf>) -> Self {
        self.custom = Some(path.into());
        self
    }

    /// Walk the ancestry of `start`.
    pub fn trace_from(mut self, start: impl Into<PathBuf>) -> Self {
        self.trace = Some(start.into());
        self
    }

    /// Walk the ancestry of the current directory.
    pub fn trace_cwd(mut self) -> Self {
        self.trace = std::env::current_dir().ok();
        self
    }

    /// Include the discouraged `~/.project` style locations.
    pub fn improper(mut self, include: bool) -> Self {
        self.improper = include;
        self
    }

    /// Order results least dominant first.
    pub fn dominant_last(mut self, last: bool) -> Self {
        self.dominant_last = last;
        self
    }

    /// Require this accessibility of every candidate.
    pub fn access(mut self, mode: AccessMode) -> Self {
        self.access = Some(mode);
        self
    }

    /// Use this config-file stem instead of `config`.
    pub fn cname(mut self, name: impl Into<String>) -> Self {
        self.cname = Some(name.into());
        self
    }

    /// Restrict write candidates to this extension (with or without a dot).
    pub fn extension(mut self, ext: impl Into<String>) -> Self {
        let ext = ext.into();
        self.ext.push(ext.trim_start_matches('.').to_string());
        self
    }
}

/// Directory-level discovery over one XDG base kind.
#[derive(Debug, Clone)]
pub struct BaseDiscovery {
    project: String,
    base: XdgBase,
    shipped: Option<PathBuf>,
    access: AccessMode,
    markers: AncestorMarkers,
    env: EnvSnapshot,
    vars: PlatformXdg,
}

impl BaseDiscovery {
    /// Discovery for `project` over `base`, reading the live environment.
    pub fn new(project: impl Into<String>, base: XdgBase) -> Self {
        Self::with_env(project, base, EnvSnapshot::from_os())
    }

    /// Discovery against an injected environment snapshot.
    pub fn with_env(project: impl Into<String>, base: XdgBase, env: EnvSnapshot) -> Self {
        let vars = xdg::variables(base, &env);
        Self {
            project: project.into(),
            base,
            shipped: None,
            access: AccessMode::EXISTS,
            markers: AncestorMarkers::default(),
            env,
            vars,
        }
    }

    /// Register a directory of shipped default configuration, least
    /// dominant of all locations.
    pub fn with_shipped(mut self, dir: impl Into<PathBuf>) -> Self {
        self.shipped = Some(dir.into());
        self
    }

    /// Default accessibility requirement for discovery passes.
    pub fn with_access(mut self, mode: AccessMode) -> Self {
        self.access = mode;
        self
    }

    /// Replace the ancestor-walk markers.
    pub fn with_markers(mut self, markers: AncestorMarkers) -> Self {
        self.markers = markers;
        self
    }

    /// The project name.
    pub fn project(&self) -> &str {
        &self.project
    }

    /// The base kind.
    pub fn base(&self) -> XdgBase {
        self.base
    }

    /// The shipped-defaults directory, if any.
    pub fn shipped(&self) -> Option<&Path> {
        self.shipped.as_deref()
    }

    /// The environment snapshot in use.
    pub fn env(&self) -> &EnvSnapshot {
        &self.env
    }

    pub(crate) fn default_access(&self) -> AccessMode {
        self.access
    }

    fn active_var(&self) -> &crate::xdg::XdgVar {
        self.vars.active()
    }

    /// System-wide base directories without the project component.
    pub(crate) fn root_bases(&self) -> Vec<PathBuf> {
        self.active_var().root.iter().map(PathBuf::from).collect()
    }

    /// User XDG locations for this project, most dominant first.
    pub fn user_dirs(&self) -> Vec<PathBuf> {
        let var = self.active_var();
        let mut bases: Vec<PathBuf> = match self.env.var(&var.var) {
            Some(value) => std::env::split_paths(value).collect(),
            None => match self.env.home() {
                Some(home) => var.defaults.iter().map(|d| home.join(d)).collect(),
                None => Vec::new(),
            },
        };

        // The *_DIRS companion only exists on POSIX and is lower priority
        // than the home location, so it is appended, never merged.
        #[cfg(not(windows))]
        if let Some(dirs_var) = &var.dirs
            && let Some(value) = self.env.var(dirs_var)
        {
            bases.extend(std::env::split_paths(value));
        }

        bases.into_iter().map(|b| b.join(&self.project)).collect()
    }

    /// System-wide locations for this project, most dominant first.
    pub fn root_dirs(&self) -> Vec<PathBuf> {
        self.root_bases()
            .into_iter()
            .map(|b| b.join(&self.project))
            .collect()
    }

    /// Discouraged `~/<project>` and `~/.<project>` locations.
    pub fn improper_dirs(&self) -> Vec<PathBuf> {
        let Some(home) = self.env.home() else {
            return Vec::new();
        };
        vec![
            home.join(&self.project),
            home.join(format!(".{}", self.project)),
        ]
    }

    /// All known locations grouped by origin.
    pub fn locations(&self) -> Locations {
        Locations {
            improper: self.improper_dirs(),
            user: self.user_dirs(),
            root: self.root_dirs(),
            shipped: self.shipped.clone().into_iter().collect(),
        }
    }

    /// Walk up from `start` to the nearest workspace root or mountpoint.
    ///
    /// Directories carrying an inherit marker are collected along the way;
    /// a directory carrying a root marker ends the walk and is included.
    /// The start directory counts as its own 0th ancestor.
    pub fn trace_ancestors(&self, start: &Path) -> AncestorTrace {
        let mut trace = AncestorTrace::default();
        let mut dir = start.to_path_buf();

        loop {
            let inherits = self
                .markers
                .inherit
                .iter()
                .any(|m| dir.join(m).is_file());
            let is_root = self.markers.root.iter().any(|m| dir.join(m).exists());

            if inherits || is_root {
                trace.dirs.push(dir.clone());
            }
            if is_root {
                trace.workspace_root = Some(dir);
                break;
            }
            if is_mount(&dir) {
                break;
            }
            match dir.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => dir = parent.to_path_buf(),
                _ => break,
            }
        }
        trace
    }

    /// Assemble and filter candidate directories for this base.
    pub fn discover(&self, opts: &DiscoverOptions) -> Vec<PathBuf> {
        let mut order: Vec<PathBuf> = Vec::new();

        if let Some(custom) = &opts.custom {
            order.push(custom.clone());
        }
        if let Some(start) = &opts.trace {
            order.extend(self.trace_ancestors(start).dirs);
        }

        let locations = self.locations();
        if opts.improper {
            order.extend(locations.improper);
        }
        order.extend(locations.user);
        order.extend(locations.root);
        order.extend(locations.shipped);

        let access = opts.access.unwrap_or(self.access);
        order.retain(|path| {
            let ok = fs_access(path, access);
            if !ok {
                debug!(path = %path.display(), "skipping inaccessible location");
            }
            ok
        });

        if opts.dominant_last {
            order.reverse();
        }
        order
    }
}
