//! Config-file discovery, reading, and writing.
//!
//! Specializes directory discovery to the CONFIG base: every candidate is a
//! file, produced by crossing the discovered directories with the known
//! config extensions and rc-file conventions. Reading parses whichever
//! candidates exist, most dominant first; writing walks the writable
//! candidates from least dominant up and takes the first that sticks.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::base::{AncestorMarkers, BaseDiscovery, DiscoverOptions};
use crate::env::EnvSnapshot;
use crate::error::{ConfigError, Result};
use crate::formats::{
    CONF_EXTENSIONS, MANIFEST_NAMES, Mapping, WriteMode, parse_file, write_file,
};
use crate::fs::{AccessMode, fs_access};
use crate::merge::deep_merge_all;
use crate::xdg::XdgBase;

/// File-level configuration discovery for a named project.
#[derive(Debug, Clone)]
pub struct ConfigDiscovery {
    base: BaseDiscovery,
}

impl ConfigDiscovery {
    /// Discovery for `project`, reading the live environment.
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            base: BaseDiscovery::new(project, XdgBase::Config),
        }
    }

    /// Discovery against an injected environment snapshot.
    pub fn with_env(project: impl Into<String>, env: EnvSnapshot) -> Self {
        Self {
            base: BaseDiscovery::with_env(project, XdgBase::Config, env),
        }
    }

    /// Register a directory of shipped default configuration.
    pub fn with_shipped(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base = self.base.with_shipped(dir);
        self
    }

    /// Default accessibility requirement for discovery passes.
    pub fn with_access(mut self, mode: AccessMode) -> Self {
        self.base = self.base.with_access(mode);
        self
    }

    /// Replace the ancestor-walk markers.
    pub fn with_markers(mut self, markers: AncestorMarkers) -> Self {
        self.base = self.base.with_markers(markers);
        self
    }

    /// The underlying directory-level discovery.
    pub fn base(&self) -> &BaseDiscovery {
        &self.base
    }

    /// The project name.
    pub fn project(&self) -> &str {
        self.base.project()
    }

    /// Cross a list of directories with the known config extensions.
    ///
    /// Each directory contributes `<dir>/<cname>.<ext>` and `<dir>.<ext>`,
    /// extension-major so every directory is tried per format.
    fn file_candidates(dirs: &[PathBuf], cname: &str) -> Vec<PathBuf> {
        let mut files = Vec::with_capacity(dirs.len() * CONF_EXTENSIONS.len() * 2);
        for ext in CONF_EXTENSIONS {
            for dir in dirs {
                files.push(dir.join(format!("{cname}.{ext}")));
                files.push(dir.with_extension(ext));
            }
        }
        files
    }

    /// Config-file candidates in user XDG locations.
    pub fn user_files(&self, cname: &str) -> Vec<PathBuf> {
        Self::file_candidates(&self.base.user_dirs(), cname)
    }

    /// Config-file candidates in system-wide locations.
    pub fn root_files(&self, cname: &str) -> Vec<PathBuf> {
        Self::file_candidates(&self.base.root_dirs(), cname)
    }

    /// Config-file candidates in the discouraged home-dotfile locations.
    pub fn improper_files(&self, cname: &str) -> Vec<PathBuf> {
        Self::file_candidates(&self.base.improper_dirs(), cname)
    }

    /// Config-file candidates shipped with the application.
    pub fn shipped_files(&self, cname: &str) -> Vec<PathBuf> {
        let Some(shipped) = self.base.shipped() else {
            return Vec::new();
        };
        CONF_EXTENSIONS
            .iter()
            .map(|ext| shipped.join(format!("{cname}.{ext}")))
            .collect()
    }

    /// Config-file candidates inherited from a directory's ancestry.
    ///
    /// Every traced directory contributes its `.<project>rc`; the start
    /// directory always participates. When the walk found a workspace root,
    /// its embedded manifests are appended, least dominant.
    pub fn ancestor_files(&self, start: &Path) -> Vec<PathBuf> {
        let trace = self.base.trace_ancestors(start);
        let mut dirs = trace.dirs;
        if dirs.first().map(PathBuf::as_path) != Some(start) {
            dirs.insert(0, start.to_path_buf());
        }

        let rc_name = format!(".{}rc", self.project());
        let mut files: Vec<PathBuf> = dirs.iter().map(|d| d.join(&rc_name)).collect();

        if let Some(root) = trace.workspace_root {
            for manifest in MANIFEST_NAMES {
                let candidate = root.join(manifest);
                if candidate.is_file() {
                    files.push(candidate);
                }
            }
        }
        files
    }

    /// Assemble and filter candidate configuration files.
    ///
    /// Dominance order: custom override, `$<PROJECT>RC`, traced ancestors,
    /// improper locations (opt-in), user, system roots, shipped defaults.
    pub fn discover(&self, opts: &DiscoverOptions) -> Result<Vec<PathBuf>> {
        let mut order: Vec<PathBuf> = Vec::new();

        if let Some(custom) = &opts.custom {
            order.push(custom.clone());
        }

        let rc_var = format!("{}RC", self.project().to_uppercase());
        if let Some(rc_path) = self.base.env().var(&rc_var) {
            let rc_path = PathBuf::from(rc_path);
            if !rc_path.is_file() {
                return Err(ConfigError::RcFileMissing {
                    var: rc_var,
                    path: rc_path,
                });
            }
            order.push(rc_path);
        }

        if let Some(start) = &opts.trace {
            order.extend(self.ancestor_files(start));
        }

        let cname = opts.cname.as_deref().unwrap_or("config");
        if opts.improper {
            order.extend(self.improper_files(cname));
        }
        order.extend(self.user_files(cname));
        order.extend(self.root_files(cname));
        order.extend(self.shipped_files(cname));

        let access = opts.access.unwrap_or(self.base.default_access());
        order.retain(|path| {
            let ok = fs_access(path, access);
            if !ok {
                debug!(path = %path.display(), "skipping inaccessible candidate");
            }
            ok
        });

        if opts.dominant_last {
            order.reverse();
        }
        Ok(order)
    }

    /// Candidate files that are safe targets for writing configuration.
    ///
    /// Requires write access unless overridden, drops system and shipped
    /// locations along with embedded manifests, and applies the extension
    /// filter. Existence of the file itself is not required.
    pub fn writable_candidates(&self, opts: &DiscoverOptions) -> Result<Vec<PathBuf>> {
        let mut opts = opts.clone();
        opts.access = Some(opts.access.unwrap_or(AccessMode::WRITE));
        opts.improper = false;

        let root_bases = self.base.root_bases();
        let shipped = self.base.shipped().map(Path::to_path_buf);

        let mut candidates = self.discover(&opts)?;
        candidates.retain(|path| {
            if root_bases.iter().any(|base| path.starts_with(base)) {
                return false;
            }
            if let Some(shipped) = &shipped
                && path.starts_with(shipped)
            {
                return false;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str())
                && MANIFEST_NAMES.contains(&name)
            {
                return false;
            }
            if !opts.ext.is_empty() {
                let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
                    return false;
                };
                if !opts.ext.iter().any(|e| e == ext) {
                    return false;
                }
            }
            true
        });
        Ok(candidates)
    }

    /// Parse every discovered configuration file.
    ///
    /// Unavailable locations (missing, permission, not a file) are skipped;
    /// a file that exists but defeats every parser is an error. Results are
    /// ordered most dominant first unless the options say otherwise.
    pub fn read(&self, opts: &DiscoverOptions) -> Result<Vec<(PathBuf, Mapping)>> {
        let mut opts = opts.clone();
        opts.access = Some(opts.access.unwrap_or(AccessMode::READ));

        let mut configs = Vec::new();
        for path in self.discover(&opts)? {
            match parse_file(&path, Some(self.project())) {
                Ok(mapping) => configs.push((path, mapping)),
                Err(ConfigError::Io(err)) => {
                    debug!(path = %path.display(), %err, "skipping unavailable config");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(configs)
    }

    /// Read and superimpose all discovered configuration.
    ///
    /// The most dominant file wins key-by-key, via deep merge.
    pub fn read_merged(&self, opts: &DiscoverOptions) -> Result<Mapping> {
        let mut opts = opts.clone();
        opts.dominant_last = false;
        let configs = self.read(&opts)?;
        Ok(deep_merge_all(
            configs.into_iter().rev().map(|(_, mapping)| mapping),
        ))
    }

    /// Write configuration to the least dominant writable candidate.
    ///
    /// Candidates are tried from least dominant to most so user-wide
    /// locations are preferred over workspace-local ones. I/O failures move
    /// on to the next candidate; an existing file under [`WriteMode::Fail`]
    /// ends the attempt. Returns the path written, or `None`.
    pub fn write(
        &self,
        data: &Mapping,
        mode: WriteMode,
        opts: &DiscoverOptions,
    ) -> Result<Option<PathBuf>> {
        let mut candidates = self.writable_candidates(opts)?;
        if !opts.dominant_last {
            candidates.reverse();
        }

        for path in candidates {
            match write_file(data, &path, None, mode) {
                Ok(true) => return Ok(Some(path)),
                Ok(false) => return Ok(None),
                Err(ConfigError::Io(err)) => {
                    debug!(path = %path.display(), %err, "write failed, trying next candidate");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(None)
    }
}
