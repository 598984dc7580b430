//! Filesystem accessibility checks and mountpoint detection.
//!
//! Candidate locations frequently do not exist yet, so the accessibility
//! check walks up to the nearest existing ancestor and judges that instead.
//! Any filesystem error means "unavailable", never a panic.

use std::path::{Path, PathBuf};

/// Required access for a candidate location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessMode {
    /// Location must be readable.
    pub read: bool,
    /// Location must be writable.
    pub write: bool,
}

impl AccessMode {
    /// Existence of a usable ancestor is enough.
    pub const EXISTS: Self = Self {
        read: false,
        write: false,
    };
    /// Readable.
    pub const READ: Self = Self {
        read: true,
        write: false,
    };
    /// Writable.
    pub const WRITE: Self = Self {
        read: false,
        write: true,
    };
    /// Readable and writable.
    pub const READ_WRITE: Self = Self {
        read: true,
        write: true,
    };
}

/// Check whether `path` (or, if it does not exist, its nearest existing
/// ancestor) satisfies the requested access.
pub fn fs_access(path: &Path, mode: AccessMode) -> bool {
    let Some(probe) = nearest_existing(path) else {
        return false;
    };
    let Ok(meta) = std::fs::metadata(&probe) else {
        return false;
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let bits = meta.permissions().mode();
        if mode.read && bits & 0o444 == 0 {
            return false;
        }
        if mode.write && bits & 0o222 == 0 {
            return false;
        }
    }

    #[cfg(not(unix))]
    {
        if mode.write && meta.permissions().readonly() {
            return false;
        }
        let _ = mode.read;
    }

    true
}

/// Walk up from `path` to the closest component that exists on disk.
fn nearest_existing(path: &Path) -> Option<PathBuf> {
    for ancestor in path.ancestors() {
        // A fully relative path bottoms out at "", which means the cwd.
        let probe = if ancestor.as_os_str().is_empty() {
            Path::new(".")
        } else {
            ancestor
        };
        if probe.exists() {
            return Some(probe.to_path_buf());
        }
    }
    None
}

/// Whether `path` is a mountpoint (unix) or a drive root (windows).
#[cfg(unix)]
pub fn is_mount(path: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    let Some(parent) = path.parent() else {
        return true;
    };
    match (std::fs::metadata(path), std::fs::metadata(parent)) {
        (Ok(meta), Ok(parent_meta)) => {
            meta.dev() != parent_meta.dev() || meta.ino() == parent_meta.ino()
        }
        _ => false,
    }
}

/// Whether `path` is a mountpoint (unix) or a drive root (windows).
#[cfg(not(unix))]
pub fn is_mount(path: &Path) -> bool {
    path.parent().is_none()
}
