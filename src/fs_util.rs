//! Filesystem helpers for locating a project root.
//!
//! These follow symlinks: installed packages are often linked into
//! `node_modules` and must still be found.

use std::path::{Component, Path, PathBuf};

/// Name of the manifest file that marks both a project root and a plugin.
pub const MANIFEST_FILE: &str = "package.json";

/// Directory under a project root that holds installed packages.
pub const PACKAGES_DIR: &str = "node_modules";

/// Walk up from `start` to the nearest directory containing a manifest file.
///
/// `start` itself is checked first.
#[must_use]
pub(crate) fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(MANIFEST_FILE).is_file())
        .map(Path::to_path_buf)
}

/// Resolve `path` against `base`, and a relative `base` against `cwd`.
///
/// The result is absolute with `.` and `..` folded lexically. An absolute
/// `path` ignores both `base` and `cwd`.
#[must_use]
pub(crate) fn resolve_from(cwd: &Path, base: &Path, path: &str) -> PathBuf {
    let joined = base.join(path);
    if joined.is_absolute() {
        normalize(&joined)
    } else {
        normalize(&cwd.join(joined))
    }
}

/// Fold `.` and `..` components without touching the filesystem.
///
/// `..` at the root stays at the root.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn find_project_root_in_start_dir() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), "{}").unwrap();
        assert_eq!(find_project_root(dir.path()), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn find_project_root_walks_up() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), "{}").unwrap();
        let nested = dir.path().join("src").join("deep");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(find_project_root(&nested), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn find_project_root_prefers_nearest() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), "{}").unwrap();
        let inner = dir.path().join("inner");
        fs::create_dir(&inner).unwrap();
        fs::write(inner.join(MANIFEST_FILE), "{}").unwrap();
        assert_eq!(find_project_root(&inner), Some(inner.clone()));
    }

    #[test]
    fn find_project_root_ignores_directory_named_like_manifest() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(MANIFEST_FILE)).unwrap();
        let found = find_project_root(dir.path());
        assert_ne!(found, Some(dir.path().to_path_buf()));
    }

    #[cfg(unix)]
    #[test]
    fn resolve_from_relative() {
        let p = resolve_from(Path::new("/cwd"), Path::new("/app"), "plugins/a");
        assert_eq!(p, PathBuf::from("/app/plugins/a"));
    }

    #[cfg(unix)]
    #[test]
    fn resolve_from_absolute_is_unchanged() {
        let p = resolve_from(Path::new("/cwd"), Path::new("/app"), "/opt/plugins/a");
        assert_eq!(p, PathBuf::from("/opt/plugins/a"));
    }

    #[cfg(unix)]
    #[test]
    fn resolve_from_folds_parent_components() {
        let p = resolve_from(Path::new("/cwd"), Path::new("/app/config"), "../plugins/./a");
        assert_eq!(p, PathBuf::from("/app/plugins/a"));
    }

    #[cfg(unix)]
    #[test]
    fn resolve_from_relative_base_uses_cwd() {
        let p = resolve_from(Path::new("/work"), Path::new("config"), "../plugins/a");
        assert_eq!(p, PathBuf::from("/work/plugins/a"));
    }

    #[cfg(unix)]
    #[test]
    fn resolve_from_stops_at_root() {
        let p = resolve_from(Path::new("/cwd"), Path::new("/app"), "../../../a");
        assert_eq!(p, PathBuf::from("/a"));
    }
}
