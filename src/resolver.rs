//! Module location and loading.
//!
//! The loader never touches the filesystem for packages or module contents
//! directly; it goes through a [`ModuleResolver`]. [`FsModuleResolver`] is the
//! implementation backed by the real filesystem.

use std::path::{Path, PathBuf};

use crate::errors::{PluginError, Result};
use crate::fs_util::{find_project_root, PACKAGES_DIR};
use crate::models::ExportValue;

/// Extensions that are parsed rather than returned as raw bytes.
const LOADABLE_EXTENSIONS: &[&str] = &["json", "yaml", "yml", ""];

/// Locates installed packages and loads module files.
pub trait ModuleResolver {
    /// Find the directory of `package` installed for the project containing `start_dir`.
    fn locate_package(&self, start_dir: &Path, package: &str) -> Result<PathBuf>;

    /// Load the value exported by the file at `path`.
    fn load_module(&self, path: &Path) -> Result<ExportValue>;

    /// Whether a loadable file exists at `path`.
    fn exists(&self, path: &Path) -> bool;
}

/// [`ModuleResolver`] backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsModuleResolver;

impl ModuleResolver for FsModuleResolver {
    fn locate_package(&self, start_dir: &Path, package: &str) -> Result<PathBuf> {
        closest_module_dir(start_dir, package)
    }

    fn load_module(&self, path: &Path) -> Result<ExportValue> {
        load_file(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Find `<project root>/node_modules/<package>` for the project containing `cwd`.
pub fn closest_module_dir(cwd: &Path, package: &str) -> Result<PathBuf> {
    let root = find_project_root(cwd).ok_or_else(|| PluginError::ProjectRootNotFound {
        cwd: cwd.to_path_buf(),
    })?;
    let module_path = root.join(PACKAGES_DIR).join(package);
    if !module_path.exists() {
        return Err(PluginError::PackageNotFound {
            name: package.to_string(),
            path: module_path,
        });
    }
    Ok(module_path)
}

/// Load a module file.
///
/// JSON, YAML and extensionless files are parsed (extensionless as JSON) and
/// a default-export wrapper is unwrapped. Anything else is returned as raw
/// bytes.
pub fn load_file(path: &Path) -> Result<ExportValue> {
    let load_err = |message: String| PluginError::Load {
        path: path.to_path_buf(),
        message,
    };

    let bytes = std::fs::read(path).map_err(|e| load_err(e.to_string()))?;
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    if !LOADABLE_EXTENSIONS.contains(&ext.as_str()) {
        return Ok(ExportValue::Bytes(bytes));
    }

    let value: serde_json::Value = match ext.as_str() {
        "yaml" | "yml" => serde_yaml_ng::from_slice(&bytes).map_err(|e| load_err(e.to_string()))?,
        _ => serde_json::from_slice(&bytes).map_err(|e| load_err(e.to_string()))?,
    };
    Ok(ExportValue::Value(unwrap_default_export(value)))
}

/// `{"__esModule": true, "default": X}` becomes `X`.
fn unwrap_default_export(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(mut map)
            if map.get("__esModule").and_then(serde_json::Value::as_bool) == Some(true) =>
        {
            match map.remove("default") {
                Some(inner) => inner,
                None => serde_json::Value::Object(map),
            }
        }
        other => other,
    }
}
