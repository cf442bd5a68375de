use std::path::PathBuf;

use thiserror::Error;

/// Broad classification of a [`PluginError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The plugin configuration or a manifest is inconsistent.
    Configuration,
    /// A collaborator could not find or load something on disk.
    Resolution,
}

/// Errors that abort a plugin resolution pass.
#[derive(Error, Debug)]
pub enum PluginError {
    /// The reserved alias `project` was used as a plugin key.
    #[error("plugin alias name can not be `project`")]
    ReservedAlias,

    /// Neither `package` nor `path` was given for an alias.
    #[error("plugin of {alias} miss 'package' or 'path'")]
    MissingSource { alias: String },

    /// The manifest has no `plugin` section.
    #[error("plugin of {alias}'s package.json miss 'plugin' property in {}", path.display())]
    MissingPluginSection { alias: String, path: PathBuf },

    /// The manifest's `plugin.name` differs from the configured alias.
    #[error(
        "plugin of {alias}'s package.json which name is not matched in {} (found {})",
        path.display(),
        found.as_deref().unwrap_or("nothing")
    )]
    NameMismatch {
        alias: String,
        found: Option<String>,
        path: PathBuf,
    },

    /// A plugin depends on aliases that are not configured at all.
    #[error("plugin [{alias}] depends on plugins that do not exist: {}", missing.join(","))]
    MissingDependencies { alias: String, missing: Vec<String> },

    /// The dependency graph contains a cycle.
    #[error("dependency cycle detected: {}", cycle.join(" -> "))]
    DependencyCycle { cycle: Vec<String> },

    /// The plugin config document could not be read or parsed.
    #[error("config error: {message}")]
    Config { message: String },

    /// No ancestor of the working directory holds a `package.json`.
    #[error("can not find the closest project root by '{}'", cwd.display())]
    ProjectRootNotFound { cwd: PathBuf },

    /// The package is not installed under the project root.
    #[error("can not find the module of {name}: {}", path.display())]
    PackageNotFound { name: String, path: PathBuf },

    /// A `path` plugin has no manifest file.
    #[error("plugin of {alias} miss 'package.json' in {}", path.display())]
    ManifestNotFound { alias: String, path: PathBuf },

    /// Reading or parsing a module file failed.
    #[error("load file: {}, error: {message}", path.display())]
    Load { path: PathBuf, message: String },
}

impl PluginError {
    /// Returns whether the error comes from configuration or from resolution.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            PluginError::ProjectRootNotFound { .. }
            | PluginError::PackageNotFound { .. }
            | PluginError::ManifestNotFound { .. }
            | PluginError::Load { .. } => ErrorKind::Resolution,
            _ => ErrorKind::Configuration,
        }
    }
}

/// Convenience alias for `Result<T, PluginError>`.
pub type Result<T> = std::result::Result<T, PluginError>;
