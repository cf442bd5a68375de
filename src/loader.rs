//! Turning one plugin config entry into a [`PluginNode`].
//!
//! An entry is either rejected (it does not apply to this process), loaded,
//! or it fails with a [`PluginError`]. Rejection is not an error.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::context::ResolveContext;
use crate::errors::{PluginError, Result};
use crate::fs_util::{resolve_from, MANIFEST_FILE};
use crate::models::{ExportValue, PluginConfigEntry, PluginManifest, PluginNode, StringList};
use crate::resolver::ModuleResolver;

/// Why a plugin was left out of the activation list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// `enable: false`.
    Disabled,
    /// The current environment is not in the entry's `env` list.
    Env { allowed: StringList },
    /// The current agent role is not in the entry's `agent` list.
    Agent { allowed: StringList },
    /// The current framework is not in the manifest's `plugin.framework` list.
    Framework { supported: StringList },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Disabled => f.write_str("config.enable = false"),
            RejectReason::Env { allowed } => write!(f, "config.env = {allowed}"),
            RejectReason::Agent { allowed } => write!(f, "config.agent = {allowed}"),
            RejectReason::Framework { supported } => {
                write!(f, "plugin.framework = {supported}")
            }
        }
    }
}

/// A plugin that was configured but does not apply to this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub alias: String,
    pub reason: RejectReason,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} reject] {}", self.alias, self.reason)
    }
}

/// Result of resolving a single entry.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded(PluginNode),
    Rejected(Rejection),
}

/// Check enablement, environment and agent role before touching the disk.
fn check_entry(entry: &PluginConfigEntry, ctx: &ResolveContext) -> Option<RejectReason> {
    if !entry.enable {
        return Some(RejectReason::Disabled);
    }
    if let Some(env) = ctx.env.as_deref().filter(|e| !e.is_empty()) {
        if !entry.env.is_empty() && !entry.env.contains(env) {
            return Some(RejectReason::Env {
                allowed: entry.env.clone(),
            });
        }
    }
    if ctx.is_agent {
        if let Some(agent) = ctx.agent.as_deref().filter(|a| !a.is_empty()) {
            if entry.agent.is_empty() || !entry.agent.contains(agent) {
                return Some(RejectReason::Agent {
                    allowed: entry.agent.clone(),
                });
            }
        }
    }
    None
}

fn reject(alias: &str, reason: RejectReason) -> LoadOutcome {
    let rejection = Rejection {
        alias: alias.to_string(),
        reason,
    };
    warn!("{rejection}; continue");
    LoadOutcome::Rejected(rejection)
}

/// Read and parse a `package.json` through the resolver.
fn read_manifest(resolver: &dyn ModuleResolver, path: &Path) -> Result<PluginManifest> {
    let parse_err = |message: String| PluginError::Load {
        path: path.to_path_buf(),
        message,
    };
    match resolver.load_module(path)? {
        ExportValue::Value(value) => {
            serde_json::from_value(value).map_err(|e| parse_err(e.to_string()))
        }
        _ => Err(parse_err("manifest is not a JSON document".to_string())),
    }
}

/// Resolve one configured plugin.
///
/// Checks enablement, environment and agent role, locates the plugin on
/// disk, verifies its manifest, and loads the entry point for the current
/// role. A missing entry-point file yields [`ExportValue::Noop`].
///
/// # Errors
///
/// Fails when the entry has neither `path` nor `package`, when the manifest
/// is missing, has no `plugin` section or names a different plugin, or when
/// the resolver cannot locate or load a file.
pub fn resolve_plugin(
    alias: &str,
    entry: &PluginConfigEntry,
    ctx: &ResolveContext,
    resolver: &dyn ModuleResolver,
) -> Result<LoadOutcome> {
    if let Some(reason) = check_entry(entry, ctx) {
        return Ok(reject(alias, reason));
    }

    let plugin_dir: PathBuf = match (&entry.path, &entry.package) {
        (Some(path), _) => {
            let dir = resolve_from(&ctx.cwd, &ctx.base, path);
            let manifest_path = dir.join(MANIFEST_FILE);
            if !resolver.exists(&manifest_path) {
                return Err(PluginError::ManifestNotFound {
                    alias: alias.to_string(),
                    path: manifest_path,
                });
            }
            dir
        }
        (None, Some(package)) => resolver.locate_package(&ctx.cwd, package)?,
        (None, None) => {
            return Err(PluginError::MissingSource {
                alias: alias.to_string(),
            })
        }
    };

    let manifest_path = plugin_dir.join(MANIFEST_FILE);
    let manifest = read_manifest(resolver, &manifest_path)?;
    let Some(plugin) = manifest.plugin else {
        return Err(PluginError::MissingPluginSection {
            alias: alias.to_string(),
            path: manifest_path,
        });
    };
    if plugin.name_str() != Some(alias) {
        return Err(PluginError::NameMismatch {
            alias: alias.to_string(),
            found: plugin.name_display(),
            path: manifest_path,
        });
    }

    if !plugin.framework.is_empty() {
        let supported = ctx
            .framework
            .as_deref()
            .is_some_and(|fw| plugin.framework.contains(fw));
        if !supported {
            return Ok(reject(
                alias,
                RejectReason::Framework {
                    supported: plugin.framework,
                },
            ));
        }
    }

    let entry_path = plugin_dir.join(ctx.entry_file());
    let export = if resolver.exists(&entry_path) {
        resolver.load_module(&entry_path)?
    } else {
        ExportValue::Noop
    };
    let directory = entry_path
        .parent()
        .map_or_else(|| plugin_dir.clone(), Path::to_path_buf);

    let dependencies = plugin
        .dependencies
        .iter()
        .chain(entry.dependencies.iter())
        .cloned();
    let node = PluginNode::new(alias, dependencies, export, directory);
    debug!(
        plugin = alias,
        dir = %node.directory.display(),
        deps = ?node.dependencies,
        "plugin loaded"
    );
    Ok(LoadOutcome::Loaded(node))
}
