pub mod config;
pub mod context;
pub mod errors;
pub(crate) mod fs_util;
pub mod graph;
pub mod loader;
pub mod models;
pub mod resolver;
pub mod sorter;

// Re-export key types at crate root for convenience.
pub use config::{load_plugin_config, parse_json_config, parse_yaml_config};
pub use context::ResolveContext;
pub use errors::{ErrorKind, PluginError, Result};
pub use fs_util::{MANIFEST_FILE, PACKAGES_DIR};
pub use graph::PluginGraph;
pub use loader::{resolve_plugin, LoadOutcome, RejectReason, Rejection};
pub use models::{
    ExportValue, PluginConfig, PluginConfigEntry, PluginManifest, PluginNode, PluginSection,
    StringList,
};
pub use resolver::{closest_module_dir, load_file, FsModuleResolver, ModuleResolver};
pub use sorter::sort_dependencies;

/// Alias that names the host application itself and can never be a plugin.
pub const RESERVED_ALIAS: &str = "project";

/// Resolve a plugin map into activation order using the filesystem.
///
/// See [`analyze_plugins_with`] for the details.
pub fn analyze_plugins(config: &PluginConfig, ctx: &ResolveContext) -> Result<Vec<PluginNode>> {
    analyze_plugins_with(config, ctx, &FsModuleResolver).map(|(nodes, _)| nodes)
}

/// Like [`analyze_plugins`], also returning the plugins that were rejected.
pub fn analyze_plugins_verbose(
    config: &PluginConfig,
    ctx: &ResolveContext,
) -> Result<(Vec<PluginNode>, Vec<Rejection>)> {
    analyze_plugins_with(config, ctx, &FsModuleResolver)
}

/// Resolve a plugin map into activation order with a custom resolver.
///
/// Entries are resolved one by one in config order. Rejected entries are
/// logged and left out; any error aborts the whole pass. The accepted
/// plugins are then checked for missing or cyclic dependencies and sorted
/// by depth, shallowest first.
pub fn analyze_plugins_with(
    config: &PluginConfig,
    ctx: &ResolveContext,
    resolver: &dyn ModuleResolver,
) -> Result<(Vec<PluginNode>, Vec<Rejection>)> {
    if config.contains(RESERVED_ALIAS) {
        return Err(PluginError::ReservedAlias);
    }

    let mut graph = PluginGraph::new(config.aliases());
    let mut rejections = Vec::new();
    for (alias, entry) in config.iter() {
        match resolve_plugin(alias, entry, ctx, resolver)? {
            LoadOutcome::Loaded(node) => graph.insert(node),
            LoadOutcome::Rejected(rejection) => rejections.push(rejection),
        }
    }

    let nodes = sort_dependencies(graph)?;
    Ok((nodes, rejections))
}
