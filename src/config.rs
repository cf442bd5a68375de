//! Reading the plugin map from a JSON or YAML document.

use std::path::Path;

use crate::errors::{PluginError, Result};
use crate::models::PluginConfig;

/// Parse a plugin map from a JSON string.
pub fn parse_json_config(content: &str) -> Result<PluginConfig> {
    serde_json::from_str(content).map_err(|e| PluginError::Config {
        message: format!("invalid JSON plugin config: {e}"),
    })
}

/// Parse a plugin map from a YAML string.
pub fn parse_yaml_config(content: &str) -> Result<PluginConfig> {
    serde_yaml_ng::from_str(content).map_err(|e| PluginError::Config {
        message: format!("invalid YAML plugin config: {e}"),
    })
}

/// Read a plugin map from disk. `.yaml`/`.yml` files are YAML, anything else JSON.
pub fn load_plugin_config(path: &Path) -> Result<PluginConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PluginError::Config {
        message: format!("cannot read {}: {e}", path.display()),
    })?;
    let is_yaml = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
    if is_yaml {
        parse_yaml_config(&content)
    } else {
        parse_json_config(&content)
    }
}
