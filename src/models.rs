use std::fmt;
use std::path::PathBuf;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// A list of strings that also accepts a single string or `null` when parsed.
///
/// Used for `env`, `agent`, `framework` and `dependencies`, which plugin
/// authors write either as `"prod"` or as `["prod", "test"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StringList(Vec<String>);

/// Accepted input shapes for [`StringList`].
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl<'de> Deserialize<'de> for StringList {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
            None => StringList::default(),
            Some(OneOrMany::One(s)) => StringList(vec![s]),
            Some(OneOrMany::Many(v)) => StringList(v),
        })
    }
}

impl StringList {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|v| v == value)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for StringList {
    fn from(v: Vec<String>) -> Self {
        StringList(v)
    }
}

impl<S: Into<String>> FromIterator<S> for StringList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        StringList(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a StringList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for StringList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

fn default_enable() -> bool {
    true
}

/// An explicit `enable: null` disables the plugin; an absent key enables it.
fn deserialize_enable<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// One entry of the plugin configuration map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginConfigEntry {
    #[serde(default = "default_enable", deserialize_with = "deserialize_enable")]
    pub enable: bool,

    /// Environments the plugin runs in. Empty means every environment.
    #[serde(default)]
    pub env: StringList,

    /// Agent roles the plugin runs in when the host is an agent process.
    #[serde(default)]
    pub agent: StringList,

    /// Installed package name, looked up from the working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,

    /// Plugin directory, relative to the base directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Extra dependencies on top of the ones the manifest declares.
    #[serde(default)]
    pub dependencies: StringList,
}

impl Default for PluginConfigEntry {
    fn default() -> Self {
        Self {
            enable: true,
            env: StringList::default(),
            agent: StringList::default(),
            package: None,
            path: None,
            dependencies: StringList::default(),
        }
    }
}

impl PluginConfigEntry {
    /// An enabled entry pointing at a plugin directory.
    #[must_use]
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// An enabled entry pointing at an installed package.
    #[must_use]
    pub fn with_package(package: impl Into<String>) -> Self {
        Self {
            package: Some(package.into()),
            ..Self::default()
        }
    }
}

/// The plugin configuration map: alias to entry, in document order.
///
/// Order matters: it is the tie-break order of the final activation list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginConfig {
    entries: Vec<(String, PluginConfigEntry)>,
}

impl PluginConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. Re-inserting an alias replaces it in place.
    pub fn insert(&mut self, alias: impl Into<String>, entry: PluginConfigEntry) {
        let alias = alias.into();
        match self.entries.iter_mut().find(|(a, _)| *a == alias) {
            Some(slot) => slot.1 = entry,
            None => self.entries.push((alias, entry)),
        }
    }

    #[must_use]
    pub fn get(&self, alias: &str) -> Option<&PluginConfigEntry> {
        self.entries
            .iter()
            .find(|(a, _)| a == alias)
            .map(|(_, e)| e)
    }

    #[must_use]
    pub fn contains(&self, alias: &str) -> bool {
        self.get(alias).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PluginConfigEntry)> {
        self.entries.iter().map(|(a, e)| (a.as_str(), e))
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(a, _)| a.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, PluginConfigEntry)> for PluginConfig {
    fn from_iter<I: IntoIterator<Item = (S, PluginConfigEntry)>>(iter: I) -> Self {
        let mut config = PluginConfig::new();
        for (alias, entry) in iter {
            config.insert(alias, entry);
        }
        config
    }
}

struct PluginConfigVisitor;

impl<'de> Visitor<'de> for PluginConfigVisitor {
    type Value = PluginConfig;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of plugin aliases to plugin entries")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut config = PluginConfig::new();
        while let Some((alias, entry)) = map.next_entry::<String, PluginConfigEntry>()? {
            config.insert(alias, entry);
        }
        Ok(config)
    }
}

impl<'de> Deserialize<'de> for PluginConfig {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(PluginConfigVisitor)
    }
}

/// The parts of a `package.json` this crate reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PluginManifest {
    #[serde(default)]
    pub plugin: Option<PluginSection>,
}

/// The `plugin` section of a manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PluginSection {
    /// Kept as raw JSON so a non-string name is reported as a mismatch.
    #[serde(default)]
    pub name: Option<serde_json::Value>,
    /// Frameworks the plugin supports. Empty means any.
    #[serde(default)]
    pub framework: StringList,
    #[serde(default)]
    pub dependencies: StringList,
}

impl PluginSection {
    /// `plugin.name` when it is a string.
    #[must_use]
    pub fn name_str(&self) -> Option<&str> {
        self.name.as_ref().and_then(serde_json::Value::as_str)
    }

    /// `plugin.name` as written, for error messages.
    #[must_use]
    pub fn name_display(&self) -> Option<String> {
        match &self.name {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }
}

/// The value a plugin's entry-point file exports.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ExportValue {
    /// No entry-point file exists for the current role.
    Noop,
    /// A parsed module (JSON, YAML or extensionless).
    Value(serde_json::Value),
    /// Raw contents of a file with an unrecognized extension.
    Bytes(Vec<u8>),
}

impl ExportValue {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        matches!(self, ExportValue::Noop)
    }
}

/// A resolved plugin, ready for activation by the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginNode {
    pub name: String,
    /// Manifest dependencies followed by config dependencies, without repeats.
    pub dependencies: Vec<String>,
    pub export: ExportValue,
    /// Directory containing the entry-point file.
    pub directory: PathBuf,
    /// Longest dependency chain below this plugin; set by the sorter.
    pub depth: usize,
}

impl PluginNode {
    pub fn new<I, S>(
        name: impl Into<String>,
        dependencies: I,
        export: ExportValue,
        directory: impl Into<PathBuf>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut deps: Vec<String> = Vec::new();
        for dep in dependencies {
            let dep = dep.into();
            if !deps.contains(&dep) {
                deps.push(dep);
            }
        }
        Self {
            name: name.into(),
            dependencies: deps,
            export,
            directory: directory.into(),
            depth: 0,
        }
    }
}
