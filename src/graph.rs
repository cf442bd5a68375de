use std::collections::{HashMap, HashSet};

use crate::models::PluginNode;

/// Accepted plugins keyed by alias, plus every alias that was configured.
///
/// Nodes keep the order in which they were inserted, which is the config
/// document order when built by [`crate::analyze_plugins`].
#[derive(Debug, Clone, Default)]
pub struct PluginGraph {
    nodes: Vec<PluginNode>,
    index: HashMap<String, usize>,
    configured: HashSet<String>,
}

impl PluginGraph {
    /// An empty graph for the given configured aliases.
    pub fn new<I, S>(configured: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            configured: configured.into_iter().map(Into::into).collect(),
        }
    }

    /// Add an accepted node. A node with the same name replaces the old one in place.
    pub fn insert(&mut self, node: PluginNode) {
        match self.index.get(&node.name) {
            Some(&i) => self.nodes[i] = node,
            None => {
                self.index.insert(node.name.clone(), self.nodes.len());
                self.nodes.push(node);
            }
        }
    }

    #[must_use]
    pub fn get(&self, alias: &str) -> Option<&PluginNode> {
        self.index.get(alias).map(|&i| &self.nodes[i])
    }

    /// Whether `alias` appeared in the config, accepted or not.
    #[must_use]
    pub fn is_configured(&self, alias: &str) -> bool {
        self.configured.contains(alias)
    }

    /// Accepted nodes in insertion order.
    #[must_use]
    pub fn nodes(&self) -> &[PluginNode] {
        &self.nodes
    }

    /// Position of an accepted node in insertion order.
    pub(crate) fn position(&self, alias: &str) -> Option<usize> {
        self.index.get(alias).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn into_nodes(self) -> Vec<PluginNode> {
        self.nodes
    }
}
