//! Dependency validation and activation ordering.
//!
//! Each plugin gets a depth: 0 without dependencies, otherwise one more than
//! its deepest dependency. Plugins are activated in ascending depth, and
//! plugins of equal depth keep their config order.

use tracing::debug;

use crate::errors::{PluginError, Result};
use crate::graph::PluginGraph;
use crate::models::PluginNode;

/// Walk state of a node during depth computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done(usize),
}

/// Validate dependencies, compute depths and return nodes in activation order.
///
/// # Errors
///
/// - [`PluginError::MissingDependencies`] when a node depends on an alias that
///   was never configured. Nodes are checked from last inserted to first, and
///   the first offender is reported.
/// - [`PluginError::DependencyCycle`] when dependencies form a cycle.
pub fn sort_dependencies(graph: PluginGraph) -> Result<Vec<PluginNode>> {
    check_missing(&graph)?;

    let mut marks = vec![Mark::Unvisited; graph.len()];
    let mut stack = Vec::new();
    let mut depths = Vec::with_capacity(graph.len());
    for i in 0..graph.len() {
        depths.push(depth_of(&graph, i, &mut marks, &mut stack)?);
    }

    let mut nodes = graph.into_nodes();
    for (node, depth) in nodes.iter_mut().zip(depths) {
        node.depth = depth;
    }
    // `sort_by_key` is stable, so equal depths keep config order.
    nodes.sort_by_key(|n| n.depth);

    debug!(
        order = ?nodes.iter().map(|n| n.name.as_str()).collect::<Vec<_>>(),
        "plugin order resolved"
    );
    Ok(nodes)
}

fn check_missing(graph: &PluginGraph) -> Result<()> {
    for node in graph.nodes().iter().rev() {
        let missing: Vec<String> = node
            .dependencies
            .iter()
            .filter(|dep| !graph.is_configured(dep))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(PluginError::MissingDependencies {
                alias: node.name.clone(),
                missing,
            });
        }
    }
    Ok(())
}

/// Memoized depth of the node at position `i`.
///
/// Dependencies that were configured but not accepted count as depth 0.
fn depth_of(
    graph: &PluginGraph,
    i: usize,
    marks: &mut [Mark],
    stack: &mut Vec<usize>,
) -> Result<usize> {
    match marks[i] {
        Mark::Done(depth) => return Ok(depth),
        Mark::OnStack => {
            let start = stack.iter().position(|&k| k == i).unwrap_or(0);
            let nodes = graph.nodes();
            let cycle = stack[start..]
                .iter()
                .chain(std::iter::once(&i))
                .map(|&k| nodes[k].name.clone())
                .collect();
            return Err(PluginError::DependencyCycle { cycle });
        }
        Mark::Unvisited => {}
    }

    marks[i] = Mark::OnStack;
    stack.push(i);
    let mut depth = 0;
    for dep in &graph.nodes()[i].dependencies {
        let below = match graph.position(dep) {
            Some(j) => depth_of(graph, j, marks, stack)?,
            None => 0,
        };
        depth = depth.max(below + 1);
    }
    stack.pop();
    marks[i] = Mark::Done(depth);
    Ok(depth)
}
