//! Dependency forest rooted at layers and services

use anyhow::Result;
use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::Serialize;

use super::{DependencyEdge, DependencyEndpoint};
use crate::error::AutodocError;

/// One node of the forest; children are keyed by object id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForestNode {
    pub attr: DependencyEndpoint,
    pub children: IndexMap<String, ForestNode>,
}

impl ForestNode {
    fn leaf(attr: DependencyEndpoint) -> Self {
        Self {
            attr,
            children: IndexMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        self.attr.id()
    }

    pub fn child(&self, id: &str) -> Option<&ForestNode> {
        self.children.get(id)
    }

    /// This node plus all its descendants
    pub fn node_count(&self) -> usize {
        1 + self.children.values().map(ForestNode::node_count).sum::<usize>()
    }

    fn insert_child(&mut self, child: ForestNode) -> Result<()> {
        match self.children.entry(child.id().to_string()) {
            Entry::Occupied(_) => Err(AutodocError::DuplicateChild {
                parent: self.id().to_string(),
                child: child.id().to_string(),
            }
            .into()),
            Entry::Vacant(slot) => {
                slot.insert(child);
                Ok(())
            }
        }
    }
}

/// All dependency trees of one database, keyed by root id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyForest {
    pub roots: IndexMap<String, ForestNode>,
}

impl DependencyForest {
    pub fn root(&self, id: &str) -> Option<&ForestNode> {
        self.roots.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.roots.values().map(ForestNode::node_count).sum()
    }
}

/// Build the forest from the complete edge set.
///
/// Every edge whose source is a layer or service contributes a root; each
/// target is expanded transitively through the edges leaving it. Targets
/// with an error stay leaves. Fails when an id repeats along one path or
/// when a parent would receive the same child twice.
pub fn build_forest(edges: &[DependencyEdge]) -> Result<DependencyForest> {
    let mut forest = DependencyForest::default();

    for edge in edges
        .iter()
        .filter(|e| e.source.object.object_type.is_external())
    {
        let root_id = edge.source.id().to_string();
        let mut path = vec![root_id.clone()];
        let child = expand(edges, &edge.target, &mut path)?;

        let root = forest
            .roots
            .entry(root_id)
            .or_insert_with(|| ForestNode::leaf(edge.source.clone()));
        root.insert_child(child)?;
    }

    Ok(forest)
}

/// Build the subtree below `endpoint`. `path` holds the ids from the root
/// down to the parent and is restored before returning.
fn expand(
    edges: &[DependencyEdge],
    endpoint: &DependencyEndpoint,
    path: &mut Vec<String>,
) -> Result<ForestNode> {
    let id = endpoint.id();
    if path.iter().any(|p| p == id) {
        let mut chain = path.clone();
        chain.push(id.to_string());
        return Err(AutodocError::CyclicDependency {
            id: id.to_string(),
            chain: chain.join(" -> "),
        }
        .into());
    }

    let mut node = ForestNode::leaf(endpoint.clone());
    if endpoint.error.is_some() {
        return Ok(node);
    }

    path.push(id.to_string());
    for edge in edges.iter().filter(|e| e.source.id() == id) {
        let child = expand(edges, &edge.target, path)?;
        node.insert_child(child)?;
    }
    path.pop();

    Ok(node)
}
