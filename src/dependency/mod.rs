//! Dependency edges and the dependency forest

mod edges;
mod forest;

use anyhow::Result;
use tracing::info;

use crate::model::DatabaseModel;

pub use edges::{collect_edges, DependencyEdge, DependencyEndpoint, SchemaObjectRef};
pub use forest::{build_forest, DependencyForest, ForestNode};

/// Collect the edges of an annotated model and build its forest
pub fn build_dependency_forest(model: &DatabaseModel) -> Result<DependencyForest> {
    let edges = collect_edges(model);
    let forest = build_forest(&edges)?;
    info!(
        "Built dependency forest: {} edges, {} roots, {} nodes",
        edges.len(),
        forest.roots.len(),
        forest.node_count()
    );
    Ok(forest)
}
