use crate::edge::GraphEdge;
use crate::error::Result;
use crate::ids::SemanticId;
use crate::node::GraphNode;
use crate::types::EdgeType;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// A predicate over nodes for `Graph::query_nodes` (spec.md §6.1 `queryNodes`).
/// Kept as a small closed enum, matching `EdgeType`'s pattern-matchable shape,
/// rather than an opaque closure, so an out-of-process backend could
/// eventually serialize it across a wire boundary (out of scope here, but the
/// shape is chosen not to foreclose it).
#[derive(Debug, Clone)]
pub enum NodeFilter {
    Kind(crate::types::NodeKind),
    File(String),
    AttrEquals { key: String, value: String },
    And(Vec<NodeFilter>),
}

/// Declared field for server-side indexing (spec.md §6.1 `declareFields`).
#[derive(Debug, Clone)]
pub struct FieldDeclaration {
    pub node_kind: crate::types::NodeKind,
    pub field: String,
}

/// The graph capability the analysis core consumes (spec.md §6.1). Storage
/// backend, wire protocol, and the Datalog evaluator behind `check_guarantee`
/// are out of scope; this trait is the seam `grafema-graph::InMemoryGraph`
/// fills for tests and for `grafema-cli` when no external backend is wired.
#[async_trait]
pub trait Graph: Send + Sync {
    async fn add_node(&self, node: GraphNode) -> Result<()>;
    async fn add_edge(&self, edge: GraphEdge) -> Result<()>;
    async fn get_node(&self, id: &SemanticId) -> Result<Option<GraphNode>>;
    async fn get_outgoing_edges(
        &self,
        id: &SemanticId,
        types_filter: Option<&[EdgeType]>,
    ) -> Result<Vec<GraphEdge>>;
    async fn get_incoming_edges(
        &self,
        id: &SemanticId,
        types_filter: Option<&[EdgeType]>,
    ) -> Result<Vec<GraphEdge>>;
    async fn query_nodes(&self, filter: NodeFilter) -> Result<BoxStream<'static, GraphNode>>;
    async fn count_nodes_by_type(&self) -> Result<std::collections::HashMap<String, u64>>;
    async fn count_edges_by_type(&self) -> Result<std::collections::HashMap<String, u64>>;
    async fn clear(&self) -> Result<()>;
    async fn flush(&self) -> Result<()>;

    /// Deletes every node with `attribute file = file`, plus every edge
    /// touching one of those nodes (spec.md §4.7 step 1, §8.1 invariant 4
    /// `clearFileNodesIfNeeded`). Returns the number of nodes cleared. Not in
    /// spec.md §6.1's operation list verbatim, but required by any backend
    /// that wants to support incremental re-analysis — added here rather
    /// than worked around, since there is no way to express "clear stale
    /// modules" through `addNode`/`addEdge` alone.
    async fn clear_file_nodes(&self, file: &str) -> Result<u64>;

    /// Optional server-side indexing hint. Default no-op.
    async fn declare_fields(&self, _fields: &[FieldDeclaration]) -> Result<()> {
        Ok(())
    }

    /// Optional Datalog guarantee check. Default: "no evaluator available".
    async fn check_guarantee(&self, _rule: &str, _explain: bool) -> Result<Option<String>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_filter_composes() {
        let f = NodeFilter::And(vec![
            NodeFilter::Kind(crate::types::NodeKind::Function),
            NodeFilter::File("a.ts".into()),
        ]);
        match f {
            NodeFilter::And(v) => assert_eq!(v.len(), 2),
            _ => panic!("expected And"),
        }
    }
}
