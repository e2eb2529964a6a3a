//! An in-process `Graph` implementation backed by `DashMap`s (spec.md §6.1:
//! the capability this trait's consumer needs; the concrete storage
//! backend/wire protocol behind it is out of scope). Grounded on the
//! teacher's `codegraph-graph::nodes`/`graph` cache shape — an
//! `Arc<DashMap<..>>` per index — generalized from a read-through cache in
//! front of RocksDB into the sole store, since no persistent backend is in
//! scope here.

use dashmap::DashMap;
use grafema_core::edge::GraphEdge;
use grafema_core::error::Result;
use grafema_core::ids::SemanticId;
use grafema_core::node::GraphNode;
use grafema_core::traits::{FieldDeclaration, Graph, NodeFilter};
use grafema_core::types::EdgeType;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};

#[derive(Default)]
pub struct InMemoryGraph {
    nodes: Arc<DashMap<SemanticId, GraphNode>>,
    outgoing: Arc<DashMap<SemanticId, Vec<GraphEdge>>>,
    incoming: Arc<DashMap<SemanticId, Vec<GraphEdge>>>,
    /// `(src, dst, type)` identity set, used to dedupe `add_edge` writes
    /// (spec.md §6.1 invariant: no duplicate edges).
    edge_identities: Arc<DashMap<(String, String, String), ()>>,
}

impl InMemoryGraph {
    pub fn new() -> Self {
        InMemoryGraph::default()
    }

    fn matches(node: &GraphNode, filter: &NodeFilter) -> bool {
        match filter {
            NodeFilter::Kind(kind) => node.kind == *kind,
            NodeFilter::File(file) => &node.file == file,
            NodeFilter::AttrEquals { key, value } => node
                .attr(key)
                .and_then(|v| v.as_str())
                .map(|s| s == value)
                .unwrap_or(false),
            NodeFilter::And(filters) => filters.iter().all(|f| Self::matches(node, f)),
        }
    }
}

#[async_trait]
impl Graph for InMemoryGraph {
    async fn add_node(&self, node: GraphNode) -> Result<()> {
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    async fn add_edge(&self, edge: GraphEdge) -> Result<()> {
        let key = edge.identity_key();
        if self.edge_identities.contains_key(&key) {
            return Ok(());
        }
        self.edge_identities.insert(key, ());
        self.outgoing
            .entry(edge.src.clone())
            .or_default()
            .push(edge.clone());
        self.incoming.entry(edge.dst.clone()).or_default().push(edge);
        Ok(())
    }

    async fn get_node(&self, id: &SemanticId) -> Result<Option<GraphNode>> {
        Ok(self.nodes.get(id).map(|r| r.value().clone()))
    }

    async fn get_outgoing_edges(
        &self,
        id: &SemanticId,
        types_filter: Option<&[EdgeType]>,
    ) -> Result<Vec<GraphEdge>> {
        let edges = self
            .outgoing
            .get(id)
            .map(|r| r.value().clone())
            .unwrap_or_default();
        Ok(filter_by_type(edges, types_filter))
    }

    async fn get_incoming_edges(
        &self,
        id: &SemanticId,
        types_filter: Option<&[EdgeType]>,
    ) -> Result<Vec<GraphEdge>> {
        let edges = self
            .incoming
            .get(id)
            .map(|r| r.value().clone())
            .unwrap_or_default();
        Ok(filter_by_type(edges, types_filter))
    }

    async fn query_nodes(&self, filter: NodeFilter) -> Result<BoxStream<'static, GraphNode>> {
        let matched: Vec<GraphNode> = self
            .nodes
            .iter()
            .filter(|entry| Self::matches(entry.value(), &filter))
            .map(|entry| entry.value().clone())
            .collect();
        Ok(stream::iter(matched).boxed())
    }

    async fn count_nodes_by_type(&self) -> Result<HashMap<String, u64>> {
        let mut counts = HashMap::new();
        for entry in self.nodes.iter() {
            *counts.entry(entry.value().kind.to_string()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn count_edges_by_type(&self) -> Result<HashMap<String, u64>> {
        let mut counts = HashMap::new();
        for entry in self.outgoing.iter() {
            for edge in entry.value() {
                *counts.entry(edge.edge_type.to_string()).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    async fn clear(&self) -> Result<()> {
        self.nodes.clear();
        self.outgoing.clear();
        self.incoming.clear();
        self.edge_identities.clear();
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        Ok(())
    }

    async fn clear_file_nodes(&self, file: &str) -> Result<u64> {
        let doomed: Vec<SemanticId> = self
            .nodes
            .iter()
            .filter(|entry| entry.value().file == file)
            .map(|entry| entry.key().clone())
            .collect();

        for id in &doomed {
            self.nodes.remove(id);
            if let Some((_, edges)) = self.outgoing.remove(id) {
                for edge in edges {
                    self.edge_identities.remove(&edge.identity_key());
                }
            }
            if let Some((_, edges)) = self.incoming.remove(id) {
                for edge in edges {
                    self.edge_identities.remove(&edge.identity_key());
                }
            }
        }

        let doomed_set: std::collections::HashSet<&SemanticId> = doomed.iter().collect();
        for mut entry in self.outgoing.iter_mut() {
            entry
                .value_mut()
                .retain(|e| !doomed_set.contains(&e.dst) && !doomed_set.contains(&e.src));
        }
        for mut entry in self.incoming.iter_mut() {
            entry
                .value_mut()
                .retain(|e| !doomed_set.contains(&e.dst) && !doomed_set.contains(&e.src));
        }

        Ok(doomed.len() as u64)
    }

    async fn declare_fields(&self, _fields: &[FieldDeclaration]) -> Result<()> {
        Ok(())
    }
}

fn filter_by_type(edges: Vec<GraphEdge>, types_filter: Option<&[EdgeType]>) -> Vec<GraphEdge> {
    match types_filter {
        Some(types) => edges
            .into_iter()
            .filter(|e| types.contains(&e.edge_type))
            .collect(),
        None => edges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grafema_core::node::NodeFactory;
    use grafema_core::types::{Location, NodeKind};

    fn loc() -> Location {
        Location {
            file: "a.ts".into(),
            line: 1,
            column: 0,
            end_line: None,
            end_column: None,
        }
    }

    #[tokio::test]
    async fn add_node_and_get_node_round_trips() {
        let graph = InMemoryGraph::new();
        let id = SemanticId::new("a.ts::fn:foo");
        let node = NodeFactory::function(id.clone(), "a.ts", "foo", loc(), false, false);
        graph.add_node(node).await.unwrap();
        let fetched = graph.get_node(&id).await.unwrap().unwrap();
        assert_eq!(fetched.kind, NodeKind::Function);
    }

    #[tokio::test]
    async fn add_edge_deduplicates_identical_triples() {
        let graph = InMemoryGraph::new();
        let a = SemanticId::new("a");
        let b = SemanticId::new("b");
        graph
            .add_edge(GraphEdge::new(a.clone(), b.clone(), EdgeType::Contains))
            .await
            .unwrap();
        graph
            .add_edge(GraphEdge::new(a.clone(), b.clone(), EdgeType::Contains))
            .await
            .unwrap();
        let out = graph.get_outgoing_edges(&a, None).await.unwrap();
        assert_eq!(out.len(), 1);
    }

    #[tokio::test]
    async fn clear_file_nodes_removes_node_and_touching_edges() {
        let graph = InMemoryGraph::new();
        let a = SemanticId::new("a.ts::fn:a");
        let b = SemanticId::new("b.ts::fn:b");
        graph
            .add_node(NodeFactory::function(a.clone(), "a.ts", "a", loc(), false, false))
            .await
            .unwrap();
        let mut other_loc = loc();
        other_loc.file = "b.ts".into();
        graph
            .add_node(NodeFactory::function(b.clone(), "b.ts", "b", other_loc, false, false))
            .await
            .unwrap();
        graph
            .add_edge(GraphEdge::new(a.clone(), b.clone(), EdgeType::Calls))
            .await
            .unwrap();

        let cleared = graph.clear_file_nodes("a.ts").await.unwrap();
        assert_eq!(cleared, 1);
        assert!(graph.get_node(&a).await.unwrap().is_none());
        assert!(graph.get_node(&b).await.unwrap().is_some());
        assert!(graph.get_incoming_edges(&b, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn query_nodes_filters_by_kind() {
        let graph = InMemoryGraph::new();
        graph
            .add_node(NodeFactory::function(
                SemanticId::new("fn1"),
                "a.ts",
                "fn1",
                loc(),
                false,
                false,
            ))
            .await
            .unwrap();
        graph
            .add_node(NodeFactory::variable(
                SemanticId::new("v1"),
                "a.ts",
                "v1",
                loc(),
                true,
            ))
            .await
            .unwrap();

        let mut stream = graph
            .query_nodes(NodeFilter::Kind(NodeKind::Function))
            .await
            .unwrap();
        let mut count = 0;
        while stream.next().await.is_some() {
            count += 1;
        }
        assert_eq!(count, 1);
    }
}
