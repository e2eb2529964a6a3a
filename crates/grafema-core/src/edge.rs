use crate::ids::SemanticId;
use crate::node::AttrValue;
use crate::types::EdgeType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A directed relationship between two nodes (spec.md §3.2). Cyclic
/// references (e.g. mutual recursion) are modeled as two separate directed
/// edges rather than a live pointer graph (SPEC_FULL.md §9 design note).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    pub src: SemanticId,
    pub dst: SemanticId,
    pub edge_type: EdgeType,
    pub metadata: BTreeMap<String, AttrValue>,
}

impl GraphEdge {
    pub fn new(src: SemanticId, dst: SemanticId, edge_type: EdgeType) -> Self {
        GraphEdge {
            src,
            dst,
            edge_type,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The `(src, dst, type)` triple `Graph::add_edge` deduplicates on
    /// (spec.md §6.1, invariant-adjacent: no duplicate edges).
    pub fn identity_key(&self) -> (String, String, String) {
        (
            self.src.as_str().to_string(),
            self.dst.as_str().to_string(),
            self.edge_type.to_string(),
        )
    }
}
