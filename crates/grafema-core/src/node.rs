use crate::ids::SemanticId;
use crate::types::{Location, NodeKind, Span};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A typed attribute value. Kept as a small closed enum (rather than raw
/// JSON) so enrichers can pattern-match without re-parsing, while still
/// round-tripping through the graph capability's serialization boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    StringList(Vec<String>),
    Null,
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::String(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::String(s)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<i64> for AttrValue {
    fn from(n: i64) -> Self {
        AttrValue::Int(n)
    }
}

impl From<u32> for AttrValue {
    fn from(n: u32) -> Self {
        AttrValue::Int(n as i64)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(list: Vec<String>) -> Self {
        AttrValue::StringList(list)
    }
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_string_list(&self) -> Option<&[String]> {
        match self {
            AttrValue::StringList(list) => Some(list),
            _ => None,
        }
    }
}

/// The uniform envelope every node kind is wrapped in (SPEC_FULL.md §3).
/// Per-kind shape lives in `attributes`; `NodeFactory` below provides typed
/// builders so call sites don't hand-assemble attribute maps for the common
/// entity kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: SemanticId,
    pub kind: NodeKind,
    pub file: String,
    pub location: Location,
    pub span: Option<Span>,
    pub attributes: BTreeMap<String, AttrValue>,
}

impl GraphNode {
    pub fn new(id: SemanticId, kind: NodeKind, file: impl Into<String>, location: Location) -> Self {
        GraphNode {
            id,
            kind,
            file: file.into(),
            location,
            span: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }
}

/// Typed constructors for the recurring node shapes, so extractors build
/// nodes by naming the domain concept rather than stringly-typed attribute
/// maps scattered across the parser crate.
pub struct NodeFactory;

impl NodeFactory {
    pub fn module(id: SemanticId, file: &str, content_hash: &str) -> GraphNode {
        GraphNode::new(
            id,
            NodeKind::Module,
            file,
            Location {
                file: file.to_string(),
                line: 1,
                column: 0,
                end_line: None,
                end_column: None,
            },
        )
        .with_attr("content_hash", content_hash)
    }

    pub fn function(
        id: SemanticId,
        file: &str,
        name: &str,
        location: Location,
        is_async: bool,
        is_arrow: bool,
    ) -> GraphNode {
        GraphNode::new(id, NodeKind::Function, file, location)
            .with_attr("name", name)
            .with_attr("is_async", is_async)
            .with_attr("is_arrow", is_arrow)
    }

    pub fn variable(
        id: SemanticId,
        file: &str,
        name: &str,
        location: Location,
        is_const: bool,
    ) -> GraphNode {
        GraphNode::new(id, NodeKind::Variable, file, location)
            .with_attr("name", name)
            .with_attr("is_const", is_const)
    }

    pub fn call(id: SemanticId, file: &str, callee: &str, location: Location) -> GraphNode {
        GraphNode::new(id, NodeKind::Call, file, location).with_attr("callee", callee)
    }

    pub fn issue(
        id: SemanticId,
        file: &str,
        location: Location,
        code: &str,
        severity: &str,
        message: &str,
    ) -> GraphNode {
        GraphNode::new(id, NodeKind::Issue, file, location)
            .with_attr("code", code)
            .with_attr("severity", severity)
            .with_attr("message", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> Location {
        Location {
            file: "a.ts".into(),
            line: 1,
            column: 0,
            end_line: None,
            end_column: None,
        }
    }

    #[test]
    fn builder_sets_requested_attrs() {
        let node = NodeFactory::function(
            SemanticId::new("a.ts::fn:foo"),
            "a.ts",
            "foo",
            loc(),
            true,
            false,
        );
        assert_eq!(node.attr("name").unwrap().as_str(), Some("foo"));
        assert_eq!(node.attr("is_async").unwrap().as_bool(), Some(true));
    }
}
