use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Host languages this engine extracts. Unlike the teacher's multi-language
/// registry, grafema only ever analyses TypeScript/JavaScript repositories
/// (see SPEC_FULL.md §1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    TypeScript,
    Tsx,
    JavaScript,
    Jsx,
}

impl Language {
    pub fn detect(file_path: &str) -> Option<Self> {
        let ext = std::path::Path::new(file_path).extension()?.to_str()?;
        match ext {
            "ts" => Some(Language::TypeScript),
            "tsx" => Some(Language::Tsx),
            "js" | "mjs" | "cjs" => Some(Language::JavaScript),
            "jsx" => Some(Language::Jsx),
            _ => None,
        }
    }

    pub fn is_typescript(&self) -> bool {
        matches!(self, Language::TypeScript | Language::Tsx)
    }

    pub fn is_jsx(&self) -> bool {
        matches!(self, Language::Tsx | Language::Jsx)
    }
}

/// The entity taxonomy from spec.md §3.1. Every `GraphNode` carries one of
/// these as its `kind`; per-kind attributes live in `GraphNode::attributes`
/// (see `node.rs`), the same split the teacher draws between `NodeType` and
/// `Metadata::attributes` in `codegraph-core::node`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Module,
    Function,
    Method,
    Parameter,
    Class,
    Interface,
    TypeAlias,
    Enum,
    Decorator,
    Scope,
    Branch,
    Case,
    Loop,
    TryBlock,
    CatchBlock,
    FinallyBlock,
    Call,
    CallArgument,
    Expression,
    Variable,
    Constant,
    VariableAssignment,
    Literal,
    ObjectLiteral,
    ObjectProperty,
    ArrayLiteral,
    ArrayElement,
    ArrayMutation,
    ObjectMutation,
    ReturnStatement,
    UpdateExpression,
    Import,
    Export,
    Issue,
    GraphMeta,
    Plugin,
}

impl NodeKind {
    /// GraphMeta and Plugin nodes are process-wide (spec.md §3.4) and so are
    /// exempt from invariant 1 (incoming CONTAINS edge) and from per-module
    /// ownership/clearance.
    pub fn is_process_wide(&self) -> bool {
        matches!(self, NodeKind::GraphMeta | NodeKind::Plugin)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The edge catalogue from spec.md §3.2.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeType {
    Contains,
    Calls,
    DependsOn,
    AssignedFrom,
    DerivesFrom,
    FlowsInto,
    Returns,
    PassesArgument,
    HasScope,
    HasBody,
    HasCondition,
    HasConsequent,
    HasAlternate,
    HasCase,
    HasDefault,
    HasCatch,
    HasFinally,
    HasInit,
    HasUpdate,
    HasProperty,
    HasElement,
    IteratesOver,
    Extends,
    Implements,
    InstanceOf,
    Replaces,
    Affects,
    Other(String),
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EdgeType::Contains => "CONTAINS",
            EdgeType::Calls => "CALLS",
            EdgeType::DependsOn => "DEPENDS_ON",
            EdgeType::AssignedFrom => "ASSIGNED_FROM",
            EdgeType::DerivesFrom => "DERIVES_FROM",
            EdgeType::FlowsInto => "FLOWS_INTO",
            EdgeType::Returns => "RETURNS",
            EdgeType::PassesArgument => "PASSES_ARGUMENT",
            EdgeType::HasScope => "HAS_SCOPE",
            EdgeType::HasBody => "HAS_BODY",
            EdgeType::HasCondition => "HAS_CONDITION",
            EdgeType::HasConsequent => "HAS_CONSEQUENT",
            EdgeType::HasAlternate => "HAS_ALTERNATE",
            EdgeType::HasCase => "HAS_CASE",
            EdgeType::HasDefault => "HAS_DEFAULT",
            EdgeType::HasCatch => "HAS_CATCH",
            EdgeType::HasFinally => "HAS_FINALLY",
            EdgeType::HasInit => "HAS_INIT",
            EdgeType::HasUpdate => "HAS_UPDATE",
            EdgeType::HasProperty => "HAS_PROPERTY",
            EdgeType::HasElement => "HAS_ELEMENT",
            EdgeType::IteratesOver => "ITERATES_OVER",
            EdgeType::Extends => "EXTENDS",
            EdgeType::Implements => "IMPLEMENTS",
            EdgeType::InstanceOf => "INSTANCE_OF",
            EdgeType::Replaces => "REPLACES",
            EdgeType::Affects => "AFFECTS",
            EdgeType::Other(s) => s.as_str(),
        };
        write!(f, "{}", s)
    }
}

impl FromStr for EdgeType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "CONTAINS" => EdgeType::Contains,
            "CALLS" => EdgeType::Calls,
            "DEPENDS_ON" => EdgeType::DependsOn,
            "ASSIGNED_FROM" => EdgeType::AssignedFrom,
            "DERIVES_FROM" => EdgeType::DerivesFrom,
            "FLOWS_INTO" => EdgeType::FlowsInto,
            "RETURNS" => EdgeType::Returns,
            "PASSES_ARGUMENT" => EdgeType::PassesArgument,
            "HAS_SCOPE" => EdgeType::HasScope,
            "HAS_BODY" => EdgeType::HasBody,
            "HAS_CONDITION" => EdgeType::HasCondition,
            "HAS_CONSEQUENT" => EdgeType::HasConsequent,
            "HAS_ALTERNATE" => EdgeType::HasAlternate,
            "HAS_CASE" => EdgeType::HasCase,
            "HAS_DEFAULT" => EdgeType::HasDefault,
            "HAS_CATCH" => EdgeType::HasCatch,
            "HAS_FINALLY" => EdgeType::HasFinally,
            "HAS_INIT" => EdgeType::HasInit,
            "HAS_UPDATE" => EdgeType::HasUpdate,
            "HAS_PROPERTY" => EdgeType::HasProperty,
            "HAS_ELEMENT" => EdgeType::HasElement,
            "ITERATES_OVER" => EdgeType::IteratesOver,
            "EXTENDS" => EdgeType::Extends,
            "IMPLEMENTS" => EdgeType::Implements,
            "INSTANCE_OF" => EdgeType::InstanceOf,
            "REPLACES" => EdgeType::Replaces,
            "AFFECTS" => EdgeType::Affects,
            other => EdgeType::Other(other.to_string()),
        })
    }
}

/// Byte-offset span within a file's source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start_byte: u32,
    pub end_byte: u32,
}

/// Line/column location, 1-indexed lines matching tree-sitter + editor
/// convention (tree-sitter rows are 0-indexed; extractors add 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub end_line: Option<u32>,
    pub end_column: Option<u32>,
}

/// Scope variants from spec.md §3.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeKind {
    FunctionBody,
    IfStatement,
    ElseStatement,
    LoopBody,
    SwitchCase,
    TryBlock,
    CatchBlock,
    FinallyBlock,
    Block,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScopeKind::FunctionBody => "function_body",
            ScopeKind::IfStatement => "if_statement",
            ScopeKind::ElseStatement => "else_statement",
            ScopeKind::LoopBody => "loop_body",
            ScopeKind::SwitchCase => "switch-case",
            ScopeKind::TryBlock => "try_block",
            ScopeKind::CatchBlock => "catch_block",
            ScopeKind::FinallyBlock => "finally_block",
            ScopeKind::Block => "block",
        };
        write!(f, "{}", s)
    }
}

/// TypeScript's `importKind` distinction (spec.md §3.1 Import/Export entity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportKind {
    Value,
    Type,
    Typeof,
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ImportKind::Value => "value",
            ImportKind::Type => "type",
            ImportKind::Typeof => "typeof",
        };
        write!(f, "{}", s)
    }
}

/// Resolution status for dynamic property mutations (spec.md §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionStatus {
    Resolved,
    ResolvedConditional,
    UnknownParameter,
    UnknownRuntime,
    DeferredCrossFile,
}

impl fmt::Display for ResolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResolutionStatus::Resolved => "RESOLVED",
            ResolutionStatus::ResolvedConditional => "RESOLVED_CONDITIONAL",
            ResolutionStatus::UnknownParameter => "UNKNOWN_PARAMETER",
            ResolutionStatus::UnknownRuntime => "UNKNOWN_RUNTIME",
            ResolutionStatus::DeferredCrossFile => "DEFERRED_CROSS_FILE",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_language_by_extension() {
        assert_eq!(Language::detect("a/b.ts"), Some(Language::TypeScript));
        assert_eq!(Language::detect("a/b.tsx"), Some(Language::Tsx));
        assert_eq!(Language::detect("a/b.js"), Some(Language::JavaScript));
        assert_eq!(Language::detect("a/b.jsx"), Some(Language::Jsx));
        assert_eq!(Language::detect("a/b.py"), None);
    }

    #[test]
    fn edge_type_round_trips_through_display() {
        for e in [
            EdgeType::Contains,
            EdgeType::HasCondition,
            EdgeType::IteratesOver,
            EdgeType::Other("custom".into()),
        ] {
            let s = e.to_string();
            let parsed = EdgeType::from_str(&s).unwrap();
            assert_eq!(parsed.to_string(), s);
        }
    }
}
