//! The plugin contract (spec.md §6.2), implemented field-for-field. Unlike
//! the teacher, which hardcodes its pipeline stages in code, grafema has no
//! built-in notion of "the extractor" or "the enricher" at the engine layer —
//! everything the orchestrator runs is a `Plugin`, including the ones this
//! workspace ships (SPEC_FULL.md §9 design note: tagged records behind one
//! trait, not an inheritance hierarchy).

use crate::edge::GraphEdge;
use crate::error::Result;
use crate::node::GraphNode;
use crate::traits::{FieldDeclaration, Graph};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Phase a plugin participates in (spec.md §6.2). Orchestrator order is
/// fixed: DISCOVERY → INDEXING → ANALYSIS → ENRICHMENT → (GUARANTEES) →
/// VALIDATION → FLUSH (spec.md §4.8); `Guarantees` and `Flush` are internal
/// engine stages not open to third-party plugins, so they are intentionally
/// absent from this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PluginPhase {
    Discovery,
    Indexing,
    Analysis,
    Enrichment,
    Validation,
}

/// What a plugin declares it creates, used for dependency-ordering
/// diagnostics and documentation; not enforced mechanically.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Creates {
    pub nodes: Vec<String>,
    pub edges: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginMetadata {
    pub name: String,
    pub phase: PluginPhase,
    /// Higher runs earlier within the same phase (spec.md §6.2).
    pub priority: i32,
    pub dependencies: Vec<String>,
    pub creates: Creates,
    pub fields: Vec<FieldDeclaration>,
}

impl PluginMetadata {
    pub fn new(name: impl Into<String>, phase: PluginPhase) -> Self {
        PluginMetadata {
            name: name.into(),
            phase,
            priority: 0,
            dependencies: Vec::new(),
            creates: Creates::default(),
            fields: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_dependencies(mut self, deps: Vec<String>) -> Self {
        self.dependencies = deps;
        self
    }
}

/// `ctx.reportIssue` (spec.md §6.2) is supplied only during VALIDATION; it is
/// represented as an `Option` populated by the orchestrator for that phase
/// rather than a capability every plugin must no-op implement.
pub type IssueReporter = Arc<dyn Fn(GraphNode) + Send + Sync>;

/// Everything a plugin's `execute` needs (spec.md §6.2). `config` is the
/// slice of `.grafema/config.yaml` relevant to this plugin, already resolved
/// by the engine.
#[derive(Clone)]
pub struct PluginContext {
    pub graph: Arc<dyn Graph>,
    pub manifest_path: std::path::PathBuf,
    pub project_path: std::path::PathBuf,
    pub config: serde_yaml::Value,
    pub force_analysis: bool,
    pub strict_mode: bool,
    pub report_issue: Option<IssueReporter>,
}

impl PluginContext {
    pub fn config_str(&self, key: &str) -> Option<String> {
        self.config
            .get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }
}

/// What a plugin hands back to the orchestrator (spec.md §6.2). `success =
/// false` without a `fatal`-severity entry in `errors` is absorbed by the
/// `DiagnosticCollector`; the run continues (spec.md §7).
#[derive(Debug, Default)]
pub struct PluginResult {
    pub success: bool,
    pub created_nodes: Vec<GraphNode>,
    pub created_edges: Vec<GraphEdge>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub metadata: Option<serde_json::Value>,
}

impl PluginResult {
    pub fn ok() -> Self {
        PluginResult {
            success: true,
            ..Default::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        PluginResult {
            success: false,
            errors: vec![error.into()],
            ..Default::default()
        }
    }
}

#[async_trait]
pub trait Plugin: Send + Sync {
    fn metadata(&self) -> &PluginMetadata;
    async fn execute(&self, ctx: &PluginContext) -> Result<PluginResult>;
}
