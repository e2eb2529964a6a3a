//! GuaranteeChecker (spec.md §4.9): runs between ENRICHMENT and VALIDATION.
//! "Declared guarantees" are named Datalog rules plus severity in spec.md;
//! the Datalog evaluator is an out-of-scope collaborator here
//! (SPEC_FULL.md §4.9), so built-in rules are plain Rust closures over the
//! graph capability, each carrying an `as_datalog_sketch` hook a real
//! Datalog integration could call in their place later.

use crate::diagnostics::{Diagnostic, Severity};
use async_trait::async_trait;
use futures::stream::StreamExt;
use grafema_core::plugin::PluginPhase;
use grafema_core::traits::{Graph, NodeFilter};
use grafema_core::types::{EdgeType, NodeKind};
use grafema_core::Result;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuaranteeSeverity {
    Error,
    Warning,
}

#[async_trait]
pub trait GuaranteeRule: Send + Sync {
    fn name(&self) -> &str;
    fn severity(&self) -> GuaranteeSeverity;
    /// `NodeKind`s this rule's violations depend on; `check_selective`'s
    /// default implementation skips the rule entirely unless the changed
    /// set intersects this list.
    fn relevant_kinds(&self) -> &[NodeKind];
    async fn check_all(&self, graph: &Arc<dyn Graph>) -> Result<Vec<String>>;
    async fn check_selective(
        &self,
        graph: &Arc<dyn Graph>,
        changed: &HashSet<NodeKind>,
    ) -> Result<Vec<String>> {
        if self.relevant_kinds().iter().any(|k| changed.contains(k)) {
            self.check_all(graph).await
        } else {
            Ok(Vec::new())
        }
    }
    fn as_datalog_sketch(&self) -> Option<&str> {
        None
    }
}

/// `core.contains-reachability` (spec.md §3.3 invariant 1 / §8.1 invariant
/// 4's counterpart): every node not exempted by `NodeKind::is_process_wide`
/// must have an incoming CONTAINS edge.
pub struct ContainsReachabilityRule {
    relevant: Vec<NodeKind>,
}

impl ContainsReachabilityRule {
    pub fn new() -> Self {
        ContainsReachabilityRule {
            relevant: vec![NodeKind::Module, NodeKind::Function, NodeKind::Variable],
        }
    }
}

impl Default for ContainsReachabilityRule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GuaranteeRule for ContainsReachabilityRule {
    fn name(&self) -> &str {
        "core.contains-reachability"
    }

    fn severity(&self) -> GuaranteeSeverity {
        GuaranteeSeverity::Error
    }

    fn relevant_kinds(&self) -> &[NodeKind] {
        &self.relevant
    }

    async fn check_all(&self, graph: &Arc<dyn Graph>) -> Result<Vec<String>> {
        let mut violations = Vec::new();
        let mut nodes = graph
            .query_nodes(NodeFilter::And(vec![]))
            .await
            .unwrap_or_else(|_| futures::stream::empty().boxed());
        // `NodeFilter::And(vec![])` matches everything (vacuous conjunction);
        // falls back to an empty stream only if the backend rejects it.
        while let Some(node) = nodes.next().await {
            if node.kind.is_process_wide() || node.kind == NodeKind::Module {
                continue;
            }
            let incoming = graph
                .get_incoming_edges(&node.id, Some(&[EdgeType::Contains]))
                .await?;
            if incoming.is_empty() {
                violations.push(format!(
                    "{} ({:?} in {}) has no incoming CONTAINS edge",
                    node.id, node.kind, node.file
                ));
            }
        }
        Ok(violations)
    }
}

/// `perf.await-in-loop-has-issue` (spec.md §8.1 invariant 5): every CALL with
/// `isAwaited ∧ isInsideLoop` must have an incoming AFFECTS edge.
pub struct AwaitInLoopHasIssueRule {
    relevant: Vec<NodeKind>,
}

impl AwaitInLoopHasIssueRule {
    pub fn new() -> Self {
        AwaitInLoopHasIssueRule {
            relevant: vec![NodeKind::Call, NodeKind::Issue],
        }
    }
}

impl Default for AwaitInLoopHasIssueRule {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GuaranteeRule for AwaitInLoopHasIssueRule {
    fn name(&self) -> &str {
        "perf.await-in-loop-has-issue"
    }

    fn severity(&self) -> GuaranteeSeverity {
        GuaranteeSeverity::Warning
    }

    fn relevant_kinds(&self) -> &[NodeKind] {
        &self.relevant
    }

    async fn check_all(&self, graph: &Arc<dyn Graph>) -> Result<Vec<String>> {
        let mut violations = Vec::new();
        let mut calls = graph.query_nodes(NodeFilter::Kind(NodeKind::Call)).await?;
        while let Some(call) = calls.next().await {
            let is_awaited = call.attr("is_awaited").and_then(|v| v.as_bool()) == Some(true);
            let is_inside_loop = call.attr("is_inside_loop").and_then(|v| v.as_bool()) == Some(true);
            if !(is_awaited && is_inside_loop) {
                continue;
            }
            let incoming = graph
                .get_incoming_edges(&call.id, Some(&[EdgeType::Affects]))
                .await?;
            if incoming.is_empty() {
                violations.push(format!("{} is awaited in a loop with no ISSUE attached", call.id));
            }
        }
        Ok(violations)
    }

    fn as_datalog_sketch(&self) -> Option<&str> {
        Some("violation(C) :- call(C), is_awaited(C), is_inside_loop(C), not affects(_, C).")
    }
}

pub struct GuaranteeChecker {
    rules: Vec<Box<dyn GuaranteeRule>>,
}

impl GuaranteeChecker {
    pub fn new() -> Self {
        GuaranteeChecker {
            rules: vec![
                Box::new(ContainsReachabilityRule::new()),
                Box::new(AwaitInLoopHasIssueRule::new()),
            ],
        }
    }

    pub fn register(&mut self, rule: Box<dyn GuaranteeRule>) {
        self.rules.push(rule);
    }

    /// Runs `checkSelective(changed)` when `changed` is non-empty, else
    /// `checkAll()` (spec.md §4.9). Violations become `ENRICHMENT`-phase
    /// diagnostics, `fatal` for `error`-severity rules, `warning` otherwise.
    pub async fn check(
        &self,
        graph: &Arc<dyn Graph>,
        changed: &HashSet<NodeKind>,
    ) -> Result<Vec<Diagnostic>> {
        let mut diagnostics = Vec::new();
        for rule in &self.rules {
            let violations = if changed.is_empty() {
                rule.check_all(graph).await?
            } else {
                rule.check_selective(graph, changed).await?
            };
            let severity = match rule.severity() {
                GuaranteeSeverity::Error => Severity::Fatal,
                GuaranteeSeverity::Warning => Severity::Warning,
            };
            for message in violations {
                diagnostics.push(Diagnostic {
                    phase: PluginPhase::Enrichment,
                    plugin: rule.name().to_string(),
                    code: "GUARANTEE_VIOLATION".to_string(),
                    severity,
                    message,
                    file: None,
                    line: None,
                    column: None,
                });
            }
        }
        Ok(diagnostics)
    }
}

impl Default for GuaranteeChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grafema_core::ids::SemanticId;
    use grafema_core::node::NodeFactory;
    use grafema_core::types::Location;
    use grafema_graph::InMemoryGraph;

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
    async fn flags_unreachable_non_module_node() {
        let graph: Arc<dyn Graph> = Arc::new(InMemoryGraph::new());
        graph
            .add_node(NodeFactory::function(
                SemanticId::new("a.ts::fn:orphan"),
                "a.ts",
                "orphan",
                loc(),
                false,
                false,
            ))
            .await
            .unwrap();

        let checker = GuaranteeChecker::new();
        let diagnostics = checker.check(&graph, &HashSet::new()).await.unwrap();
        assert!(diagnostics
            .iter()
            .any(|d| d.plugin == "core.contains-reachability" && d.is_fatal()));
    }

    #[tokio::test]
    async fn flags_await_in_loop_without_issue() {
        let graph: Arc<dyn Graph> = Arc::new(InMemoryGraph::new());
        let module_id = SemanticId::new("a.ts::module");
        graph
            .add_node(NodeFactory::module(module_id.clone(), "a.ts", "deadbeef"))
            .await
            .unwrap();
        let call_id = SemanticId::new("a.ts::call:f#1");
        graph
            .add_node(
                NodeFactory::call(call_id.clone(), "a.ts", "f", loc())
                    .with_attr("is_awaited", true)
                    .with_attr("is_inside_loop", true),
            )
            .await
            .unwrap();
        graph
            .add_edge(grafema_core::edge::GraphEdge::new(
                module_id,
                call_id,
                EdgeType::Contains,
            ))
            .await
            .unwrap();

        let checker = GuaranteeChecker::new();
        let diagnostics = checker.check(&graph, &HashSet::new()).await.unwrap();
        assert!(diagnostics
            .iter()
            .any(|d| d.plugin == "perf.await-in-loop-has-issue" && !d.is_fatal()));
    }
}
