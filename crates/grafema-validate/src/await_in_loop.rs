use async_trait::async_trait;
use futures::StreamExt;
use grafema_core::edge::GraphEdge;
use grafema_core::ids::SemanticId;
use grafema_core::node::NodeFactory;
use grafema_core::plugin::{Plugin, PluginContext, PluginMetadata, PluginPhase, PluginResult};
use grafema_core::traits::NodeFilter;
use grafema_core::types::{EdgeType, NodeKind};
use grafema_core::Result;

/// For every `CALL` with `isAwaited ∧ isInsideLoop`, produces exactly one
/// `issue:performance` node with an `AFFECTS` edge to the call (spec.md §4.4,
/// §8.1 invariant 5, scenario S2). The issue id is derived from the call's
/// own id so re-running VALIDATION on an unchanged graph is idempotent —
/// `add_node`/`add_edge` overwrite/dedupe by id rather than accumulate.
pub struct AwaitInLoopValidator {
    metadata: PluginMetadata,
}

impl AwaitInLoopValidator {
    pub fn new() -> Self {
        AwaitInLoopValidator {
            metadata: PluginMetadata::new("await-in-loop-validator", PluginPhase::Validation)
                .with_priority(10),
        }
    }
}

impl Default for AwaitInLoopValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Plugin for AwaitInLoopValidator {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    async fn execute(&self, ctx: &PluginContext) -> Result<PluginResult> {
        let mut calls = ctx.graph.query_nodes(NodeFilter::Kind(NodeKind::Call)).await?;
        let mut created_nodes = Vec::new();
        let mut created_edges = Vec::new();

        while let Some(call) = calls.next().await {
            let is_awaited = call.attr("is_awaited").and_then(|v| v.as_bool()) == Some(true);
            let is_inside_loop = call.attr("is_inside_loop").and_then(|v| v.as_bool()) == Some(true);
            if !(is_awaited && is_inside_loop) {
                continue;
            }

            let issue_id = SemanticId::new(format!("{}::issue:await-in-loop", call.id));
            let issue = NodeFactory::issue(
                issue_id.clone(),
                &call.file,
                call.location.clone(),
                "AWAIT_IN_LOOP",
                "performance",
                "Sequential await in loop",
            );
            ctx.graph.add_node(issue.clone()).await?;
            let edge = GraphEdge::new(issue_id, call.id.clone(), EdgeType::Affects);
            ctx.graph.add_edge(edge.clone()).await?;

            if let Some(reporter) = &ctx.report_issue {
                reporter(issue.clone());
            }

            created_nodes.push(issue);
            created_edges.push(edge);
        }

        Ok(PluginResult {
            created_nodes,
            created_edges,
            ..PluginResult::ok()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grafema_core::node::NodeFactory as NF;
    use grafema_core::types::Location;
    use grafema_graph::InMemoryGraph;
    use std::sync::Arc;

    fn loc() -> Location {
        Location {
            file: "a.ts".into(),
            line: 2,
            column: 4,
            end_line: None,
            end_column: None,
        }
    }

    fn test_ctx(graph: Arc<InMemoryGraph>) -> PluginContext {
        PluginContext {
            graph,
            manifest_path: "/tmp/manifest".into(),
            project_path: "/tmp".into(),
            config: serde_yaml::Value::Null,
            force_analysis: false,
            strict_mode: false,
            report_issue: None,
        }
    }

    #[tokio::test]
    async fn flags_exactly_one_issue_per_offending_call() {
        let graph = Arc::new(InMemoryGraph::new());
        let call_id = SemanticId::new("a.ts::call:f#1");
        graph
            .add_node(
                NF::call(call_id.clone(), "a.ts", "f", loc())
                    .with_attr("is_awaited", true)
                    .with_attr("is_inside_loop", true),
            )
            .await
            .unwrap();
        let safe_call_id = SemanticId::new("a.ts::call:g#1");
        graph
            .add_node(
                NF::call(safe_call_id, "a.ts", "g", loc())
                    .with_attr("is_awaited", true)
                    .with_attr("is_inside_loop", false),
            )
            .await
            .unwrap();

        let ctx = test_ctx(graph.clone());
        let result = AwaitInLoopValidator::new().execute(&ctx).await.unwrap();
        assert_eq!(result.created_nodes.len(), 1);
        assert_eq!(result.created_nodes[0].kind, NodeKind::Issue);
        assert!(result.created_nodes[0]
            .attr("message")
            .unwrap()
            .as_str()
            .unwrap()
            .contains("Sequential await in loop"));

        let affects = graph
            .get_incoming_edges(&call_id, Some(&[EdgeType::Affects]))
            .await
            .unwrap();
        assert_eq!(affects.len(), 1);
    }

    #[tokio::test]
    async fn is_idempotent_on_repeated_runs() {
        let graph = Arc::new(InMemoryGraph::new());
        let call_id = SemanticId::new("a.ts::call:f#1");
        graph
            .add_node(
                NF::call(call_id.clone(), "a.ts", "f", loc())
                    .with_attr("is_awaited", true)
                    .with_attr("is_inside_loop", true),
            )
            .await
            .unwrap();

        let ctx = test_ctx(graph.clone());
        AwaitInLoopValidator::new().execute(&ctx).await.unwrap();
        AwaitInLoopValidator::new().execute(&ctx).await.unwrap();

        let affects = graph
            .get_incoming_edges(&call_id, Some(&[EdgeType::Affects]))
            .await
            .unwrap();
        assert_eq!(affects.len(), 1);
    }
}
