use async_trait::async_trait;
use futures::StreamExt;
use grafema_core::edge::GraphEdge;
use grafema_core::plugin::{Plugin, PluginContext, PluginMetadata, PluginPhase, PluginResult};
use grafema_core::traits::NodeFilter;
use grafema_core::types::{EdgeType, NodeKind};
use grafema_core::Result;

/// Resolves `obj.method()` calls to the method's declaring function, when
/// that function is visible anywhere in the graph (spec.md §4.4). Diagnostic-
/// not-throw: a callee it can't resolve is simply left unresolved for a later
/// enrichment pass or for VALIDATION to flag, never an error.
pub struct MethodCallResolver {
    metadata: PluginMetadata,
}

impl MethodCallResolver {
    pub fn new() -> Self {
        MethodCallResolver {
            metadata: PluginMetadata::new("method-call-resolver", PluginPhase::Enrichment)
                .with_priority(10),
        }
    }
}

impl Default for MethodCallResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Plugin for MethodCallResolver {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    async fn execute(&self, ctx: &PluginContext) -> Result<PluginResult> {
        let mut calls = ctx.graph.query_nodes(NodeFilter::Kind(NodeKind::Call)).await?;
        let mut pending = Vec::new();
        while let Some(node) = calls.next().await {
            let Some(callee) = node.attr("callee").and_then(|v| v.as_str()) else {
                continue;
            };
            let Some((_, method_name)) = callee.rsplit_once('.') else {
                continue;
            };
            pending.push((node.id.clone(), method_name.to_string()));
        }

        let mut functions = ctx
            .graph
            .query_nodes(NodeFilter::Kind(NodeKind::Function))
            .await?;
        let mut by_name = std::collections::HashMap::new();
        while let Some(f) = functions.next().await {
            if let Some(name) = f.attr("name").and_then(|v| v.as_str()) {
                by_name.entry(name.to_string()).or_insert_with(Vec::new).push(f.id.clone());
            }
        }

        let mut created_edges = Vec::new();
        for (call_id, method_name) in pending {
            if let Some(targets) = by_name.get(&method_name) {
                if targets.len() == 1 {
                    let edge = GraphEdge::new(call_id, targets[0].clone(), EdgeType::DependsOn);
                    ctx.graph.add_edge(edge.clone()).await?;
                    created_edges.push(edge);
                }
            }
        }

        Ok(PluginResult {
            created_edges,
            ..PluginResult::ok()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grafema_core::ids::SemanticId;
    use grafema_core::node::NodeFactory;
    use grafema_core::types::Location;
    use grafema_graph::InMemoryGraph;
    use std::sync::Arc;

    fn loc() -> Location {
        Location {
            file: "a.ts".into(),
            line: 1,
            column: 0,
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
    async fn links_call_to_uniquely_named_method() {
        let graph = Arc::new(InMemoryGraph::new());
        let method_id = SemanticId::new("a.ts::fn:doThing");
        graph
            .add_node(NodeFactory::function(
                method_id.clone(),
                "a.ts",
                "doThing",
                loc(),
                false,
                false,
            ))
            .await
            .unwrap();
        let call_id = SemanticId::new("a.ts::call:obj.doThing#1");
        graph
            .add_node(NodeFactory::call(call_id.clone(), "a.ts", "obj.doThing", loc()))
            .await
            .unwrap();

        let ctx = test_ctx(graph.clone());
        let result = MethodCallResolver::new().execute(&ctx).await.unwrap();
        assert_eq!(result.created_edges.len(), 1);

        let out = graph
            .get_outgoing_edges(&call_id, Some(&[EdgeType::DependsOn]))
            .await
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].dst, method_id);
    }

    #[tokio::test]
    async fn leaves_ambiguous_method_name_unresolved() {
        let graph = Arc::new(InMemoryGraph::new());
        for file in ["a.ts", "b.ts"] {
            graph
                .add_node(NodeFactory::function(
                    SemanticId::new(format!("{file}::fn:run")),
                    file,
                    "run",
                    loc(),
                    false,
                    false,
                ))
                .await
                .unwrap();
        }
        let call_id = SemanticId::new("a.ts::call:obj.run#1");
        graph
            .add_node(NodeFactory::call(call_id.clone(), "a.ts", "obj.run", loc()))
            .await
            .unwrap();

        let ctx = test_ctx(graph.clone());
        let result = MethodCallResolver::new().execute(&ctx).await.unwrap();
        assert!(result.created_edges.is_empty());
    }
}
