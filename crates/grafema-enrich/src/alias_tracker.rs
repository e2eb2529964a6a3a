use async_trait::async_trait;
use futures::StreamExt;
use grafema_core::edge::GraphEdge;
use grafema_core::plugin::{Plugin, PluginContext, PluginMetadata, PluginPhase, PluginResult};
use grafema_core::traits::NodeFilter;
use grafema_core::types::{EdgeType, NodeKind};
use grafema_core::Result;
use std::collections::HashMap;

/// Follows `const alias = obj.method; alias()` chains and writes a
/// `DEPENDS_ON` edge from the `alias()` call site to the method it actually
/// resolves to, the same edge `MethodCallResolver` would have written had the
/// call spelled the method out directly (spec.md §4.6 step 3). Only resolves
/// when exactly one function in the graph carries the aliased method's name —
/// an ambiguous or absent match is left alone, never an error.
pub struct AliasTracker {
    metadata: PluginMetadata,
}

impl AliasTracker {
    pub fn new() -> Self {
        AliasTracker {
            metadata: PluginMetadata::new("alias-tracker", PluginPhase::Enrichment)
                .with_priority(8)
                .with_dependencies(vec!["method-call-resolver".to_string()]),
        }
    }
}

impl Default for AliasTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Plugin for AliasTracker {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    async fn execute(&self, ctx: &PluginContext) -> Result<PluginResult> {
        let mut variables = ctx.graph.query_nodes(NodeFilter::Kind(NodeKind::Variable)).await?;
        let mut aliases_by_file_and_name = HashMap::new();
        while let Some(var) = variables.next().await {
            let Some(member) = var.attr("initializer_member").and_then(|v| v.as_str()) else {
                continue;
            };
            let Some((_, method_name)) = member.rsplit_once('.') else {
                continue;
            };
            let Some(alias_name) = var.attr("name").and_then(|v| v.as_str()) else {
                continue;
            };
            aliases_by_file_and_name
                .insert((var.file.clone(), alias_name.to_string()), method_name.to_string());
        }

        let mut functions = ctx
            .graph
            .query_nodes(NodeFilter::Kind(NodeKind::Function))
            .await?;
        let mut by_name: HashMap<String, Vec<_>> = HashMap::new();
        while let Some(f) = functions.next().await {
            if let Some(name) = f.attr("name").and_then(|v| v.as_str()) {
                by_name.entry(name.to_string()).or_default().push(f.id.clone());
            }
        }

        let mut calls = ctx.graph.query_nodes(NodeFilter::Kind(NodeKind::Call)).await?;
        let mut created_edges = Vec::new();
        while let Some(call) = calls.next().await {
            let Some(callee) = call.attr("callee").and_then(|v| v.as_str()) else {
                continue;
            };
            let Some(method_name) = aliases_by_file_and_name.get(&(call.file.clone(), callee.to_string())) else {
                continue;
            };
            if !ctx
                .graph
                .get_outgoing_edges(&call.id, Some(&[EdgeType::DependsOn]))
                .await?
                .is_empty()
            {
                continue;
            }
            if let Some(targets) = by_name.get(method_name) {
                if targets.len() == 1 {
                    let edge = GraphEdge::new(call.id.clone(), targets[0].clone(), EdgeType::DependsOn);
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
