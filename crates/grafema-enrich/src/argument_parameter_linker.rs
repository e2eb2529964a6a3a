use async_trait::async_trait;
use futures::StreamExt;
use grafema_core::edge::GraphEdge;
use grafema_core::ids::SemanticId;
use grafema_core::plugin::{Plugin, PluginContext, PluginMetadata, PluginPhase, PluginResult};
use grafema_core::traits::NodeFilter;
use grafema_core::types::{EdgeType, NodeKind};
use grafema_core::Result;
use std::collections::HashMap;

/// Given `PASSES_ARGUMENT` and a resolved call target, links each
/// `CallArgument` to the `Parameter` it fills by position with a
/// `FLOWS_INTO` edge (spec.md §4.6 step 2). A call's target function is
/// whatever `CALLS`/`DEPENDS_ON` edge `MethodCallResolver` or same-file
/// resolution in `GraphBuilder` already produced; an unresolved callee just
/// means no argument of that call gets linked, never an error.
pub struct ArgumentParameterLinker {
    metadata: PluginMetadata,
}

impl ArgumentParameterLinker {
    pub fn new() -> Self {
        ArgumentParameterLinker {
            metadata: PluginMetadata::new("argument-parameter-linker", PluginPhase::Enrichment)
                .with_priority(5)
                .with_dependencies(vec!["method-call-resolver".to_string()]),
        }
    }
}

impl Default for ArgumentParameterLinker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Plugin for ArgumentParameterLinker {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    async fn execute(&self, ctx: &PluginContext) -> Result<PluginResult> {
        let mut parameters = ctx
            .graph
            .query_nodes(NodeFilter::Kind(NodeKind::Parameter))
            .await?;
        let mut params_by_function: HashMap<SemanticId, Vec<(u32, SemanticId)>> = HashMap::new();
        while let Some(p) = parameters.next().await {
            let Some(index) = p.attr("index").and_then(|v| v.as_int()) else {
                continue;
            };
            for edge in ctx
                .graph
                .get_incoming_edges(&p.id, Some(&[EdgeType::Contains]))
                .await?
            {
                params_by_function
                    .entry(edge.src.clone())
                    .or_default()
                    .push((index as u32, p.id.clone()));
            }
        }

        let mut calls = ctx.graph.query_nodes(NodeFilter::Kind(NodeKind::Call)).await?;
        let mut warnings = Vec::new();
        let mut created_edges = Vec::new();
        while let Some(call) = calls.next().await {
            let targets = ctx
                .graph
                .get_outgoing_edges(&call.id, Some(&[EdgeType::DependsOn]))
                .await?;
            let Some(target_fn) = targets.first().map(|e| e.dst.clone()) else {
                continue;
            };
            let Some(params) = params_by_function.get(&target_fn) else {
                continue;
            };
            let arguments = ctx
                .graph
                .get_outgoing_edges(&call.id, Some(&[EdgeType::PassesArgument]))
                .await?;
            for arg_edge in arguments {
                let Some(arg_node) = ctx.graph.get_node(&arg_edge.dst).await? else {
                    continue;
                };
                let Some(arg_index) = arg_node.attr("arg_index").and_then(|v| v.as_int()) else {
                    continue;
                };
                match params.iter().find(|(idx, _)| *idx as i64 == arg_index) {
                    Some((_, param_id)) => {
                        let edge =
                            GraphEdge::new(arg_node.id.clone(), param_id.clone(), EdgeType::FlowsInto);
                        ctx.graph.add_edge(edge.clone()).await?;
                        created_edges.push(edge);
                    }
                    None => warnings.push(format!(
                        "no parameter at index {arg_index} for call {}",
                        call.id
                    )),
                }
            }
        }

        Ok(PluginResult {
            created_edges,
            warnings,
            ..PluginResult::ok()
        })
    }
}
