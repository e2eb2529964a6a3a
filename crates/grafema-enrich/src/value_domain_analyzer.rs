use async_trait::async_trait;
use futures::StreamExt;
use grafema_core::node::GraphNode;
use grafema_core::plugin::{Plugin, PluginContext, PluginMetadata, PluginPhase, PluginResult};
use grafema_core::traits::NodeFilter;
use grafema_core::types::NodeKind;
use grafema_core::Result;
use std::collections::{HashMap, HashSet};

/// Computes an abstract value set per variable: a set of literal values plus
/// a `hasUnknown` flag (spec.md §4.6 step 4), written back onto the
/// `Variable` node as `value_domain` (`StringList`) and `has_unknown`
/// (`Bool`) attributes for security validators to read. `hasUnknown` becomes
/// true when a variable is assigned from a parameter, from an unresolved
/// call, or from another variable whose own domain has `hasUnknown` set —
/// propagated to a fixpoint since alias chains can be arbitrarily long.
pub struct ValueDomainAnalyzer {
    metadata: PluginMetadata,
}

impl ValueDomainAnalyzer {
    pub fn new() -> Self {
        ValueDomainAnalyzer {
            metadata: PluginMetadata::new("value-domain-analyzer", PluginPhase::Enrichment)
                .with_priority(6),
        }
    }
}

impl Default for ValueDomainAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Default)]
struct Domain {
    values: Vec<String>,
    has_unknown: bool,
}

#[async_trait]
impl Plugin for ValueDomainAnalyzer {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    async fn execute(&self, ctx: &PluginContext) -> Result<PluginResult> {
        let mut parameter_names = HashSet::new();
        let mut parameters = ctx
            .graph
            .query_nodes(NodeFilter::Kind(NodeKind::Parameter))
            .await?;
        while let Some(p) = parameters.next().await {
            if let Some(name) = p.attr("name").and_then(|v| v.as_str()) {
                parameter_names.insert(name.to_string());
            }
        }

        let mut variables: Vec<GraphNode> = Vec::new();
        let mut stream = ctx.graph.query_nodes(NodeFilter::Kind(NodeKind::Variable)).await?;
        while let Some(v) = stream.next().await {
            variables.push(v);
        }
        let by_file_and_name: HashMap<(String, String), usize> = variables
            .iter()
            .enumerate()
            .filter_map(|(i, v)| {
                v.attr("name")
                    .and_then(|n| n.as_str())
                    .map(|n| ((v.file.clone(), n.to_string()), i))
            })
            .collect();

        let mut domains: Vec<Domain> = vec![Domain::default(); variables.len()];
        let mut resolved = vec![false; variables.len()];

        for _ in 0..variables.len().max(1) {
            let mut progressed = false;
            for (i, var) in variables.iter().enumerate() {
                if resolved[i] {
                    continue;
                }
                if let Some(literal) = var.attr("initializer_literal").and_then(|v| v.as_str()) {
                    domains[i] = Domain {
                        values: vec![literal.to_string()],
                        has_unknown: false,
                    };
                    resolved[i] = true;
                    progressed = true;
                    continue;
                }
                if var.attr("initializer_is_call").and_then(|v| v.as_bool()) == Some(true) {
                    domains[i] = Domain {
                        values: Vec::new(),
                        has_unknown: true,
                    };
                    resolved[i] = true;
                    progressed = true;
                    continue;
                }
                if let Some(source_name) = var.attr("initializer_name").and_then(|v| v.as_str()) {
                    if parameter_names.contains(source_name) {
                        domains[i] = Domain {
                            values: Vec::new(),
                            has_unknown: true,
                        };
                        resolved[i] = true;
                        progressed = true;
                        continue;
                    }
                    if let Some(&source_idx) = by_file_and_name.get(&(var.file.clone(), source_name.to_string())) {
                        if resolved[source_idx] {
                            domains[i] = domains[source_idx].clone();
                            resolved[i] = true;
                            progressed = true;
                        }
                        continue;
                    }
                    // References an identifier outside this file's Variable set (e.g.
                    // an import or global) — conservatively unknown.
                    domains[i] = Domain {
                        values: Vec::new(),
                        has_unknown: true,
                    };
                    resolved[i] = true;
                    progressed = true;
                    continue;
                }
                // No initializer we can classify (destructured, member-expression,
                // object/array literal, or no initializer at all): conservatively
                // unknown, since downstream validators must not assume safety.
                domains[i] = Domain {
                    values: Vec::new(),
                    has_unknown: true,
                };
                resolved[i] = true;
                progressed = true;
            }
            if !progressed {
                break;
            }
        }

        for (i, resolved_flag) in resolved.iter().enumerate() {
            if !resolved_flag {
                domains[i].has_unknown = true;
            }
        }

        for (i, var) in variables.into_iter().enumerate() {
            let domain = &domains[i];
            let updated = var
                .with_attr("value_domain", domain.values.clone())
                .with_attr("has_unknown", domain.has_unknown);
            ctx.graph.add_node(updated).await?;
        }

        Ok(PluginResult::ok())
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
    async fn literal_initializer_has_no_unknown() {
        let graph = Arc::new(InMemoryGraph::new());
        let id = SemanticId::new("a.ts::var:x");
        graph
            .add_node(
                NodeFactory::variable(id.clone(), "a.ts", "x", loc(), true)
                    .with_attr("initializer_literal", "42"),
            )
            .await
            .unwrap();

        let ctx = test_ctx(graph.clone());
        ValueDomainAnalyzer::new().execute(&ctx).await.unwrap();

        let node = graph.get_node(&id).await.unwrap().unwrap();
        assert_eq!(node.attr("has_unknown").unwrap().as_bool(), Some(false));
        assert_eq!(
            node.attr("value_domain").unwrap().as_string_list(),
            Some(&["42".to_string()][..])
        );
    }

    #[tokio::test]
    async fn alias_of_a_parameter_is_unknown() {
        let graph = Arc::new(InMemoryGraph::new());
        graph
            .add_node(GraphNode::new(
                SemanticId::new("a.ts::param:input"),
                NodeKind::Parameter,
                "a.ts",
                loc(),
            ).with_attr("name", "input"))
            .await
            .unwrap();
        let id = SemanticId::new("a.ts::var:copy");
        graph
            .add_node(
                NodeFactory::variable(id.clone(), "a.ts", "copy", loc(), true)
                    .with_attr("initializer_name", "input"),
            )
            .await
            .unwrap();

        let ctx = test_ctx(graph.clone());
        ValueDomainAnalyzer::new().execute(&ctx).await.unwrap();

        let node = graph.get_node(&id).await.unwrap().unwrap();
        assert_eq!(node.attr("has_unknown").unwrap().as_bool(), Some(true));
    }

    #[tokio::test]
    async fn alias_chain_propagates_through_fixpoint() {
        let graph = Arc::new(InMemoryGraph::new());
        let a = SemanticId::new("a.ts::var:a");
        graph
            .add_node(
                NodeFactory::variable(a.clone(), "a.ts", "a", loc(), true)
                    .with_attr("initializer_literal", "\"hi\""),
            )
            .await
            .unwrap();
        let b = SemanticId::new("a.ts::var:b");
        graph
            .add_node(
                NodeFactory::variable(b.clone(), "a.ts", "b", loc(), true)
                    .with_attr("initializer_name", "a"),
            )
            .await
            .unwrap();

        let ctx = test_ctx(graph.clone());
        ValueDomainAnalyzer::new().execute(&ctx).await.unwrap();

        let node = graph.get_node(&b).await.unwrap().unwrap();
        assert_eq!(node.attr("has_unknown").unwrap().as_bool(), Some(false));
        assert_eq!(
            node.attr("value_domain").unwrap().as_string_list(),
            Some(&["\"hi\"".to_string()][..])
        );
    }
}
