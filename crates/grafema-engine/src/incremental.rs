//! `IncrementalReanalyzer` (spec.md §4.7): clear → indexing → analysis →
//! restricted-enrichment. Full re-enrichment is not required because
//! cross-file edges owned by unchanged modules remain valid — their targets
//! keep the same semantic ids.

use crate::freshness::{StaleModule, StaleReason};
use grafema_core::plugin::{Plugin, PluginContext};
use grafema_core::traits::Graph;
use grafema_core::Result;
use grafema_enrich::{ImportExportLinker, InstanceOfResolver};
use grafema_parser::{extract_module, LanguageRegistry};
use std::path::PathBuf;
use std::sync::Arc;

pub struct ReanalyzeOptions {
    pub project_root: PathBuf,
    /// Spec.md §4.7 step 4 says the restricted enrichment pass is
    /// skippable — callers that already know no cross-file edges are
    /// affected (e.g. a single internal rename) can set this.
    pub skip_enrichment: bool,
}

#[derive(Debug, Default)]
pub struct ReanalyzeReport {
    pub nodes_cleared: u64,
    pub nodes_created: usize,
    pub edges_created: usize,
}

pub struct IncrementalReanalyzer {
    registry: LanguageRegistry,
}

impl IncrementalReanalyzer {
    pub fn new() -> Self {
        IncrementalReanalyzer {
            registry: LanguageRegistry::new(),
        }
    }

    pub async fn reanalyze(
        &self,
        graph: &Arc<dyn Graph>,
        stale_modules: &[StaleModule],
        options: &ReanalyzeOptions,
    ) -> Result<ReanalyzeReport> {
        let mut report = ReanalyzeReport::default();

        // 1. Clear phase.
        for stale in stale_modules {
            report.nodes_cleared += graph.clear_file_nodes(&stale.file).await?;
        }

        // 2 + 3. Indexing + Analysis phases: rebuild still-existing modules.
        for stale in stale_modules {
            if stale.reason == StaleReason::Deleted {
                continue;
            }
            let abs_path = options.project_root.join(&stale.file);
            let built = extract_module(&self.registry, &abs_path, &stale.file)?;
            for node in built.nodes {
                graph.add_node(node).await?;
                report.nodes_created += 1;
            }
            for edge in built.edges {
                graph.add_edge(edge).await?;
                report.edges_created += 1;
            }
        }

        // 4. Restricted enrichment phase.
        if !options.skip_enrichment {
            let ctx = PluginContext {
                graph: graph.clone(),
                manifest_path: options.project_root.join(".grafema").join("manifest"),
                project_path: options.project_root.clone(),
                config: serde_yaml::Value::Null,
                force_analysis: false,
                strict_mode: false,
                report_issue: None,
            };
            for result in [
                ImportExportLinker::new().execute(&ctx).await?,
                InstanceOfResolver::new().execute(&ctx).await?,
            ] {
                report.edges_created += result.created_edges.len();
            }
        }

        Ok(report)
    }
}

impl Default for IncrementalReanalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grafema_core::ids::SemanticId;
    use grafema_core::node::NodeFactory;
    use grafema_core::types::NodeKind;
    use grafema_graph::InMemoryGraph;

    #[tokio::test]
    async fn reanalyze_rebuilds_a_changed_module() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("a.ts"),
            "export function greet(name: string) { return name; }\n",
        )
        .unwrap();

        let graph: Arc<dyn Graph> = Arc::new(InMemoryGraph::new());
        graph
            .add_node(NodeFactory::module(
                SemanticId::new("a.ts::module"),
                "a.ts",
                "stale-hash",
            ))
            .await
            .unwrap();
        graph
            .add_node(NodeFactory::function(
                SemanticId::new("a.ts::fn:old"),
                "a.ts",
                "old",
                grafema_core::types::Location {
                    file: "a.ts".into(),
                    line: 1,
                    column: 0,
                    end_line: None,
                    end_column: None,
                },
                false,
                false,
            ))
            .await
            .unwrap();

        let reanalyzer = IncrementalReanalyzer::new();
        let options = ReanalyzeOptions {
            project_root: dir.path().to_path_buf(),
            skip_enrichment: true,
        };
        let stale = vec![StaleModule {
            file: "a.ts".into(),
            reason: StaleReason::Changed,
        }];
        let report = reanalyzer.reanalyze(&graph, &stale, &options).await.unwrap();

        assert_eq!(report.nodes_cleared, 2);
        assert!(report.nodes_created > 0);
        assert!(graph
            .get_node(&SemanticId::new("a.ts::fn:old"))
            .await
            .unwrap()
            .is_none());

        let mut stream = graph
            .query_nodes(grafema_core::traits::NodeFilter::Kind(NodeKind::Function))
            .await
            .unwrap();
        let mut found_greet = false;
        while let Some(n) = futures::StreamExt::next(&mut stream).await {
            if n.attr("name").and_then(|v| v.as_str()) == Some("greet") {
                found_greet = true;
            }
        }
        assert!(found_greet);
    }

    #[tokio::test]
    async fn deleted_module_is_cleared_without_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        let graph: Arc<dyn Graph> = Arc::new(InMemoryGraph::new());
        graph
            .add_node(NodeFactory::module(
                SemanticId::new("gone.ts::module"),
                "gone.ts",
                "whatever",
            ))
            .await
            .unwrap();

        let reanalyzer = IncrementalReanalyzer::new();
        let options = ReanalyzeOptions {
            project_root: dir.path().to_path_buf(),
            skip_enrichment: true,
        };
        let stale = vec![StaleModule {
            file: "gone.ts".into(),
            reason: StaleReason::Deleted,
        }];
        let report = reanalyzer.reanalyze(&graph, &stale, &options).await.unwrap();

        assert_eq!(report.nodes_cleared, 1);
        assert_eq!(report.nodes_created, 0);
    }
}
