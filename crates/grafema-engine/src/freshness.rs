//! `GraphFreshnessChecker` (spec.md §4.7): compares each Module node's stored
//! `content_hash` against the file's current bytes, batched by 50 in
//! parallel — the same `futures::buffer_unordered` idiom
//! `grafema_parser::DirectoryParser` uses for extraction batches
//! (SPEC_FULL.md §5).

use futures::stream::{self, StreamExt};
use grafema_core::traits::{Graph, NodeFilter};
use grafema_core::types::NodeKind;
use grafema_core::{HashUtils, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

const FRESHNESS_BATCH_WIDTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
    Changed,
    Deleted,
    Unreadable,
}

#[derive(Debug, Clone)]
pub struct StaleModule {
    pub file: String,
    pub reason: StaleReason,
}

#[derive(Debug)]
pub struct FreshnessReport {
    pub fresh_count: usize,
    pub stale_count: usize,
    pub deleted_count: usize,
    pub stale_modules: Vec<StaleModule>,
    pub check_duration: std::time::Duration,
}

pub struct GraphFreshnessChecker {
    /// Root every Module `file` attribute is relative to (SPEC_FULL.md §4.7
    /// open-question resolution: always compare relative-to-root paths).
    project_root: PathBuf,
}

impl GraphFreshnessChecker {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        GraphFreshnessChecker {
            project_root: project_root.into(),
        }
    }

    pub async fn check_freshness(&self, graph: &Arc<dyn Graph>) -> Result<FreshnessReport> {
        let start = Instant::now();
        let mut nodes = graph.query_nodes(NodeFilter::Kind(NodeKind::Module)).await?;
        let mut modules = Vec::new();
        while let Some(node) = nodes.next().await {
            modules.push(node);
        }

        let mut fresh_count = 0usize;
        let mut stale_modules = Vec::new();

        for batch in modules.chunks(FRESHNESS_BATCH_WIDTH) {
            let root = self.project_root.clone();
            let results: Vec<Option<StaleModule>> = stream::iter(batch.iter().cloned().map(|node| {
                let root = root.clone();
                async move {
                    let stored_hash = node
                        .attr("content_hash")
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_string();
                    let path = root.join(&node.file);
                    if !path.exists() {
                        return Some(StaleModule {
                            file: node.file.clone(),
                            reason: StaleReason::Deleted,
                        });
                    }
                    match tokio::task::spawn_blocking(move || HashUtils::hash_file(&path)).await {
                        Ok(Ok(current_hash)) if current_hash == stored_hash => None,
                        Ok(Ok(_)) => Some(StaleModule {
                            file: node.file.clone(),
                            reason: StaleReason::Changed,
                        }),
                        _ => Some(StaleModule {
                            file: node.file.clone(),
                            reason: StaleReason::Unreadable,
                        }),
                    }
                }
            }))
            .buffer_unordered(FRESHNESS_BATCH_WIDTH)
            .collect()
            .await;

            for result in results {
                match result {
                    Some(stale) => stale_modules.push(stale),
                    None => fresh_count += 1,
                }
            }
        }

        let deleted_count = stale_modules
            .iter()
            .filter(|m| m.reason == StaleReason::Deleted)
            .count();

        Ok(FreshnessReport {
            fresh_count,
            stale_count: stale_modules.len(),
            deleted_count,
            stale_modules,
            check_duration: start.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grafema_core::ids::SemanticId;
    use grafema_core::node::NodeFactory;
    use grafema_graph::InMemoryGraph;

    #[tokio::test]
    async fn classifies_unchanged_changed_and_deleted_modules() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("fresh.ts"), b"const a = 1;").unwrap();
        std::fs::write(dir.path().join("changed.ts"), b"const b = 2;").unwrap();

        let graph: Arc<dyn Graph> = Arc::new(InMemoryGraph::new());
        graph
            .add_node(NodeFactory::module(
                SemanticId::new("fresh.ts::module"),
                "fresh.ts",
                &HashUtils::hash_bytes(b"const a = 1;"),
            ))
            .await
            .unwrap();
        graph
            .add_node(NodeFactory::module(
                SemanticId::new("changed.ts::module"),
                "changed.ts",
                "stale-hash",
            ))
            .await
            .unwrap();
        graph
            .add_node(NodeFactory::module(
                SemanticId::new("gone.ts::module"),
                "gone.ts",
                "whatever",
            ))
            .await
            .unwrap();

        let checker = GraphFreshnessChecker::new(dir.path());
        let report = checker.check_freshness(&graph).await.unwrap();

        assert_eq!(report.fresh_count, 1);
        assert_eq!(report.stale_count, 2);
        assert_eq!(report.deleted_count, 1);
        assert!(report
            .stale_modules
            .iter()
            .any(|m| m.file == "changed.ts" && m.reason == StaleReason::Changed));
        assert!(report
            .stale_modules
            .iter()
            .any(|m| m.file == "gone.ts" && m.reason == StaleReason::Deleted));
    }
}
