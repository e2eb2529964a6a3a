//! `Orchestrator` / `PhaseRunner` (spec.md §4.8): runs phases in fixed order
//! DISCOVERY → INDEXING → ANALYSIS → ENRICHMENT → (GUARANTEES) → VALIDATION →
//! FLUSH. Plugins within a phase run serially, sorted descending by
//! priority. Grounded on the teacher's `TreeSitterParser::
//! parse_directory_parallel` batch-with-semaphore idiom for the builtin
//! INDEXING/ANALYSIS step (delegated to `grafema_parser::DirectoryParser`),
//! generalized from "parse all files" to "run all plugins of a phase, then
//! barrier" for the plugin-phase loop itself.

use crate::diagnostics::{Diagnostic, DiagnosticCollector};
use crate::guarantees::GuaranteeChecker;
use grafema_core::node::GraphNode;
use grafema_core::plugin::{IssueReporter, Plugin, PluginContext, PluginPhase, PluginResult};
use grafema_core::traits::Graph;
use grafema_core::types::NodeKind;
use grafema_core::{CodeGraphError, Result};
use grafema_parser::file_collect::FileCollectionConfig;
use grafema_parser::parser::{DirectoryParser, ParsingStatistics};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

pub struct RunRequest {
    pub project_root: PathBuf,
    pub manifest_path: PathBuf,
    pub config: serde_yaml::Value,
    pub strict_mode: bool,
    pub force_analysis: bool,
    pub worker_count: usize,
    /// One path per declared service root (spec.md §1/§2 multi-service
    /// scope). Each is walked and extracted independently.
    pub service_roots: Vec<PathBuf>,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub diagnostics: DiagnosticCollector,
    pub parsing_stats: Vec<ParsingStatistics>,
    pub issues_reported: Vec<GraphNode>,
    pub aborted_early: bool,
}

/// The set of `Plugin`s the engine runs, keyed by declared `phase`. Built-in
/// INDEXING/ANALYSIS extraction (tree-sitter + `GraphBuilder`) is not itself
/// a `Plugin` — it runs as a fixed step before any user `Indexing`/
/// `Analysis`-phase plugins, matching spec.md §4.8's "INDEXING and ANALYSIS
/// process units in batches" language, which describes the engine's own
/// work rather than a plugin contract.
pub struct Orchestrator {
    plugins: Vec<Arc<dyn Plugin>>,
    guarantee_checker: GuaranteeChecker,
    analysis_lock: Mutex<()>,
}

impl Orchestrator {
    pub fn new(plugins: Vec<Arc<dyn Plugin>>) -> Self {
        Orchestrator {
            plugins,
            guarantee_checker: GuaranteeChecker::new(),
            analysis_lock: Mutex::new(()),
        }
    }

    pub fn with_guarantee_checker(mut self, checker: GuaranteeChecker) -> Self {
        self.guarantee_checker = checker;
        self
    }

    fn make_ctx(&self, graph: Arc<dyn Graph>, req: &RunRequest, report_issue: Option<IssueReporter>) -> PluginContext {
        PluginContext {
            graph,
            manifest_path: req.manifest_path.clone(),
            project_path: req.project_root.clone(),
            config: req.config.clone(),
            force_analysis: req.force_analysis,
            strict_mode: req.strict_mode,
            report_issue,
        }
    }

    /// Runs every plugin declared for `phase`, descending by priority
    /// (spec.md §4.8). A plugin that throws becomes `ERR_PLUGIN_THREW` and
    /// aborts the entire run immediately — matching spec.md §7's "Plugin
    /// exception... abort the run", distinct from a plugin merely returning
    /// `errors`, which is absorbed and (for ENRICHMENT in strict mode)
    /// escalated at the phase barrier instead of mid-phase.
    #[instrument(skip(self, ctx, diagnostics))]
    async fn run_phase(
        &self,
        phase: PluginPhase,
        ctx: &PluginContext,
        diagnostics: &mut DiagnosticCollector,
    ) -> Result<Vec<PluginResult>> {
        let mut phase_plugins: Vec<&Arc<dyn Plugin>> =
            self.plugins.iter().filter(|p| p.metadata().phase == phase).collect();
        phase_plugins.sort_by(|a, b| b.metadata().priority.cmp(&a.metadata().priority));

        let mut results = Vec::new();
        for plugin in phase_plugins {
            let name = plugin.metadata().name.clone();
            info!(phase = ?phase, plugin = %name, "running plugin");
            match plugin.execute(ctx).await {
                Err(e) => {
                    diagnostics.push(Diagnostic::fatal(
                        phase,
                        name.clone(),
                        "ERR_PLUGIN_THREW",
                        e.to_string(),
                    ));
                    return Err(CodeGraphError::PluginThrew {
                        plugin: name,
                        message: e.to_string(),
                    });
                }
                Ok(result) => {
                    for w in &result.warnings {
                        diagnostics.push(Diagnostic::warning(phase, name.clone(), "PLUGIN_WARNING", w.clone()));
                    }
                    if phase == PluginPhase::Enrichment && ctx.strict_mode && !result.errors.is_empty() {
                        for e in &result.errors {
                            diagnostics.push(Diagnostic::fatal(
                                phase,
                                name.clone(),
                                "ERR_UNRESOLVED_REFERENCE",
                                format!("Strict mode: unresolved reference — {e}"),
                            ));
                        }
                    } else {
                        for e in &result.errors {
                            diagnostics.push(Diagnostic::warning(phase, name.clone(), "PLUGIN_ERROR", e.clone()));
                        }
                    }
                    results.push(result);
                }
            }
        }
        Ok(results)
    }

    /// Full orchestrator run over one or more declared service roots
    /// (spec.md §4.8/§5). Acquires the process-wide analysis-exclusivity
    /// lock for the duration of the run (SPEC_FULL.md §5): a `force_analysis`
    /// request made while another run holds the lock fails fast instead of
    /// queuing behind it; a non-force request waits its turn.
    pub async fn run(&self, graph: Arc<dyn Graph>, req: RunRequest) -> Result<RunReport> {
        let _lock_guard = if req.force_analysis {
            match self.analysis_lock.try_lock() {
                Ok(guard) => guard,
                Err(_) => {
                    return Err(CodeGraphError::InvalidOperation(
                        "analysis already in progress; refusing concurrent force=true run".into(),
                    ))
                }
            }
        } else {
            self.analysis_lock.lock().await
        };

        let mut diagnostics = DiagnosticCollector::new();

        let discovery_ctx = self.make_ctx(graph.clone(), &req, None);
        self.run_phase(PluginPhase::Discovery, &discovery_ctx, &mut diagnostics).await?;

        let mut parsing_stats = Vec::new();
        let parser = DirectoryParser::new(req.worker_count.max(1));
        let mut total_files = 0usize;
        for service_root in &req.service_roots {
            let (modules, stats) = parser
                .parse_service_root(service_root, &req.project_root, &FileCollectionConfig::default())
                .await;
            total_files += stats.total_files;
            for built in modules {
                for node in built.nodes {
                    graph.add_node(node).await?;
                }
                for edge in built.edges {
                    graph.add_edge(edge).await?;
                }
            }
            parsing_stats.push(stats);
        }

        let indexing_ctx = self.make_ctx(graph.clone(), &req, None);
        self.run_phase(PluginPhase::Indexing, &indexing_ctx, &mut diagnostics).await?;
        let analysis_ctx = self.make_ctx(graph.clone(), &req, None);
        self.run_phase(PluginPhase::Analysis, &analysis_ctx, &mut diagnostics).await?;

        if total_files == 0 {
            // spec.md §7: "Discovery found no units: not an error; the run
            // ends after ENRICHMENT with zero work." There is nothing for
            // enrichment or guarantees to do, so skip straight to flush.
            graph.flush().await?;
            return Ok(RunReport {
                diagnostics,
                parsing_stats,
                issues_reported: Vec::new(),
                aborted_early: false,
            });
        }

        let enrichment_ctx = self.make_ctx(graph.clone(), &req, None);
        let enrichment_results = self
            .run_phase(PluginPhase::Enrichment, &enrichment_ctx, &mut diagnostics)
            .await?;

        if diagnostics.has_fatal_in_phase(PluginPhase::Enrichment) {
            return Err(CodeGraphError::StrictMode(
                "Strict mode: unresolved reference encountered during enrichment".into(),
            ));
        }

        let mut changed_types: HashSet<NodeKind> = HashSet::new();
        for result in &enrichment_results {
            for node in &result.created_nodes {
                changed_types.insert(node.kind);
            }
            for edge in &result.created_edges {
                if let Some(n) = graph.get_node(&edge.src).await? {
                    changed_types.insert(n.kind);
                }
                if let Some(n) = graph.get_node(&edge.dst).await? {
                    changed_types.insert(n.kind);
                }
            }
        }

        let guarantee_diagnostics = self.guarantee_checker.check(&graph, &changed_types).await?;
        diagnostics.extend(guarantee_diagnostics);

        if diagnostics.has_fatal_in_phase(PluginPhase::Enrichment) {
            return Err(CodeGraphError::Graph(
                "guarantee violation: one or more error-severity guarantees failed".into(),
            ));
        }

        let reported_issues: Arc<StdMutex<Vec<GraphNode>>> = Arc::new(StdMutex::new(Vec::new()));
        let collector = reported_issues.clone();
        let report_issue: IssueReporter = Arc::new(move |node: GraphNode| {
            collector.lock().expect("reported-issues lock poisoned").push(node);
        });
        let validation_ctx = self.make_ctx(graph.clone(), &req, Some(report_issue));
        self.run_phase(PluginPhase::Validation, &validation_ctx, &mut diagnostics).await?;

        graph.flush().await?;

        if diagnostics.has_fatal() {
            warn!("run completed with fatal diagnostics outside the enrichment barrier");
        }

        let issues_reported = Arc::try_unwrap(reported_issues)
            .map(|m| m.into_inner().expect("reported-issues lock poisoned"))
            .unwrap_or_default();

        Ok(RunReport {
            diagnostics,
            parsing_stats,
            issues_reported,
            aborted_early: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use grafema_core::plugin::PluginMetadata;
    use grafema_graph::InMemoryGraph;

    struct FailingEnricher {
        metadata: PluginMetadata,
    }

    #[async_trait]
    impl Plugin for FailingEnricher {
        fn metadata(&self) -> &PluginMetadata {
            &self.metadata
        }
        async fn execute(&self, _ctx: &PluginContext) -> Result<PluginResult> {
            Ok(PluginResult {
                success: false,
                errors: vec!["unresolved reference to `foo`".to_string()],
                ..Default::default()
            })
        }
    }

    #[tokio::test]
    async fn strict_mode_aborts_after_enrichment_barrier() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.ts"), "export const a = 1;\n").unwrap();

        let plugin: Arc<dyn Plugin> = Arc::new(FailingEnricher {
            metadata: PluginMetadata::new("failing-enricher", PluginPhase::Enrichment),
        });
        let orchestrator = Orchestrator::new(vec![plugin]);
        let graph: Arc<dyn Graph> = Arc::new(InMemoryGraph::new());

        let req = RunRequest {
            project_root: dir.path().to_path_buf(),
            manifest_path: dir.path().join(".grafema").join("manifest"),
            config: serde_yaml::Value::Null,
            strict_mode: true,
            force_analysis: false,
            worker_count: 2,
            service_roots: vec![dir.path().to_path_buf()],
        };

        let result = orchestrator.run(graph, req).await;
        assert!(result.is_err());
        let message = result.unwrap_err().to_string();
        assert!(message.contains("Strict mode"));
        assert!(message.contains("unresolved reference"));
    }

    #[tokio::test]
    async fn non_strict_mode_absorbs_enricher_errors_and_runs_validation() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.ts"), "export const a = 1;\n").unwrap();

        let plugin: Arc<dyn Plugin> = Arc::new(FailingEnricher {
            metadata: PluginMetadata::new("failing-enricher", PluginPhase::Enrichment),
        });
        let orchestrator = Orchestrator::new(vec![plugin]);
        let graph: Arc<dyn Graph> = Arc::new(InMemoryGraph::new());

        let req = RunRequest {
            project_root: dir.path().to_path_buf(),
            manifest_path: dir.path().join(".grafema").join("manifest"),
            config: serde_yaml::Value::Null,
            strict_mode: false,
            force_analysis: false,
            worker_count: 2,
            service_roots: vec![dir.path().to_path_buf()],
        };

        let report = orchestrator.run(graph, req).await.unwrap();
        assert!(!report.diagnostics.has_fatal());
        assert!(report
            .diagnostics
            .for_phase(PluginPhase::Enrichment)
            .any(|d| d.code == "PLUGIN_ERROR"));
    }

    #[tokio::test]
    async fn empty_discovery_ends_after_enrichment_with_no_error() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = Orchestrator::new(vec![]);
        let graph: Arc<dyn Graph> = Arc::new(InMemoryGraph::new());

        let req = RunRequest {
            project_root: dir.path().to_path_buf(),
            manifest_path: dir.path().join(".grafema").join("manifest"),
            config: serde_yaml::Value::Null,
            strict_mode: false,
            force_analysis: false,
            worker_count: 2,
            service_roots: vec![dir.path().to_path_buf()],
        };

        let report = orchestrator.run(graph, req).await.unwrap();
        assert!(report.parsing_stats.iter().all(|s| s.total_files == 0));
        assert!(!report.diagnostics.has_fatal());
    }
}
