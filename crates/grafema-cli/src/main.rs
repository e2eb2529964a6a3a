//! Thin CLI surface (spec.md §6.4): `analyze`, `freshness`, `status`.
//! Only `--strict` and `--force` reach `grafema-engine`'s behavior; every
//! other flag here governs the out-of-scope discovery/output/backend
//! collaborators spec.md treats as peripheral.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use grafema_core::config::EngineConfig;
use grafema_core::plugin::Plugin;
use grafema_engine::{GraphFreshnessChecker, ManifestStore, Orchestrator, RunRequest};
use grafema_enrich::{
    AliasTracker, ArgumentParameterLinker, ImportExportLinker, InstanceOfResolver,
    MethodCallResolver, ValueDomainAnalyzer,
};
use grafema_graph::InMemoryGraph;
use grafema_validate::AwaitInLoopValidator;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// The production plugin set (spec.md §4.4 enrichers, §4.9 validators),
/// run in ENRICHMENT then VALIDATION phase by the `Orchestrator`.
fn default_plugins() -> Vec<Arc<dyn Plugin>> {
    vec![
        Arc::new(ArgumentParameterLinker::new()),
        Arc::new(AliasTracker::new()),
        Arc::new(ValueDomainAnalyzer::new()),
        Arc::new(ImportExportLinker::new()),
        Arc::new(InstanceOfResolver::new()),
        Arc::new(MethodCallResolver::new()),
        Arc::new(AwaitInLoopValidator::new()),
    ]
}

/// Monorepo root override (spec.md §6.4). Falls back to the current
/// directory — auto-discovery of service roots is out of scope here.
const GRAFEMA_ROOT_ENV: &str = "GRAFEMA_ROOT";
/// Backend binary override, threaded through but unused by the analysis
/// core itself (it governs the out-of-scope storage collaborator).
const GRAFEMA_RFDB_SERVER_ENV: &str = "GRAFEMA_RFDB_SERVER";

#[derive(Parser)]
#[command(name = "grafema")]
#[command(about = "grafema analysis engine CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Monorepo root. Defaults to $GRAFEMA_ROOT, then the current directory.
    #[arg(long, global = true, env = GRAFEMA_ROOT_ENV)]
    root: Option<PathBuf>,

    /// Backend binary override (read but not used by the analysis core).
    #[arg(long, global = true, env = GRAFEMA_RFDB_SERVER_ENV)]
    rfdb_server: Option<String>,

    /// Emit results as JSON instead of the default human-readable summary.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full analysis pass: DISCOVERY through FLUSH.
    Analyze {
        /// Abort the run if ENRICHMENT emits an unresolved reference.
        #[arg(long)]
        strict: bool,

        /// Refuse to wait for a concurrently running analysis; fail fast
        /// instead (spec.md §5 analysis exclusivity).
        #[arg(long)]
        force: bool,
    },

    /// Compare stored content hashes against the working tree without
    /// re-analyzing anything.
    Freshness,

    /// Print the `.grafema/manifest` entries for the project.
    Status,
}

fn project_root(cli: &Cli) -> Result<PathBuf> {
    let root = match &cli.root {
        Some(r) => r.clone(),
        None => std::env::current_dir().context("resolving current directory")?,
    };
    Ok(root)
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let root = project_root(&cli)?;
    let config = EngineConfig::load(&root).context("loading .grafema/config.yaml")?;
    config.validate().context("validating engine configuration")?;

    match &cli.command {
        Commands::Analyze { strict, force } => analyze(&cli, &root, &config, *strict, *force).await,
        Commands::Freshness => freshness(&cli, &root).await,
        Commands::Status => status(&cli, &root).await,
    }
}

async fn analyze(
    cli: &Cli,
    root: &PathBuf,
    config: &EngineConfig,
    strict: bool,
    force: bool,
) -> Result<ExitCode> {
    let graph: Arc<dyn grafema_core::traits::Graph> = Arc::new(InMemoryGraph::new());
    let orchestrator = Orchestrator::new(default_plugins());

    let service_roots = if config.services.is_empty() {
        vec![root.clone()]
    } else {
        config.services.iter().map(|svc| root.join(&svc.path)).collect()
    };

    let req = RunRequest {
        project_root: root.clone(),
        manifest_path: EngineConfig::manifest_path(root),
        config: serde_yaml::Value::Null,
        strict_mode: strict || config.strict_mode,
        force_analysis: force,
        worker_count: config.worker_count,
        service_roots,
    };

    match orchestrator.run(graph, req).await {
        Ok(report) => {
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "files_parsed": report.parsing_stats.iter().map(|s| s.parsed_files).sum::<usize>(),
                        "files_failed": report.parsing_stats.iter().map(|s| s.failed_files).sum::<usize>(),
                        "issues": report.issues_reported.len(),
                        "has_fatal": report.diagnostics.has_fatal(),
                    })
                );
            } else {
                let parsed: usize = report.parsing_stats.iter().map(|s| s.parsed_files).sum();
                let failed: usize = report.parsing_stats.iter().map(|s| s.failed_files).sum();
                println!("{} {parsed} files parsed, {failed} failed", "analyze:".bold());
                println!("  issues reported: {}", report.issues_reported.len());
                for diag in report.diagnostics.all() {
                    let label = if diag.is_fatal() { "fatal".red() } else { "warn".yellow() };
                    println!("  [{label}] {:?}/{}: {}", diag.phase, diag.plugin, diag.message);
                }
            }
            if report.diagnostics.has_fatal() {
                Ok(ExitCode::from(1))
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
        Err(err) => {
            eprintln!("{} {err}", "analysis failed:".red().bold());
            Ok(ExitCode::from(1))
        }
    }
}

async fn freshness(cli: &Cli, root: &PathBuf) -> Result<ExitCode> {
    let graph: Arc<dyn grafema_core::traits::Graph> = Arc::new(InMemoryGraph::new());
    let checker = GraphFreshnessChecker::new(root.clone());
    let report = checker.check_freshness(&graph).await?;

    if cli.json {
        println!(
            "{}",
            serde_json::json!({
                "fresh": report.fresh_count,
                "stale": report.stale_count,
                "deleted": report.deleted_count,
            })
        );
    } else {
        println!(
            "{} fresh={} stale={} deleted={}",
            "freshness:".bold(),
            report.fresh_count,
            report.stale_count,
            report.deleted_count
        );
        for stale in &report.stale_modules {
            println!("  {:?}: {}", stale.reason, stale.file);
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn status(cli: &Cli, root: &PathBuf) -> Result<ExitCode> {
    let store = ManifestStore::new(EngineConfig::manifest_path(root));
    let entries = store.read_all().context("reading .grafema/manifest")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string(
                &entries
                    .iter()
                    .map(|e| serde_json::json!({
                        "stable_id": e.stable_id,
                        "phase": e.phase,
                        "status": e.status.to_string(),
                        "unix_time": e.unix_time,
                    }))
                    .collect::<Vec<_>>()
            )?
        );
    } else {
        println!("{}", "status:".bold());
        for entry in &entries {
            println!("  {} [{}] {}", entry.stable_id, entry.phase, entry.status);
        }
        if entries.is_empty() {
            println!("  (no manifest entries; run `grafema analyze` first)");
        }
    }
    Ok(ExitCode::SUCCESS)
}
