//! Orchestrator, phase runner, freshness checking, and incremental
//! re-analysis for the grafema analysis engine (spec.md §4.7–§4.9).

pub mod diagnostics;
pub mod freshness;
pub mod guarantees;
pub mod incremental;
pub mod manifest;
pub mod orchestrator;

pub use diagnostics::{Diagnostic, DiagnosticCollector, Severity};
pub use freshness::{FreshnessReport, GraphFreshnessChecker, StaleModule, StaleReason};
pub use guarantees::{GuaranteeChecker, GuaranteeRule, GuaranteeSeverity};
pub use incremental::{IncrementalReanalyzer, ReanalyzeOptions, ReanalyzeReport};
pub use manifest::{ManifestEntry, ManifestStatus, ManifestStore};
pub use orchestrator::{Orchestrator, RunReport, RunRequest};
