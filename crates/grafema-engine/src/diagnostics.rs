//! Diagnostics are data (spec.md §4.8/§7), kept separate from the `tracing`
//! spans the orchestrator emits for the human-facing log trail — the two are
//! not merged (SPEC_FULL.md §4.8).

use grafema_core::plugin::PluginPhase;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Fatal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub phase: PluginPhase,
    pub plugin: String,
    pub code: String,
    pub severity: Severity,
    pub message: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl Diagnostic {
    pub fn warning(
        phase: PluginPhase,
        plugin: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Diagnostic {
            phase,
            plugin: plugin.into(),
            code: code.into(),
            severity: Severity::Warning,
            message: message.into(),
            file: None,
            line: None,
            column: None,
        }
    }

    pub fn fatal(
        phase: PluginPhase,
        plugin: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Diagnostic {
            phase,
            plugin: plugin.into(),
            code: code.into(),
            severity: Severity::Fatal,
            message: message.into(),
            file: None,
            line: None,
            column: None,
        }
    }

    pub fn with_location(mut self, file: impl Into<String>, line: u32, column: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self.severity, Severity::Fatal)
    }
}

/// Accumulates diagnostics across an entire orchestrator run. Addressable by
/// `(phase, plugin)` and stable enough to diff between runs (spec.md §7),
/// since it never reorders — only appends.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    pub fn has_fatal(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_fatal)
    }

    pub fn has_fatal_in_phase(&self, phase: PluginPhase) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.phase == phase && d.is_fatal())
    }

    pub fn all(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn for_phase(&self, phase: PluginPhase) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.phase == phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_detects_fatal_in_specific_phase_only() {
        let mut collector = DiagnosticCollector::new();
        collector.push(Diagnostic::warning(
            PluginPhase::Enrichment,
            "alias-tracker",
            "ERR_DANGLING_EDGE",
            "dropped",
        ));
        assert!(!collector.has_fatal());
        assert!(!collector.has_fatal_in_phase(PluginPhase::Enrichment));

        collector.push(Diagnostic::fatal(
            PluginPhase::Enrichment,
            "import-export-linker",
            "ERR_PLUGIN_THREW",
            "boom",
        ));
        assert!(collector.has_fatal());
        assert!(collector.has_fatal_in_phase(PluginPhase::Enrichment));
        assert!(!collector.has_fatal_in_phase(PluginPhase::Validation));
    }
}
