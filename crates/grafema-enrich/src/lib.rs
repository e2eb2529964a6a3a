//! Cross-file enrichment resolvers (spec.md §4.4). Each enricher is a
//! `grafema_core::Plugin` that runs in the ENRICHMENT phase, reads the graph
//! built by per-file extraction, and adds edges/attributes it can derive
//! with more context than a single file gives — never erroring on a missing
//! or unresolved node, since a module another enricher depends on may not
//! have analyzed yet (idempotent, diagnostic-not-throw, spec.md §4.4 design
//! note).

pub mod alias_tracker;
pub mod argument_parameter_linker;
pub mod import_export_linker;
pub mod instanceof_resolver;
pub mod method_call_resolver;
pub mod value_domain_analyzer;

pub use alias_tracker::AliasTracker;
pub use argument_parameter_linker::ArgumentParameterLinker;
pub use import_export_linker::ImportExportLinker;
pub use instanceof_resolver::InstanceOfResolver;
pub use method_call_resolver::MethodCallResolver;
pub use value_domain_analyzer::ValueDomainAnalyzer;
