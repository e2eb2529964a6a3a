use thiserror::Error;

/// Error taxonomy for the analysis core (see spec §7). A `CodeGraphError` is
/// what the orchestrator converts into an aborting run; recoverable problems
/// stay `Diagnostic` values instead (see `grafema-engine::diagnostics`).
#[derive(Error, Debug)]
pub enum CodeGraphError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Graph error: {0}")]
    Graph(String),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Plugin '{plugin}' threw: {message}")]
    PluginThrew { plugin: String, message: String },

    #[error("Strict mode: {0}")]
    StrictMode(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, CodeGraphError>;
