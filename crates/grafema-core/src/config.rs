use std::{env, path::PathBuf};

use anyhow::{Context, Result};
use config as cfg;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One entry in `.grafema/config.yaml`'s plugin list (spec.md §6.3): a
/// plugin name plus whatever opaque config that plugin's `PluginContext`
/// needs, kept as a raw YAML value so the core crate doesn't need to know
/// every plugin's config shape.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PluginEntry {
    pub name: String,
    #[serde(default)]
    pub config: serde_yaml::Value,
}

/// A declared service root within a multi-service repository (spec.md §1,
/// §2): one analyzable unit under the project root.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct ServiceConfig {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

/// The engine's resolved configuration: what `.grafema/config.yaml` declares
/// plus environment overrides, matching the scope `PluginContext.config`
/// and the orchestrator need (spec.md §6.2/§6.3). Server, database, vector,
/// and secrets concerns from the teacher's equivalent `Settings` struct are
/// out of scope here — this crate never talks to a storage backend directly.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EngineConfig {
    #[serde(default = "EngineConfig::default_env")]
    pub env: String,
    pub services: Vec<ServiceConfig>,
    pub plugins: Vec<PluginEntry>,
    #[serde(default = "EngineConfig::default_worker_count")]
    pub worker_count: usize,
    #[serde(default)]
    pub strict_mode: bool,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            env: Self::default_env(),
            services: Vec::new(),
            plugins: Vec::new(),
            worker_count: Self::default_worker_count(),
            strict_mode: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl EngineConfig {
    fn default_env() -> String {
        env::var("APP_ENV")
            .ok()
            .or_else(|| env::var("RUST_ENV").ok())
            .unwrap_or_else(|| "development".to_string())
    }

    fn default_worker_count() -> usize {
        num_cpus::get().max(1)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.worker_count > 0, "worker_count must be > 0");
        for svc in &self.services {
            anyhow::ensure!(
                !svc.path.trim().is_empty(),
                "service '{}' has an empty path",
                svc.name
            );
        }
        Ok(())
    }

    /// Loads `<project_root>/.grafema/config.yaml`, overlaid with
    /// `GRAFEMA__*`-prefixed environment variables (spec.md §6.3 file,
    /// matching the teacher's layered `config` crate usage).
    pub fn load(project_root: &std::path::Path) -> Result<Self> {
        let config_path = project_root.join(".grafema").join("config.yaml");
        let builder = cfg::Config::builder()
            .add_source(cfg::File::from(config_path).required(false))
            .add_source(cfg::Environment::with_prefix("GRAFEMA").separator("__"));

        let settings: EngineConfig = builder
            .build()
            .context("building grafema configuration")?
            .try_deserialize()
            .context("deserializing grafema configuration")?;
        Ok(settings)
    }

    pub fn manifest_path(project_root: &std::path::Path) -> PathBuf {
        project_root.join(".grafema").join("manifest")
    }

    pub fn plugins_dir(project_root: &std::path::Path) -> PathBuf {
        project_root.join(".grafema").join("plugins")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_worker_count() {
        let cfg = EngineConfig::default();
        assert!(cfg.worker_count >= 1);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_service_path() {
        let mut cfg = EngineConfig::default();
        cfg.services.push(ServiceConfig {
            name: "svc".into(),
            path: "".into(),
            exclude: vec![],
        });
        assert!(cfg.validate().is_err());
    }
}
