use async_trait::async_trait;
use futures::StreamExt;
use grafema_core::edge::GraphEdge;
use grafema_core::ids::SemanticId;
use grafema_core::node::GraphNode;
use grafema_core::plugin::{Plugin, PluginContext, PluginMetadata, PluginPhase, PluginResult};
use grafema_core::traits::NodeFilter;
use grafema_core::types::{EdgeType, NodeKind};
use grafema_core::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const CANDIDATE_SUFFIXES: &[&str] = &[
    "", ".ts", ".tsx", ".js", ".jsx", "/index.ts", "/index.tsx", "/index.js", "/index.jsx",
];

/// Resolves relative `import`/re-export specifiers to the module and
/// declaration they actually name, wiring a `DEPENDS_ON` edge from the
/// `Import` node to the `Export` it draws on (spec.md §4.4 cross-module
/// references). Non-relative specifiers (bare package names) are left alone —
/// there is no source file in this graph to point at.
pub struct ImportExportLinker {
    metadata: PluginMetadata,
}

impl ImportExportLinker {
    pub fn new() -> Self {
        ImportExportLinker {
            metadata: PluginMetadata::new("import-export-linker", PluginPhase::Enrichment)
                .with_priority(9),
        }
    }

    fn resolve_module_file(importing_file: &str, specifier: &str, known_files: &[String]) -> Option<String> {
        if !specifier.starts_with('.') {
            return None;
        }
        let base = Path::new(importing_file).parent().unwrap_or_else(|| Path::new(""));
        for suffix in CANDIDATE_SUFFIXES {
            let joined: PathBuf = base.join(format!("{specifier}{suffix}"));
            let normalized = normalize(&joined);
            if let Some(found) = known_files.iter().find(|f| **f == normalized) {
                return Some(found.clone());
            }
        }
        None
    }
}

impl Default for ImportExportLinker {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(path: &Path) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for component in path.components() {
        match component.as_os_str().to_str() {
            Some(".") | None => {}
            Some("..") => {
                parts.pop();
            }
            Some(other) => parts.push(other),
        }
    }
    parts.join("/")
}

#[async_trait]
impl Plugin for ImportExportLinker {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    async fn execute(&self, ctx: &PluginContext) -> Result<PluginResult> {
        let mut modules = ctx.graph.query_nodes(NodeFilter::Kind(NodeKind::Module)).await?;
        let mut known_files = Vec::new();
        while let Some(m) = modules.next().await {
            known_files.push(m.file.clone());
        }

        let mut exports = ctx.graph.query_nodes(NodeFilter::Kind(NodeKind::Export)).await?;
        let mut exports_by_file_and_name: HashMap<(String, String), SemanticId> = HashMap::new();
        while let Some(exp) = exports.next().await {
            if let Some(name) = exp.attr("exported_name").and_then(|v| v.as_str()) {
                exports_by_file_and_name.insert((exp.file.clone(), name.to_string()), exp.id.clone());
            }
        }

        let mut imports = ctx.graph.query_nodes(NodeFilter::Kind(NodeKind::Import)).await?;
        let mut import_nodes: Vec<GraphNode> = Vec::new();
        while let Some(imp) = imports.next().await {
            import_nodes.push(imp);
        }

        let mut warnings = Vec::new();
        let mut created_edges = Vec::new();
        for imp in &import_nodes {
            let Some(specifier) = imp.attr("specifier").and_then(|v| v.as_str()) else {
                continue;
            };
            let Some(target_file) = Self::resolve_module_file(&imp.file, specifier, &known_files) else {
                continue;
            };
            let lookup_name = imp
                .attr("imported_name")
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .unwrap_or("default");
            match exports_by_file_and_name.get(&(target_file.clone(), lookup_name.to_string())) {
                Some(export_id) => {
                    let edge = GraphEdge::new(imp.id.clone(), export_id.clone(), EdgeType::DependsOn);
                    ctx.graph.add_edge(edge.clone()).await?;
                    created_edges.push(edge);
                }
                None => warnings.push(format!(
                    "{}: import {lookup_name:?} not found among exports of {target_file}",
                    imp.file
                )),
            }
        }

        Ok(PluginResult {
            created_edges,
            warnings,
            ..PluginResult::ok()
        })
    }
}
