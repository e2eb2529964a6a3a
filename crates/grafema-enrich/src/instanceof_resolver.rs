use async_trait::async_trait;
use futures::StreamExt;
use grafema_core::edge::GraphEdge;
use grafema_core::ids::SemanticId;
use grafema_core::plugin::{Plugin, PluginContext, PluginMetadata, PluginPhase, PluginResult};
use grafema_core::traits::NodeFilter;
use grafema_core::types::{EdgeType, NodeKind};
use grafema_core::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const CANDIDATE_SUFFIXES: &[&str] = &[
    "", ".ts", ".tsx", ".js", ".jsx", "/index.ts", "/index.tsx", "/index.js", "/index.jsx",
];

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

/// Resolves `new Foo()` where `Foo` is imported rather than declared in the
/// same file (spec.md §4.4) — `GraphBuilder` already wires the same-file case
/// via `local_names` at build time, this covers the cross-module one.
pub struct InstanceOfResolver {
    metadata: PluginMetadata,
}

impl InstanceOfResolver {
    pub fn new() -> Self {
        InstanceOfResolver {
            metadata: PluginMetadata::new("instanceof-resolver", PluginPhase::Enrichment)
                .with_priority(7)
                .with_dependencies(vec!["import-export-linker".to_string()]),
        }
    }
}

impl Default for InstanceOfResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Plugin for InstanceOfResolver {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    async fn execute(&self, ctx: &PluginContext) -> Result<PluginResult> {
        let mut modules = ctx.graph.query_nodes(NodeFilter::Kind(NodeKind::Module)).await?;
        let mut known_files = Vec::new();
        while let Some(m) = modules.next().await {
            known_files.push(m.file.clone());
        }

        let mut imports = ctx.graph.query_nodes(NodeFilter::Kind(NodeKind::Import)).await?;
        let mut imports_by_file_and_name = HashMap::new();
        while let Some(imp) = imports.next().await {
            if let Some(local_name) = imp.attr("local_name").and_then(|v| v.as_str()) {
                if let Some(specifier) = imp.attr("specifier").and_then(|v| v.as_str()) {
                    imports_by_file_and_name
                        .insert((imp.file.clone(), local_name.to_string()), specifier.to_string());
                }
            }
        }

        let mut classes = ctx.graph.query_nodes(NodeFilter::Kind(NodeKind::Class)).await?;
        let mut classes_by_file_and_name: HashMap<(String, String), SemanticId> = HashMap::new();
        while let Some(c) = classes.next().await {
            if let Some(name) = c.attr("name").and_then(|v| v.as_str()) {
                classes_by_file_and_name.insert((c.file.clone(), name.to_string()), c.id.clone());
            }
        }

        let mut calls = ctx.graph.query_nodes(NodeFilter::Kind(NodeKind::Call)).await?;
        let mut new_calls = Vec::new();
        while let Some(call) = calls.next().await {
            if call.attr("is_new").and_then(|v| v.as_bool()) == Some(true) {
                new_calls.push(call);
            }
        }

        let mut created_edges = Vec::new();
        for call in new_calls {
            let Some(constructor) = call.attr("constructor").and_then(|v| v.as_str()) else {
                continue;
            };
            if !ctx
                .graph
                .get_outgoing_edges(&call.id, Some(&[EdgeType::InstanceOf]))
                .await?
                .is_empty()
            {
                continue;
            }
            let Some(specifier) =
                imports_by_file_and_name.get(&(call.file.clone(), constructor.to_string()))
            else {
                continue;
            };
            let Some(target_file) = resolve_module_file(&call.file, specifier, &known_files) else {
                continue;
            };
            if let Some(class_id) = classes_by_file_and_name.get(&(target_file, constructor.to_string())) {
                let edge = GraphEdge::new(call.id.clone(), class_id.clone(), EdgeType::InstanceOf);
                ctx.graph.add_edge(edge.clone()).await?;
                created_edges.push(edge);
            }
        }

        Ok(PluginResult {
            created_edges,
            ..PluginResult::ok()
        })
    }
}
