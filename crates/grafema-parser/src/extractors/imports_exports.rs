use super::Extractor;
use crate::collections::{ExportFact, ImportFact};
use crate::context::BuilderContext;
use grafema_core::types::ImportKind;
use tree_sitter::Node;

/// Step 1: Imports/Exports (spec.md §4.2).
pub struct ImportsExportsExtractor;

impl Extractor for ImportsExportsExtractor {
    fn interested(&self, kind: &str) -> bool {
        matches!(kind, "import_statement" | "export_statement")
    }

    fn visit(&self, node: Node, ctx: &mut BuilderContext) {
        match node.kind() {
            "import_statement" => self.visit_import(node, ctx),
            "export_statement" => self.visit_export(node, ctx),
            _ => {}
        }
    }
}

impl ImportsExportsExtractor {
    fn visit_import(&self, node: Node, ctx: &mut BuilderContext) {
        let Some(source_node) = node.child_by_field_name("source") else {
            return;
        };
        let specifier = ctx.node_text(&source_node).trim_matches(['"', '\'']).to_string();

        let kind = if ctx.node_text(&node).trim_start().starts_with("import type") {
            ImportKind::Type
        } else {
            ImportKind::Value
        };

        let location = ctx.location(&node);

        if let Some(clause) = node.child_by_field_name("import_clause") {
            self.collect_clause(clause, &specifier, kind, ctx, &location);
        } else {
            // Bare `import "side-effect";`
            let pending = ctx
                .ids
                .generate("Import", &specifier, location.line, location.column, 0);
            ctx.collections.imports.push(ImportFact {
                pending_id: pending.slot,
                specifier: specifier.clone(),
                imported_name: None,
                local_name: specifier,
                kind,
                location,
            });
        }
    }

    fn collect_clause(
        &self,
        clause: Node,
        specifier: &str,
        kind: ImportKind,
        ctx: &mut BuilderContext,
        location: &grafema_core::types::Location,
    ) {
        let mut cursor = clause.walk();
        if !cursor.goto_first_child() {
            return;
        }
        loop {
            let n = cursor.node();
            match n.kind() {
                "identifier" => {
                    let local = ctx.node_text(&n);
                    self.push_import(ctx, specifier, None, &local, kind, location);
                }
                "named_imports" => self.collect_named(n, specifier, kind, ctx, location),
                "namespace_import" => {
                    if let Some(local_node) = n.named_child(0) {
                        let local = ctx.node_text(&local_node);
                        self.push_import(ctx, specifier, Some("*".into()), &local, kind, location);
                    }
                }
                _ => {}
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }

    fn collect_named(
        &self,
        named: Node,
        specifier: &str,
        kind: ImportKind,
        ctx: &mut BuilderContext,
        location: &grafema_core::types::Location,
    ) {
        let mut cursor = named.walk();
        for spec in named.named_children(&mut cursor) {
            if spec.kind() != "import_specifier" {
                continue;
            }
            let name_node = spec.child_by_field_name("name");
            let alias_node = spec.child_by_field_name("alias");
            let imported = name_node.map(|n| ctx.node_text(&n));
            let local = alias_node
                .map(|n| ctx.node_text(&n))
                .or_else(|| imported.clone())
                .unwrap_or_default();
            self.push_import(ctx, specifier, imported, &local, kind, location);
        }
    }

    fn push_import(
        &self,
        ctx: &mut BuilderContext,
        specifier: &str,
        imported_name: Option<String>,
        local_name: &str,
        kind: ImportKind,
        location: &grafema_core::types::Location,
    ) {
        let pending = ctx
            .ids
            .generate("Import", local_name, location.line, location.column, 0);
        ctx.collections.imports.push(ImportFact {
            pending_id: pending.slot,
            specifier: specifier.to_string(),
            imported_name,
            local_name: local_name.to_string(),
            kind,
            location: location.clone(),
        });
    }

    fn visit_export(&self, node: Node, ctx: &mut BuilderContext) {
        let location = ctx.location(&node);
        let is_default = ctx.node_text(&node).contains("export default");
        let source = node
            .child_by_field_name("source")
            .map(|n| ctx.node_text(&n).trim_matches(['"', '\'']).to_string());

        if let Some(decl) = node.child_by_field_name("declaration") {
            let name = ctx
                .child_text_by_kinds(decl, &["identifier", "type_identifier"])
                .unwrap_or_else(|| "<default>".to_string());
            let pending = ctx
                .ids
                .generate("Export", &name, location.line, location.column, 0);
            ctx.collections.exports.push(ExportFact {
                pending_id: pending.slot,
                exported_name: name.clone(),
                local_name: Some(name),
                is_default,
                is_reexport: false,
                reexport_source: None,
                location,
            });
            return;
        }

        if let Some(clause) = node.child_by_field_name("export_clause") {
            let mut cursor = clause.walk();
            for spec in clause.named_children(&mut cursor) {
                if spec.kind() != "export_specifier" {
                    continue;
                }
                let name_node = spec.child_by_field_name("name");
                let alias_node = spec.child_by_field_name("alias");
                let local = name_node.map(|n| ctx.node_text(&n)).unwrap_or_default();
                let exported = alias_node
                    .map(|n| ctx.node_text(&n))
                    .unwrap_or_else(|| local.clone());
                let pending =
                    ctx.ids
                        .generate("Export", &exported, location.line, location.column, 0);
                ctx.collections.exports.push(ExportFact {
                    pending_id: pending.slot,
                    exported_name: exported,
                    local_name: Some(local),
                    is_default: false,
                    is_reexport: source.is_some(),
                    reexport_source: source.clone(),
                    location: location.clone(),
                });
            }
        }
    }
}
