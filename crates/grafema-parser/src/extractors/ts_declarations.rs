use super::Extractor;
use crate::collections::{TsDeclarationFact, TsDeclarationKind};
use crate::context::BuilderContext;
use tree_sitter::Node;

/// Step 7: TypeScript-only declarations — interfaces, type aliases, enums
/// (spec.md §4.2).
pub struct TsDeclarationsExtractor;

impl Extractor for TsDeclarationsExtractor {
    fn interested(&self, kind: &str) -> bool {
        matches!(
            kind,
            "interface_declaration" | "type_alias_declaration" | "enum_declaration"
        )
    }

    fn visit(&self, node: Node, ctx: &mut BuilderContext) {
        let kind = match node.kind() {
            "interface_declaration" => TsDeclarationKind::Interface,
            "type_alias_declaration" => TsDeclarationKind::TypeAlias,
            "enum_declaration" => TsDeclarationKind::Enum,
            _ => return,
        };

        let name = node
            .child_by_field_name("name")
            .map(|n| ctx.node_text(&n))
            .unwrap_or_else(|| "<anonymous>".to_string());

        let location = ctx.location(&node);
        let scope_ctx = ctx.scope.context_at(location.line, location.column);
        let pending = ctx.ids.generate_simple("TsDeclaration", &name, &scope_ctx);

        ctx.collections.ts_declarations.push(TsDeclarationFact {
            pending_id: pending.slot,
            name,
            kind,
            location,
        });
    }
}
