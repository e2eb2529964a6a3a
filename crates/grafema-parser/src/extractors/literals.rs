use super::Extractor;
use crate::collections::{LiteralFact, LiteralKind};
use crate::context::BuilderContext;
use tree_sitter::Node;

/// Step 14: the universal literal visitor — runs last so every other
/// extractor gets first look at a node before it's reduced to a bare literal
/// fact (spec.md §4.2).
pub struct LiteralsExtractor;

impl Extractor for LiteralsExtractor {
    fn interested(&self, kind: &str) -> bool {
        matches!(
            kind,
            "string" | "number" | "true" | "false" | "null" | "undefined" | "regex" | "template_string"
        )
    }

    fn visit(&self, node: Node, ctx: &mut BuilderContext) {
        let kind = match node.kind() {
            "string" => LiteralKind::String,
            "number" => LiteralKind::Number,
            "true" | "false" => LiteralKind::Boolean,
            "null" => LiteralKind::Null,
            "undefined" => LiteralKind::Undefined,
            "regex" => LiteralKind::RegExp,
            "template_string" => LiteralKind::Template,
            _ => return,
        };

        let raw_text = ctx.node_text(&node);
        let location = ctx.location(&node);
        let pending = ctx
            .ids
            .generate("Literal", &raw_text, location.line, location.column, 0);

        ctx.collections.literals.push(LiteralFact {
            pending_id: pending.slot,
            kind,
            raw_text,
            location,
        });
    }
}
