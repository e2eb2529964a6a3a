use super::Extractor;
use crate::collections::TopLevelAwaitFact;
use crate::context::BuilderContext;
use tree_sitter::Node;

/// Step 9: top-level `await` / `for await (... of ...)` (spec.md §4.2).
/// Only fires when there's no enclosing function — a nested `await` belongs
/// to its enclosing async function and is already captured via CallsExtractor.
pub struct TopLevelAwaitExtractor;

impl Extractor for TopLevelAwaitExtractor {
    fn interested(&self, kind: &str) -> bool {
        matches!(kind, "await_expression" | "for_in_statement")
    }

    fn visit(&self, node: Node, ctx: &mut BuilderContext) {
        if ctx.current_function().is_some() {
            return;
        }

        let is_for_await_of = node.kind() == "for_in_statement"
            && ctx.node_text(&node).trim_start().starts_with("for await");
        if node.kind() == "for_in_statement" && !is_for_await_of {
            return;
        }

        let location = ctx.location(&node);
        let pending = ctx
            .ids
            .generate("TopLevelAwait", "await", location.line, location.column, 0);

        ctx.collections.has_top_level_await = true;
        ctx.collections.top_level_awaits.push(TopLevelAwaitFact {
            pending_id: pending.slot,
            is_for_await_of,
            location,
        });
    }
}
