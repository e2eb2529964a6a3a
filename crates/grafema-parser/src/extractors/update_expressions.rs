use super::Extractor;
use crate::collections::UpdateExpressionFact;
use crate::context::BuilderContext;
use tree_sitter::Node;

/// Step 5: module-level `i++`/`--i` update expressions (spec.md §4.2).
pub struct UpdateExpressionsExtractor;

impl Extractor for UpdateExpressionsExtractor {
    fn interested(&self, kind: &str) -> bool {
        kind == "update_expression"
    }

    fn visit(&self, node: Node, ctx: &mut BuilderContext) {
        let is_prefix = node
            .child(0)
            .map(|c| matches!(c.kind(), "++" | "--"))
            .unwrap_or(false);

        let operand = if is_prefix { node.child(1) } else { node.child(0) };
        let Some(operand) = operand else { return };
        let operand_name = ctx.node_text(&operand);

        let text = ctx.node_text(&node);
        let operator = if text.contains("++") { "++" } else { "--" }.to_string();

        let location = ctx.location(&node);
        let pending = ctx
            .ids
            .generate("UpdateExpression", &operand_name, location.line, location.column, 0);

        ctx.collections.update_expressions.push(UpdateExpressionFact {
            pending_id: pending.slot,
            operand_name,
            operator,
            is_prefix,
            location,
        });
    }
}
