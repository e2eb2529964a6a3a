use super::Extractor;
use crate::collections::ModuleAssignmentFact;
use crate::context::BuilderContext;
use tree_sitter::Node;

/// Step 4: bare module-level assignments (`exports.foo = ...`,
/// `module.exports = ...`, `x = function () {}`) that aren't `const`/`let`
/// declarations (spec.md §4.2).
pub struct ModuleAssignmentsExtractor;

impl Extractor for ModuleAssignmentsExtractor {
    fn interested(&self, kind: &str) -> bool {
        kind == "expression_statement"
    }

    fn visit(&self, node: Node, ctx: &mut BuilderContext) {
        let Some(inner) = node.named_child(0) else {
            return;
        };
        if inner.kind() != "assignment_expression" {
            return;
        }
        let Some(left) = inner.child_by_field_name("left") else {
            return;
        };
        let target_name = ctx.node_text(&left);
        let right = inner.child_by_field_name("right");
        let is_function_value = right
            .map(|n| matches!(n.kind(), "function" | "arrow_function" | "function_declaration"))
            .unwrap_or(false);

        let location = ctx.location(&node);
        let pending = ctx
            .ids
            .generate("ModuleAssignment", &target_name, location.line, location.column, 0);

        // The right-hand function expression, if any, is visited after this
        // node in the pre-order walk and hasn't minted its pending id yet;
        // linking assigned_function_pending is left to ArgumentParameterLinker-
        // style enrichment, which matches by enclosing location instead.
        let _ = is_function_value;
        ctx.collections.module_assignments.push(ModuleAssignmentFact {
            pending_id: pending.slot,
            target_name,
            assigned_function_pending: None,
            location,
        });
    }
}
