use super::support::single_inner_expr;
use super::Extractor;
use crate::collections::{BranchFact, BranchKind, ConditionRef};
use crate::context::BuilderContext;
use tree_sitter::Node;

/// Step 12: `if`/`else`/`else if` chains (spec.md §4.3). Body recursion
/// (scope push for the consequent/alternate) is driven centrally by
/// `pipeline::walk`; this extractor only records the branch fact plus the
/// Scope ids the builder will attach HAS_CONSEQUENT/HAS_ALTERNATE to.
pub struct IfStatementExtractor;

impl Extractor for IfStatementExtractor {
    fn interested(&self, kind: &str) -> bool {
        kind == "if_statement"
    }

    fn visit(&self, node: Node, ctx: &mut BuilderContext) {
        let location = ctx.location(&node);

        let condition_node = node.child_by_field_name("condition").map(single_inner_expr);
        let condition_text = condition_node
            .map(|n| ctx.node_text(&n))
            .unwrap_or_default();

        let condition = match condition_node {
            Some(n) if n.kind() == "call_expression" => {
                let call_loc = ctx.location(&n);
                ConditionRef::CallSite {
                    line: call_loc.line,
                    column: call_loc.column,
                }
            }
            Some(_) => {
                let expr_pending = ctx.ids.generate(
                    "Expression",
                    &condition_text,
                    location.line,
                    location.column,
                    0,
                );
                ConditionRef::Expression {
                    pending_id: expr_pending.slot,
                }
            }
            None => ConditionRef::None,
        };

        let pending = ctx
            .ids
            .generate("Branch", &condition_text, location.line, location.column, 0);

        let consequent_scope = node.child_by_field_name("consequence").map(|cons| {
            let cons_loc = ctx.location(&cons);
            ctx.ids
                .generate_scope("if_statement", &condition_text, cons_loc.line, Some(cons_loc.column))
                .slot
        });

        let alternative = node.child_by_field_name("alternative");
        let (alternate_scope, alternate_if_location) = match alternative {
            Some(alt) if alt.kind() == "if_statement" => {
                let alt_loc = ctx.location(&alt);
                (None, Some((alt_loc.line, alt_loc.column)))
            }
            Some(alt) => {
                let alt_loc = ctx.location(&alt);
                let slot = ctx
                    .ids
                    .generate_scope("else_statement", &condition_text, alt_loc.line, Some(alt_loc.column))
                    .slot;
                (Some(slot), None)
            }
            None => (None, None),
        };

        ctx.collections.branches.push(BranchFact {
            pending_id: pending.slot,
            branch_kind: BranchKind::If,
            condition_text,
            condition,
            consequent_scope,
            alternate_scope,
            alternate_if_location,
            location,
        });
    }
}
