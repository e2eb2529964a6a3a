use super::support::single_inner_expr;
use super::Extractor;
use crate::collections::{BranchFact, BranchKind, CaseFact, ConditionRef};
use crate::context::BuilderContext;
use tree_sitter::Node;

/// Switch statements (spec.md §4.3): one Branch plus one Case per
/// `switch_case`/`switch_default` arm, linked via HAS_CASE/HAS_DEFAULT.
pub struct SwitchStatementExtractor;

impl Extractor for SwitchStatementExtractor {
    fn interested(&self, kind: &str) -> bool {
        kind == "switch_statement"
    }

    fn visit(&self, node: Node, ctx: &mut BuilderContext) {
        let location = ctx.location(&node);

        let discriminant = node.child_by_field_name("value").map(single_inner_expr);
        let condition_text = discriminant
            .map(|n| ctx.node_text(&n))
            .unwrap_or_default();

        let condition = match discriminant {
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

        let branch_pending = ctx
            .ids
            .generate("Branch", &condition_text, location.line, location.column, 0);

        ctx.collections.branches.push(BranchFact {
            pending_id: branch_pending.slot,
            branch_kind: BranchKind::Switch,
            condition_text,
            condition,
            consequent_scope: None,
            alternate_scope: None,
            alternate_if_location: None,
            location,
        });

        let Some(body) = node.child_by_field_name("body") else {
            return;
        };
        let mut cursor = body.walk();
        for case in body.children(&mut cursor) {
            match case.kind() {
                "switch_case" => {
                    let case_loc = ctx.location(&case);
                    let test_text = case.child_by_field_name("value").map(|n| ctx.node_text(&n));
                    let case_pending = ctx.ids.generate(
                        "Case",
                        test_text.as_deref().unwrap_or("case"),
                        case_loc.line,
                        case_loc.column,
                        0,
                    );
                    ctx.collections.cases.push(CaseFact {
                        pending_id: case_pending.slot,
                        branch_pending: branch_pending.slot,
                        is_default: false,
                        test_text,
                        location: case_loc,
                    });
                }
                "switch_default" => {
                    let case_loc = ctx.location(&case);
                    let case_pending =
                        ctx.ids
                            .generate("Case", "default", case_loc.line, case_loc.column, 0);
                    ctx.collections.cases.push(CaseFact {
                        pending_id: case_pending.slot,
                        branch_pending: branch_pending.slot,
                        is_default: true,
                        test_text: None,
                        location: case_loc,
                    });
                }
                _ => {}
            }
        }
    }
}
