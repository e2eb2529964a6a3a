use super::support::{has_child_text, unwrap_expression_statement};
use super::Extractor;
use crate::collections::{ConditionRef, InitRef, LoopFact};
use crate::context::BuilderContext;
use tree_sitter::Node;

/// `for`/`for-in`/`for-of`/`while`/`do-while` loops (spec.md §4.3). The body
/// Scope push is driven centrally by `pipeline::walk`; this extractor mints
/// the Scope id the builder attaches HAS_BODY to, plus the iterated-name
/// hint for ITERATES_OVER on `for-in`/`for-of` and the init/condition/update
/// clauses of a classic `for(init;test;update)`.
pub struct LoopsExtractor;

impl Extractor for LoopsExtractor {
    fn interested(&self, kind: &str) -> bool {
        matches!(
            kind,
            "for_statement" | "for_in_statement" | "while_statement" | "do_statement"
        )
    }

    fn visit(&self, node: Node, ctx: &mut BuilderContext) {
        let location = ctx.location(&node);

        let (loop_kind, iterates_name, iterates_mode) = match node.kind() {
            "for_statement" => ("for", None, None),
            "for_in_statement" => {
                let is_of = has_child_text(node, "of", ctx.source);
                let mode = if is_of { "values" } else { "keys" };
                let iterates_name = node
                    .child_by_field_name("right")
                    .filter(|n| n.kind() == "identifier")
                    .map(|n| ctx.node_text(&n));
                let kind = if is_of { "for_of" } else { "for_in" };
                (kind, iterates_name, Some(mode))
            }
            "while_statement" => ("while", None, None),
            "do_statement" => ("do_while", None, None),
            _ => unreachable!(),
        };

        let pending = ctx.ids.generate(
            "Loop",
            iterates_name.as_deref().unwrap_or(loop_kind),
            location.line,
            location.column,
            0,
        );

        let body_scope = node.child_by_field_name("body").map(|body| {
            let body_loc = ctx.location(&body);
            ctx.ids
                .generate_scope("loop_body", loop_kind, body_loc.line, Some(body_loc.column))
                .slot
        });

        let (init, init_text) = if node.kind() == "for_statement" {
            match node.child_by_field_name("initializer") {
                Some(n) if matches!(n.kind(), "variable_declaration" | "lexical_declaration") => {
                    let mut cursor = n.walk();
                    match n
                        .named_children(&mut cursor)
                        .find(|c| c.kind() == "variable_declarator")
                    {
                        Some(declarator) => {
                            let loc = ctx.location(&declarator);
                            (InitRef::Variable { line: loc.line, column: loc.column }, Some(ctx.node_text(&n)))
                        }
                        None => (InitRef::None, None),
                    }
                }
                Some(n) if n.kind() == ";" => (InitRef::None, None),
                Some(n) => {
                    let expr = unwrap_expression_statement(n);
                    let text = ctx.node_text(&expr);
                    let expr_pending =
                        ctx.ids
                            .generate("Expression", &text, location.line, location.column, 0);
                    (InitRef::Expression { pending_id: expr_pending.slot }, Some(text))
                }
                None => (InitRef::None, None),
            }
        } else {
            (InitRef::None, None)
        };

        let (condition, condition_text) = if node.kind() == "for_statement" {
            match node.child_by_field_name("condition") {
                Some(n) if n.kind() == ";" => (ConditionRef::None, None),
                Some(n) => {
                    let expr = unwrap_expression_statement(n);
                    let text = ctx.node_text(&expr);
                    let condition = if expr.kind() == "call_expression" {
                        let call_loc = ctx.location(&expr);
                        ConditionRef::CallSite { line: call_loc.line, column: call_loc.column }
                    } else {
                        let expr_pending = ctx.ids.generate(
                            "Expression",
                            &text,
                            location.line,
                            location.column,
                            1,
                        );
                        ConditionRef::Expression { pending_id: expr_pending.slot }
                    };
                    (condition, Some(text))
                }
                None => (ConditionRef::None, None),
            }
        } else if node.kind() == "while_statement" || node.kind() == "do_statement" {
            let condition_node = node.child_by_field_name("condition");
            let text = condition_node.map(|n| ctx.node_text(&n));
            (ConditionRef::None, text)
        } else {
            (ConditionRef::None, None)
        };

        let (update, update_text) = if node.kind() == "for_statement" {
            match node.child_by_field_name("update") {
                Some(n) => {
                    let text = ctx.node_text(&n);
                    let update = if n.kind() == "call_expression" {
                        let call_loc = ctx.location(&n);
                        ConditionRef::CallSite { line: call_loc.line, column: call_loc.column }
                    } else {
                        let expr_pending = ctx.ids.generate(
                            "Expression",
                            &text,
                            location.line,
                            location.column,
                            2,
                        );
                        ConditionRef::Expression { pending_id: expr_pending.slot }
                    };
                    (update, Some(text))
                }
                None => (ConditionRef::None, None),
            }
        } else {
            (ConditionRef::None, None)
        };

        ctx.collections.loops.push(LoopFact {
            pending_id: pending.slot,
            loop_kind,
            body_scope,
            iterates_name,
            iterates_mode,
            init,
            init_text,
            condition,
            condition_text,
            update,
            update_text,
            location,
        });
    }
}
