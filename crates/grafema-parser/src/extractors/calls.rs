use super::Extractor;
use crate::collections::{CallArgumentFact, CallFact};
use crate::context::BuilderContext;
use tree_sitter::Node;

/// Step 8: call expressions and their arguments, including module-level
/// callbacks — a callback is just a call whose argument happens to be a
/// function expression, so no separate pass is needed (spec.md §4.2 step 8
/// folds into this one).
pub struct CallsExtractor;

impl Extractor for CallsExtractor {
    fn interested(&self, kind: &str) -> bool {
        kind == "call_expression"
    }

    fn visit(&self, node: Node, ctx: &mut BuilderContext) {
        let Some(callee) = node.child_by_field_name("function") else {
            return;
        };
        let callee_name = ctx.node_text(&callee);

        let is_awaited = node
            .parent()
            .map(|p| p.kind() == "await_expression")
            .unwrap_or(false);

        let location = ctx.location(&node);
        let pending = ctx.ids.generate(
            "Call",
            &callee_name,
            location.line,
            location.column,
            0,
        );

        ctx.collections.calls.push(CallFact {
            pending_id: pending.slot,
            callee_name,
            enclosing_function: ctx.current_function(),
            is_awaited,
            is_inside_loop: ctx.is_inside_loop(),
            location: location.clone(),
        });

        if let Some(args) = node.child_by_field_name("arguments") {
            let mut cursor = args.walk();
            let mut index = 0u32;
            for arg in args.named_children(&mut cursor) {
                let is_spread = arg.kind() == "spread_element";
                let arg_loc = ctx.location(&arg);
                let arg_pending = ctx.ids.generate(
                    "CallArgument",
                    &format!("{}#{}", pending.base, index),
                    arg_loc.line,
                    arg_loc.column,
                    index,
                );

                let is_nested_call = arg.kind() == "call_expression";
                let value_identifier =
                    (arg.kind() == "identifier").then(|| ctx.node_text(&arg));
                let raw_text = ctx.node_text(&arg);

                // Value resolution (LITERAL / VARIABLE / PARAMETER / nested
                // CALL / EXPRESSION, spec.md §4.2) happens in the builder at
                // build time: a nested call's own `CallFact` is looked up by
                // this same `(line, column)`, a literal argument's own
                // `LiteralFact` likewise, and an identifier argument is
                // resolved against `local_names`/parameters.
                ctx.collections.call_arguments.push(CallArgumentFact {
                    pending_id: arg_pending.slot,
                    call_pending: pending.slot,
                    arg_index: index,
                    is_spread,
                    is_nested_call,
                    value_identifier,
                    raw_text,
                    location: arg_loc,
                });
                index += 1;
            }
        }
    }
}
