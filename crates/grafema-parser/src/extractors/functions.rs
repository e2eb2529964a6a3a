use super::Extractor;
use crate::collections::{FunctionFact, ParameterFact};
use crate::context::BuilderContext;
use tree_sitter::Node;

/// Step 3: function declarations, function expressions, and arrow functions
/// (spec.md §4.2). Pushes a lexical scope frame and the current-function
/// marker so nested calls/returns attribute correctly.
pub struct FunctionsExtractor;

impl Extractor for FunctionsExtractor {
    fn interested(&self, kind: &str) -> bool {
        matches!(
            kind,
            "function_declaration" | "function" | "arrow_function" | "generator_function_declaration"
        )
    }

    fn visit(&self, node: Node, ctx: &mut BuilderContext) {
        let is_async = ctx.node_text(&node).trim_start().starts_with("async");
        let is_arrow = node.kind() == "arrow_function";
        let is_generator = node.kind() == "generator_function_declaration" || ctx.node_text(&node).contains('*');

        let name = node
            .child_by_field_name("name")
            .map(|n| ctx.node_text(&n))
            .unwrap_or_else(|| "<anonymous>".to_string());

        let location = ctx.location(&node);
        let scope_ctx = ctx.scope.context_at(location.line, location.column);
        let fn_pending = ctx.ids.generate_simple("Function", &name, &scope_ctx);

        // The body's own scope frame and the current-function marker are
        // pushed/popped by the central walk (pipeline::walk) around its
        // recursion into this node's children, not here — `visit` only
        // records facts for the node it's handed.
        let scope_pending = ctx.ids.generate_scope("function_body", &name, location.line, None);

        if let Some(params) = node.child_by_field_name("parameters") {
            let mut cursor = params.walk();
            let mut index = 0u32;
            for param in params.named_children(&mut cursor) {
                let (pname, is_rest, has_default) = match param.kind() {
                    "identifier" => (ctx.node_text(&param), false, false),
                    "rest_pattern" => (ctx.node_text(&param).trim_start_matches("...").to_string(), true, false),
                    "assignment_pattern" => {
                        let pname = param
                            .child_by_field_name("left")
                            .map(|n| ctx.node_text(&n))
                            .unwrap_or_default();
                        (pname, false, true)
                    }
                    _ => (ctx.node_text(&param), false, false),
                };
                let ploc = ctx.location(&param);
                let ppending = ctx.ids.generate(
                    "Parameter",
                    &pname,
                    ploc.line,
                    ploc.column,
                    index,
                );
                ctx.collections.parameters.push(ParameterFact {
                    pending_id: ppending.slot,
                    function_pending: fn_pending.slot,
                    name: pname,
                    index,
                    is_rest,
                    has_default,
                    location: ploc,
                });
                index += 1;
            }
        }

        ctx.collections.functions.push(FunctionFact {
            pending_id: fn_pending.slot,
            name,
            is_async,
            is_arrow,
            is_generator,
            scope_pending: scope_pending.slot,
            location,
        });
    }
}
