use super::Extractor;
use crate::collections::{ClassInstantiationFact, NewExpressionFact, PromiseExecutorFact};
use crate::context::BuilderContext;
use tree_sitter::Node;

/// Step 11: `new Foo(...)` instantiations (spec.md §4.2), including the
/// `new Promise((resolve, reject) => …)` executor pattern (spec.md §4.4).
pub struct NewExpressionExtractor;

impl Extractor for NewExpressionExtractor {
    fn interested(&self, kind: &str) -> bool {
        kind == "new_expression"
    }

    fn visit(&self, node: Node, ctx: &mut BuilderContext) {
        let Some(constructor) = node.child_by_field_name("constructor") else {
            return;
        };
        let constructor_name = ctx.node_text(&constructor);

        let location = ctx.location(&node);
        let pending = ctx.ids.generate(
            "NewExpression",
            &constructor_name,
            location.line,
            location.column,
            0,
        );

        if constructor_name == "Promise" {
            if let Some(args) = node.child_by_field_name("arguments") {
                let mut cursor = args.walk();
                if let Some(executor) = args
                    .named_children(&mut cursor)
                    .find(|a| matches!(a.kind(), "arrow_function" | "function"))
                {
                    let (resolve_name, reject_name) = executor
                        .child_by_field_name("parameters")
                        .map(|params| {
                            let mut pcursor = params.walk();
                            let names: Vec<String> = params
                                .named_children(&mut pcursor)
                                .map(|p| ctx.node_text(&p))
                                .collect();
                            (names.first().cloned(), names.get(1).cloned())
                        })
                        .unwrap_or((None, None));
                    ctx.collections.promise_executors.push(PromiseExecutorFact {
                        promise_pending: pending.slot,
                        executor_location: ctx.location(&executor),
                        resolve_name,
                        reject_name,
                    });
                }
            }
        }

        ctx.collections.new_expressions.push(NewExpressionFact {
            pending_id: pending.slot,
            constructor_name: constructor_name.clone(),
            location: location.clone(),
        });

        ctx.collections.class_instantiations.push(ClassInstantiationFact {
            pending_id: pending.slot,
            class_name: constructor_name,
            enclosing_function: ctx.current_function(),
            location,
        });
    }
}
