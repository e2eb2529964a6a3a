use super::support::unwrap_initializer;
use super::Extractor;
use crate::collections::{
    ArrayElementFact, ArrayLiteralFact, ObjectLiteralFact, ObjectPropertyFact, VariableFact,
};
use crate::context::BuilderContext;
use tree_sitter::Node;

/// Step 2: top-level variable declarations (spec.md §4.2, §4.2.1
/// `trackVariableAssignment`). The initializer classifier is a strictly
/// ordered match: unwrap await/type-assertion wrappers, then object/array
/// literals (each materialised as its own node here, since composite
/// literals need children), then primitive literal, call, identifier, new,
/// function/arrow, member expression; anything else is kept as raw text so
/// `GraphBuilder` can still derive best-effort `DERIVES_FROM` edges from
/// whatever identifiers it references.
pub struct VariablesExtractor;

impl Extractor for VariablesExtractor {
    fn interested(&self, kind: &str) -> bool {
        matches!(kind, "lexical_declaration" | "variable_declaration")
    }

    fn visit(&self, node: Node, ctx: &mut BuilderContext) {
        let is_const = ctx.node_text(&node).trim_start().starts_with("const");
        let mut cursor = node.walk();
        for declarator in node.named_children(&mut cursor) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let Some(name_node) = declarator.child_by_field_name("name") else {
                continue;
            };
            let is_destructured =
                matches!(name_node.kind(), "object_pattern" | "array_pattern");
            let name = ctx.node_text(&name_node);

            let location = ctx.location(&declarator);
            let pending = ctx
                .ids
                .generate_simple("Variable", &name, &ctx.scope.context_at(location.line, location.column));

            let value_node = declarator.child_by_field_name("value").map(unwrap_initializer);

            let mut initializer_name = None;
            let mut initializer_member = None;
            let mut initializer_literal = None;
            let mut initializer_is_call = false;
            let mut initializer_is_new = false;
            let mut initializer_is_function = false;
            let mut initializer_literal_pending = None;
            let mut initializer_raw = None;
            let initializer_location = value_node.map(|v| ctx.location(&v));

            if let Some(v) = value_node {
                match v.kind() {
                    "object" => {
                        initializer_literal_pending = Some(extract_object_literal(&v, ctx));
                    }
                    "array" => {
                        initializer_literal_pending = Some(extract_array_literal(&v, ctx));
                    }
                    "string" | "number" | "true" | "false" | "null" | "undefined" | "template_string" => {
                        initializer_literal = Some(ctx.node_text(&v));
                    }
                    "call_expression" => {
                        initializer_is_call = true;
                    }
                    "identifier" => {
                        initializer_name = Some(ctx.node_text(&v));
                    }
                    "new_expression" => {
                        initializer_is_new = true;
                    }
                    "function" | "arrow_function" | "generator_function" => {
                        initializer_is_function = true;
                    }
                    "member_expression" => {
                        if v.child_by_field_name("object")
                            .map(|o| o.kind() == "identifier")
                            .unwrap_or(false)
                        {
                            initializer_member = Some(ctx.node_text(&v));
                        } else {
                            initializer_raw = Some(ctx.node_text(&v));
                        }
                    }
                    // BinaryExpression, ConditionalExpression (ternary_expression),
                    // LogicalExpression, UnaryExpression, TaggedTemplateExpression,
                    // ClassExpression, OptionalCallExpression, OptionalMemberExpression,
                    // SequenceExpression, YieldExpression, AssignmentExpression, and
                    // any other shape: no dedicated edge, but the raw text still
                    // feeds `GraphBuilder`'s best-effort identifier scan.
                    _ => {
                        initializer_raw = Some(ctx.node_text(&v));
                    }
                }
            }

            ctx.collections.variables.push(VariableFact {
                pending_id: pending.slot,
                name,
                is_const,
                is_destructured,
                initializer_pending: None,
                initializer_name,
                initializer_member,
                initializer_literal,
                initializer_is_call,
                initializer_is_new,
                initializer_is_function,
                initializer_literal_pending,
                initializer_raw,
                initializer_location,
                location,
            });
        }
    }
}

/// Materialises an `ObjectExpression` initializer as an `ObjectLiteralFact`
/// plus one `ObjectPropertyFact` per `pair`/shorthand property (spec.md
/// §4.2.1). Returns the literal's own pending slot so the variable can
/// `DERIVES_FROM` it directly.
fn extract_object_literal(node: &Node, ctx: &mut BuilderContext) -> grafema_core::ids::PendingSlot {
    let location = ctx.location(node);
    let pending = ctx.ids.generate("ObjectLiteral", "object", location.line, location.column, 0);

    let mut cursor = node.walk();
    let mut index = 0u32;
    for prop in node.named_children(&mut cursor) {
        let (key, value_node) = match prop.kind() {
            "pair" => {
                let key = prop
                    .child_by_field_name("key")
                    .map(|k| ctx.node_text(&k))
                    .unwrap_or_default();
                (key, prop.child_by_field_name("value"))
            }
            "shorthand_property_identifier" => (ctx.node_text(&prop), Some(prop)),
            "spread_element" => ("...".to_string(), prop.named_child(0)),
            _ => continue,
        };
        let value_text = value_node.map(|v| ctx.node_text(&v)).unwrap_or_default();
        let prop_loc = ctx.location(&prop);
        let prop_pending = ctx.ids.generate("ObjectProperty", &key, prop_loc.line, prop_loc.column, index);
        ctx.collections.object_properties.push(ObjectPropertyFact {
            pending_id: prop_pending.slot,
            object_pending: pending.slot,
            key,
            value_text,
            location: prop_loc,
        });
        index += 1;
    }

    ctx.collections.object_literals.push(ObjectLiteralFact {
        pending_id: pending.slot,
        location,
    });
    pending.slot
}

/// Materialises an `ArrayExpression` initializer as an `ArrayLiteralFact`
/// plus one `ArrayElementFact` per element.
fn extract_array_literal(node: &Node, ctx: &mut BuilderContext) -> grafema_core::ids::PendingSlot {
    let location = ctx.location(node);
    let pending = ctx.ids.generate("ArrayLiteral", "array", location.line, location.column, 0);

    let mut cursor = node.walk();
    let mut index = 0u32;
    for element in node.named_children(&mut cursor) {
        let value_text = ctx.node_text(&element);
        let elem_loc = ctx.location(&element);
        let elem_pending = ctx.ids.generate(
            "ArrayElement",
            &format!("{}#{}", pending.base, index),
            elem_loc.line,
            elem_loc.column,
            index,
        );
        ctx.collections.array_elements.push(ArrayElementFact {
            pending_id: elem_pending.slot,
            array_pending: pending.slot,
            index,
            value_text,
            location: elem_loc,
        });
        index += 1;
    }

    ctx.collections.array_literals.push(ArrayLiteralFact {
        pending_id: pending.slot,
        location,
    });
    pending.slot
}
