use super::Extractor;
use crate::collections::PropertyAccessFact;
use crate::context::BuilderContext;
use tree_sitter::Node;

/// Step 10: member expressions (`obj.prop`), used by later enrichment to
/// resolve method calls and aliasing (spec.md §4.2, §4.4).
pub struct PropertyAccessExtractor;

impl Extractor for PropertyAccessExtractor {
    fn interested(&self, kind: &str) -> bool {
        kind == "member_expression"
    }

    fn visit(&self, node: Node, ctx: &mut BuilderContext) {
        let Some(object) = node.child_by_field_name("object") else {
            return;
        };
        let Some(property) = node.child_by_field_name("property") else {
            return;
        };
        if object.kind() != "identifier" {
            return;
        }

        let object_name = ctx.node_text(&object);
        let property_name = ctx.node_text(&property);

        let location = ctx.location(&node);
        let pending = ctx.ids.generate(
            "PropertyAccess",
            &format!("{object_name}.{property_name}"),
            location.line,
            location.column,
            0,
        );

        ctx.collections.property_accesses.push(PropertyAccessFact {
            pending_id: pending.slot,
            object_name,
            property_name,
            location,
        });
    }
}
