use super::Extractor;
use crate::collections::ClassFact;
use crate::context::BuilderContext;
use tree_sitter::Node;

/// Step 6: class declarations, including `extends`/`implements` (spec.md §4.2).
pub struct ClassesExtractor;

impl Extractor for ClassesExtractor {
    fn interested(&self, kind: &str) -> bool {
        kind == "class_declaration"
    }

    fn visit(&self, node: Node, ctx: &mut BuilderContext) {
        let name = node
            .child_by_field_name("name")
            .map(|n| ctx.node_text(&n))
            .unwrap_or_else(|| "<anonymous>".to_string());

        let mut superclass_name = None;
        let mut implemented_interfaces = Vec::new();

        if let Some(heritage) = node.child_by_field_name("heritage") {
            let mut cursor = heritage.walk();
            for clause in heritage.named_children(&mut cursor) {
                match clause.kind() {
                    "class_heritage" | "extends_clause" => {
                        if let Some(ident) = clause.named_child(0) {
                            superclass_name = Some(ctx.node_text(&ident));
                        }
                    }
                    "implements_clause" => {
                        let mut icursor = clause.walk();
                        for iface in clause.named_children(&mut icursor) {
                            implemented_interfaces.push(ctx.node_text(&iface));
                        }
                    }
                    _ => {}
                }
            }
        }

        let location = ctx.location(&node);
        let scope_ctx = ctx.scope.context_at(location.line, location.column);
        let pending = ctx.ids.generate_simple("Class", &name, &scope_ctx);

        ctx.collections.classes.push(ClassFact {
            pending_id: pending.slot,
            name,
            superclass_name,
            implemented_interfaces,
            location,
        });
    }
}
