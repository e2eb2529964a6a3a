use super::Extractor;
use crate::collections::{EdgeOnlyFact, MiscEdgeKind};
use crate::context::BuilderContext;
use tree_sitter::Node;

/// Step 13: edge-only facts that don't mint their own node — AWAITS (an
/// awaited call inside a function), CHAINS_FROM (member-expression chains),
/// DEFAULTS_TO (default parameter values) (spec.md §4.2).
pub struct MiscEdgesExtractor;

impl Extractor for MiscEdgesExtractor {
    fn interested(&self, kind: &str) -> bool {
        matches!(
            kind,
            "await_expression" | "assignment_pattern" | "member_expression"
        )
    }

    fn visit(&self, node: Node, ctx: &mut BuilderContext) {
        let Some(from) = ctx.current_function() else {
            return;
        };

        match node.kind() {
            "await_expression" => {
                let target = node
                    .named_child(0)
                    .map(|n| ctx.node_text(&n))
                    .unwrap_or_default();
                ctx.collections.misc_edges.push(EdgeOnlyFact {
                    from_pending: from,
                    to_name: target,
                    edge_kind: MiscEdgeKind::Awaits,
                });
            }
            "assignment_pattern" => {
                let default_value = node
                    .child_by_field_name("right")
                    .map(|n| ctx.node_text(&n))
                    .unwrap_or_default();
                ctx.collections.misc_edges.push(EdgeOnlyFact {
                    from_pending: from,
                    to_name: default_value,
                    edge_kind: MiscEdgeKind::DefaultsTo,
                });
            }
            "member_expression" => {
                // Only the outermost link of a chain fires, so `a.b.c.d`
                // records one CHAINS_FROM edge rather than one per `.`.
                if node
                    .parent()
                    .is_some_and(|p| p.kind() == "member_expression")
                {
                    return;
                }
                if let Some(root) = chain_root_identifier(node, ctx) {
                    ctx.collections.misc_edges.push(EdgeOnlyFact {
                        from_pending: from,
                        to_name: root,
                        edge_kind: MiscEdgeKind::ChainsFrom,
                    });
                }
            }
            _ => {}
        }
    }
}

/// Walks a `member_expression`'s `object` chain down to its root. Returns
/// `None` for chains of depth 1 (`a.b` has nothing to chain from) or ones
/// that don't bottom out in a plain identifier (`this.a.b`, `(f()).a`).
fn chain_root_identifier(node: Node, ctx: &BuilderContext) -> Option<String> {
    let mut object = node.child_by_field_name("object")?;
    let mut depth = 0;
    loop {
        match object.kind() {
            "member_expression" => {
                depth += 1;
                object = object.child_by_field_name("object")?;
            }
            "identifier" if depth > 0 => return Some(ctx.node_text(&object)),
            _ => return None,
        }
    }
}
