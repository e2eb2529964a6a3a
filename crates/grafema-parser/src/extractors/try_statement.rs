use super::support::find_child_kind;
use super::Extractor;
use crate::collections::TryFact;
use crate::context::BuilderContext;
use tree_sitter::Node;

/// `try`/`catch`/`finally` (spec.md §4.3). TryBlock/CatchBlock/FinallyBlock
/// are themselves construct-plus-body node kinds — there's no separate
/// generic Scope child to mint for any of the three.
pub struct TryStatementExtractor;

impl Extractor for TryStatementExtractor {
    fn interested(&self, kind: &str) -> bool {
        kind == "try_statement"
    }

    fn visit(&self, node: Node, ctx: &mut BuilderContext) {
        let location = ctx.location(&node);
        let pending = ctx
            .ids
            .generate("TryBlock", "try", location.line, location.column, 0);

        let handler = node
            .child_by_field_name("handler")
            .or_else(|| find_child_kind(node, "catch_clause"));
        let (catch_pending, catch_param_name, catch_location) = match handler {
            Some(catch) => {
                let catch_loc = ctx.location(&catch);
                let param_name = catch
                    .child_by_field_name("parameter")
                    .map(|n| ctx.node_text(&n));
                let catch_pending = ctx.ids.generate(
                    "CatchBlock",
                    param_name.as_deref().unwrap_or("catch"),
                    catch_loc.line,
                    catch_loc.column,
                    0,
                );
                (Some(catch_pending.slot), param_name, Some(catch_loc))
            }
            None => (None, None, None),
        };

        let finalizer = node
            .child_by_field_name("finalizer")
            .or_else(|| find_child_kind(node, "finally_clause"));
        let (finally_pending, finally_location) = match finalizer {
            Some(finalizer) => {
                let finally_loc = ctx.location(&finalizer);
                let finally_pending =
                    ctx.ids
                        .generate("FinallyBlock", "finally", finally_loc.line, finally_loc.column, 0);
                (Some(finally_pending.slot), Some(finally_loc))
            }
            None => (None, None),
        };

        ctx.collections.try_blocks.push(TryFact {
            pending_id: pending.slot,
            catch_pending,
            catch_param_name,
            catch_location,
            finally_pending,
            finally_location,
            location,
        });
    }
}
