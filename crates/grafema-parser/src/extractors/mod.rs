//! The ordered visitor list (spec.md §4.2 step 4). Each extractor registers
//! interest in a set of tree-sitter node kinds; `pipeline::walk` dispatches
//! every node to every interested extractor in list order during a single
//! `TreeCursor` walk, rather than re-walking the tree once per step.

mod calls;
mod classes;
mod functions;
mod if_statement;
mod imports_exports;
mod literals;
mod loops;
mod misc_edges;
mod module_assignments;
mod new_expression;
mod property_access;
mod support;
mod switch_statement;
mod top_level_await;
mod try_statement;
mod ts_declarations;
mod update_expressions;
mod variables;

use crate::context::BuilderContext;
use tree_sitter::Node;

pub trait Extractor {
    fn interested(&self, kind: &str) -> bool;
    fn visit(&self, node: Node, ctx: &mut BuilderContext);
}

/// Builds the contractually-ordered extractor list (spec.md §4.2 steps
/// 1–15). Construction is cheap (stateless structs); call once per file.
pub fn ordered_extractors() -> Vec<Box<dyn Extractor>> {
    vec![
        Box::new(imports_exports::ImportsExportsExtractor),
        Box::new(variables::VariablesExtractor),
        Box::new(functions::FunctionsExtractor),
        Box::new(module_assignments::ModuleAssignmentsExtractor),
        Box::new(update_expressions::UpdateExpressionsExtractor),
        Box::new(classes::ClassesExtractor),
        Box::new(ts_declarations::TsDeclarationsExtractor),
        // Module-level callbacks reuse the call-expression step's argument
        // handling (spec.md §4.2 step 8 folds into step 9 here — a callback
        // is just a call whose argument is a function expression).
        Box::new(calls::CallsExtractor),
        Box::new(top_level_await::TopLevelAwaitExtractor),
        Box::new(property_access::PropertyAccessExtractor),
        Box::new(new_expression::NewExpressionExtractor),
        Box::new(if_statement::IfStatementExtractor),
        Box::new(switch_statement::SwitchStatementExtractor),
        Box::new(loops::LoopsExtractor),
        Box::new(try_statement::TryStatementExtractor),
        Box::new(misc_edges::MiscEdgesExtractor),
        Box::new(literals::LiteralsExtractor),
    ]
}
