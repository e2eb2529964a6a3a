//! The flat `BuilderContext` every extractor function shares (SPEC_FULL.md
//! §4.3–4.6 design note: no `FunctionBodyHandler` inheritance chain — one
//! context struct threaded by `&mut` instead).

use crate::collections::ModuleCollections;
use grafema_core::ids::{IdGenerator, PendingSlot};
use grafema_core::scope::ScopeTracker;
use grafema_core::types::Location;
use tree_sitter::Node;

pub struct BuilderContext<'a> {
    pub source: &'a str,
    pub file: String,
    pub relative_file: String,
    pub scope: ScopeTracker,
    pub ids: IdGenerator,
    pub collections: ModuleCollections,
    /// Stack of enclosing function pending slots, innermost last — used to
    /// attach CALLS/RETURNS/AWAITS to the right function (spec.md §4.2 step
    /// 3's current-function tracking, generalized to a stack).
    function_stack: Vec<PendingSlot>,
    /// Depth counter for "is this call inside a loop" (spec.md §4.3 await-
    /// in-loop detection input).
    loop_depth: u32,
}

impl<'a> BuilderContext<'a> {
    pub fn new(source: &'a str, file: impl Into<String>, relative_file: impl Into<String>) -> Self {
        let relative_file = relative_file.into();
        BuilderContext {
            source,
            file: file.into(),
            relative_file: relative_file.clone(),
            scope: ScopeTracker::new(relative_file.clone()),
            ids: IdGenerator::new(relative_file),
            collections: ModuleCollections::default(),
            function_stack: Vec::new(),
            loop_depth: 0,
        }
    }

    pub fn node_text(&self, node: &Node) -> String {
        node.utf8_text(self.source.as_bytes()).unwrap_or("").to_string()
    }

    pub fn location(&self, node: &Node) -> Location {
        Location {
            file: self.relative_file.clone(),
            line: node.start_position().row as u32 + 1,
            column: node.start_position().column as u32,
            end_line: Some(node.end_position().row as u32 + 1),
            end_column: Some(node.end_position().column as u32),
        }
    }

    pub fn enter_function(&mut self, slot: PendingSlot) {
        self.function_stack.push(slot);
    }

    pub fn exit_function(&mut self) {
        self.function_stack.pop();
    }

    pub fn current_function(&self) -> Option<PendingSlot> {
        self.function_stack.last().copied()
    }

    pub fn enter_loop(&mut self) {
        self.loop_depth += 1;
    }

    pub fn exit_loop(&mut self) {
        self.loop_depth = self.loop_depth.saturating_sub(1);
    }

    pub fn is_inside_loop(&self) -> bool {
        self.loop_depth > 0
    }

    /// Best-effort identifier/member-expression text for a child of `node`,
    /// matching the teacher's `child_text_by_kinds` idiom.
    pub fn child_text_by_kinds(&self, node: Node, kinds: &[&str]) -> Option<String> {
        let mut cursor = node.walk();
        if cursor.goto_first_child() {
            loop {
                let n = cursor.node();
                if kinds.iter().any(|k| n.kind() == *k) {
                    return Some(self.node_text(&n));
                }
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }
        None
    }
}
