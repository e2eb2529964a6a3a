//! Small tree-walking helpers shared by the control-flow extractors
//! (if/switch/loop/try), kept out of any single extractor so none of them
//! has to reach into a sibling module for a one-liner.

use tree_sitter::Node;

/// Unwraps a `parenthesized_expression` down to its single inner expression.
/// `if` conditions are typed as `parenthesized_expression` in the grammar;
/// `switch` discriminants and loop tests usually aren't, so this is a no-op
/// for those — callers pass whatever field the grammar handed them.
pub fn single_inner_expr(node: Node) -> Node {
    if node.kind() == "parenthesized_expression" {
        if let Some(inner) = node.named_child(0) {
            return single_inner_expr(inner);
        }
    }
    node
}

/// Finds the first direct child of `node` with the given kind, including
/// anonymous/unnamed children (`(`, `in`, `of`, …) — a couple of the control-
/// flow constructs distinguish themselves only through such tokens.
pub fn find_child_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|c| c.kind() == kind)
}

/// True if any direct child (named or not) has exactly this text — used to
/// tell a `for...in` from a `for...of` loop, where the grammar only records
/// the keyword as an anonymous token rather than a field.
pub fn has_child_text(node: Node, text: &str, source: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .any(|c| c.utf8_text(source.as_bytes()).unwrap_or("") == text)
}

/// Unwraps a classic for-loop's `initializer`/`condition` field: the
/// grammar wraps both in an `expression_statement` (to carry the clause's
/// trailing `;`), while `update` carries the bare expression directly. A
/// no-op when handed a node that isn't an `expression_statement`.
pub fn unwrap_expression_statement(node: Node) -> Node {
    if node.kind() == "expression_statement" {
        if let Some(inner) = node.named_child(0) {
            return inner;
        }
    }
    node
}

/// Peels `await`/type-assertion wrappers off an initializer expression
/// before classification (spec.md §4.2.1: "Unwraps must happen before
/// literal detection"). Each of these grammar nodes carries the wrapped
/// value under its `expression` (or, for `type_assertion`, `value`) field.
pub fn unwrap_initializer(node: Node) -> Node {
    match node.kind() {
        "await_expression" | "as_expression" | "satisfies_expression" | "non_null_expression" => {
            match node.child_by_field_name("expression") {
                Some(inner) => unwrap_initializer(inner),
                None => node,
            }
        }
        "type_assertion" => match node.child_by_field_name("value") {
            Some(inner) => unwrap_initializer(inner),
            None => node,
        },
        _ => node,
    }
}
