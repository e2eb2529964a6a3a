//! Per-file extraction pipeline (spec.md §4.2): parse, walk once dispatching
//! to the ordered extractor list, resolve pending ids, materialize facts
//! into graph nodes/edges.

use crate::context::BuilderContext;
use crate::extractors::{ordered_extractors, Extractor};
use crate::graph_builder::{BuiltModule, GraphBuilder};
use crate::language::LanguageRegistry;
use grafema_core::ids::CollisionResolver;
use grafema_core::{CodeGraphError, HashUtils, Result};
use std::path::Path;
use tree_sitter::Node;

/// Node kinds that introduce a new lexical scope. The walk pushes a scope
/// frame before recursing into one of these and pops it on the way back out
/// (spec.md §4.1's scope-as-id-key-material design), instead of each
/// extractor managing the stack itself.
fn scope_label(node: &Node) -> Option<&'static str> {
    match node.kind() {
        "function_declaration" | "function" | "arrow_function" | "generator_function_declaration" => {
            Some("fn")
        }
        "if_statement" => Some("if"),
        "for_statement" | "for_in_statement" | "while_statement" | "do_statement" => Some("loop"),
        "switch_statement" => Some("switch"),
        "try_statement" => Some("try"),
        "catch_clause" => Some("catch"),
        _ => None,
    }
}

fn is_loop(node: &Node) -> bool {
    matches!(
        node.kind(),
        "for_statement" | "for_in_statement" | "while_statement" | "do_statement"
    )
}

fn is_function(node: &Node) -> bool {
    matches!(
        node.kind(),
        "function_declaration" | "function" | "arrow_function" | "generator_function_declaration"
    )
}

/// Walks `node` and its descendants once, dispatching each node to every
/// interested extractor in contractual list order (spec.md §4.2 step 4).
fn walk(node: Node, extractors: &[Box<dyn Extractor>], ctx: &mut BuilderContext) {
    for extractor in extractors {
        if extractor.interested(node.kind()) {
            extractor.visit(node, ctx);
        }
    }

    let pushed_scope = scope_label(&node).is_some();
    if pushed_scope {
        ctx.scope.push(scope_label(&node).unwrap().to_string());
    }
    let pushed_function = is_function(&node);
    if pushed_function {
        if let Some(last) = ctx.collections.functions.last() {
            ctx.enter_function(last.pending_id);
        }
    }
    let pushed_loop = is_loop(&node);
    if pushed_loop {
        ctx.enter_loop();
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(child, extractors, ctx);
    }

    if pushed_loop {
        ctx.exit_loop();
    }
    if pushed_function {
        ctx.exit_function();
    }
    if pushed_scope {
        ctx.scope.pop();
    }
}

/// Parses and extracts one file, returning the fully materialized module
/// (nodes + edges) ready for `Graph::add_node`/`add_edge`.
pub fn extract_module(
    registry: &LanguageRegistry,
    file_path: &Path,
    relative_file: &str,
) -> Result<BuiltModule> {
    let source = std::fs::read_to_string(file_path)?;

    let language = registry
        .detect_language(&file_path.to_string_lossy())
        .ok_or_else(|| {
            CodeGraphError::Parse(format!("unsupported file extension: {}", file_path.display()))
        })?;

    let mut parser = registry.create_parser(&language).ok_or_else(|| {
        CodeGraphError::Parse(format!("no tree-sitter grammar registered for {:?}", language))
    })?;

    let tree = parser.parse(&source, None).ok_or_else(|| {
        CodeGraphError::Parse(format!("tree-sitter returned no tree for {}", file_path.display()))
    })?;

    let file_str = file_path.to_string_lossy().to_string();
    let mut ctx = BuilderContext::new(&source, file_str, relative_file);

    let extractors = ordered_extractors();
    walk(tree.root_node(), &extractors, &mut ctx);

    let pending = ctx.ids.take_pending();
    let resolution = CollisionResolver::resolve(&pending);

    let content_hash = HashUtils::hash_str(&source);
    let module_id = grafema_core::ids::SemanticId::new(format!("{relative_file}::module"));

    let builder = GraphBuilder::new(relative_file, &resolution);
    Ok(builder.build(module_id, &content_hash, &ctx.collections))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_a_simple_module() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.ts");
        std::fs::write(
            &file,
            "export function add(a: number, b: number) {\n  return a + b;\n}\n",
        )
        .unwrap();

        let registry = LanguageRegistry::new();
        let built = extract_module(&registry, &file, "a.ts").unwrap();

        assert!(built.nodes.iter().any(|n| n.kind == grafema_core::types::NodeKind::Function));
        assert!(built.nodes.iter().any(|n| n.kind == grafema_core::types::NodeKind::Module));
    }

    #[test]
    fn member_expression_chain_emits_chains_from_edge() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.ts");
        std::fs::write(
            &file,
            "const config = {};\nfunction run() {\n  return config.db.host;\n}\n",
        )
        .unwrap();

        let registry = LanguageRegistry::new();
        let built = extract_module(&registry, &file, "a.ts").unwrap();

        let chains_from_count = built
            .edges
            .iter()
            .filter(|e| e.edge_type == grafema_core::types::EdgeType::Other("CHAINS_FROM".into()))
            .count();
        // Exactly one edge for the whole `config.db.host` chain, not one
        // per `.` — and none at all for the single-level `config.db` that
        // would be left over if the outermost-node guard didn't hold.
        assert_eq!(chains_from_count, 1);
    }

    #[test]
    fn else_if_chain_links_branches_and_scopes() {
        use grafema_core::types::{EdgeType, NodeKind};

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.ts");
        std::fs::write(
            &file,
            "function classify(x: number) {\n  if (a) {\n    return 1;\n  } else if (b) {\n    return 2;\n  } else {\n    return 3;\n  }\n}\n",
        )
        .unwrap();

        let registry = LanguageRegistry::new();
        let built = extract_module(&registry, &file, "a.ts").unwrap();

        let branches: Vec<_> = built
            .nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Branch)
            .collect();
        assert_eq!(branches.len(), 2, "outer if + else-if branch");

        let has_alternate_edges = built
            .edges
            .iter()
            .filter(|e| e.edge_type == EdgeType::HasAlternate)
            .count();
        // B1 -> B2 (the else-if), plus B2 -> Scope(else_statement) for the
        // trailing `else`.
        assert_eq!(has_alternate_edges, 2);

        let branch_to_branch = built.edges.iter().any(|e| {
            e.edge_type == EdgeType::HasAlternate
                && branches.iter().any(|b| b.id == e.src)
                && branches.iter().any(|b| b.id == e.dst)
        });
        assert!(branch_to_branch, "outer branch's HAS_ALTERNATE must target the inner branch, not a Scope");

        let consequent_scopes = built
            .edges
            .iter()
            .filter(|e| e.edge_type == EdgeType::HasConsequent)
            .count();
        assert_eq!(consequent_scopes, 2, "both branches get a consequent Scope");
    }

    #[test]
    fn switch_with_call_discriminant_links_existing_call_site() {
        use grafema_core::types::{EdgeType, NodeKind};

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.ts");
        std::fs::write(
            &file,
            "function run() {\n  switch (f()) {\n    case 1:\n      break;\n    default:\n      break;\n  }\n}\n",
        )
        .unwrap();

        let registry = LanguageRegistry::new();
        let built = extract_module(&registry, &file, "a.ts").unwrap();

        let switch_branch = built
            .nodes
            .iter()
            .find(|n| n.kind == NodeKind::Branch && n.attr("branch_type").and_then(|v| v.as_str()) == Some("switch"))
            .expect("switch branch node");

        let call_node = built
            .nodes
            .iter()
            .find(|n| n.kind == NodeKind::Call && n.attr("callee").and_then(|v| v.as_str()) == Some("f"))
            .expect("CALL_SITE for the discriminant");

        let has_condition_to_call = built.edges.iter().any(|e| {
            e.edge_type == EdgeType::HasCondition && e.src == switch_branch.id && e.dst == call_node.id
        });
        assert!(has_condition_to_call, "switch HAS_CONDITION must link to the existing CALL_SITE");

        assert!(!built
            .nodes
            .iter()
            .any(|n| n.kind == NodeKind::Expression && n.location.line == switch_branch.location.line));

        let cases: Vec<_> = built.nodes.iter().filter(|n| n.kind == NodeKind::Case).collect();
        assert_eq!(cases.len(), 2);
        let default_case = cases
            .iter()
            .find(|c| c.attr("is_default").and_then(|v| v.as_bool()) == Some(true))
            .expect("default case");

        let has_default = built
            .edges
            .iter()
            .any(|e| e.edge_type == EdgeType::HasDefault && e.src == switch_branch.id && e.dst == default_case.id);
        assert!(has_default);

        let has_case_count = built.edges.iter().filter(|e| e.edge_type == EdgeType::HasCase).count();
        assert_eq!(has_case_count, 1, "the non-default case links via HAS_CASE");
    }

    #[test]
    fn await_inside_for_of_loop_is_flagged_inside_loop() {
        use grafema_core::types::{EdgeType, NodeKind};

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.ts");
        std::fs::write(
            &file,
            "async function run() {\n  const xs = getItems();\n  for (const x of xs) {\n    await f(x);\n  }\n}\n",
        )
        .unwrap();

        let registry = LanguageRegistry::new();
        let built = extract_module(&registry, &file, "a.ts").unwrap();

        let loop_node = built
            .nodes
            .iter()
            .find(|n| n.kind == NodeKind::Loop)
            .expect("LOOP node");
        assert_eq!(loop_node.attr("loop_type").and_then(|v| v.as_str()), Some("for_of"));

        let call_node = built
            .nodes
            .iter()
            .find(|n| n.kind == NodeKind::Call && n.attr("callee").and_then(|v| v.as_str()) == Some("f"))
            .expect("CALL node for f(x)");
        assert_eq!(call_node.attr("is_awaited").and_then(|v| v.as_bool()), Some(true));
        assert_eq!(call_node.attr("is_inside_loop").and_then(|v| v.as_bool()), Some(true));

        let has_body = built
            .edges
            .iter()
            .any(|e| e.edge_type == EdgeType::HasBody && e.src == loop_node.id);
        assert!(has_body, "LOOP gets a HAS_BODY edge to its Scope");

        let iterates_over = built
            .edges
            .iter()
            .any(|e| e.edge_type == EdgeType::IteratesOver && e.src == loop_node.id);
        assert!(iterates_over, "for-of over a same-file declared variable resolves via ITERATES_OVER");
    }

    #[test]
    fn function_id_is_stable_but_branch_id_is_positional_across_edits() {
        use grafema_core::types::NodeKind;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.ts");

        std::fs::write(
            &file,
            "export function add(a: number, b: number) {\n  if (x) {\n    return a + b;\n  }\n  return 0;\n}\n",
        )
        .unwrap();
        let registry = LanguageRegistry::new();
        let built_v1 = extract_module(&registry, &file, "a.ts").unwrap();

        // Edit the trailing return value only — neither the function's name/
        // scope nor the branch's (line, column) move.
        std::fs::write(
            &file,
            "export function add(a: number, b: number) {\n  if (x) {\n    return a + b;\n  }\n  return 1;\n}\n",
        )
        .unwrap();
        let built_v2 = extract_module(&registry, &file, "a.ts").unwrap();

        let fn_id_v1 = &built_v1.nodes.iter().find(|n| n.kind == NodeKind::Function).unwrap().id;
        let fn_id_v2 = &built_v2.nodes.iter().find(|n| n.kind == NodeKind::Function).unwrap().id;
        assert_eq!(fn_id_v1, fn_id_v2, "Function id is keyed on scope+name, stable across an unrelated edit");

        let branch_id_v1 = &built_v1.nodes.iter().find(|n| n.kind == NodeKind::Branch).unwrap().id;
        let branch_id_v2 = &built_v2.nodes.iter().find(|n| n.kind == NodeKind::Branch).unwrap().id;
        assert_eq!(branch_id_v1, branch_id_v2, "Branch id is positional; same (line, column) across the edit reuses it");

        // Now shift the branch down a line — its id must change since it's
        // keyed on position, not content.
        std::fs::write(
            &file,
            "export function add(a: number, b: number) {\n\n  if (x) {\n    return a + b;\n  }\n  return 0;\n}\n",
        )
        .unwrap();
        let built_v3 = extract_module(&registry, &file, "a.ts").unwrap();
        let branch_id_v3 = &built_v3.nodes.iter().find(|n| n.kind == NodeKind::Branch).unwrap().id;
        assert_ne!(branch_id_v1, branch_id_v3, "shifting the branch's line changes its positional id");
    }
}
