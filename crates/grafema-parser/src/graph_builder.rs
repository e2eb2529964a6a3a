//! Materializes the facts a file's extraction run collected into
//! `GraphNode`/`GraphEdge` values (spec.md §4.2 closing note: "visitors
//! never write to the graph directly"). Runs once per file, after
//! `CollisionResolver::resolve` has turned every `PendingSlot` into a final
//! `SemanticId`.

use crate::collections::{
    BranchKind, ConditionRef, InitRef, LiteralKind, ModuleCollections, MutationKind,
    TsDeclarationKind,
};
use grafema_core::edge::GraphEdge;
use grafema_core::ids::{IdResolution, PendingSlot};
use grafema_core::node::{GraphNode, NodeFactory};
use grafema_core::types::{EdgeType, ImportKind, NodeKind};
use std::collections::HashMap;

pub struct BuiltModule {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Turns one file's `ModuleCollections` into graph nodes/edges. `module_id`
/// and `content_hash` come from the caller (the pipeline mints the module's
/// own id before calling this, since the module node isn't a fact itself).
pub struct GraphBuilder<'a> {
    file: &'a str,
    resolution: &'a IdResolution,
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    /// Locally declared names resolved to ids, used to wire same-file
    /// CALLS/EXTENDS/IMPLEMENTS edges without waiting for cross-file
    /// enrichment.
    local_names: HashMap<String, grafema_core::ids::SemanticId>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(file: &'a str, resolution: &'a IdResolution) -> Self {
        GraphBuilder {
            file,
            resolution,
            nodes: Vec::new(),
            edges: Vec::new(),
            local_names: HashMap::new(),
        }
    }

    fn id(&self, slot: PendingSlot) -> grafema_core::ids::SemanticId {
        self.resolution.final_id(slot).clone()
    }

    fn contains(&mut self, parent: &grafema_core::ids::SemanticId, child: &grafema_core::ids::SemanticId) {
        self.edges
            .push(GraphEdge::new(parent.clone(), child.clone(), EdgeType::Contains));
    }

    /// Finds the CALL fact recorded at `(line, column)` and resolves its
    /// final id — used to link a branch's CallExpression discriminant to
    /// its existing CALL_SITE instead of minting a synthetic Expression
    /// node (spec.md §4.3).
    fn call_id_at(
        &self,
        line: u32,
        column: u32,
        collections: &ModuleCollections,
    ) -> Option<grafema_core::ids::SemanticId> {
        collections
            .calls
            .iter()
            .find(|c| c.location.line == line && c.location.column == column)
            .and_then(|c| self.resolution.try_final_id(c.pending_id).cloned())
    }

    /// Finds the LITERAL fact recorded at `(line, column)` — every literal
    /// node in the file gets its own `LiteralFact` from the universal
    /// literal visitor, so a literal call argument's own value node is
    /// already in `collections.literals` by the time the builder runs.
    fn literal_id_at(
        &self,
        line: u32,
        column: u32,
        collections: &ModuleCollections,
    ) -> Option<grafema_core::ids::SemanticId> {
        collections
            .literals
            .iter()
            .find(|l| l.location.line == line && l.location.column == column)
            .and_then(|l| self.resolution.try_final_id(l.pending_id).cloned())
    }

    /// Finds the FUNCTION fact recorded at `(line, column)` — used to link a
    /// variable's function/arrow-function initializer to the Function node
    /// the universal function visitor already created for that same node.
    fn function_id_at(
        &self,
        line: u32,
        column: u32,
        collections: &ModuleCollections,
    ) -> Option<grafema_core::ids::SemanticId> {
        collections
            .functions
            .iter()
            .find(|f| f.location.line == line && f.location.column == column)
            .and_then(|f| self.resolution.try_final_id(f.pending_id).cloned())
    }

    /// Finds the `new`-expression fact recorded at `(line, column)` — used
    /// to link a variable's `new` initializer to its own CALL node.
    fn new_expression_id_at(
        &self,
        line: u32,
        column: u32,
        collections: &ModuleCollections,
    ) -> Option<grafema_core::ids::SemanticId> {
        collections
            .new_expressions
            .iter()
            .find(|n| n.location.line == line && n.location.column == column)
            .and_then(|n| self.resolution.try_final_id(n.pending_id).cloned())
    }

    /// Finds the variable declarator fact recorded at `(line, column)` —
    /// used to link a classic `for(init;;)`'s init clause to the Variable
    /// it declares (`VariablesExtractor` mints that Variable's id at the
    /// declarator's own location, which `LoopsExtractor` records verbatim).
    fn variable_id_at(
        &self,
        line: u32,
        column: u32,
        collections: &ModuleCollections,
    ) -> Option<grafema_core::ids::SemanticId> {
        collections
            .variables
            .iter()
            .find(|v| v.location.line == line && v.location.column == column)
            .and_then(|v| self.resolution.try_final_id(v.pending_id).cloned())
    }

    pub fn build(
        mut self,
        module_id: grafema_core::ids::SemanticId,
        content_hash: &str,
        collections: &ModuleCollections,
    ) -> BuiltModule {
        let module_node = NodeFactory::module(module_id.clone(), self.file, content_hash);
        self.nodes.push(module_node);

        for f in &collections.functions {
            let id = self.id(f.pending_id);
            self.local_names.insert(f.name.clone(), id.clone());
            let node = NodeFactory::function(id.clone(), self.file, &f.name, f.location.clone(), f.is_async, f.is_arrow)
                .with_attr("is_generator", f.is_generator);
            self.nodes.push(node);
            self.contains(&module_id, &id);

            let scope_id = self.id(f.scope_pending);
            let scope_node = GraphNode::new(scope_id.clone(), NodeKind::Scope, self.file, f.location.clone())
                .with_attr("scope_kind", "function_body");
            self.nodes.push(scope_node);
            self.contains(&id, &scope_id);
        }

        for v in &collections.variables {
            let id = self.id(v.pending_id);
            self.local_names.insert(v.name.clone(), id.clone());
            let mut node = NodeFactory::variable(id.clone(), self.file, &v.name, v.location.clone(), v.is_const)
                .with_attr("is_destructured", v.is_destructured);
            if let Some(ref initializer) = v.initializer_name {
                node = node.with_attr("initializer_name", initializer.clone());
            }
            if let Some(ref member) = v.initializer_member {
                node = node.with_attr("initializer_member", member.clone());
            }
            if let Some(ref literal) = v.initializer_literal {
                node = node.with_attr("initializer_literal", literal.clone());
            }
            node = node.with_attr("initializer_is_call", v.initializer_is_call);
            node = node.with_attr("initializer_is_new", v.initializer_is_new);
            node = node.with_attr("initializer_is_function", v.initializer_is_function);
            self.nodes.push(node);
            self.contains(&module_id, &id);

            if let Some(ref initializer) = v.initializer_name {
                if let Some(target) = self.local_names.get(initializer) {
                    self.edges
                        .push(GraphEdge::new(id.clone(), target.clone(), EdgeType::DerivesFrom));
                }
            }
            if let Some(slot) = v.initializer_literal_pending {
                let target = self.id(slot);
                self.edges
                    .push(GraphEdge::new(id.clone(), target, EdgeType::DerivesFrom));
            }
            if let Some(ref loc) = v.initializer_location {
                if v.initializer_is_call {
                    if let Some(target) = self.call_id_at(loc.line, loc.column, collections) {
                        self.edges
                            .push(GraphEdge::new(id.clone(), target, EdgeType::DerivesFrom));
                    }
                } else if v.initializer_is_new {
                    if let Some(target) = self.new_expression_id_at(loc.line, loc.column, collections) {
                        self.edges
                            .push(GraphEdge::new(id.clone(), target, EdgeType::DerivesFrom));
                    }
                } else if v.initializer_is_function {
                    if let Some(target) = self.function_id_at(loc.line, loc.column, collections) {
                        self.edges
                            .push(GraphEdge::new(id.clone(), target, EdgeType::DerivesFrom));
                    }
                }
            }
            if let Some(ref raw) = v.initializer_raw {
                for name in referenced_identifiers(raw) {
                    if let Some(target) = self.local_names.get(&name) {
                        self.edges
                            .push(GraphEdge::new(id.clone(), target.clone(), EdgeType::DerivesFrom));
                    }
                }
            }
        }

        for p in &collections.parameters {
            let id = self.id(p.pending_id);
            let fn_id = self.id(p.function_pending);
            let node = GraphNode::new(id.clone(), NodeKind::Parameter, self.file, p.location.clone())
                .with_attr("name", p.name.clone())
                .with_attr("index", p.index)
                .with_attr("is_rest", p.is_rest)
                .with_attr("has_default", p.has_default);
            self.nodes.push(node);
            self.contains(&fn_id, &id);
        }

        for c in &collections.classes {
            let id = self.id(c.pending_id);
            self.local_names.insert(c.name.clone(), id.clone());
            let mut node = GraphNode::new(id.clone(), NodeKind::Class, self.file, c.location.clone())
                .with_attr("name", c.name.clone());
            if let Some(ref superclass) = c.superclass_name {
                node = node.with_attr("superclass", superclass.clone());
            }
            if !c.implemented_interfaces.is_empty() {
                node = node.with_attr("implements", c.implemented_interfaces.clone());
            }
            self.nodes.push(node);
            self.contains(&module_id, &id);
        }

        for ts in &collections.ts_declarations {
            let id = self.id(ts.pending_id);
            self.local_names.insert(ts.name.clone(), id.clone());
            let kind = match ts.kind {
                TsDeclarationKind::Interface => NodeKind::Interface,
                TsDeclarationKind::TypeAlias => NodeKind::TypeAlias,
                TsDeclarationKind::Enum => NodeKind::Enum,
            };
            let node = GraphNode::new(id.clone(), kind, self.file, ts.location.clone())
                .with_attr("name", ts.name.clone());
            self.nodes.push(node);
            self.contains(&module_id, &id);
        }

        for imp in &collections.imports {
            let id = self.id(imp.pending_id);
            let kind_str = match imp.kind {
                ImportKind::Value => "value",
                ImportKind::Type => "type",
                ImportKind::Typeof => "typeof",
            };
            let node = GraphNode::new(id.clone(), NodeKind::Import, self.file, imp.location.clone())
                .with_attr("specifier", imp.specifier.clone())
                .with_attr("local_name", imp.local_name.clone())
                .with_attr("kind", kind_str)
                .with_attr(
                    "imported_name",
                    imp.imported_name.clone().unwrap_or_default(),
                );
            self.nodes.push(node);
            self.contains(&module_id, &id);
        }

        for exp in &collections.exports {
            let id = self.id(exp.pending_id);
            let node = GraphNode::new(id.clone(), NodeKind::Export, self.file, exp.location.clone())
                .with_attr("exported_name", exp.exported_name.clone())
                .with_attr("is_default", exp.is_default)
                .with_attr("is_reexport", exp.is_reexport);
            self.nodes.push(node);
            self.contains(&module_id, &id);
        }

        for call in &collections.calls {
            let id = self.id(call.pending_id);
            let node = NodeFactory::call(id.clone(), self.file, &call.callee_name, call.location.clone())
                .with_attr("is_awaited", call.is_awaited)
                .with_attr("is_inside_loop", call.is_inside_loop);
            self.nodes.push(node);

            let caller = call
                .enclosing_function
                .and_then(|slot| self.resolution.try_final_id(slot).cloned())
                .unwrap_or_else(|| module_id.clone());
            self.edges.push(
                GraphEdge::new(caller, id.clone(), EdgeType::Calls)
                    .with_meta("is_awaited", call.is_awaited),
            );

            if let Some(target) = self.local_names.get(&call.callee_name) {
                self.edges
                    .push(GraphEdge::new(id.clone(), target.clone(), EdgeType::DependsOn));
            }
        }

        // Promise executor resolve/reject calls (spec.md §4.4): a call
        // inside the executor function whose callee matches the executor's
        // `resolve`/`reject` parameter name is linked back to the outer
        // `new Promise(...)` CALL node.
        for pe in &collections.promise_executors {
            let Some(promise_id) = self.resolution.try_final_id(pe.promise_pending).cloned() else {
                continue;
            };
            let Some(executor_fn_id) =
                self.function_id_at(pe.executor_location.line, pe.executor_location.column, collections)
            else {
                continue;
            };
            for call in &collections.calls {
                let is_in_executor = call
                    .enclosing_function
                    .and_then(|slot| self.resolution.try_final_id(slot).cloned())
                    .map(|id| id == executor_fn_id)
                    .unwrap_or(false);
                if !is_in_executor {
                    continue;
                }
                let role = if pe.resolve_name.as_deref() == Some(call.callee_name.as_str()) {
                    Some("resolve")
                } else if pe.reject_name.as_deref() == Some(call.callee_name.as_str()) {
                    Some("reject")
                } else {
                    None
                };
                if let Some(role) = role {
                    let call_id = self.id(call.pending_id);
                    self.edges.push(
                        GraphEdge::new(promise_id.clone(), call_id, EdgeType::Other("RESOLVES_PROMISE".into()))
                            .with_meta("role", role),
                    );
                }
            }
        }

        for arg in &collections.call_arguments {
            let id = self.id(arg.pending_id);
            let call_id = self.id(arg.call_pending);
            let node = GraphNode::new(id.clone(), NodeKind::CallArgument, self.file, arg.location.clone())
                .with_attr("arg_index", arg.arg_index)
                .with_attr("is_spread", arg.is_spread);
            self.nodes.push(node);
            self.contains(&call_id, &id);
            self.edges.push(
                GraphEdge::new(call_id, id.clone(), EdgeType::PassesArgument)
                    .with_meta("arg_index", arg.arg_index)
                    .with_meta("is_spread", arg.is_spread),
            );

            // Value resolution (spec.md §4.2): nested CALL, then bare
            // identifier (VARIABLE or PARAMETER), then LITERAL, otherwise a
            // best-effort EXPRESSION derivation off referenced identifiers.
            if arg.is_nested_call {
                if let Some(target) = self.call_id_at(arg.location.line, arg.location.column, collections) {
                    self.edges
                        .push(GraphEdge::new(id.clone(), target, EdgeType::DerivesFrom));
                }
            } else if let Some(ref name) = arg.value_identifier {
                if let Some(target) = self.local_names.get(name) {
                    self.edges
                        .push(GraphEdge::new(id.clone(), target.clone(), EdgeType::DerivesFrom));
                } else if let Some(param) = collections.parameters.iter().find(|p| &p.name == name) {
                    if let Some(target) = self.resolution.try_final_id(param.pending_id).cloned() {
                        self.edges
                            .push(GraphEdge::new(id.clone(), target, EdgeType::DerivesFrom));
                    }
                }
            } else if let Some(target) = self.literal_id_at(arg.location.line, arg.location.column, collections) {
                self.edges
                    .push(GraphEdge::new(id.clone(), target, EdgeType::DerivesFrom));
            } else {
                for name in referenced_identifiers(&arg.raw_text) {
                    if let Some(target) = self.local_names.get(&name) {
                        self.edges
                            .push(GraphEdge::new(id.clone(), target.clone(), EdgeType::DerivesFrom));
                    }
                }
            }
        }

        for tla in &collections.top_level_awaits {
            let id = self.id(tla.pending_id);
            let node = GraphNode::new(id.clone(), NodeKind::Call, self.file, tla.location.clone())
                .with_attr("top_level_await", true)
                .with_attr("is_for_await_of", tla.is_for_await_of);
            self.nodes.push(node);
            self.contains(&module_id, &id);
        }

        for pa in &collections.property_accesses {
            let id = self.id(pa.pending_id);
            let node = GraphNode::new(id.clone(), NodeKind::Expression, self.file, pa.location.clone())
                .with_attr("object", pa.object_name.clone())
                .with_attr("property", pa.property_name.clone());
            self.nodes.push(node);
        }

        for ne in &collections.new_expressions {
            let id = self.id(ne.pending_id);
            let node = GraphNode::new(id.clone(), NodeKind::Call, self.file, ne.location.clone())
                .with_attr("constructor", ne.constructor_name.clone())
                .with_attr("is_new", true);
            self.nodes.push(node);
            if let Some(target) = self.local_names.get(&ne.constructor_name) {
                self.edges
                    .push(GraphEdge::new(id.clone(), target.clone(), EdgeType::InstanceOf));
            }
        }

        // ObjectLiteral/ArrayLiteral initializers and their properties/
        // elements (spec.md §4.2.1). Property/element values are resolved
        // best-effort against `local_names` from their raw text, same as a
        // branch condition's fallback.
        for ol in &collections.object_literals {
            let id = self.id(ol.pending_id);
            let node = GraphNode::new(id.clone(), NodeKind::ObjectLiteral, self.file, ol.location.clone());
            self.nodes.push(node);
        }
        for op in &collections.object_properties {
            let id = self.id(op.pending_id);
            let object_id = self.id(op.object_pending);
            let node = GraphNode::new(id.clone(), NodeKind::ObjectProperty, self.file, op.location.clone())
                .with_attr("key", op.key.clone());
            self.nodes.push(node);
            self.edges
                .push(GraphEdge::new(object_id, id.clone(), EdgeType::HasProperty).with_meta("key", op.key.clone()));
            for name in referenced_identifiers(&op.value_text) {
                if let Some(target) = self.local_names.get(&name) {
                    self.edges
                        .push(GraphEdge::new(id.clone(), target.clone(), EdgeType::DerivesFrom));
                }
            }
        }
        for al in &collections.array_literals {
            let id = self.id(al.pending_id);
            let node = GraphNode::new(id.clone(), NodeKind::ArrayLiteral, self.file, al.location.clone());
            self.nodes.push(node);
        }
        for ae in &collections.array_elements {
            let id = self.id(ae.pending_id);
            let array_id = self.id(ae.array_pending);
            let node = GraphNode::new(id.clone(), NodeKind::ArrayElement, self.file, ae.location.clone())
                .with_attr("index", ae.index);
            self.nodes.push(node);
            self.edges
                .push(GraphEdge::new(array_id, id.clone(), EdgeType::HasElement).with_meta("index", ae.index));
            for name in referenced_identifiers(&ae.value_text) {
                if let Some(target) = self.local_names.get(&name) {
                    self.edges
                        .push(GraphEdge::new(id.clone(), target.clone(), EdgeType::DerivesFrom));
                }
            }
        }

        // Branches (if/else-if/else, switch) + their conditions, consequent/
        // alternate Scopes, and switch Cases (spec.md §4.3). Branch nodes are
        // materialized up front so else-if chains (which reference a sibling
        // branch by its source location) can be resolved in a second pass.
        let mut branch_by_loc: HashMap<(u32, u32), grafema_core::ids::SemanticId> = HashMap::new();
        for b in &collections.branches {
            let id = self.id(b.pending_id);
            branch_by_loc.insert((b.location.line, b.location.column), id.clone());
            let branch_type = match b.branch_kind {
                BranchKind::If => "if",
                BranchKind::Switch => "switch",
            };
            let node = GraphNode::new(id, NodeKind::Branch, self.file, b.location.clone())
                .with_attr("branch_type", branch_type)
                .with_attr("condition", b.condition_text.clone());
            self.nodes.push(node);
        }

        for b in &collections.branches {
            let id = self.id(b.pending_id);
            self.contains(&module_id, &id);

            match &b.condition {
                ConditionRef::CallSite { line, column } => {
                    if let Some(call_id) = self.call_id_at(*line, *column, collections) {
                        self.edges
                            .push(GraphEdge::new(id.clone(), call_id, EdgeType::HasCondition));
                    }
                }
                ConditionRef::Expression { pending_id } => {
                    let expr_id = self.id(*pending_id);
                    let expr_node =
                        GraphNode::new(expr_id.clone(), NodeKind::Expression, self.file, b.location.clone())
                            .with_attr("text", b.condition_text.clone());
                    self.nodes.push(expr_node);
                    self.contains(&id, &expr_id);
                    self.edges
                        .push(GraphEdge::new(id.clone(), expr_id.clone(), EdgeType::HasCondition));
                    for word in referenced_identifiers(&b.condition_text) {
                        if let Some(target) = self.local_names.get(&word) {
                            self.edges.push(GraphEdge::new(
                                expr_id.clone(),
                                target.clone(),
                                EdgeType::DerivesFrom,
                            ));
                        }
                    }
                }
                ConditionRef::None => {}
            }

            if let Some(scope_slot) = b.consequent_scope {
                let scope_id = self.id(scope_slot);
                let scope_node =
                    GraphNode::new(scope_id.clone(), NodeKind::Scope, self.file, b.location.clone())
                        .with_attr("scope_kind", "if_statement");
                self.nodes.push(scope_node);
                self.contains(&id, &scope_id);
                self.edges
                    .push(GraphEdge::new(id.clone(), scope_id, EdgeType::HasConsequent));
            }

            if let Some(scope_slot) = b.alternate_scope {
                let scope_id = self.id(scope_slot);
                let scope_node =
                    GraphNode::new(scope_id.clone(), NodeKind::Scope, self.file, b.location.clone())
                        .with_attr("scope_kind", "else_statement");
                self.nodes.push(scope_node);
                self.contains(&id, &scope_id);
                self.edges
                    .push(GraphEdge::new(id.clone(), scope_id, EdgeType::HasAlternate));
            } else if let Some(loc) = b.alternate_if_location {
                if let Some(inner_branch_id) = branch_by_loc.get(&loc) {
                    self.edges.push(GraphEdge::new(
                        id.clone(),
                        inner_branch_id.clone(),
                        EdgeType::HasAlternate,
                    ));
                }
            }
        }

        for c in &collections.cases {
            let id = self.id(c.pending_id);
            let branch_id = self.id(c.branch_pending);
            let mut node = GraphNode::new(id.clone(), NodeKind::Case, self.file, c.location.clone())
                .with_attr("is_default", c.is_default);
            if let Some(ref test) = c.test_text {
                node = node.with_attr("test", test.clone());
            }
            self.nodes.push(node);
            self.contains(&branch_id, &id);
            let edge_type = if c.is_default {
                EdgeType::HasDefault
            } else {
                EdgeType::HasCase
            };
            self.edges.push(GraphEdge::new(branch_id, id, edge_type));
        }

        // Loops (spec.md §4.3): body Scope, a best-effort ITERATES_OVER edge
        // for `for-in`/`for-of`, and a classic `for(init;test;update)`'s
        // optional HAS_INIT/HAS_CONDITION/HAS_UPDATE edges.
        for l in &collections.loops {
            let id = self.id(l.pending_id);
            let mut node = GraphNode::new(id.clone(), NodeKind::Loop, self.file, l.location.clone())
                .with_attr("loop_type", l.loop_kind);
            if let Some(ref mode) = l.iterates_mode {
                node = node.with_attr("iterates", *mode);
            }
            self.nodes.push(node);
            self.contains(&module_id, &id);

            if let Some(scope_slot) = l.body_scope {
                let scope_id = self.id(scope_slot);
                let scope_node =
                    GraphNode::new(scope_id.clone(), NodeKind::Scope, self.file, l.location.clone())
                        .with_attr("scope_kind", "loop_body");
                self.nodes.push(scope_node);
                self.contains(&id, &scope_id);
                self.edges
                    .push(GraphEdge::new(id.clone(), scope_id, EdgeType::HasBody));
            }

            // Resolved only against same-file module-level/function-level
            // names already collected here, not the full "nearest PARAMETER,
            // else nearest declared VARIABLE above" scope-aware lookup — no
            // per-file parameters-by-name index exists yet.
            if let Some(ref name) = l.iterates_name {
                if let Some(target) = self.local_names.get(name) {
                    self.edges
                        .push(GraphEdge::new(id.clone(), target.clone(), EdgeType::IteratesOver));
                }
            }

            match &l.init {
                InitRef::Variable { line, column } => {
                    if let Some(var_id) = self.variable_id_at(*line, *column, collections) {
                        self.edges
                            .push(GraphEdge::new(id.clone(), var_id, EdgeType::HasInit));
                    }
                }
                InitRef::Expression { pending_id } => {
                    let expr_id = self.id(*pending_id);
                    let text = l.init_text.clone().unwrap_or_default();
                    let expr_node =
                        GraphNode::new(expr_id.clone(), NodeKind::Expression, self.file, l.location.clone())
                            .with_attr("text", text.clone());
                    self.nodes.push(expr_node);
                    self.contains(&id, &expr_id);
                    self.edges
                        .push(GraphEdge::new(id.clone(), expr_id.clone(), EdgeType::HasInit));
                    for word in referenced_identifiers(&text) {
                        if let Some(target) = self.local_names.get(&word) {
                            self.edges.push(GraphEdge::new(
                                expr_id.clone(),
                                target.clone(),
                                EdgeType::DerivesFrom,
                            ));
                        }
                    }
                }
                InitRef::None => {}
            }

            match &l.condition {
                ConditionRef::CallSite { line, column } => {
                    if let Some(call_id) = self.call_id_at(*line, *column, collections) {
                        self.edges
                            .push(GraphEdge::new(id.clone(), call_id, EdgeType::HasCondition));
                    }
                }
                ConditionRef::Expression { pending_id } => {
                    let expr_id = self.id(*pending_id);
                    let text = l.condition_text.clone().unwrap_or_default();
                    let expr_node =
                        GraphNode::new(expr_id.clone(), NodeKind::Expression, self.file, l.location.clone())
                            .with_attr("text", text.clone());
                    self.nodes.push(expr_node);
                    self.contains(&id, &expr_id);
                    self.edges
                        .push(GraphEdge::new(id.clone(), expr_id.clone(), EdgeType::HasCondition));
                    for word in referenced_identifiers(&text) {
                        if let Some(target) = self.local_names.get(&word) {
                            self.edges.push(GraphEdge::new(
                                expr_id.clone(),
                                target.clone(),
                                EdgeType::DerivesFrom,
                            ));
                        }
                    }
                }
                ConditionRef::None => {}
            }

            match &l.update {
                ConditionRef::CallSite { line, column } => {
                    if let Some(call_id) = self.call_id_at(*line, *column, collections) {
                        self.edges
                            .push(GraphEdge::new(id.clone(), call_id, EdgeType::HasUpdate));
                    }
                }
                ConditionRef::Expression { pending_id } => {
                    let expr_id = self.id(*pending_id);
                    let text = l.update_text.clone().unwrap_or_default();
                    let expr_node =
                        GraphNode::new(expr_id.clone(), NodeKind::Expression, self.file, l.location.clone())
                            .with_attr("text", text.clone());
                    self.nodes.push(expr_node);
                    self.contains(&id, &expr_id);
                    self.edges
                        .push(GraphEdge::new(id, expr_id.clone(), EdgeType::HasUpdate));
                    for word in referenced_identifiers(&text) {
                        if let Some(target) = self.local_names.get(&word) {
                            self.edges.push(GraphEdge::new(
                                expr_id.clone(),
                                target.clone(),
                                EdgeType::DerivesFrom,
                            ));
                        }
                    }
                }
                ConditionRef::None => {}
            }
        }

        // Try/catch/finally (spec.md §4.3). TryBlock/CatchBlock/FinallyBlock
        // are themselves construct-plus-body node kinds, so no extra generic
        // Scope child is minted for any of the three.
        for t in &collections.try_blocks {
            let id = self.id(t.pending_id);
            let node = GraphNode::new(id.clone(), NodeKind::TryBlock, self.file, t.location.clone());
            self.nodes.push(node);
            self.contains(&module_id, &id);

            if let Some(catch_slot) = t.catch_pending {
                let catch_id = self.id(catch_slot);
                let catch_loc = t.catch_location.clone().unwrap_or_else(|| t.location.clone());
                let mut catch_node =
                    GraphNode::new(catch_id.clone(), NodeKind::CatchBlock, self.file, catch_loc);
                if let Some(ref param) = t.catch_param_name {
                    catch_node = catch_node.with_attr("param_name", param.clone());
                }
                self.nodes.push(catch_node);
                self.contains(&id, &catch_id);
                self.edges
                    .push(GraphEdge::new(id.clone(), catch_id, EdgeType::HasCatch));
            }

            if let Some(finally_slot) = t.finally_pending {
                let finally_id = self.id(finally_slot);
                let finally_loc = t.finally_location.clone().unwrap_or_else(|| t.location.clone());
                let finally_node =
                    GraphNode::new(finally_id.clone(), NodeKind::FinallyBlock, self.file, finally_loc);
                self.nodes.push(finally_node);
                self.contains(&id, &finally_id);
                self.edges
                    .push(GraphEdge::new(id, finally_id, EdgeType::HasFinally));
            }
        }

        for m in &collections.mutations {
            let id = self.id(m.pending_id);
            let kind_str = match m.mutation_kind {
                MutationKind::ArrayPush => "array_push",
                MutationKind::ArrayOther => "array_other",
                MutationKind::ObjectPropertySet => "object_property_set",
            };
            let node_kind = match m.mutation_kind {
                MutationKind::ObjectPropertySet => NodeKind::ObjectMutation,
                MutationKind::ArrayPush | MutationKind::ArrayOther => NodeKind::ArrayMutation,
            };
            let node = GraphNode::new(id.clone(), node_kind, self.file, m.location.clone())
                .with_attr("target", m.target_name.clone())
                .with_attr("mutation_kind", kind_str)
                .with_attr("resolution_status", format!("{:?}", m.resolution_status));
            self.nodes.push(node);
            if let Some(target) = self.local_names.get(&m.target_name) {
                self.edges
                    .push(GraphEdge::new(id, target.clone(), EdgeType::FlowsInto));
            }
        }

        for ret in &collections.return_statements {
            let id = self.id(ret.pending_id);
            let node = GraphNode::new(id.clone(), NodeKind::ReturnStatement, self.file, ret.location.clone())
                .with_attr("returns_value", ret.returns_value);
            self.nodes.push(node);
            if let Some(fn_id) = ret
                .enclosing_function
                .and_then(|slot| self.resolution.try_final_id(slot).cloned())
            {
                self.edges
                    .push(GraphEdge::new(fn_id, id, EdgeType::Returns));
            }
        }

        for lit in &collections.literals {
            let id = self.id(lit.pending_id);
            let kind_str = literal_kind_str(lit.kind);
            let node = GraphNode::new(id, NodeKind::Literal, self.file, lit.location.clone())
                .with_attr("literal_kind", kind_str)
                .with_attr("raw_text", truncate(&lit.raw_text, 256));
            self.nodes.push(node);
        }

        for me in &collections.misc_edges {
            let Some(from) = self.resolution.try_final_id(me.from_pending).cloned() else {
                continue;
            };
            let Some(to) = self.local_names.get(&me.to_name).cloned() else {
                continue;
            };
            let edge_type = match me.edge_kind {
                crate::collections::MiscEdgeKind::Awaits => EdgeType::Other("AWAITS".into()),
                crate::collections::MiscEdgeKind::ChainsFrom => EdgeType::Other("CHAINS_FROM".into()),
                crate::collections::MiscEdgeKind::DefaultsTo => EdgeType::Other("DEFAULTS_TO".into()),
            };
            self.edges.push(GraphEdge::new(from, to, edge_type));
        }

        for ma in &collections.module_assignments {
            let id = self.id(ma.pending_id);
            let node = GraphNode::new(id.clone(), NodeKind::VariableAssignment, self.file, ma.location.clone())
                .with_attr("target", ma.target_name.clone());
            self.nodes.push(node);
            self.contains(&module_id, &id);
        }

        for up in &collections.update_expressions {
            let id = self.id(up.pending_id);
            let node = GraphNode::new(id.clone(), NodeKind::UpdateExpression, self.file, up.location.clone())
                .with_attr("operand", up.operand_name.clone())
                .with_attr("operator", up.operator.clone())
                .with_attr("is_prefix", up.is_prefix);
            self.nodes.push(node);
        }

        for ci in &collections.class_instantiations {
            if let Some(target) = self.local_names.get(&ci.class_name) {
                if let Some(from) = self.resolution.try_final_id(ci.pending_id) {
                    self.edges.push(GraphEdge::new(
                        from.clone(),
                        target.clone(),
                        EdgeType::InstanceOf,
                    ));
                }
            }
        }

        BuiltModule {
            nodes: self.nodes,
            edges: self.edges,
        }
    }
}

fn literal_kind_str(kind: LiteralKind) -> &'static str {
    match kind {
        LiteralKind::String => "string",
        LiteralKind::Number => "number",
        LiteralKind::Boolean => "boolean",
        LiteralKind::Null => "null",
        LiteralKind::Undefined => "undefined",
        LiteralKind::RegExp => "regexp",
        LiteralKind::Template => "template",
    }
}

/// Best-effort identifier extraction from a condition's source text, used to
/// emit DERIVES_FROM edges for a branch's Expression node (spec.md §4.3's
/// "operand names are recorded in fact fields" without a dedicated
/// expression-operand tracker — every `\w`-run that isn't a JS keyword or a
/// bare number is treated as a candidate reference).
fn referenced_identifiers(text: &str) -> Vec<String> {
    const KEYWORDS: &[&str] = &[
        "true", "false", "null", "undefined", "typeof", "instanceof", "in", "of", "new", "this",
        "void", "await",
    ];
    let mut words = Vec::new();
    let mut current = String::new();
    for ch in text.chars().chain(std::iter::once(' ')) {
        if ch.is_alphanumeric() || ch == '_' || ch == '$' {
            current.push(ch);
        } else {
            if !current.is_empty() {
                let is_keyword = KEYWORDS.contains(&current.as_str());
                let is_number = current.chars().next().is_some_and(|c| c.is_ascii_digit());
                if !is_keyword && !is_number {
                    words.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
            }
        }
    }
    words
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}…", &s[..max])
    }
}
