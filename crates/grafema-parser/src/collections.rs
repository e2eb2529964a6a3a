//! Fact records produced by the ordered visitor list (spec.md §4.2 step 4).
//! Visitors never write to the graph directly — they append facts here;
//! `GraphBuilder` (in `graph_builder.rs`) is the only thing that turns facts
//! into `GraphNode`/`GraphEdge` values (spec.md §4.2 closing note).

use grafema_core::ids::{IdShape, PendingId, PendingSlot};
use grafema_core::types::{ImportKind, Location, ResolutionStatus};

#[derive(Debug, Clone)]
pub struct ImportFact {
    pub pending_id: PendingSlot,
    pub specifier: String,
    pub imported_name: Option<String>,
    pub local_name: String,
    pub kind: ImportKind,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct ExportFact {
    pub pending_id: PendingSlot,
    pub exported_name: String,
    pub local_name: Option<String>,
    pub is_default: bool,
    pub is_reexport: bool,
    pub reexport_source: Option<String>,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct VariableFact {
    pub pending_id: PendingSlot,
    pub name: String,
    pub is_const: bool,
    pub is_destructured: bool,
    pub initializer_pending: Option<PendingSlot>,
    /// Bare identifier the declarator's initializer resolves to, e.g. the
    /// `a` in `const b = a;` — lets `GraphBuilder` wire a same-file
    /// `DERIVES_FROM` edge without needing `initializer_pending`'s
    /// same-pass ordering.
    pub initializer_name: Option<String>,
    /// `obj.method`-shaped initializer, e.g. the right side of
    /// `const alias = obj.method;` — lets `AliasTracker` later resolve
    /// `alias()` call sites back to the method `obj` carries (spec.md §4.6).
    pub initializer_member: Option<String>,
    /// Raw text of the initializer when it's a bare literal, for
    /// `ValueDomainAnalyzer`'s abstract value set (spec.md §4.6 step 4).
    pub initializer_literal: Option<String>,
    /// True when the initializer is itself a call expression — `ValueDomainAnalyzer`
    /// treats this as a potential `hasUnknown` source alongside parameters.
    pub initializer_is_call: bool,
    /// True when the initializer is a `new` expression — resolved to the
    /// matching `NewExpressionFact` at this location by `GraphBuilder`.
    pub initializer_is_new: bool,
    /// True when the initializer is a function/arrow-function expression —
    /// resolved to the matching `FunctionFact` at this location.
    pub initializer_is_function: bool,
    /// Set when the initializer is a composite literal (object/array) this
    /// visitor minted its own node for — resolved directly, bypassing the
    /// name-based lookups above (spec.md §4.2.1 classifier order).
    pub initializer_literal_pending: Option<PendingSlot>,
    /// Location of the initializer expression itself (not the declarator) —
    /// used to look up the matching call/new/function fact by position when
    /// `initializer_is_call`/`initializer_is_new`/`initializer_is_function`.
    pub initializer_location: Option<Location>,
    /// Raw text of any initializer shape not otherwise classified (binary,
    /// conditional, logical, template, unary, tagged-template, sequence,
    /// yield, assignment, class expressions) — `GraphBuilder` scans it for
    /// referenced identifiers to emit best-effort `DERIVES_FROM` edges,
    /// same as a branch condition's fallback (spec.md §4.2.1 "unknown
    /// shapes produce no edge" is the floor, not the ceiling).
    pub initializer_raw: Option<String>,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct ParameterFact {
    pub pending_id: PendingSlot,
    pub function_pending: PendingSlot,
    pub name: String,
    pub index: u32,
    pub is_rest: bool,
    pub has_default: bool,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct FunctionFact {
    pub pending_id: PendingSlot,
    pub name: String,
    pub is_async: bool,
    pub is_arrow: bool,
    pub is_generator: bool,
    pub scope_pending: PendingSlot,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct ModuleAssignmentFact {
    pub pending_id: PendingSlot,
    pub target_name: String,
    pub assigned_function_pending: Option<PendingSlot>,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct UpdateExpressionFact {
    pub pending_id: PendingSlot,
    pub operand_name: String,
    pub operator: String,
    pub is_prefix: bool,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct ClassFact {
    pub pending_id: PendingSlot,
    pub name: String,
    pub superclass_name: Option<String>,
    pub implemented_interfaces: Vec<String>,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct ClassInstantiationFact {
    pub pending_id: PendingSlot,
    pub class_name: String,
    pub enclosing_function: Option<PendingSlot>,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct TsDeclarationFact {
    pub pending_id: PendingSlot,
    pub name: String,
    pub kind: TsDeclarationKind,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsDeclarationKind {
    Interface,
    TypeAlias,
    Enum,
}

#[derive(Debug, Clone)]
pub struct CallArgumentFact {
    pub pending_id: PendingSlot,
    pub call_pending: PendingSlot,
    pub arg_index: u32,
    pub is_spread: bool,
    /// `true` when the argument expression is itself a `call_expression` —
    /// resolved at build time by looking up the nested `CallFact` recorded
    /// at this same location (spec.md §4.2 closing note: argument value
    /// targets are resolved by the builder, not deferred to enrichment).
    pub is_nested_call: bool,
    /// Set when the argument is a bare identifier, resolved against
    /// `local_names`/parameters the same way `DERIVES_FROM` resolves a
    /// variable initializer.
    pub value_identifier: Option<String>,
    pub raw_text: String,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct CallFact {
    pub pending_id: PendingSlot,
    pub callee_name: String,
    pub enclosing_function: Option<PendingSlot>,
    pub is_awaited: bool,
    pub is_inside_loop: bool,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct TopLevelAwaitFact {
    pub pending_id: PendingSlot,
    pub is_for_await_of: bool,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct PropertyAccessFact {
    pub pending_id: PendingSlot,
    pub object_name: String,
    pub property_name: String,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct NewExpressionFact {
    pub pending_id: PendingSlot,
    pub constructor_name: String,
    pub location: Location,
}

/// `new Promise((resolve, reject) => …)` (spec.md §4.4). Recognised when a
/// function expression is the first argument of a `new Promise()` call;
/// calls to `resolve`/`reject` inside that executor's body are linked back
/// to the outer `NewExpressionFact`'s CALL node by the builder.
#[derive(Debug, Clone)]
pub struct PromiseExecutorFact {
    pub promise_pending: PendingSlot,
    pub executor_location: Location,
    pub resolve_name: Option<String>,
    pub reject_name: Option<String>,
}

/// How a branch's/loop's discriminant resolves in the builder (spec.md
/// §4.3: a CallExpression discriminant links to its existing CALL_SITE
/// rather than minting a synthetic Expression node). Also reused for a
/// classic for-loop's `test`/`update` clauses.
#[derive(Debug, Clone)]
pub enum ConditionRef {
    CallSite { line: u32, column: u32 },
    Expression { pending_id: PendingSlot },
    None,
}

/// How a classic `for(init;;)`'s init clause resolves (spec.md §4.3): a
/// variable declaration links HAS_INIT straight to that Variable (matched
/// by the declarator's own location, same id `VariablesExtractor` mints);
/// a bare expression (`i = 0`, reusing an outer-scope variable) mints a
/// synthetic Expression node instead.
#[derive(Debug, Clone)]
pub enum InitRef {
    Variable { line: u32, column: u32 },
    Expression { pending_id: PendingSlot },
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    If,
    Switch,
}

#[derive(Debug, Clone)]
pub struct BranchFact {
    pub pending_id: PendingSlot,
    pub branch_kind: BranchKind,
    pub condition_text: String,
    pub condition: ConditionRef,
    /// `if_statement`-kind Scope covering the consequent block.
    pub consequent_scope: Option<PendingSlot>,
    /// `else_statement`-kind Scope covering a terminal (non-`else if`) else
    /// block. `None` when there's no else, or when the else is itself
    /// another `if` (see `alternate_if_location`).
    pub alternate_scope: Option<PendingSlot>,
    /// Location of the nested `if_statement` this branch's `else if` chains
    /// into. Its own `BranchFact` doesn't exist yet at the time this one is
    /// recorded (the walk visits parents before children), so the link is
    /// resolved by the builder matching locations after every fact is in.
    pub alternate_if_location: Option<(u32, u32)>,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct CaseFact {
    pub pending_id: PendingSlot,
    pub branch_pending: PendingSlot,
    pub is_default: bool,
    pub test_text: Option<String>,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct LoopFact {
    pub pending_id: PendingSlot,
    pub loop_kind: &'static str,
    pub body_scope: Option<PendingSlot>,
    /// Name of the iterable expression, when it's a bare identifier
    /// (spec.md §4.3's ITERATES_OVER heuristic; see graph_builder's
    /// simplification note for what this resolves against).
    pub iterates_name: Option<String>,
    pub iterates_mode: Option<&'static str>,
    /// Classic `for(init;test;update)` clauses (spec.md §4.3). `None` for
    /// the other three loop kinds, and for any clause a classic `for`
    /// leaves empty (`for (;;)`).
    pub init: InitRef,
    pub init_text: Option<String>,
    pub condition: ConditionRef,
    pub condition_text: Option<String>,
    pub update: ConditionRef,
    pub update_text: Option<String>,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct TryFact {
    pub pending_id: PendingSlot,
    pub catch_pending: Option<PendingSlot>,
    pub catch_param_name: Option<String>,
    pub catch_location: Option<Location>,
    pub finally_pending: Option<PendingSlot>,
    pub finally_location: Option<Location>,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct MutationFact {
    pub pending_id: PendingSlot,
    pub target_name: String,
    pub mutation_kind: MutationKind,
    pub resolution_status: ResolutionStatus,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    ArrayPush,
    ArrayOther,
    ObjectPropertySet,
}

#[derive(Debug, Clone)]
pub struct ReturnStatementFact {
    pub pending_id: PendingSlot,
    pub enclosing_function: Option<PendingSlot>,
    pub returns_value: bool,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct LiteralFact {
    pub pending_id: PendingSlot,
    pub kind: LiteralKind,
    pub raw_text: String,
    pub location: Location,
}

/// An `ObjectExpression` reached while classifying an initializer (spec.md
/// §4.2.1). `GraphBuilder` emits `HAS_PROPERTY` to each `ObjectPropertyFact`
/// minted alongside it.
#[derive(Debug, Clone)]
pub struct ObjectLiteralFact {
    pub pending_id: PendingSlot,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct ObjectPropertyFact {
    pub pending_id: PendingSlot,
    pub object_pending: PendingSlot,
    pub key: String,
    /// Raw text of the property's value expression, scanned for referenced
    /// identifiers the same way a fallback `DERIVES_FROM` is resolved
    /// elsewhere — properties don't warrant a full recursive classifier.
    pub value_text: String,
    pub location: Location,
}

/// An `ArrayExpression` reached while classifying an initializer. Elements
/// get `HAS_ELEMENT` edges from the array, keyed by position.
#[derive(Debug, Clone)]
pub struct ArrayLiteralFact {
    pub pending_id: PendingSlot,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct ArrayElementFact {
    pub pending_id: PendingSlot,
    pub array_pending: PendingSlot,
    pub index: u32,
    pub value_text: String,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    String,
    Number,
    Boolean,
    Null,
    Undefined,
    RegExp,
    Template,
}

/// Miscellaneous edge-only facts (spec.md §4.2 step 14: AWAITS, CHAINS_FROM,
/// DEFAULTS_TO) that don't need their own node.
#[derive(Debug, Clone)]
pub struct EdgeOnlyFact {
    pub from_pending: PendingSlot,
    pub to_name: String,
    pub edge_kind: MiscEdgeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiscEdgeKind {
    Awaits,
    ChainsFrom,
    DefaultsTo,
}

/// All facts collected for one file during extraction (spec.md §4.2 step 3:
/// "a Collections record: keyed arrays for each entity kind").
#[derive(Debug, Clone, Default)]
pub struct ModuleCollections {
    pub imports: Vec<ImportFact>,
    pub exports: Vec<ExportFact>,
    pub variables: Vec<VariableFact>,
    pub parameters: Vec<ParameterFact>,
    pub functions: Vec<FunctionFact>,
    pub module_assignments: Vec<ModuleAssignmentFact>,
    pub update_expressions: Vec<UpdateExpressionFact>,
    pub classes: Vec<ClassFact>,
    pub class_instantiations: Vec<ClassInstantiationFact>,
    pub ts_declarations: Vec<TsDeclarationFact>,
    pub calls: Vec<CallFact>,
    pub call_arguments: Vec<CallArgumentFact>,
    pub top_level_awaits: Vec<TopLevelAwaitFact>,
    pub property_accesses: Vec<PropertyAccessFact>,
    pub new_expressions: Vec<NewExpressionFact>,
    pub branches: Vec<BranchFact>,
    pub cases: Vec<CaseFact>,
    pub loops: Vec<LoopFact>,
    pub try_blocks: Vec<TryFact>,
    pub misc_edges: Vec<EdgeOnlyFact>,
    pub mutations: Vec<MutationFact>,
    pub return_statements: Vec<ReturnStatementFact>,
    pub literals: Vec<LiteralFact>,
    pub object_literals: Vec<ObjectLiteralFact>,
    pub object_properties: Vec<ObjectPropertyFact>,
    pub array_literals: Vec<ArrayLiteralFact>,
    pub array_elements: Vec<ArrayElementFact>,
    pub promise_executors: Vec<PromiseExecutorFact>,
    pub has_top_level_await: bool,
}

impl ModuleCollections {
    /// All `PendingId`s a single fact touches are assumed to have already
    /// been pushed into the shared `IdGenerator`; this just confirms the
    /// resolver sees every slot this module minted, used in tests.
    pub fn pending_slot_count(&self) -> usize {
        self.imports.len()
            + self.exports.len()
            + self.variables.len()
            + self.parameters.len()
            + self.functions.len()
            + self.module_assignments.len()
            + self.update_expressions.len()
            + self.classes.len()
            + self.class_instantiations.len()
            + self.ts_declarations.len()
            + self.calls.len()
            + self.call_arguments.len()
            + self.top_level_awaits.len()
            + self.property_accesses.len()
            + self.new_expressions.len()
            + self.branches.len()
            + self.cases.len()
            + self.loops.len()
            + self.try_blocks.len()
            + self.mutations.len()
            + self.return_statements.len()
            + self.literals.len()
            + self.object_literals.len()
            + self.object_properties.len()
            + self.array_literals.len()
            + self.array_elements.len()
    }
}

/// A `PendingId` a visitor just minted, paired with where it's headed in
/// `ModuleCollections`. Visitors build these via `BuilderContext` helpers;
/// kept here since it's the common currency between `ids::IdGenerator` and
/// every fact struct's `pending_id` field.
pub type MintedId = PendingId;

pub fn slot_of(id: &MintedId) -> PendingSlot {
    id.slot
}

pub fn shape_of(id: &MintedId) -> IdShape {
    id.shape
}
