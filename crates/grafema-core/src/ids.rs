//! Semantic id synthesis (spec.md §4.1).
//!
//! `IdGenerator` never hands a visitor a finished id string. It hands out a
//! `PendingId`, which carries a base id computed from scope/position/name
//! plus a `PendingSlot` — an opaque handle a fact can store instead of a raw
//! string. Multiple pending ids can share the same base (two anonymous arrow
//! functions with identical context); the slot is what lets `CollisionResolver`
//! tell them apart and rewrite every back-reference (e.g. `callArguments.callId`)
//! unambiguously once final ids are assigned, even when the base id string
//! alone cannot.

use crate::scope::ScopeContext;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

/// A stable, textual node identifier. Either a semantic id derived from
/// scope/name/position, or a legacy `FILE:TYPE:name:line:column:counter` id.
/// Readers must accept both shapes (spec.md §4.1).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SemanticId(String);

impl SemanticId {
    pub fn new(raw: impl Into<String>) -> Self {
        SemanticId(raw.into())
    }

    pub fn legacy(file: &str, ty: &str, name: &str, line: u32, column: u32, counter: u64) -> Self {
        SemanticId(format!("{file}:{ty}:{name}:{line}:{column}:{counter}"))
    }

    pub fn is_legacy(&self) -> bool {
        self.0.matches(':').count() >= 5 && !self.0.contains('#')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Appends a disambiguating suffix, used by `CollisionResolver`.
    fn with_suffix(&self, n: u32) -> Self {
        SemanticId(format!("{}#{n}", self.0))
    }
}

impl fmt::Display for SemanticId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SemanticId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(SemanticId(s.to_string()))
    }
}

/// Which of the three `IdGenerator` shapes produced a given `PendingId`
/// (spec.md §4.1); kept so `CollisionResolver` can log useful diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdShape {
    Simple,
    Positional,
    Scope,
}

/// Opaque handle into `CollisionResolver`'s resolution table. Facts (e.g. a
/// `CallArgument`'s `call_id`) store this instead of a `SemanticId` until
/// resolution runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingSlot(pub u64);

/// A not-yet-finalized id: the base id computed eagerly, plus the slot that
/// identifies *this occurrence* among any colliding siblings.
#[derive(Debug, Clone)]
pub struct PendingId {
    pub slot: PendingSlot,
    pub base: SemanticId,
    pub shape: IdShape,
    /// AST visit order, used to break ties deterministically (invariant 6).
    pub sequence: u64,
}

/// Emits `PendingId`s for one file's extraction run. Mixing legacy and
/// semantic shapes for the same node kind within one run is a logic error
/// (spec.md §9 / SPEC_FULL.md §4.1); `use_legacy` is fixed at construction.
pub struct IdGenerator {
    file: String,
    use_legacy: bool,
    next_slot: AtomicU64,
    next_sequence: AtomicU64,
    pending: parking_lot::Mutex<Vec<PendingId>>,
}

impl IdGenerator {
    pub fn new(file: impl Into<String>) -> Self {
        IdGenerator {
            file: file.into(),
            use_legacy: false,
            next_slot: AtomicU64::new(0),
            next_sequence: AtomicU64::new(0),
            pending: parking_lot::Mutex::new(Vec::new()),
        }
    }

    pub fn with_legacy_ids(file: impl Into<String>) -> Self {
        IdGenerator {
            file: file.into(),
            use_legacy: true,
            next_slot: AtomicU64::new(0),
            next_sequence: AtomicU64::new(0),
            pending: parking_lot::Mutex::new(Vec::new()),
        }
    }

    fn next_slot(&self) -> PendingSlot {
        PendingSlot(self.next_slot.fetch_add(1, Ordering::Relaxed))
    }

    fn next_sequence(&self) -> u64 {
        self.next_sequence.fetch_add(1, Ordering::Relaxed)
    }

    fn record(&self, base: SemanticId, shape: IdShape) -> PendingId {
        let pending = PendingId {
            slot: self.next_slot(),
            base,
            shape,
            sequence: self.next_sequence(),
        };
        self.pending.lock().push(pending.clone());
        pending
    }

    /// Stable id keyed on type+name within the current scope. Used for
    /// declared functions and classes, where the name itself disambiguates.
    pub fn generate_simple(&self, kind: &str, name: &str, ctx: &ScopeContext) -> PendingId {
        let base = if self.use_legacy {
            SemanticId::legacy(&self.file, kind, name, ctx.line, ctx.column, 0)
        } else {
            SemanticId::new(format!("{}::{kind}:{name}", ctx.path_key()))
        };
        self.record(base, IdShape::Simple)
    }

    /// For anonymous or position-bearing constructs. `counter` disambiguates
    /// siblings sharing the same scope (e.g. the Nth arrow function literal).
    pub fn generate(
        &self,
        kind: &str,
        name: &str,
        line: u32,
        column: u32,
        counter: u64,
    ) -> PendingId {
        let base = if self.use_legacy {
            SemanticId::legacy(&self.file, kind, name, line, column, counter)
        } else {
            SemanticId::new(format!(
                "{}:{kind}:{name}:{line}:{column}:{counter}",
                self.file
            ))
        };
        self.record(base, IdShape::Positional)
    }

    /// Id for a `Scope` node.
    pub fn generate_scope(
        &self,
        scope_kind: &str,
        label: &str,
        line: u32,
        column: Option<u32>,
    ) -> PendingId {
        let base = match column {
            Some(col) => SemanticId::new(format!(
                "{}:scope:{scope_kind}:{label}:{line}:{col}",
                self.file
            )),
            None => SemanticId::new(format!("{}:scope:{scope_kind}:{label}:{line}", self.file)),
        };
        self.record(base, IdShape::Scope)
    }

    /// Drains all pending ids generated so far, in generation order, for
    /// handoff to the `CollisionResolver`.
    pub fn take_pending(&self) -> Vec<PendingId> {
        std::mem::take(&mut self.pending.lock())
    }
}

/// Final mapping from `PendingSlot` to resolved `SemanticId`, produced by
/// `CollisionResolver::resolve`.
#[derive(Debug, Clone, Default)]
pub struct IdResolution {
    by_slot: HashMap<PendingSlot, SemanticId>,
}

impl IdResolution {
    /// The resolved id for a slot. Panics if the slot was never registered —
    /// every fact that stored a `PendingSlot` must have come from the same
    /// `IdGenerator` whose `take_pending()` fed this resolution.
    pub fn final_id(&self, slot: PendingSlot) -> &SemanticId {
        self.by_slot
            .get(&slot)
            .unwrap_or_else(|| panic!("unresolved pending slot {:?} — id generator/resolver mismatch", slot))
    }

    pub fn try_final_id(&self, slot: PendingSlot) -> Option<&SemanticId> {
        self.by_slot.get(&slot)
    }
}

/// Groups pending ids by base id and assigns `#N` suffixes to any group of
/// size greater than one, in stable AST-visit (sequence) order (invariant 6).
pub struct CollisionResolver;

impl CollisionResolver {
    pub fn resolve(pending: &[PendingId]) -> IdResolution {
        let mut by_base: HashMap<&SemanticId, Vec<&PendingId>> = HashMap::new();
        for p in pending {
            by_base.entry(&p.base).or_default().push(p);
        }

        let mut by_slot = HashMap::with_capacity(pending.len());
        for (base, mut group) in by_base {
            group.sort_by_key(|p| p.sequence);
            if group.len() == 1 {
                by_slot.insert(group[0].slot, base.clone());
            } else {
                for (n, p) in group.into_iter().enumerate() {
                    by_slot.insert(p.slot, base.with_suffix(n as u32));
                }
            }
        }

        IdResolution { by_slot }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ScopeContext {
        ScopeContext {
            file: "a.ts".into(),
            scopes: vec!["moduleFn".into()],
            line: 1,
            column: 0,
        }
    }

    #[test]
    fn unique_base_ids_pass_through_unsuffixed() {
        let gen = IdGenerator::new("a.ts");
        let a = gen.generate("Function", "foo", 1, 0, 0);
        let b = gen.generate("Function", "bar", 2, 0, 0);
        let pending = gen.take_pending();
        let resolution = CollisionResolver::resolve(&pending);
        assert_eq!(resolution.final_id(a.slot).as_str(), a.base.as_str());
        assert_eq!(resolution.final_id(b.slot).as_str(), b.base.as_str());
    }

    #[test]
    fn colliding_base_ids_get_stable_suffixes_in_visit_order() {
        let gen = IdGenerator::new("a.ts");
        let first = gen.generate("Function", "<anonymous>", 5, 2, 0);
        let second = gen.generate("Function", "<anonymous>", 5, 2, 0);
        let pending = gen.take_pending();
        let resolution = CollisionResolver::resolve(&pending);
        assert_eq!(resolution.final_id(first.slot).as_str(), format!("{}#0", first.base));
        assert_eq!(resolution.final_id(second.slot).as_str(), format!("{}#1", second.base));
    }

    #[test]
    fn generate_simple_uses_scope_path() {
        let gen = IdGenerator::new("a.ts");
        let id = gen.generate_simple("Function", "outer", &ctx());
        assert!(id.base.as_str().contains("outer"));
    }

    #[test]
    fn legacy_ids_match_fixed_shape() {
        let gen = IdGenerator::with_legacy_ids("a.ts");
        let id = gen.generate("Function", "foo", 10, 4, 2);
        assert!(id.base.is_legacy());
        assert_eq!(id.base.as_str(), "a.ts:Function:foo:10:4:2");
    }
}
