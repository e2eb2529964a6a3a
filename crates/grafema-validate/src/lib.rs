//! Validators (spec.md §4.9, §8.1 invariant 5): read-only checks that
//! produce `Issue` nodes during the VALIDATION phase. Each is a
//! `grafema_core::Plugin` with `PluginPhase::Validation`, given a
//! `ctx.report_issue` callback in addition to the usual graph handle.

pub mod await_in_loop;

pub use await_in_loop::AwaitInLoopValidator;
