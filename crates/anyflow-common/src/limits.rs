//! Centralized limits and thresholds for the analyzer.
//!
//! Recursion limits for the detector's structural comparison live in
//! `anyflow_solver::recursion::RecursionProfile` rather than here, so the
//! profiles stay the single source of truth for solver recursion.

// =============================================================================
// Tree Walk Limits (Checker)
// =============================================================================

/// Maximum number of parent hops when walking up the syntax tree.
///
/// Prevents infinite loops when a malformed arena contains a parent cycle.
/// A well-formed tree never gets close: the walk from a return statement to
/// its enclosing function is bounded by the nesting depth of the source.
pub const MAX_TREE_WALK_ITERATIONS: usize = 10_000;

/// Maximum depth when descending the syntax tree to collect return sites.
///
/// Deeper subtrees are skipped rather than risking a stack overflow on
/// pathological input.
pub const MAX_SYNTAX_DEPTH: u32 = 1_000;

// =============================================================================
// Type Resolution Limits (Solver)
// =============================================================================

/// Maximum number of deferred alias hops followed when resolving a type.
///
/// `type A = B; type B = A;` resolves to nothing; the bound turns that into
/// an unresolvable (and therefore safe) descriptor instead of a hang.
pub const MAX_ALIAS_RESOLUTION_DEPTH: u32 = 64;

/// Maximum number of `Array<...>` layers unwrapped by the classifier.
pub const MAX_ARRAY_NESTING_DEPTH: u32 = 100;

/// Maximum nesting depth rendered by the type formatter before eliding
/// the remainder as `...`.
pub const MAX_FORMAT_DEPTH: u32 = 32;
