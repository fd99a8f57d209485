//! Type-Flow Safety Solver
//!
//! This crate answers two questions about an already type-checked program:
//!
//! - **Classification**: is a type `any`, an array of `any`, or safe?
//!   ([`classify_any`])
//! - **Unsafe assignment**: does assigning a value of one type to a location
//!   of another silently narrow `any` into a typed shape?
//!   ([`UnsafeAssignmentChecker`])
//!
//! Types live in a host-owned graph reached through [`TypeDatabase`];
//! [`TypeInterner`] is the in-tree implementation.
//!
//! Key properties:
//! - O(1) type identity via interning (`TypeId` comparison)
//! - Cycles (only possible through deferred definitions) are cut by a
//!   visiting set, never by unbounded recursion
//! - Anything unresolvable is treated as safe

mod db;
mod format;
mod intern;
pub mod recursion;
pub mod type_classifier;
pub mod types;
pub mod unsafe_assignment;

pub use db::{TypeDatabase, resolve_alias};
pub use format::TypeFormatter;
pub use intern::TypeInterner;
pub use type_classifier::{AnyClassification, array_element_type, classify_any, tolerates_dynamic};
pub use types::{
    CallSignature, CallableShape, CallableShapeId, DefId, DefinitionInfo, FunctionShape,
    FunctionShapeId, IntrinsicKind, LiteralValue, OrderedFloat, ParamInfo, TypeApplication,
    TypeApplicationId, TypeData, TypeId, TypeListId,
};
pub use unsafe_assignment::{UnsafeAssignment, UnsafeAssignmentChecker, detect_unsafe_assignment};

#[cfg(test)]
#[path = "../tests/db_tests.rs"]
mod db_tests;
