//! Return-site checking for the anyflow analyzer.
//!
//! This crate walks a checked program's syntax tree, finds every place a
//! function hands a value back to its caller, and reports returned values
//! that leak `any`, using the classifier and unsafe-assignment detector
//! from `anyflow-solver`.
//!
//! The program is reached through [`CheckerHost`]; [`TypedProgram`] is an
//! in-memory host.

pub mod context;
pub mod error;
pub mod host;
pub mod node;
pub mod return_site;
pub mod scope_finder;
pub mod unsafe_return;

pub use context::{CheckerOptions, OverloadPolicy};
pub use error::CheckError;
pub use host::{CheckerHost, TypedProgram};
pub use node::{NodeArena, NodeIndex, NodeKind};
pub use return_site::{ReturnSite, collect_return_sites};
pub use scope_finder::find_enclosing_function;
pub use unsafe_return::{
    DiagnosticSink, UnsafeReturnChecker, UnsafeReturnFinding, UnsafeReturnKind,
    check_unsafe_returns,
};
