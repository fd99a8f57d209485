//! Common types and utilities for the anyflow analyzer.
//!
//! This crate provides foundational types used across all anyflow crates:
//! - String interning (`Atom`, `Interner`)
//! - Source spans (`Span`) and line/column lookup (`LineMap`)
//! - Diagnostic model and the message table
//! - Analyzer limits and thresholds

// String interning for type and parameter names
pub mod interner;
pub use interner::{Atom, Interner};

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::Span;

// Line/column lookup for rendering
pub mod position;
pub use position::{LineMap, Position};

// Centralized limits and thresholds
pub mod limits;

pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticMessage};

#[cfg(test)]
#[path = "../tests/interner_tests.rs"]
mod interner_tests;
