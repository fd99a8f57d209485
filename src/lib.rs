//! anyflow: reports `any` values that leak out of functions through
//! return statements.
//!
//! The analysis itself lives in the workspace crates:
//! - [`solver`]: classification of `any` and the unsafe-assignment detector
//! - [`checker`]: return-site discovery and the per-function driver
//! - [`common`]: spans, limits and the diagnostic model
//!
//! This crate adds what the binary needs around them: the program snapshot
//! loader, the CLI, and tracing setup.

pub use anyflow_checker as checker;
pub use anyflow_common as common;
pub use anyflow_solver as solver;

pub mod cli;
pub mod snapshot;
pub mod tracing_config;

pub use snapshot::{SnapshotError, SnapshotHost, load_snapshot_file, load_snapshot_str};
