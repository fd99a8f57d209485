//! Tracing setup for the `anyflow` binary.
//!
//! Library crates only emit `tracing` events; this module decides whether
//! and how they are printed. Nothing is installed unless `ANYFLOW_LOG` (or
//! `RUST_LOG`) is set, and output always goes to stderr so it never mixes
//! with reported diagnostics on stdout.
//!
//! `ANYFLOW_LOG_FORMAT` picks the layout:
//!
//! - `text` (default): flat `tracing-subscriber` lines
//! - `tree`: indented span hierarchy via `tracing-tree`, one block per
//!   return site
//! - `json`: newline-delimited JSON objects
//!
//! ```bash
//! ANYFLOW_LOG=debug ANYFLOW_LOG_FORMAT=tree anyflow snapshot.json
//! ANYFLOW_LOG="anyflow_solver=trace,anyflow_checker=debug" anyflow snapshot.json
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

pub const LOG_ENV: &str = "ANYFLOW_LOG";
pub const LOG_FORMAT_ENV: &str = "ANYFLOW_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Tree,
    Json,
}

impl LogFormat {
    /// Case-insensitive; anything unrecognized falls back to text.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// What the environment asks for, before anything is installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingSettings {
    /// Filter directives in `RUST_LOG` syntax. `None` means `RUST_LOG`
    /// itself should be read.
    pub directives: Option<String>,
    pub format: LogFormat,
}

impl TracingSettings {
    /// Resolve settings through `var`, which stands in for
    /// `std::env::var`. Returns `None` when tracing was not requested.
    ///
    /// `ANYFLOW_LOG` wins over `RUST_LOG` when both are set.
    pub fn resolve(var: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let directives = var(LOG_ENV);
        if directives.is_none() && var("RUST_LOG").is_none() {
            return None;
        }
        let format = var(LOG_FORMAT_ENV)
            .map(|value| LogFormat::parse(&value))
            .unwrap_or_default();
        Some(TracingSettings { directives, format })
    }

    pub fn from_env() -> Option<Self> {
        Self::resolve(|name| std::env::var(name).ok())
    }

    fn filter(&self) -> EnvFilter {
        match &self.directives {
            Some(directives) => EnvFilter::builder().parse_lossy(directives),
            None => EnvFilter::from_default_env(),
        }
    }
}

/// Install the global subscriber if the environment asks for one.
///
/// Calling this more than once is harmless; later calls leave the first
/// subscriber in place.
pub fn init_tracing() {
    let Some(settings) = TracingSettings::from_env() else {
        return;
    };
    let filter = settings.filter();

    let installed = match settings.format {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_writer(std::io::stderr)
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_targets(true);
            Registry::default().with(filter).with(tree_layer).try_init()
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).try_init()
        }
        LogFormat::Text => {
            let text_layer = fmt::layer().with_writer(std::io::stderr);
            Registry::default().with(filter).with(text_layer).try_init()
        }
    };
    if installed.is_err() {
        tracing::debug!("a global tracing subscriber was already installed");
    }
}

#[cfg(test)]
#[path = "tests/tracing_config_tests.rs"]
mod tests;
