use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use anyflow_checker::{CheckerOptions, OverloadPolicy};

/// CLI arguments for the anyflow binary.
#[derive(Parser, Debug)]
#[command(
    name = "anyflow",
    version,
    about = "Report `any` values leaking out of functions through return statements"
)]
pub struct CliArgs {
    /// Program snapshot files (JSON) to check.
    #[arg(required = true, value_name = "SNAPSHOT")]
    pub files: Vec<PathBuf>,

    // ==================== Output Formatting ====================
    /// How findings are printed.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Enable color and source snippets. Defaults to on when stdout is a terminal.
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub pretty: Option<bool>,

    /// Disable color even when `--pretty` is in effect.
    #[arg(long = "no-color", alias = "noColor")]
    pub no_color: bool,

    // ==================== Checking ====================
    /// Report every unsafe overload of the enclosing function instead of
    /// stopping at the first one.
    #[arg(long = "each-signature", alias = "eachSignature")]
    pub each_signature: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// `file:line:col - error AF7101: message`, with snippets when pretty.
    Text,
    /// A JSON array of diagnostics.
    Json,
}

impl CliArgs {
    pub fn checker_options(&self) -> CheckerOptions {
        let policy = if self.each_signature {
            OverloadPolicy::EachSignature
        } else {
            OverloadPolicy::FirstUnsafe
        };
        CheckerOptions::default().with_overload_policy(policy)
    }

    /// Whether output should be colored, given whether stdout is a terminal.
    pub fn use_color(&self, is_terminal: bool) -> bool {
        !self.no_color && self.pretty.unwrap_or(is_terminal)
    }
}
