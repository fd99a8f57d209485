//! Loads snapshots, runs the return checker over each, and gathers the
//! resulting diagnostics.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info_span};

use crate::cli::args::CliArgs;
use crate::snapshot::load_snapshot_file;
use anyflow_checker::{CheckerHost, CheckerOptions, check_unsafe_returns};
use anyflow_common::diagnostics::Diagnostic;

/// Outcome of checking one snapshot.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    /// File name recorded in the snapshot.
    pub file: String,
    pub source: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default)]
pub struct CheckResult {
    /// One entry per input, in input order.
    pub files: Vec<FileReport>,
}

impl CheckResult {
    /// All diagnostics, file by file, each file ordered by position.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.files
            .iter()
            .flat_map(|report| report.diagnostics.iter().cloned())
            .collect()
    }

    pub fn finding_count(&self) -> usize {
        self.files.iter().map(|report| report.diagnostics.len()).sum()
    }

    pub fn has_findings(&self) -> bool {
        self.files.iter().any(|report| !report.diagnostics.is_empty())
    }
}

pub fn run(args: &CliArgs) -> Result<CheckResult> {
    check_files(&args.files, args.checker_options())
}

/// Check every snapshot in parallel. The first file that fails to load or
/// check aborts the run.
pub fn check_files(paths: &[PathBuf], options: CheckerOptions) -> Result<CheckResult> {
    let files = paths
        .par_iter()
        .map(|path| check_file(path, options))
        .collect::<Result<Vec<_>>>()?;
    Ok(CheckResult { files })
}

pub fn check_file(path: &Path, options: CheckerOptions) -> Result<FileReport> {
    let _span = info_span!("check_file", path = %path.display()).entered();

    let host = load_snapshot_file(path)
        .with_context(|| format!("failed to load snapshot {}", path.display()))?;
    let findings = check_unsafe_returns(&host, host.root(), options)
        .with_context(|| format!("failed to check {}", host.file_name()))?;

    let file = host.file_name().to_string();
    let mut diagnostics: Vec<Diagnostic> = findings
        .iter()
        .map(|finding| finding.to_diagnostic(&file))
        .collect();
    diagnostics.sort_by_key(|diagnostic| (diagnostic.start, diagnostic.code));
    debug!(file = %file, findings = diagnostics.len(), "file checked");

    Ok(FileReport {
        path: path.to_path_buf(),
        file,
        source: host.source().map(str::to_string),
        diagnostics,
    })
}
