use colored::Colorize;
use rustc_hash::FxHashMap;
use std::path::Path;

use anyflow_common::diagnostics::{Diagnostic, DiagnosticCategory};
use anyflow_common::position::LineMap;

/// Prefix of rendered diagnostic codes (`AF7101`).
pub const CODE_PREFIX: &str = "AF";

/// Renders diagnostics as text, optionally colored and with a source
/// snippet under each one.
pub struct Reporter {
    color: bool,
    snippets: bool,
    sources: FxHashMap<String, String>,
    line_maps: FxHashMap<String, LineMap>,
}

impl Reporter {
    pub fn new(color: bool) -> Self {
        Reporter {
            color,
            snippets: color,
            sources: FxHashMap::default(),
            line_maps: FxHashMap::default(),
        }
    }

    /// Show the source line under each diagnostic. On by default in color
    /// mode.
    pub fn with_snippets(mut self, snippets: bool) -> Self {
        self.snippets = snippets;
        self
    }

    /// Register the text of `file` so it is not read from disk.
    pub fn add_source(&mut self, file: impl Into<String>, text: impl Into<String>) {
        let file = file.into();
        self.line_maps.remove(&file);
        self.sources.insert(file, text.into());
    }

    pub fn render(&mut self, diagnostics: &[Diagnostic]) -> String {
        let mut out = String::new();
        for (index, diagnostic) in diagnostics.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            out.push_str(&self.format_diagnostic(diagnostic));
        }
        out
    }

    pub fn format_diagnostic(&mut self, diagnostic: &Diagnostic) -> String {
        let mut output = match self.format_location(&diagnostic.file, diagnostic.start) {
            Some(location) => location,
            None if !diagnostic.file.is_empty() => diagnostic.file.clone(),
            None => "<unknown>".to_string(),
        };

        output.push_str(" - ");
        output.push_str(&self.format_category(diagnostic.category));
        let code = self.format_code(diagnostic.code);
        if !code.is_empty() {
            output.push(' ');
            output.push_str(&code);
        }
        output.push_str(": ");
        output.push_str(&diagnostic.message_text);

        if self.snippets
            && let Some(snippet) =
                self.format_snippet(&diagnostic.file, diagnostic.start, diagnostic.length)
        {
            output.push_str(&snippet);
        }
        output
    }

    /// Summary line printed after the findings.
    pub fn format_summary(&self, findings: usize, files: usize) -> String {
        let noun = if findings == 1 { "finding" } else { "findings" };
        let file_noun = if files == 1 { "file" } else { "files" };
        let text = format!("Found {findings} {noun} in {files} {file_noun}.");
        if self.color && findings > 0 {
            text.bold().to_string()
        } else {
            text
        }
    }

    /// Source line of the diagnostic with the span underlined:
    ///
    /// ```text
    ///     2     return value;
    ///           ~~~~~~~~~~~~~
    /// ```
    ///
    /// Spans that run past the end of the line are cut at the line end.
    fn format_snippet(&mut self, file: &str, start: u32, length: u32) -> Option<String> {
        if file.is_empty() || length == 0 {
            return None;
        }
        self.ensure_line_map(file)?;
        let source = self.sources.get(file)?;
        let line_map = self.line_maps.get(file)?;

        let position = line_map.position(start, source);
        let line_text = line_map.line_text(position.line, source)?;
        let line_start = line_map.line_start(position.line)?;
        let span_end = start.saturating_add(length).saturating_sub(line_start) as usize;

        let mut underline = String::new();
        for (index, (offset, ch)) in line_text.char_indices().enumerate() {
            if offset >= span_end {
                break;
            }
            let width = if ch == '\t' { 4 } else { 1 };
            let mark = if index < position.column as usize { ' ' } else { '~' };
            underline.extend(std::iter::repeat_n(mark, width));
        }
        if !underline.contains('~') {
            underline.push('~');
        }

        let underline = if self.color {
            underline.red().to_string()
        } else {
            underline
        };
        let line_text = line_text.replace('\t', "    ");
        Some(format!(
            "\n  {:>3}   {}\n        {}",
            position.line + 1,
            line_text,
            underline
        ))
    }

    fn format_location(&mut self, file: &str, offset: u32) -> Option<String> {
        if file.is_empty() {
            return None;
        }
        self.ensure_line_map(file)?;
        let source = self.sources.get(file)?;
        let position = self.line_maps.get(file)?.position(offset, source);
        Some(format!(
            "{}:{}:{}",
            file,
            position.line + 1,
            position.column + 1
        ))
    }

    fn ensure_line_map(&mut self, file: &str) -> Option<()> {
        if !self.sources.contains_key(file) {
            let contents = std::fs::read_to_string(Path::new(file)).ok()?;
            self.sources.insert(file.to_string(), contents);
        }
        if !self.line_maps.contains_key(file) {
            let map = LineMap::build(self.sources.get(file)?);
            self.line_maps.insert(file.to_string(), map);
        }
        Some(())
    }

    fn format_category(&self, category: DiagnosticCategory) -> String {
        let label = match category {
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Suggestion => "suggestion",
            DiagnosticCategory::Message => "message",
        };
        if !self.color {
            return label.to_string();
        }
        match category {
            DiagnosticCategory::Error => label.red().bold().to_string(),
            DiagnosticCategory::Warning => label.yellow().bold().to_string(),
            DiagnosticCategory::Suggestion => label.blue().bold().to_string(),
            DiagnosticCategory::Message => label.cyan().bold().to_string(),
        }
    }

    fn format_code(&self, code: u32) -> String {
        if code == 0 {
            return String::new();
        }
        let label = format!("{CODE_PREFIX}{code}");
        if self.color {
            label.bright_blue().to_string()
        } else {
            label
        }
    }
}
