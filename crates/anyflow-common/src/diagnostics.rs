//! Diagnostic types and message lookup.
//!
//! Message templates live in `data.rs` and use positional `{0}`, `{1}`
//! placeholders, filled in by [`format_message`].

pub mod data;

pub use data::{
    DIAGNOSTIC_MESSAGES, UNSAFE_RETURN, UNSAFE_RETURN_ASSIGNMENT, diagnostic_codes,
    diagnostic_messages,
};

use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Suggestion,
    Message,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub code: u32,
    /// Stable message key, used by consumers that localize on their side.
    pub key: &'static str,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

/// A rendered finding attached to a source range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub key: &'static str,
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
}

impl Diagnostic {
    /// Build a diagnostic from a message template and its arguments.
    pub fn from_message(
        message: &DiagnosticMessage,
        file: impl Into<String>,
        start: u32,
        length: u32,
        args: &[&str],
    ) -> Self {
        Self {
            category: message.category,
            code: message.code,
            key: message.key,
            file: file.into(),
            start,
            length,
            message_text: format_message(message.message, args),
        }
    }
}

pub fn get_message(code: u32) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}

pub fn get_message_by_key(key: &str) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.key == key)
}

pub fn format_message(message: &str, args: &[&str]) -> String {
    let mut result = message.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}
