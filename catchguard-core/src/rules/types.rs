//! Rule and diagnostic types

use serde::{Deserialize, Serialize};

use crate::grammar::{Language, Range};

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Fixed metadata of one rule
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RuleDescriptor {
    pub id: &'static str,
    pub title: &'static str,
    pub category: &'static str,
    pub default_severity: Severity,
    pub enabled_by_default: bool,
    /// Template with exactly one `{0}` substitution parameter
    pub message_template: &'static str,
    pub description: &'static str,
}

impl RuleDescriptor {
    /// Message with the single substitution parameter filled in
    pub fn format_message(&self, argument: &str) -> String {
        self.message_template.replace("{0}", argument)
    }
}

/// One reported finding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Rule that produced the finding
    pub rule_id: String,
    /// Severity
    pub severity: Severity,
    /// File containing the offending clause
    pub file: String,
    /// Range of the offending clause
    pub range: Range,
    /// Display name of the caught type (or the catch-all placeholder)
    pub offending_type: String,
    /// Formatted message
    pub message: String,
}

/// One source input to the analysis driver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceUnit {
    pub path: String,
    pub language: Language,
    pub source: String,
}

/// Catch analysis result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatchAnalysisResult {
    /// Diagnostics found
    pub diagnostics: Vec<Diagnostic>,
    /// Files analyzed
    pub files_analyzed: usize,
    /// Method-like declarations checked
    pub declarations_checked: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}
