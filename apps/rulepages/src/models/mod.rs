//! Shared data models: parsed rule records, page metadata, content
//! descriptors and run reports.

pub mod content;
pub mod page;

use serde::Serialize;
use serde_json::{Map, Value as Json};
use std::path::PathBuf;

#[derive(Debug, Clone)]
/// Parsed content of one rule definition file paired with its message.
pub struct RuleRecord {
    /// Path of the rule definition file.
    pub path: PathBuf,
    /// Raw top-level fields.
    pub fields: Map<String, Json>,
    /// Path of the sibling `.md` message file.
    pub message_path: PathBuf,
}

impl RuleRecord {
    pub fn get(&self, key: &str) -> Option<&Json> {
        self.fields.get(key)
    }

    /// String field, or `""` when absent or not a string.
    pub fn str_field(&self, key: &str) -> &str {
        self.fields.get(key).and_then(Json::as_str).unwrap_or("")
    }

    /// `framework.name`, or `""`.
    pub fn framework_name(&self) -> &str {
        self.fields
            .get("framework")
            .and_then(|f| f.get("name"))
            .and_then(Json::as_str)
            .unwrap_or("")
    }

    /// File name without extension.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// The definition file failed to parse.
    Parse,
    /// No sibling `.md` message file.
    MissingMessage,
    /// Parsed to an empty document.
    Empty,
    /// Retired, but no previously generated page existed.
    RetiredAbsent,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub file: String,
    pub reason: SkipReason,
}

#[derive(Debug, Default, Serialize)]
/// Result of one action run.
pub struct RunReport {
    pub action: String,
    pub rendered: Vec<String>,
    pub retired: Vec<String>,
    pub skipped: Vec<SkippedFile>,
    pub aliases: Vec<String>,
    pub index_updated: bool,
}

impl RunReport {
    pub fn new(action: impl Into<String>) -> Self {
        RunReport {
            action: action.into(),
            ..Default::default()
        }
    }

    pub fn skip(&mut self, file: &std::path::Path, reason: SkipReason) {
        self.skipped.push(SkippedFile {
            file: file.to_string_lossy().to_string(),
            reason,
        });
    }
}
