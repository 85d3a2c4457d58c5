//! Rule file discovery and tolerant parsing.
//!
//! Expands the descriptor's globs, parses `.json` and `.yaml` definitions
//! and pairs each with its sibling `.md` message file. A file that fails to
//! parse is logged and skipped; it never aborts the run.

use crate::error::{Result, TransformError};
use crate::models::{RuleRecord, SkipReason};
use crate::template;
use glob::glob;
use serde_json::{Map, Value as Json};
use serde_yaml::Mapping;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Definition file extensions accepted by each entry point.
pub const SECURITY_EXTENSIONS: &[&str] = &["json", "yaml"];
pub const COMPLIANCE_EXTENSIONS: &[&str] = &["json"];

#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub records: Vec<RuleRecord>,
    pub skipped: Vec<(PathBuf, SkipReason)>,
}

/// Expand every pattern (recursive `**` supported) in order.
pub fn expand_globs(patterns: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for pat in patterns {
        match glob(pat) {
            Ok(paths) => {
                for entry in paths {
                    match entry {
                        Ok(p) => files.push(p),
                        Err(e) => debug!("unreadable glob entry: {}", e),
                    }
                }
            }
            Err(e) => warn!("Invalid glob pattern {}: {}", pat, e),
        }
    }
    files
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

fn into_object(path: &Path, value: Json) -> Result<Map<String, Json>> {
    match value {
        Json::Object(map) => Ok(map),
        Json::Null => Ok(Map::new()),
        other => Err(TransformError::parse(
            path,
            format!("expected a mapping, found {}", kind(&other)),
        )),
    }
}

fn kind(v: &Json) -> &'static str {
    match v {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

/// Parse one definition file.
///
/// Returns `Ok(None)` for extensions outside `.json`/`.yaml`.
pub fn parse_rule_file(path: &Path, vars: &Mapping) -> Result<Option<Map<String, Json>>> {
    let value: Json = match extension(path) {
        Some("json") => {
            let text = fs::read_to_string(path).map_err(|e| TransformError::parse(path, e))?;
            serde_json::from_str(&text).map_err(|e| TransformError::parse(path, e))?
        }
        Some("yaml") => {
            let text = fs::read_to_string(path).map_err(|e| TransformError::parse(path, e))?;
            if template::is_templated(&text) {
                let rendered = template::render_file(path, &text, vars)?;
                serde_yaml::from_str(&rendered).map_err(|e| TransformError::parse(path, e))?
            } else {
                serde_yaml::from_str(&text).map_err(|e| TransformError::parse(path, e))?
            }
        }
        _ => return Ok(None),
    };
    into_object(path, value).map(Some)
}

/// Sibling message file: same path with a `.md` extension.
pub fn message_path(path: &Path) -> PathBuf {
    path.with_extension("md")
}

/// Enumerate, parse and pair rule files for one descriptor.
pub fn load(patterns: &[String], vars: &Mapping, extensions: &[&str]) -> LoadOutcome {
    let mut out = LoadOutcome::default();
    for path in expand_globs(patterns) {
        match extension(&path) {
            Some(ext) if extensions.contains(&ext) => {}
            _ => continue,
        }
        let fields = match parse_rule_file(&path, vars) {
            Ok(Some(fields)) => fields,
            Ok(None) => continue,
            Err(e) => {
                warn!("{}", e);
                out.skipped.push((path, SkipReason::Parse));
                continue;
            }
        };
        if fields.is_empty() {
            debug!("empty rule file {}", path.display());
            out.skipped.push((path, SkipReason::Empty));
            continue;
        }
        let message_path = message_path(&path);
        if !message_path.exists() {
            debug!("no message file for {}", path.display());
            out.skipped.push((path, SkipReason::MissingMessage));
            continue;
        }
        out.records.push(RuleRecord {
            path,
            fields,
            message_path,
        });
    }
    out
}
