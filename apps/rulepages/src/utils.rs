//! Small helpers shared across modules: message prefixes, path display and
//! loose truthiness for heterogeneous rule fields.

use owo_colors::OwoColorize;
use serde_json::Value as Json;
use std::path::Path;

fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

pub fn error_prefix() -> String {
    if colors_enabled() {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    }
}

pub fn note_prefix() -> String {
    if colors_enabled() {
        "note:".cyan().bold().to_string()
    } else {
        "note:".to_string()
    }
}

pub fn info_prefix() -> String {
    if colors_enabled() {
        "info:".blue().bold().to_string()
    } else {
        "info:".to_string()
    }
}

/// Render `p` relative to the working directory when possible.
pub fn rel_to_wd(p: &Path) -> String {
    match std::env::current_dir() {
        Ok(cwd) => pathdiff::diff_paths(p, &cwd)
            .filter(|rel| !rel.starts_with(".."))
            .unwrap_or_else(|| p.to_path_buf())
            .to_string_lossy()
            .to_string(),
        Err(_) => p.to_string_lossy().to_string(),
    }
}

/// Truthiness of a rule field: `null`, `false`, `0`, `""`, `[]` and `{}`
/// are falsy; everything else is truthy.
pub fn truthy(v: &Json) -> bool {
    match v {
        Json::Null => false,
        Json::Bool(b) => *b,
        Json::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Json::String(s) => !s.is_empty(),
        Json::Array(a) => !a.is_empty(),
        Json::Object(o) => !o.is_empty(),
    }
}

/// Same as [`truthy`] for YAML values held in page metadata.
pub fn yaml_truthy(v: &serde_yaml::Value) -> bool {
    use serde_yaml::Value as Y;
    match v {
        Y::Null => false,
        Y::Bool(b) => *b,
        Y::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Y::String(s) => !s.is_empty(),
        Y::Sequence(s) => !s.is_empty(),
        Y::Mapping(m) => !m.is_empty(),
        Y::Tagged(t) => yaml_truthy(&t.value),
    }
}
