//! Front-matter derivation for rule pages.
//!
//! Maps heterogeneous rule metadata (tags, framework, path-derived
//! categories) onto the page schema consumed by the docs site.
//!
//! The two builders differ on purpose in how they treat tags:
//! - `build_security` only honours tags of the form `key:value` and skips
//!   anything else.
//! - `build_compliance` requires every tag to contain exactly one `:` and
//!   fails the whole run otherwise.

use crate::error::{Result, TransformError};
use crate::models::page::{string_list, PageMetadata};
use crate::models::RuleRecord;
use crate::utils::truthy;
use regex::Regex;
use serde_json::Value as Json;
use serde_yaml::Value as Yaml;
use std::sync::OnceLock;
use tracing::debug;

pub const DEFAULT_RULES_PATH: &str = "/security_monitoring/default_rules";

fn title_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)\[.+\]\s?(.*)").expect("valid title regex"))
}

/// Strip bracketed prefixes: `"[CIS Docker] Ensure that.."` becomes
/// `"Ensure that.."`.
pub fn strip_title(name: &str) -> String {
    title_re().replace_all(name, "$1").into_owned()
}

/// Path of the rule's directory relative to the repository checkout.
///
/// Uses the text after the first `/<repo_name>/` segment, or `""` when the
/// repository name does not appear (no categories are derived then).
pub fn relative_to_repo(parent: &str, repo_name: &str) -> String {
    let marker = format!("/{}/", repo_name);
    match parent.find(&marker) {
        Some(i) => parent[i + marker.len()..].to_string(),
        None => {
            debug!("{} is outside repository {}", parent, repo_name);
            String::new()
        }
    }
}

/// Categories used for filtering, in check order.
pub fn categorize(relative_path: &str) -> Vec<String> {
    let mut cats = Vec::new();
    if relative_path.contains("configuration") {
        cats.push("Cloud Configuration".to_string());
    }
    if relative_path.contains("security-monitoring") {
        cats.push("Log Detection".to_string());
    }
    if relative_path.contains("runtime") {
        if relative_path.contains("compliance") {
            cats.push("Infrastructure Configuration".to_string());
        } else {
            cats.push("Workload Security".to_string());
        }
    }
    cats
}

fn base_page(record: &RuleRecord) -> PageMetadata {
    let mut page = PageMetadata::new();
    page.set("title", strip_title(record.str_field("name")));
    page.set("kind", "documentation");
    page.set("type", "security_rules");
    page.set("disable_edit", true);
    page.set("integration_id", "");
    page
}

fn json_to_yaml(v: &Json) -> Yaml {
    serde_yaml::to_value(v).unwrap_or(Yaml::Null)
}

/// Front matter for the security-rules entry point.
///
/// `compliance_action` enables the manual fallback used when a compliance
/// rule carries no tags.
pub fn build_security(
    record: &RuleRecord,
    relative_path: &str,
    compliance_action: bool,
) -> PageMetadata {
    let mut page = base_page(record);
    let rule_id = record.str_field("defaultRuleId").trim().to_string();
    let stem = record.stem();
    page.set(
        "aliases",
        string_list([
            rule_id.clone(),
            format!("{}/{}", DEFAULT_RULES_PATH, rule_id),
            format!("{}/{}", DEFAULT_RULES_PATH, stem),
        ]),
    );
    page.set("rule_category", string_list(categorize(relative_path)));

    let tags = record
        .get("tags")
        .and_then(Json::as_array)
        .filter(|t| !t.is_empty());
    if let Some(tags) = tags {
        if let Some(source) = record.get("source").filter(|v| truthy(v)) {
            page.set("source", json_to_yaml(source));
        }
        for tag in tags.iter().filter_map(Json::as_str) {
            if let Some((key, value)) = tag.split_once(':') {
                page.set(key, value);
            }
        }
    } else if compliance_action {
        let tech = record.framework_name().replace("cis-", "");
        let source = record
            .get("source")
            .filter(|v| truthy(v))
            .map(json_to_yaml)
            .unwrap_or_else(|| Yaml::String(tech.clone()));
        page.set("source", source);
        page.set("security", "compliance");
        page.set("framework", record.framework_name());
        page.set(
            "control",
            record.get("control").map(json_to_yaml).unwrap_or_else(|| "".into()),
        );
        page.set("scope", tech);
    }

    finalize(page)
}

/// Front matter for the compliance-rules entry point.
pub fn build_compliance(record: &RuleRecord) -> Result<PageMetadata> {
    let mut page = base_page(record);
    page.set(
        "aliases",
        string_list([record.str_field("defaultRuleId").trim()]),
    );
    page.set("source", record.framework_name().replace("cis-", ""));

    if let Some(tags) = record.get("tags").and_then(Json::as_array) {
        for tag in tags {
            let (key, value) = split_strict(tag).ok_or_else(|| TransformError::MalformedTag {
                path: record.path.clone(),
                tag: tag.as_str().map(str::to_string).unwrap_or_else(|| tag.to_string()),
            })?;
            page.set(key, value);
        }
    }

    Ok(finalize(page))
}

fn split_strict(tag: &Json) -> Option<(&str, &str)> {
    let s = tag.as_str()?;
    let (key, value) = s.split_once(':')?;
    if value.contains(':') {
        return None;
    }
    Some((key, value))
}

/// Lower-case `source`/`scope` and derive `integration_id`.
pub fn finalize(mut page: PageMetadata) -> PageMetadata {
    page.lowercase("source");
    page.lowercase("scope");

    let integration_id = page
        .get_truthy("scope")
        .or_else(|| page.get("source"))
        .cloned()
        .unwrap_or_else(|| Yaml::String(String::new()));
    let integration_id = if page.get_str("cloud") == Some("aws") {
        Yaml::String(format!("amazon-{}", yaml_text(&integration_id)))
    } else {
        integration_id
    };
    page.set("integration_id", integration_id);
    page
}

fn yaml_text(v: &Yaml) -> String {
    match v {
        Yaml::String(s) => s.clone(),
        Yaml::Null => String::new(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}
