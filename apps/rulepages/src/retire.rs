//! Retirement of rules that are staged, deleted, disabled or restricted to
//! specific orgs.

use crate::aliases::AliasSet;
use crate::error::{Result, TransformError};
use crate::models::RuleRecord;
use crate::utils::truthy;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Enabled flag read by the security-rules entry point.
pub const SECURITY_ENABLED_KEY: &str = "isEnabled";
/// Enabled flag read by the compliance-rules entry point.
pub const COMPLIANCE_ENABLED_KEY: &str = "enabled";

/// A rule is retired when any of the following hold: it carries a
/// `restrictedToOrgs` field, `isStaged` is truthy, `isDeleted` is truthy, or
/// its enabled flag is present and falsy.
pub fn is_retired(record: &RuleRecord, enabled_key: &str) -> bool {
    record.fields.contains_key("restrictedToOrgs")
        || record.get("isStaged").map(truthy).unwrap_or(false)
        || record.get("isDeleted").map(truthy).unwrap_or(false)
        || !record.get(enabled_key).map(truthy).unwrap_or(true)
}

/// Redirect paths recorded for a removed page.
pub fn retirement_aliases(stem: &str) -> [String; 2] {
    [
        format!("/security_monitoring/default_rules/{}", stem),
        format!("/security_platform/default_rules/{}", stem),
    ]
}

/// Remove the page previously generated for `stem`, if any.
///
/// Returns the removed path. A missing page is not an error and records no
/// aliases.
pub fn retire(dest_dir: &Path, stem: &str, aliases: &mut AliasSet) -> Result<Option<PathBuf>> {
    let page = dest_dir.join(format!("{}.md", stem));
    if !page.exists() {
        debug!("skipping file {}", page.display());
        return Ok(None);
    }
    info!("removing file {}", page.display());
    fs::remove_file(&page).map_err(|e| TransformError::io(&page, e))?;
    aliases.extend(retirement_aliases(stem));
    Ok(Some(page))
}
