//! Content descriptors: which source files an action pulls and where the
//! generated pages land.

use serde::Deserialize;

pub const COMPLIANCE_RULES: &str = "compliance-rules";

#[derive(Debug, Clone, Deserialize)]
/// One `[[content]]` entry.
pub struct ContentDescriptor {
    /// Action identifier, e.g. `security-rules` or `compliance-rules`.
    pub action: String,
    /// Entry point override; derived from `action` when absent.
    #[serde(default)]
    pub handler: Option<Handler>,
    /// Repository checkout name, used to compute rule paths relative to it.
    pub repo_name: String,
    #[serde(default)]
    pub globs: Vec<String>,
    pub options: ContentOptions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentOptions {
    /// Destination sub-path below the content directory.
    pub dest_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Which of the two entry points processes a descriptor.
pub enum Handler {
    SecurityRules,
    ComplianceRules,
}

impl ContentDescriptor {
    pub fn handler(&self) -> Handler {
        self.handler.unwrap_or(if self.action == COMPLIANCE_RULES {
            Handler::ComplianceRules
        } else {
            Handler::SecurityRules
        })
    }

    /// True when the action asks for the compliance-flavoured front matter.
    pub fn is_compliance_action(&self) -> bool {
        self.action == COMPLIANCE_RULES
    }
}
