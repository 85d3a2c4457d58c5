//! Entry points for the `security-rules` and `compliance-rules` actions.
//!
//! Both run the same linear batch: expand globs, parse, retire or render
//! each rule, then publish the collected aliases into the section index
//! when the deployment environment allows it.

use crate::aliases::{self, AliasSet, INDEX_FILE};
use crate::emit;
use crate::error::{Result, TransformError};
use crate::frontmatter;
use crate::loader::{self, COMPLIANCE_EXTENSIONS, SECURITY_EXTENSIONS};
use crate::models::content::{ContentDescriptor, Handler};
use crate::models::page::PageMetadata;
use crate::models::{RuleRecord, RunReport, SkipReason};
use crate::retire::{self, COMPLIANCE_ENABLED_KEY, SECURITY_ENABLED_KEY};
use serde_yaml::Mapping;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default)]
/// Settings shared by every action of one invocation.
pub struct RunContext {
    /// Root content directory the destination sub-path is joined onto.
    pub content_dir: PathBuf,
    /// Value of the deployment environment variable, if set.
    pub deploy_env: Option<String>,
    /// Variables available to `{@ ... @}` expressions in templated YAML.
    pub template_vars: Mapping,
}

impl RunContext {
    pub fn dest_dir(&self, descriptor: &ContentDescriptor) -> PathBuf {
        self.content_dir
            .join(descriptor.options.dest_path.trim_start_matches('/'))
    }
}

/// Run the entry point selected by the descriptor.
pub fn run_content(descriptor: &ContentDescriptor, ctx: &RunContext) -> Result<RunReport> {
    match descriptor.handler() {
        Handler::SecurityRules => security_rules(descriptor, ctx),
        Handler::ComplianceRules => compliance_rules(descriptor, ctx),
    }
}

fn read_message(record: &RuleRecord) -> Result<String> {
    fs::read_to_string(&record.message_path).map_err(|e| TransformError::io(&record.message_path, e))
}

fn parent_text(path: &Path) -> String {
    path.parent()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Shared loop; `build` produces the front matter for surviving rules.
fn run_batch<F>(
    descriptor: &ContentDescriptor,
    ctx: &RunContext,
    extensions: &[&str],
    enabled_key: &str,
    mut build: F,
) -> Result<RunReport>
where
    F: FnMut(&RuleRecord) -> Result<PageMetadata>,
{
    let mut report = RunReport::new(descriptor.action.clone());
    let dest_dir = ctx.dest_dir(descriptor);
    let mut collected = AliasSet::default();

    let loaded = loader::load(&descriptor.globs, &ctx.template_vars, extensions);
    for (path, reason) in &loaded.skipped {
        report.skip(path, *reason);
    }

    for record in &loaded.records {
        let stem = record.stem();
        if retire::is_retired(record, enabled_key) {
            match retire::retire(&dest_dir, &stem, &mut collected)? {
                Some(removed) => report.retired.push(removed.to_string_lossy().to_string()),
                None => report.skip(&record.path, SkipReason::RetiredAbsent),
            }
            continue;
        }
        let message = read_message(record)?;
        let meta = build(record)?;
        let written = emit::write_page(&dest_dir, &stem, &meta, &message)?;
        report.rendered.push(written.to_string_lossy().to_string());
    }

    report.aliases = collected.to_vec();
    if aliases::should_publish(ctx.deploy_env.as_deref()) {
        aliases::update_index(&dest_dir.join(INDEX_FILE), &collected)?;
        report.index_updated = true;
    }
    Ok(report)
}

/// Security-rules entry point: JSON and (optionally templated) YAML rules,
/// tolerant tag handling, path-derived categories.
pub fn security_rules(descriptor: &ContentDescriptor, ctx: &RunContext) -> Result<RunReport> {
    info!("Starting security rules action...");
    let compliance_action = descriptor.is_compliance_action();
    run_batch(
        descriptor,
        ctx,
        SECURITY_EXTENSIONS,
        SECURITY_ENABLED_KEY,
        |record| {
            let relative = frontmatter::relative_to_repo(
                &parent_text(&record.path),
                &descriptor.repo_name,
            );
            Ok(frontmatter::build_security(record, &relative, compliance_action))
        },
    )
}

/// Compliance-rules entry point: JSON rules only, strict tag handling.
///
/// A malformed tag aborts the action.
pub fn compliance_rules(descriptor: &ContentDescriptor, ctx: &RunContext) -> Result<RunReport> {
    info!("Starting compliance rules action...");
    run_batch(
        descriptor,
        ctx,
        COMPLIANCE_EXTENSIONS,
        COMPLIANCE_ENABLED_KEY,
        frontmatter::build_compliance,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::content::ContentOptions;
    use std::collections::BTreeMap;
    use tempfile::{tempdir, TempDir};

    const INDEX: &str = "---\ntitle: Rules\naliases:\n- /keep/me\n---\n\nIndex body.\n";

    struct Fixture {
        _tmp: TempDir,
        repo: PathBuf,
        content: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = tempdir().unwrap();
            let repo = tmp.path().join("extract/rules-repo");
            let content = tmp.path().join("content/en");
            fs::create_dir_all(content.join("security/default_rules")).unwrap();
            fs::write(content.join("security/default_rules/_index.md"), INDEX).unwrap();
            Fixture {
                _tmp: tmp,
                repo,
                content,
            }
        }

        fn rule(&self, rel: &str, definition: &str, message: Option<&str>) {
            let path = self.repo.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, definition).unwrap();
            if let Some(m) = message {
                fs::write(path.with_extension("md"), m).unwrap();
            }
        }

        fn page(&self, stem: &str) -> PathBuf {
            self.content
                .join("security/default_rules")
                .join(format!("{}.md", stem))
        }

        fn index(&self) -> PathBuf {
            self.content.join("security/default_rules/_index.md")
        }

        fn descriptor(&self, action: &str) -> ContentDescriptor {
            ContentDescriptor {
                action: action.to_string(),
                handler: None,
                repo_name: "rules-repo".into(),
                globs: vec![self.repo.join("**/*").to_string_lossy().to_string()],
                options: ContentOptions {
                    dest_path: "security/default_rules/".into(),
                },
            }
        }

        fn ctx(&self, env: Option<&str>) -> RunContext {
            RunContext {
                content_dir: self.content.clone(),
                deploy_env: env.map(str::to_string),
                template_vars: Mapping::new(),
            }
        }
    }

    fn front(path: &Path) -> BTreeMap<String, serde_yaml::Value> {
        let text = fs::read_to_string(path).unwrap();
        let (fm, _) = aliases::split_front_matter(path, &text).unwrap();
        serde_yaml::from_str(fm).unwrap()
    }

    #[test]
    fn test_security_rules_renders_and_retires() {
        let fx = Fixture::new();
        fx.rule(
            "security-monitoring/aws/root.json",
            r#"{"name": "[AWS] Root used", "defaultRuleId": "r-1", "tags": ["source:CloudTrail", "cloud:aws"]}"#,
            Some("  Root account activity.\n"),
        );
        fx.rule(
            "runtime/linux/staged.yaml",
            "name: Staged\nisStaged: true\n",
            Some("m"),
        );
        fx.rule(
            "runtime/linux/disabled.yaml",
            "name: Disabled\nisEnabled: false\n",
            Some("m"),
        );
        fx.rule("runtime/linux/broken.json", "{oops", Some("m"));
        fs::write(fx.page("staged"), "old page").unwrap();

        let report = security_rules(&fx.descriptor("security-rules"), &fx.ctx(None)).unwrap();

        assert_eq!(report.rendered, vec![fx.page("root").to_string_lossy().to_string()]);
        let text = fs::read_to_string(fx.page("root")).unwrap();
        assert!(text.ends_with("---\n\nRoot account activity.\n"));
        let fm = front(&fx.page("root"));
        assert_eq!(fm["title"], "Root used");
        assert_eq!(fm["integration_id"], "amazon-cloudtrail");
        assert_eq!(fm["rule_category"][0], "Log Detection");

        assert!(!fx.page("staged").exists());
        assert!(!fx.page("disabled").exists());
        assert_eq!(report.retired.len(), 1);
        assert_eq!(
            report.aliases,
            vec![
                "/security_monitoring/default_rules/staged",
                "/security_platform/default_rules/staged"
            ]
        );
        assert!(report
            .skipped
            .iter()
            .any(|s| s.file.ends_with("broken.json") && s.reason == SkipReason::Parse));
        assert!(report
            .skipped
            .iter()
            .any(|s| s.file.ends_with("disabled.yaml") && s.reason == SkipReason::RetiredAbsent));
    }

    #[test]
    fn test_index_untouched_outside_publish_environments() {
        let fx = Fixture::new();
        fx.rule("runtime/gone.json", r#"{"isDeleted": true}"#, Some("m"));
        fs::write(fx.page("gone"), "old").unwrap();

        for env in [None, Some("staging")] {
            let report = security_rules(&fx.descriptor("security-rules"), &fx.ctx(env)).unwrap();
            assert!(!report.index_updated);
        }
        assert_eq!(fs::read_to_string(fx.index()).unwrap(), INDEX);
    }

    #[test]
    fn test_index_aliases_published_in_live() {
        let fx = Fixture::new();
        fx.rule("runtime/gone.json", r#"{"restrictedToOrgs": [1]}"#, Some("m"));
        fs::write(fx.page("gone"), "old").unwrap();

        let report = security_rules(&fx.descriptor("security-rules"), &fx.ctx(Some("live"))).unwrap();
        assert!(report.index_updated);
        // second run: page already gone, nothing new collected
        security_rules(&fx.descriptor("security-rules"), &fx.ctx(Some("preview"))).unwrap();

        let aliases: Vec<String> = front(&fx.index())["aliases"]
            .as_sequence()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            aliases,
            vec![
                "/keep/me",
                "/security_monitoring/default_rules/gone",
                "/security_platform/default_rules/gone"
            ]
        );
    }

    #[test]
    fn test_compliance_rules_json_only_with_enabled_flag() {
        let fx = Fixture::new();
        fx.rule(
            "compliance/docker/c1.json",
            r#"{"name": "[CIS Docker] Audit", "defaultRuleId": " c-1", "framework": {"name": "cis-docker"}, "tags": ["scope:Docker"]}"#,
            Some("Audit body"),
        );
        fx.rule("compliance/docker/off.json", r#"{"enabled": false}"#, Some("m"));
        fx.rule("compliance/docker/y.yaml", "name: y\n", Some("m"));
        fs::write(fx.page("off"), "old").unwrap();

        let report = compliance_rules(&fx.descriptor("compliance-rules"), &fx.ctx(None)).unwrap();
        assert_eq!(report.rendered.len(), 1);
        assert!(!fx.page("y").exists());
        assert!(!fx.page("off").exists());

        let fm = front(&fx.page("c1"));
        assert_eq!(fm["source"], "docker");
        assert_eq!(fm["scope"], "docker");
        assert_eq!(fm["aliases"][0], "c-1");
        assert!(!fm.contains_key("rule_category"));
    }

    #[test]
    fn test_compliance_malformed_tag_aborts() {
        let fx = Fixture::new();
        fx.rule(
            "compliance/k8s/bad.json",
            r#"{"name": "bad", "tags": ["a:b:c"]}"#,
            Some("m"),
        );
        let err = compliance_rules(&fx.descriptor("compliance-rules"), &fx.ctx(None)).unwrap_err();
        assert!(matches!(err, TransformError::MalformedTag { .. }));
    }

    #[test]
    fn test_run_content_dispatches_by_action() {
        let fx = Fixture::new();
        fx.rule(
            "runtime/compliance/docker/d.yaml",
            "name: \"[CIS Docker] Check\"\nframework:\n  name: cis-docker\n",
            Some("Body"),
        );
        // compliance-rules routes to the JSON-only entry point
        let report = run_content(&fx.descriptor("compliance-rules"), &fx.ctx(None)).unwrap();
        assert!(report.rendered.is_empty());

        // the security entry point with a compliance action uses the manual fallback
        let mut d = fx.descriptor("compliance-rules");
        d.handler = Some(Handler::SecurityRules);
        run_content(&d, &fx.ctx(None)).unwrap();
        let fm = front(&fx.page("d"));
        assert_eq!(fm["security"], "compliance");
        assert_eq!(fm["scope"], "docker");
        assert_eq!(fm["rule_category"][0], "Infrastructure Configuration");
    }
}
