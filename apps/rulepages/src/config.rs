//! Configuration discovery and effective settings resolution.
//!
//! `rulepages.toml|yaml|yml` is read from the repository root (or closest
//! ancestor) and merged with CLI flags to produce an `Effective` config.
//! Defaults:
//! - `content_dir`: `content/en/`
//! - `output`: `human`
//! - `env_var`: `CI_ENVIRONMENT_NAME`
//! - `template.vars`: empty
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::error::{Result, TransformError};
use crate::models::content::ContentDescriptor;
use serde::Deserialize;
use serde_yaml::Mapping;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONTENT_DIR: &str = "content/en/";
pub const DEFAULT_ENV_VAR: &str = "CI_ENVIRONMENT_NAME";
const CONFIG_FILES: &[&str] = &["rulepages.toml", "rulepages.yaml", "rulepages.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Template section under `[template]`.
pub struct TemplateCfg {
    #[serde(default)]
    pub vars: Option<Mapping>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `rulepages.toml|yaml`.
pub struct RulePagesConfig {
    pub content_dir: Option<String>,
    pub output: Option<String>,
    /// Name of the variable holding the deployment environment.
    pub env_var: Option<String>,
    #[serde(default)]
    pub template: Option<TemplateCfg>,
    #[serde(default)]
    pub content: Vec<ContentDescriptor>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub config_found: bool,
    pub content_dir: PathBuf,
    pub output: String,
    pub env_var: String,
    pub deploy_env: Option<String>,
    pub template_vars: Mapping,
    /// Descriptors with globs resolved against `repo_root`.
    pub content: Vec<ContentDescriptor>,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `rulepages.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).exists()) {
            return cur.to_path_buf();
        }
        if cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `RulePagesConfig` from `rulepages.toml` or `rulepages.yaml|yml`.
///
/// `Ok(None)` when no file exists; a file that does not parse is an error.
pub fn load_config(root: &Path) -> Result<Option<RulePagesConfig>> {
    for name in CONFIG_FILES {
        let p = root.join(name);
        if !p.exists() {
            continue;
        }
        let s = fs::read_to_string(&p).map_err(|e| TransformError::io(&p, e))?;
        let cfg: RulePagesConfig = if name.ends_with(".toml") {
            toml::from_str(&s).map_err(|e| TransformError::Config(format!("{}: {}", p.display(), e)))?
        } else {
            serde_yaml::from_str(&s)
                .map_err(|e| TransformError::Config(format!("{}: {}", p.display(), e)))?
        };
        return Ok(Some(cfg));
    }
    Ok(None)
}

fn anchor_glob(root: &Path, pattern: &str) -> String {
    if Path::new(pattern).is_absolute() {
        pattern.to_string()
    } else {
        root.join(pattern).to_string_lossy().to_string()
    }
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
///
/// `cli_env` replaces the deployment environment read from `env_var`.
pub fn resolve_effective(
    cli_repo_root: Option<&str>,
    cli_content_dir: Option<&str>,
    cli_output: Option<&str>,
    cli_env: Option<&str>,
) -> Result<Effective> {
    let start = PathBuf::from(cli_repo_root.unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let loaded = load_config(&repo_root)?;
    let config_found = loaded.is_some();
    let cfg = loaded.unwrap_or_default();

    let content_dir = cli_content_dir
        .map(|s| s.to_string())
        .or(cfg.content_dir)
        .unwrap_or_else(|| DEFAULT_CONTENT_DIR.to_string());
    let content_dir = repo_root.join(content_dir);

    let output = cli_output
        .map(|s| s.to_string())
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());
    if output != "human" && output != "json" {
        return Err(TransformError::Config(format!(
            "unknown output mode '{}' (expected human|json)",
            output
        )));
    }

    let env_var = cfg.env_var.unwrap_or_else(|| DEFAULT_ENV_VAR.to_string());
    let deploy_env = cli_env
        .map(|s| s.to_string())
        .or_else(|| std::env::var(&env_var).ok());

    let template_vars = cfg.template.and_then(|t| t.vars).unwrap_or_default();

    let content = cfg
        .content
        .into_iter()
        .map(|mut d| {
            d.globs = d.globs.iter().map(|g| anchor_glob(&repo_root, g)).collect();
            d
        })
        .collect();

    Ok(Effective {
        repo_root,
        config_found,
        content_dir,
        output,
        env_var,
        deploy_env,
        template_vars,
        content,
    })
}
