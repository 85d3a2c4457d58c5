//! CLI argument parsing via `clap`.

use crate::models::content::Handler;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "rulepages",
    version,
    about = "Generate rule documentation pages",
    long_about = "rulepages — turns security and compliance rule definitions (JSON/YAML + Markdown) into documentation pages with front matter, and keeps redirect aliases for retired rules.\n\nConfiguration precedence: CLI > rulepages.toml > defaults.",
    after_help = "Examples:\n  rulepages run\n  rulepages run --action compliance-rules --env preview\n  rulepages render --action security-rules --repo-name rules-repo --glob 'extract/rules-repo/**/*.json' --dest-path security/default_rules/",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[arg(long, short, global = true, action = clap::ArgAction::SetTrue, help = "Log progress at info level (RUST_LOG overrides)")]
    pub verbose: bool,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum HandlerArg {
    SecurityRules,
    ComplianceRules,
}

impl From<HandlerArg> for Handler {
    fn from(h: HandlerArg) -> Self {
        match h {
            HandlerArg::SecurityRules => Handler::SecurityRules,
            HandlerArg::ComplianceRules => Handler::ComplianceRules,
        }
    }
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current rulepages version.")]
    Version,
    /// Run every configured content descriptor
    #[command(
        about = "Run configured actions",
        long_about = "Process every [[content]] entry of rulepages.toml. Aliases of retired pages are published into _index.md only when the deployment environment is live or preview.",
        after_help = "Examples:\n  rulepages run\n  rulepages run --action security-rules --output json"
    )]
    Run {
        #[arg(long, help = "Repository root (default: current dir)")]
        root: Option<String>,
        #[arg(long, help = "Root content directory (default: content/en/)")]
        content_dir: Option<String>,
        #[arg(long, help = "Only run descriptors with this action")]
        action: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, help = "Deployment environment (overrides the environment variable)")]
        env: Option<String>,
    },
    /// Run a single ad-hoc descriptor given on the command line
    #[command(
        about = "Run one descriptor from flags",
        long_about = "Process one content descriptor built from flags instead of rulepages.toml.",
        after_help = "Examples:\n  rulepages render --action compliance-rules --repo-name rules-repo --glob 'rules-repo/compliance/**/*.json' --dest-path security/default_rules/"
    )]
    Render {
        #[arg(long, help = "Repository root (default: current dir)")]
        root: Option<String>,
        #[arg(long, help = "Action identifier, e.g. security-rules or compliance-rules")]
        action: String,
        #[arg(long, value_enum, help = "Entry point override (default: derived from --action)")]
        handler: Option<HandlerArg>,
        #[arg(long, help = "Repository checkout name used for path categorization")]
        repo_name: String,
        #[arg(long = "glob", required = true, help = "Source glob (repeatable)")]
        globs: Vec<String>,
        #[arg(long, help = "Destination sub-path below the content directory")]
        dest_path: String,
        #[arg(long, help = "Root content directory (default: content/en/)")]
        content_dir: Option<String>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, help = "Deployment environment (overrides the environment variable)")]
        env: Option<String>,
    },
}
