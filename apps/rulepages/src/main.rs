//! rulepages CLI binary entry point.
//! Resolves configuration, runs the requested actions and prints results.

use clap::Parser;
use rulepages::actions::{self, RunContext};
use rulepages::cli::{Cli, Commands};
use rulepages::config::{self, Effective};
use rulepages::models::content::{ContentDescriptor, ContentOptions};
use rulepages::models::RunReport;
use rulepages::{output, utils};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn resolve_or_exit(
    root: Option<&str>,
    content_dir: Option<&str>,
    output: Option<&str>,
    env: Option<&str>,
) -> Effective {
    match config::resolve_effective(root, content_dir, output, env) {
        Ok(eff) => eff,
        Err(e) => {
            eprintln!("{} {}", utils::error_prefix(), e);
            std::process::exit(2);
        }
    }
}

fn context(eff: &Effective) -> RunContext {
    RunContext {
        content_dir: eff.content_dir.clone(),
        deploy_env: eff.deploy_env.clone(),
        template_vars: eff.template_vars.clone(),
    }
}

/// Run descriptors in order; the first failing action aborts the run.
fn run_all(descriptors: &[ContentDescriptor], ctx: &RunContext, output_mode: &str) {
    let mut reports: Vec<RunReport> = Vec::new();
    for d in descriptors {
        match actions::run_content(d, ctx) {
            Ok(r) => reports.push(r),
            Err(e) => {
                output::print_reports(&reports, output_mode);
                eprintln!(
                    "{} {} action failed: {}",
                    utils::error_prefix(),
                    d.action,
                    e
                );
                std::process::exit(1);
            }
        }
    }
    output::print_reports(&reports, output_mode);
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Run {
            root,
            content_dir,
            action,
            output,
            env,
        } => {
            let eff = resolve_or_exit(
                root.as_deref(),
                content_dir.as_deref(),
                output.as_deref(),
                env.as_deref(),
            );
            if !eff.config_found {
                eprintln!(
                    "{} No rulepages.toml found under {}.",
                    utils::note_prefix(),
                    eff.repo_root.to_string_lossy()
                );
            }
            let selected: Vec<ContentDescriptor> = eff
                .content
                .iter()
                .filter(|d| action.as_deref().map_or(true, |a| d.action == a))
                .cloned()
                .collect();
            if selected.is_empty() {
                eprintln!(
                    "{} No [[content]] entries to run. Add them to rulepages.toml or use `rulepages render`.",
                    utils::error_prefix()
                );
                std::process::exit(2);
            }
            if eff.output != "json" && eff.deploy_env.is_none() {
                eprintln!(
                    "{} {} is not set; retired aliases will not be published.",
                    utils::info_prefix(),
                    eff.env_var
                );
            }
            run_all(&selected, &context(&eff), &eff.output);
        }
        Commands::Render {
            root,
            action,
            handler,
            repo_name,
            globs,
            dest_path,
            content_dir,
            output,
            env,
        } => {
            let eff = resolve_or_exit(
                root.as_deref(),
                content_dir.as_deref(),
                output.as_deref(),
                env.as_deref(),
            );
            let descriptor = ContentDescriptor {
                action,
                handler: handler.map(Into::into),
                repo_name,
                globs,
                options: ContentOptions { dest_path },
            };
            run_all(&[descriptor], &context(&eff), &eff.output);
        }
    }
}
