//! Output rendering for run reports.
//!
//! Supports `human` (default) and `json` outputs. The JSON form includes
//! per-action fields and a top-level summary.

use crate::models::{RunReport, SkipReason};
use crate::utils::rel_to_wd;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::path::Path;

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

fn reason_label(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::Parse => "parse error",
        SkipReason::MissingMessage => "no message file",
        SkipReason::Empty => "empty",
        SkipReason::RetiredAbsent => "retired, no page",
    }
}

/// Print run reports in the requested format.
pub fn print_reports(reports: &[RunReport], output: &str) {
    match output {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&compose_json(reports)).unwrap_or_default()
        ),
        _ => {
            let color = use_colors(output);
            for r in reports {
                let header = format!("▶ {}", r.action);
                if color {
                    println!("{}", header.bold());
                } else {
                    println!("{}", header);
                }
                for f in &r.rendered {
                    let f = rel_to_wd(Path::new(f));
                    if color {
                        println!("{} {}", "📄 rendered:".green().bold(), f);
                    } else {
                        println!("📄 rendered: {}", f);
                    }
                }
                for f in &r.retired {
                    let f = rel_to_wd(Path::new(f));
                    if color {
                        println!("{} {}", "🗑️  removed:".red().bold(), f);
                    } else {
                        println!("🗑️  removed: {}", f);
                    }
                }
                for s in &r.skipped {
                    let f = rel_to_wd(Path::new(&s.file));
                    let label = format!("⏭️  skipped ({}):", reason_label(s.reason));
                    if color {
                        println!("{} {}", label.yellow(), f);
                    } else {
                        println!("{} {}", label, f);
                    }
                }
                if r.index_updated {
                    if color {
                        println!(
                            "{} {} alias(es)",
                            "🔀 index updated:".cyan().bold(),
                            r.aliases.len()
                        );
                    } else {
                        println!("🔀 index updated: {} alias(es)", r.aliases.len());
                    }
                } else if !r.aliases.is_empty() {
                    let note = format!(
                        "{} alias(es) collected; index not updated outside live/preview",
                        r.aliases.len()
                    );
                    if color {
                        println!("{}", note.bright_black());
                    } else {
                        println!("{}", note);
                    }
                }
            }
            let summary = format!(
                "— Summary — rendered={} removed={} skipped={} aliases={}",
                reports.iter().map(|r| r.rendered.len()).sum::<usize>(),
                reports.iter().map(|r| r.retired.len()).sum::<usize>(),
                reports.iter().map(|r| r.skipped.len()).sum::<usize>(),
                reports.iter().map(|r| r.aliases.len()).sum::<usize>(),
            );
            if color {
                println!("{}", summary.bold());
            } else {
                println!("{}", summary);
            }
        }
    }
}

/// Compose the JSON report (pure) for testing/snapshot purposes.
pub fn compose_json(reports: &[RunReport]) -> JsonVal {
    let summary = json!({
        "rendered": reports.iter().map(|r| r.rendered.len()).sum::<usize>(),
        "removed": reports.iter().map(|r| r.retired.len()).sum::<usize>(),
        "skipped": reports.iter().map(|r| r.skipped.len()).sum::<usize>(),
        "aliases": reports.iter().map(|r| r.aliases.len()).sum::<usize>(),
        "actions": reports.len(),
    });
    json!({"results": reports, "summary": summary})
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SkippedFile;

    #[test]
    fn test_compose_json_shape() {
        let reports = vec![
            RunReport {
                action: "security-rules".into(),
                rendered: vec!["a.md".into(), "b.md".into()],
                retired: vec!["c.md".into()],
                skipped: vec![SkippedFile {
                    file: "d.json".into(),
                    reason: SkipReason::MissingMessage,
                }],
                aliases: vec!["/x/c".into(), "/y/c".into()],
                index_updated: true,
            },
            RunReport::new("compliance-rules"),
        ];
        let out = compose_json(&reports);
        assert_eq!(out["summary"]["rendered"], 2);
        assert_eq!(out["summary"]["removed"], 1);
        assert_eq!(out["summary"]["aliases"], 2);
        assert_eq!(out["summary"]["actions"], 2);
        assert_eq!(out["results"][0]["skipped"][0]["reason"], "missing-message");
        assert_eq!(out["results"][0]["index_updated"], true);
        assert_eq!(out["results"][1]["action"], "compliance-rules");
    }
}
