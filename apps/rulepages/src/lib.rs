//! rulepages core library.
//!
//! Turns security and compliance rule definitions (JSON/YAML, optionally
//! templated, each paired with a Markdown message) into documentation
//! pages with derived front matter, and maintains redirect aliases for
//! retired rules on the section index page.
//!
//! High-level modules:
//! - `actions`: The `security-rules` and `compliance-rules` entry points.
//! - `loader`: Glob expansion, tolerant parsing, message pairing.
//! - `template`: `{@ ... @}` rendering for templated YAML.
//! - `frontmatter`: Page metadata derivation.
//! - `retire`: Retirement predicate and page removal.
//! - `emit`: Page rendering and writing.
//! - `aliases`: Alias accumulation and index page rewrite.
//! - `config`: Discovery and effective configuration resolution.
//! - `cli`, `output`: Binary argument parsing and printers.
pub mod actions;
pub mod aliases;
pub mod cli;
pub mod config;
pub mod emit;
pub mod error;
pub mod frontmatter;
pub mod loader;
pub mod models;
pub mod output;
pub mod retire;
pub mod template;
pub mod utils;
