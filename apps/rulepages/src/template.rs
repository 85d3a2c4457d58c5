//! Rendering of templated rule YAML.
//!
//! Rule files may be Jinja templates whose variable delimiters are
//! `{@ ... @}` (so they never collide with the site's own `{{ }}`).
//! Statements and comments keep the usual `{% %}` / `{# #}` syntax.
//! Undefined names render as empty strings, `none` renders as `None`, and
//! output is HTML-escaped.

use crate::error::{Result, TransformError};
use minijinja::syntax::SyntaxConfig;
use minijinja::value::Object;
use minijinja::{AutoEscape, Environment, Error, ErrorKind, Output, State, UndefinedBehavior, Value};
use serde_yaml::Mapping;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;

/// Marker whose presence in the raw text switches on template rendering.
pub const TEMPLATE_MARKER: &str = "jinja2";

/// Helper namespace exposed to rule templates as `fim`.
///
/// `fim.watch_files(...)` only matters to the rules' own build; here it
/// does nothing and yields `none`.
#[derive(Debug)]
struct Fim;

impl Object for Fim {
    fn call_method(
        self: &Arc<Self>,
        _state: &State<'_, '_>,
        method: &str,
        _args: &[Value],
    ) -> std::result::Result<Value, Error> {
        match method {
            "watch_files" => Ok(Value::from(())),
            _ => Err(Error::new(
                ErrorKind::UnknownMethod,
                format!("fim has no method named {}", method),
            )),
        }
    }
}

pub fn is_templated(text: &str) -> bool {
    text.contains(TEMPLATE_MARKER)
}

/// Drop the first line (the import-style header) including its newline.
pub fn strip_first_line(text: &str) -> &str {
    match text.find('\n') {
        Some(i) => &text[i + 1..],
        None => "",
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn format_value(
    out: &mut Output<'_>,
    state: &State<'_, '_>,
    value: &Value,
) -> std::result::Result<(), Error> {
    let text = if value.is_none() {
        "None".to_string()
    } else if value.is_safe() || matches!(state.auto_escape(), AutoEscape::None) {
        value.to_string()
    } else {
        escape(&value.to_string())
    };
    out.write_str(&text)
        .map_err(|e| Error::new(ErrorKind::WriteFailure, e.to_string()))
}

fn environment() -> std::result::Result<Environment<'static>, Error> {
    let mut env = Environment::new();
    env.set_syntax(
        SyntaxConfig::builder()
            .variable_delimiters("{@", "@}")
            .build()?,
    );
    env.set_undefined_behavior(UndefinedBehavior::Chainable);
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    env.set_formatter(format_value);
    Ok(env)
}

/// Render `text` with `vars` plus the `fim` helper in scope.
pub fn render(path: &Path, text: &str, vars: &Mapping) -> Result<String> {
    let env = environment().map_err(|e| TransformError::parse(path, e))?;
    let mut ctx: BTreeMap<String, Value> = BTreeMap::new();
    for (k, v) in vars {
        if let Some(name) = k.as_str() {
            ctx.insert(name.to_string(), Value::from_serialize(v));
        }
    }
    ctx.insert("fim".to_string(), Value::from_object(Fim));
    env.render_str(text, ctx)
        .map_err(|e| TransformError::parse(path, e))
}

/// Strip the header line and render the remainder.
pub fn render_file(path: &Path, text: &str, vars: &Mapping) -> Result<String> {
    render(path, strip_first_line(text), vars)
}
