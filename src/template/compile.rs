//! Template compilation and rendering
//!
//! Templates are plain text with `{{ variable }}` or `{{ variable | filter }}`
//! placeholders.
//!
//! | Variable | Value |
//! |----------|-------|
//! | `proxies` | fragments of the successful entries |
//! | `proxy_names` | their tags |
//! | `proxy_count` | number of fragments |
//! | `generated_at` | RFC 3339 UTC timestamp |
//!
//! | Filter | Output |
//! |--------|--------|
//! | `yaml` | YAML block sequence |
//! | `json` | comma-separated JSON values (the inside of an array) |
//! | `csv` | items joined by `, `, quoted when they hold `,` or `"` |
//! | `lines` | one item per line |
//!
//! Without a filter, `proxies` renders in the format's native shape and
//! `proxy_names` as `csv`. A placeholder that only has whitespace before it on
//! its line indents every following line of a multi-line value to that column.

use super::TemplateKey;
use crate::error::{ConvertError, Result};
use crate::format::{self, Format, Fragment};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variable {
    Proxies,
    ProxyNames,
    ProxyCount,
    GeneratedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Filter {
    Native,
    Yaml,
    Json,
    Csv,
    Lines,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder {
        variable: Variable,
        filter: Filter,
        indent: String,
    },
}

/// Compiled template for one `(format, level)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    key: TemplateKey,
    segments: Vec<Segment>,
}

/// Values bound into a template at render time
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    /// Fragments of the successful entries, in input order
    pub proxies: Vec<&'a Fragment>,
    /// Tags of the same entries
    pub proxy_names: Vec<&'a str>,
    /// Generation time
    pub generated_at: DateTime<Utc>,
}

impl Template {
    /// Compiles `source` for `key`.
    ///
    /// # Errors
    ///
    /// `TemplateLoadFailure` on an unclosed placeholder, unknown variable or unknown filter.
    pub fn compile(key: TemplateKey, source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut rest = source;

        while let Some(open) = rest.find("{{") {
            let literal = &rest[..open];
            let after_open = &rest[open + 2..];
            let offset = source.len() - rest.len() + open;
            let close = after_open.find("}}").ok_or_else(|| {
                compile_error(&key, format!("unclosed placeholder at byte {}", offset))
            })?;

            let line_start = literal.rfind('\n').map(|p| p + 1).unwrap_or(0);
            let before = &literal[line_start..];
            let at_line_start = line_start > 0 || segments.is_empty();
            let indent = if at_line_start && before.chars().all(|c| c == ' ' || c == '\t') {
                before.to_string()
            } else {
                String::new()
            };

            if !literal.is_empty() {
                segments.push(Segment::Literal(literal.to_string()));
            }
            let (variable, filter) = parse_placeholder(&key, &after_open[..close])?;
            segments.push(Segment::Placeholder {
                variable,
                filter,
                indent,
            });
            rest = &after_open[close + 2..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self { key, segments })
    }

    /// Key this template was compiled for
    pub fn key(&self) -> &TemplateKey {
        &self.key
    }

    /// Renders the template with `ctx`.
    pub fn render(&self, ctx: &RenderContext<'_>) -> Result<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder {
                    variable,
                    filter,
                    indent,
                } => {
                    let value = self.render_variable(*variable, *filter, ctx)?;
                    out.push_str(&indent_following_lines(&value, indent));
                }
            }
        }
        Ok(out)
    }

    fn render_variable(
        &self,
        variable: Variable,
        filter: Filter,
        ctx: &RenderContext<'_>,
    ) -> Result<String> {
        match variable {
            Variable::ProxyCount => Ok(ctx.proxies.len().to_string()),
            Variable::GeneratedAt => Ok(ctx
                .generated_at
                .to_rfc3339_opts(SecondsFormat::Secs, true)),
            Variable::ProxyNames => {
                let items: Vec<Value> = ctx
                    .proxy_names
                    .iter()
                    .map(|n| Value::String(n.to_string()))
                    .collect();
                let filter = if filter == Filter::Native {
                    Filter::Csv
                } else {
                    filter
                };
                render_items(&items, filter)
            }
            Variable::Proxies => {
                let filter = match (filter, self.key.format) {
                    (Filter::Native, Format::Clash) => Filter::Yaml,
                    (Filter::Native, Format::SingBox) => Filter::Json,
                    (Filter::Native, _) => Filter::Lines,
                    (other, _) => other,
                };
                let items: Vec<Value> = ctx.proxies.iter().map(|f| fragment_value(f)).collect();
                render_items(&items, filter)
            }
        }
    }
}

fn parse_placeholder(key: &TemplateKey, inner: &str) -> Result<(Variable, Filter)> {
    let mut parts = inner.split('|').map(str::trim);
    let variable = match parts.next().unwrap_or_default() {
        "proxies" => Variable::Proxies,
        "proxy_names" => Variable::ProxyNames,
        "proxy_count" => Variable::ProxyCount,
        "generated_at" => Variable::GeneratedAt,
        other => return Err(compile_error(key, format!("unknown variable '{}'", other))),
    };
    let filter = match parts.next() {
        None => Filter::Native,
        Some("yaml") => Filter::Yaml,
        Some("json") => Filter::Json,
        Some("csv") => Filter::Csv,
        Some("lines") => Filter::Lines,
        Some(other) => return Err(compile_error(key, format!("unknown filter '{}'", other))),
    };
    if let Some(extra) = parts.next() {
        return Err(compile_error(key, format!("unexpected '| {}'", extra)));
    }
    if filter != Filter::Native
        && matches!(variable, Variable::ProxyCount | Variable::GeneratedAt)
    {
        return Err(compile_error(key, "scalar variables take no filter".to_string()));
    }
    Ok((variable, filter))
}

fn fragment_value(fragment: &Fragment) -> Value {
    match fragment {
        Fragment::Mapping(value) | Fragment::Object(value) => value.clone(),
        Fragment::Line(line) => Value::String(line.clone()),
    }
}

fn render_items(items: &[Value], filter: Filter) -> Result<String> {
    match filter {
        Filter::Yaml => {
            if items.is_empty() {
                return Ok("[]".to_string());
            }
            Ok(serde_yaml::to_string(items)?.trim_end().to_string())
        }
        Filter::Json => {
            let rendered = items
                .iter()
                .map(serde_json::to_string_pretty)
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rendered.join(",\n"))
        }
        Filter::Csv => Ok(items
            .iter()
            .map(|item| format::quote(&plain_text(item)))
            .collect::<Vec<_>>()
            .join(", ")),
        Filter::Lines | Filter::Native => {
            Ok(items.iter().map(plain_text).collect::<Vec<_>>().join("\n"))
        }
    }
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn indent_following_lines(value: &str, indent: &str) -> String {
    if indent.is_empty() || !value.contains('\n') {
        return value.to_string();
    }
    value.replace('\n', &format!("\n{}", indent))
}

fn compile_error(key: &TemplateKey, detail: String) -> ConvertError {
    ConvertError::TemplateLoadFailure(format!("{}: {}", key, detail))
}
