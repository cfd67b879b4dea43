//! Structured listing that bypasses templates
//!
//! Clash and sing-box fragments are already structured. Surge and Quantumult X
//! lines are parsed back into key/value maps so every format lists the same
//! shape: one JSON object per proxy.

use crate::batch::Batch;
use crate::error::{ConvertError, Result};
use crate::format::{Format, Fragment};
use serde::Serialize;
use serde_json::{Map, Value};

/// Tags and structured fragments of one format
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RawListing {
    /// Tags of the usable entries, in input order
    pub tags: Vec<String>,
    /// One object per usable entry
    pub proxies: Vec<Value>,
}

impl RawListing {
    /// Collects the entries of `batch` that contribute to `format`.
    ///
    /// # Errors
    ///
    /// `MalformedLink` when a generated line cannot be read back.
    pub fn from_batch(batch: &Batch, format: Format) -> Result<Self> {
        let usable = batch.successes(format);
        let mut tags = Vec::with_capacity(usable.len());
        let mut proxies = Vec::with_capacity(usable.len());
        for entry in usable {
            tags.push(entry.tag.to_string());
            proxies.push(fragment_value(format, entry.fragment)?);
        }
        Ok(Self { tags, proxies })
    }
}

/// Structured view of a fragment.
pub fn fragment_value(format: Format, fragment: &Fragment) -> Result<Value> {
    match fragment {
        Fragment::Mapping(value) | Fragment::Object(value) => Ok(value.clone()),
        Fragment::Line(line) => line_to_mapping(format, line),
    }
}

/// Parses a Surge or Quantumult X proxy line into a map.
///
/// Surge `name = type, host, port, k=v` yields `name`, `type`, `server`,
/// `port` and one key per option. The positional fields of the `custom`
/// shape become `encrypt-method`, `password` and `module`.
///
/// Quantumult X `type=host:port, k=v, tag=name` yields `type`, `server`,
/// `port`, one key per option, and `tag` renamed to `name`.
///
/// # Errors
///
/// `InvalidInput` for formats without line fragments, `MalformedLink` when
/// the line does not have the expected shape.
pub fn line_to_mapping(format: Format, line: &str) -> Result<Value> {
    match format {
        Format::Surge => surge_line(line),
        Format::QuantumultX => quantumult_line(line),
        Format::Clash | Format::SingBox => Err(ConvertError::InvalidInput(format!(
            "{} fragments are not lines",
            format
        ))),
    }
}

fn surge_line(line: &str) -> Result<Value> {
    let (name, rest) = line
        .split_once(" = ")
        .ok_or_else(|| ConvertError::MalformedLink(format!("Missing ' = ' in {}", line)))?;
    let fields = split_fields(rest);
    if fields.len() < 3 {
        return Err(ConvertError::MalformedLink(format!(
            "Expected type, host and port in {}",
            line
        )));
    }

    let mut map = Map::new();
    map.insert("name".to_string(), Value::String(split_fields(name).concat()));
    map.insert("type".to_string(), Value::String(fields[0].clone()));
    map.insert("server".to_string(), Value::String(fields[1].clone()));
    map.insert("port".to_string(), scalar(&fields[2]));

    let positional = ["encrypt-method", "password", "module"];
    let mut next_positional = positional.iter();
    for field in &fields[3..] {
        match field.split_once('=') {
            Some((key, value)) => {
                map.insert(key.trim().to_string(), scalar(value.trim()));
            }
            None => {
                if let Some(key) = next_positional.next() {
                    map.insert(key.to_string(), Value::String(field.clone()));
                }
            }
        }
    }
    Ok(Value::Object(map))
}

fn quantumult_line(line: &str) -> Result<Value> {
    let fields = split_fields(line);
    let (kind, address) = fields
        .first()
        .and_then(|f| f.split_once('='))
        .ok_or_else(|| ConvertError::MalformedLink(format!("Missing type=host:port in {}", line)))?;
    let (host, port) = address
        .rsplit_once(':')
        .ok_or_else(|| ConvertError::MalformedLink(format!("Missing port in {}", line)))?;

    let mut map = Map::new();
    map.insert("type".to_string(), Value::String(kind.to_string()));
    map.insert(
        "server".to_string(),
        Value::String(host.trim_start_matches('[').trim_end_matches(']').to_string()),
    );
    map.insert("port".to_string(), scalar(port));

    for field in &fields[1..] {
        if let Some((key, value)) = field.split_once('=') {
            let key = if key == "tag" { "name" } else { key };
            map.insert(key.to_string(), scalar(value));
        }
    }
    Ok(Value::Object(map))
}

/// Splits on `, ` outside double quotes, unquoting quoted fields.
fn split_fields(text: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if in_quotes => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() || !fields.is_empty() {
        fields.push(current.trim().to_string());
    }
    fields
}

fn scalar(value: &str) -> Value {
    match value {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => value
            .parse::<u64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(value.to_string())),
    }
}
