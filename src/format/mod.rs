//! Target formats and fragment serialization
//!
//! A [`Fragment`] is one proxy rendered for one client application:
//!
//! | Format | Client | Fragment |
//! |--------|--------|----------|
//! | [`Format::Clash`] | Clash / mihomo | [`Fragment::Mapping`], kebab-case keys |
//! | [`Format::Surge`] | Surge | [`Fragment::Line`], `name = type, host, port, k=v` |
//! | [`Format::QuantumultX`] | Quantumult X | [`Fragment::Line`], `type=host:port, k=v, tag=name` |
//! | [`Format::SingBox`] | sing-box | [`Fragment::Object`], outbound with `tls`/`transport` |
//!
//! Serializers are pure: the same record always yields byte-identical output.

use crate::error::{ConvertError, Result};
use crate::record::ProxyRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub mod clash;
pub mod quantumult;
pub mod singbox;
pub mod surge;

/// Client application a document is generated for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Clash / mihomo YAML
    Clash,
    /// Surge INI-like profile
    Surge,
    /// Quantumult X profile
    #[serde(rename = "quantumult")]
    QuantumultX,
    /// sing-box JSON
    #[serde(rename = "singbox")]
    SingBox,
}

impl Format {
    /// All formats, in serialization order
    pub const ALL: [Format; 4] = [
        Format::Clash,
        Format::Surge,
        Format::QuantumultX,
        Format::SingBox,
    ];

    /// Canonical id, also the template directory name
    pub fn id(self) -> &'static str {
        match self {
            Format::Clash => "clash",
            Format::Surge => "surge",
            Format::QuantumultX => "quantumult",
            Format::SingBox => "singbox",
        }
    }

    /// Template file extension
    pub fn extension(self) -> &'static str {
        match self {
            Format::Clash => "yaml",
            Format::Surge | Format::QuantumultX => "conf",
            Format::SingBox => "json",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Format {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clash" | "mihomo" => Ok(Format::Clash),
            "surge" => Ok(Format::Surge),
            "quantumult" | "quantumultx" | "quanx" => Ok(Format::QuantumultX),
            "singbox" | "sing-box" => Ok(Format::SingBox),
            other => Err(ConvertError::InvalidInput(format!(
                "Unknown format: {}",
                other
            ))),
        }
    }
}

/// One proxy rendered for one format
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// Mapping rendered inside a YAML sequence (Clash)
    Mapping(Value),
    /// Single profile line (Surge, Quantumult X)
    Line(String),
    /// JSON object (sing-box)
    Object(Value),
}

impl Fragment {
    /// Fragment as text: a one-element YAML sequence, the line, or compact JSON
    pub fn to_text(&self) -> Result<String> {
        match self {
            Fragment::Mapping(value) => Ok(serde_yaml::to_string(&[value])?),
            Fragment::Line(line) => Ok(line.clone()),
            Fragment::Object(value) => Ok(serde_json::to_string(value)?),
        }
    }
}

/// Serializes a record for `format`, named by its display name.
///
/// # Errors
///
/// Returns `UnsupportedCombination` when the format has no encoding for the record's scheme.
pub fn serialize(format: Format, record: &ProxyRecord) -> Result<Fragment> {
    serialize_named(format, record, &record.display_name)
}

/// Serializes a record for `format` under an explicit proxy name (e.g. a batch tag).
pub fn serialize_named(format: Format, record: &ProxyRecord, name: &str) -> Result<Fragment> {
    match format {
        Format::Clash => Ok(Fragment::Mapping(clash::serialize(record, name))),
        Format::Surge => surge::serialize(record, name).map(Fragment::Line),
        Format::QuantumultX => Ok(Fragment::Line(quantumult::serialize(record, name))),
        Format::SingBox => Ok(Fragment::Object(singbox::serialize(record, name))),
    }
}

/// Fragments of one record for every format; formats without an encoding keep their error
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentSet {
    slots: BTreeMap<Format, std::result::Result<Fragment, ConvertError>>,
}

impl FragmentSet {
    /// Runs every serializer independently, naming each fragment `name`.
    pub fn generate(record: &ProxyRecord, name: &str) -> Self {
        let slots = Format::ALL
            .iter()
            .map(|&format| (format, serialize_named(format, record, name)))
            .collect();
        Self { slots }
    }

    /// Fragment for `format`, if the format can encode this record
    pub fn get(&self, format: Format) -> Option<&Fragment> {
        self.slots.get(&format).and_then(|slot| slot.as_ref().ok())
    }

    /// Serializer error for `format`, if any
    pub fn error(&self, format: Format) -> Option<&ConvertError> {
        self.slots.get(&format).and_then(|slot| slot.as_ref().err())
    }

    /// Formats that produced a fragment
    pub fn formats(&self) -> impl Iterator<Item = Format> + '_ {
        self.slots
            .iter()
            .filter(|(_, slot)| slot.is_ok())
            .map(|(format, _)| *format)
    }
}

/// Joins `key=value` options the way the line formats expect.
pub(crate) fn push_opt(opts: &mut Vec<String>, key: &str, value: impl fmt::Display) {
    opts.push(format!("{}={}", key, value));
}

/// Quotes values that would otherwise split a line or a policy list.
pub(crate) fn quote(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.starts_with(' ') {
        format!("\"{}\"", value.replace('"', "\\\""))
    } else {
        value.to_string()
    }
}
