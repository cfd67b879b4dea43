//! Static format → level descriptor table

use crate::constants::level;
use crate::format::Format;
use serde::Serialize;
use std::str::FromStr;

/// Describes the templates shipped for one format
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct FormatDescriptor {
    /// Format
    pub format: Format,
    /// Client application name
    pub name: &'static str,
    /// Template file extension
    pub extension: &'static str,
    /// Levels, baseline first
    pub levels: &'static [&'static str],
    /// Level used when none is requested
    pub default_level: &'static str,
}

static CATALOG: [FormatDescriptor; 4] = [
    FormatDescriptor {
        format: Format::Clash,
        name: "Clash",
        extension: "yaml",
        levels: &[level::BASIC, level::STANDARD, level::ADVANCED],
        default_level: level::STANDARD,
    },
    FormatDescriptor {
        format: Format::Surge,
        name: "Surge",
        extension: "conf",
        levels: &[level::BASIC, level::STANDARD],
        default_level: level::STANDARD,
    },
    FormatDescriptor {
        format: Format::QuantumultX,
        name: "Quantumult X",
        extension: "conf",
        levels: &[level::BASIC, level::STANDARD],
        default_level: level::STANDARD,
    },
    FormatDescriptor {
        format: Format::SingBox,
        name: "sing-box",
        extension: "json",
        levels: &[level::BASIC, level::STANDARD, level::ADVANCED],
        default_level: level::STANDARD,
    },
];

/// Descriptor for a format id or alias; `None` when the format is unknown.
pub fn template_info(format: &str) -> Option<&'static FormatDescriptor> {
    let format = Format::from_str(format).ok()?;
    descriptor(format)
}

/// Levels for a format id or alias; empty when the format is unknown.
pub fn available_levels(format: &str) -> &'static [&'static str] {
    template_info(format).map(|d| d.levels).unwrap_or(&[])
}

/// Descriptor for a parsed format.
pub fn descriptor(format: Format) -> Option<&'static FormatDescriptor> {
    CATALOG.iter().find(|d| d.format == format)
}
