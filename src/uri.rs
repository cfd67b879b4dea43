//! Splitting helpers shared by the URI-style parsers (vless, trojan, ss)

use crate::constants::{error_msg, scheme};
use crate::error::{ConvertError, Result};
use crate::record::Scheme;
use std::collections::HashMap;

/// Checks length and emptiness, returning the trimmed link.
pub(crate) fn check_input(link: &str, max_len: usize) -> Result<&str> {
    let link = link.trim();
    if link.is_empty() {
        return Err(ConvertError::InvalidInput(error_msg::EMPTY_INPUT.to_string()));
    }
    let len = link.chars().count();
    if len > max_len {
        return Err(ConvertError::InvalidInput(format!(
            "{} {} characters (got {})",
            error_msg::TOO_LONG,
            max_len,
            len
        )));
    }
    Ok(link)
}

/// Detects the scheme from a case-insensitive prefix.
pub(crate) fn detect_scheme(link: &str) -> Result<Scheme> {
    let lower = link
        .get(..link.len().min(16))
        .unwrap_or(link)
        .to_ascii_lowercase();
    if lower.starts_with(scheme::VLESS) {
        Ok(Scheme::Vless)
    } else if lower.starts_with(scheme::VMESS) {
        Ok(Scheme::Vmess)
    } else if lower.starts_with(scheme::TROJAN) {
        Ok(Scheme::Trojan)
    } else if lower.starts_with(scheme::SHADOWSOCKS) {
        Ok(Scheme::Shadowsocks)
    } else {
        let scheme_name = link.split("://").next().unwrap_or("unknown");
        Err(ConvertError::UnsupportedScheme(scheme_name.to_string()))
    }
}

/// Strips `prefix` (case-insensitive) from an already checked link.
pub(crate) fn strip_scheme<'a>(link: &'a str, prefix: &str) -> Result<&'a str> {
    match link.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => Ok(&link[prefix.len()..]),
        _ => {
            let scheme_name = link.split("://").next().unwrap_or("unknown");
            Err(ConvertError::UnsupportedScheme(format!(
                "{} (expected {})",
                scheme_name, prefix
            )))
        }
    }
}

/// Splits `userinfo@host:port` on the last `@`.
pub(crate) fn split_userinfo(main: &str) -> Result<(&str, &str)> {
    let at_pos = main
        .rfind('@')
        .ok_or_else(|| ConvertError::MalformedLink(error_msg::MISSING_AT.to_string()))?;
    Ok((&main[..at_pos], &main[at_pos + 1..]))
}

/// Splits `host:port`, accepting `[v6]:port`, and validates both parts.
pub(crate) fn split_host_port(host_port: &str) -> Result<(String, u16)> {
    let host_port = host_port.trim_end_matches('/');
    let colon_pos = host_port.rfind(':').ok_or_else(|| {
        ConvertError::MalformedLink(error_msg::MISSING_COLON_HOST_PORT.to_string())
    })?;

    let host = host_port[..colon_pos]
        .trim_start_matches('[')
        .trim_end_matches(']');
    if host.is_empty() {
        return Err(ConvertError::MalformedLink(error_msg::MISSING_HOST.to_string()));
    }

    let port = parse_port(&host_port[colon_pos + 1..])?;
    Ok((host.to_string(), port))
}

/// Parses a port in 1–65535.
pub(crate) fn parse_port(raw: &str) -> Result<u16> {
    match raw.trim().parse::<u16>() {
        Ok(0) => Err(ConvertError::MalformedLink(format!(
            "{}: 0",
            error_msg::INVALID_PORT
        ))),
        Ok(port) => Ok(port),
        Err(e) => Err(ConvertError::MalformedLink(format!(
            "{} '{}': {}",
            error_msg::INVALID_PORT,
            raw,
            e
        ))),
    }
}

/// Parses `&`-joined `key=value` pairs with form decoding.
///
/// Keys and values are percent-decoded and `+` decodes to a space, so a
/// literal plus in a path must be sent as `%2B`. A repeated key keeps its last value.
pub(crate) fn parse_query(query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

/// Percent-decodes `raw`, falling back to the raw text.
pub(crate) fn decode_or_raw(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// Display name from a fragment: decoded, raw on decode failure, placeholder if absent.
pub(crate) fn display_name(fragment: Option<&str>, scheme: Scheme) -> String {
    match fragment.map(str::trim) {
        Some(f) if !f.is_empty() => decode_or_raw(f),
        _ => scheme.placeholder_name().to_string(),
    }
}

/// Reads a boolean query flag (`1`/`true`).
pub(crate) fn flag(params: &HashMap<String, String>, keys: &[&str]) -> bool {
    keys.iter().any(|k| {
        params
            .get(*k)
            .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
    })
}

/// Returns a non-empty query value.
pub(crate) fn non_empty(params: &HashMap<String, String>, key: &str) -> Option<String> {
    params.get(key).filter(|v| !v.is_empty()).cloned()
}
