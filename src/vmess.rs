//! VMess link parser
//!
//! ## Link format
//!
//! `vmess://base64(JSON)`: the body is Base64 of a flat JSON object. Standard, no-padding and
//! URL-safe alphabets are accepted; whitespace (including newlines from pasted links) is stripped
//! before decoding.
//!
//! ## JSON fields
//!
//! **Required**: `add` (server address), `port` (1–65535), `id` (user UUID).
//!
//! **Optional**: `ps` (display name), `aid` (alter id, default 0),
//! `net` (tcp/ws/grpc/...), `type` (header type), `host`, `path`, `tls` (`"tls"` enables TLS),
//! `scy` (cipher, default `auto`), `alpn`, `fp`, `sni`, `allowInsecure`.
//!
//! Every field is accepted as a string, number or boolean and read through its text form, so
//! `"tls": true` means "not `tls`" rather than a broken payload. `null` counts as absent.
//!
//! ## Parsing rules
//!
//! 1. Prefix `vmess://` is case-insensitive.
//! 2. Base64, UTF-8 or JSON failures are `InvalidPayload`.
//! 3. Missing `add`/`id` or an invalid port is `MalformedLink`.

use crate::LinkParser;
use crate::constants::{error_msg, scheme};
use crate::error::{ConvertError, Result};
use crate::record::{CipherParams, Network, ProxyRecord, Scheme, Security};
use crate::uri;
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use serde::Deserialize;
use tracing::trace;

/// JSON scalar that some clients write as a number and others as a string.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
enum StrOrNum {
    Str(String),
    Num(i64),
    Float(f64),
    Bool(bool),
}

impl StrOrNum {
    fn as_text(&self) -> String {
        match self {
            StrOrNum::Str(s) => s.trim().to_string(),
            StrOrNum::Num(n) => n.to_string(),
            StrOrNum::Float(f) => f.to_string(),
            StrOrNum::Bool(b) => b.to_string(),
        }
    }
}

/// VMess JSON body as found in share links
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(default)]
struct VMessJson {
    ps: Option<StrOrNum>,
    add: Option<StrOrNum>,
    port: Option<StrOrNum>,
    id: Option<StrOrNum>,
    aid: Option<StrOrNum>,
    net: Option<StrOrNum>,
    #[serde(rename = "type")]
    header_type: Option<StrOrNum>,
    host: Option<StrOrNum>,
    path: Option<StrOrNum>,
    tls: Option<StrOrNum>,
    scy: Option<StrOrNum>,
    alpn: Option<StrOrNum>,
    fp: Option<StrOrNum>,
    sni: Option<StrOrNum>,
    #[serde(rename = "allowInsecure", alias = "skip-cert-verify")]
    allow_insecure: Option<StrOrNum>,
}

/// VMess link parser
#[derive(Debug, Clone, Copy, Default)]
pub struct VMess;

impl LinkParser for VMess {
    const PREFIX: &'static str = scheme::VMESS;

    fn parse_body(link_body: &str) -> Result<ProxyRecord> {
        trace!("Parsing VMess link");

        let json_str = decode_body(link_body)?;
        let body: VMessJson = serde_json::from_str(&json_str)?;

        let host = text(body.add)
            .ok_or_else(|| ConvertError::MalformedLink(error_msg::MISSING_HOST.to_string()))?;
        let id = text(body.id).ok_or_else(|| {
            ConvertError::MalformedLink(error_msg::MISSING_CREDENTIAL.to_string())
        })?;
        let port = match &body.port {
            Some(p) => uri::parse_port(&p.as_text())?,
            None => {
                return Err(ConvertError::MalformedLink(format!(
                    "{}: missing",
                    error_msg::INVALID_PORT
                )));
            }
        };

        let mut record = ProxyRecord::new(Scheme::Vmess, host, port, id);
        record.display_name = uri::display_name(text(body.ps).as_deref(), Scheme::Vmess);
        record.security = Some(if text(body.tls).as_deref() == Some("tls") {
            Security::Tls
        } else {
            Security::None
        });

        record.transport.network = text(body.net)
            .as_deref()
            .map(Network::parse)
            .unwrap_or_default();
        record.transport.path = text(body.path);
        record.transport.host_header = text(body.host);
        record.transport.header_type = text(body.header_type);
        if record.transport.network == Network::Grpc {
            record.transport.service_name = record.transport.path.clone();
        }

        record.tls.sni = text(body.sni);
        record.tls.alpn = text(body.alpn);
        record.tls.fingerprint = text(body.fp);

        record.cipher = CipherParams::Vmess {
            alter_id: body
                .aid
                .as_ref()
                .and_then(|a| a.as_text().parse().ok())
                .unwrap_or(0),
            cipher: text(body.scy).unwrap_or_else(|| "auto".to_string()),
        };
        record.allow_insecure = body
            .allow_insecure
            .as_ref()
            .is_some_and(|v| matches!(v.as_text().as_str(), "1" | "true"));

        Ok(record)
    }
}

/// Decodes the Base64 body, trying padded, unpadded and URL-safe alphabets.
fn decode_body(link_body: &str) -> Result<String> {
    let cleaned: String = link_body.chars().filter(|c| !c.is_whitespace()).collect();
    let decoded = STANDARD
        .decode(&cleaned)
        .or_else(|_| STANDARD_NO_PAD.decode(cleaned.trim_end_matches('=')))
        .or_else(|_| URL_SAFE.decode(&cleaned))
        .or_else(|_| URL_SAFE_NO_PAD.decode(cleaned.trim_end_matches('=')))?;
    Ok(String::from_utf8(decoded)?)
}

/// Trimmed text form of a field; `None` when absent or blank.
fn text(value: Option<StrOrNum>) -> Option<String> {
    value.map(|v| v.as_text()).filter(|s| !s.is_empty())
}
