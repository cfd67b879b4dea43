//! Shadowsocks link parser (SIP002)
//!
//! Link format: `ss://userinfo@hostname:port[/][?plugin=...][#tag]`
//!
//! **userinfo**: Base64-encoded `method:password` (may itself be percent-encoded, e.g. `%3D` padding).
//! Hostname and port are plain text.
//!
//! **plugin**: Optional; `plugin-name;opt=value;...`, URL-encoded. The name is everything before the
//! first `;`, the rest is kept as the options string.
//!
//! **Legacy obfs**: `obfs` and `obfs-host` query parameters are read as-is.
//!
//! **tag**: Optional; fragment used as display name.
//!
//! ## Parsing rules
//!
//! 1. The `#tag` is located and removed first, then the `ss://` prefix (case-insensitive).
//! 2. Userinfo is split from `host:port` on the last `@`. Bad Base64 is `InvalidPayload`.
//! 3. Without `@`, the whole body is treated as legacy `base64(method:password@host:port)`.
//! 4. Port must parse as a non-zero u16; otherwise `MalformedLink`.

use crate::LinkParser;
use crate::constants::{error_msg, scheme};
use crate::error::{ConvertError, Result};
use crate::record::{CipherParams, ProxyRecord, Scheme};
use crate::uri;
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use tracing::trace;

/// Shadowsocks link parser
#[derive(Debug, Clone, Copy, Default)]
pub struct Shadowsocks;

impl LinkParser for Shadowsocks {
    const PREFIX: &'static str = scheme::SHADOWSOCKS;

    fn parse_checked(link: &str) -> Result<ProxyRecord> {
        // Tag first: it may contain characters that look like delimiters.
        let (without_tag, tag) = match link.find('#') {
            Some(pos) => (&link[..pos], Some(&link[pos + 1..])),
            None => (link, None),
        };
        let body = uri::strip_scheme(without_tag, Self::PREFIX)?;
        let mut record = Self::parse_body(body)?;
        record.display_name = uri::display_name(tag, Scheme::Shadowsocks);
        Ok(record)
    }

    fn parse_body(link_body: &str) -> Result<ProxyRecord> {
        trace!("Parsing Shadowsocks link");

        let (address_part, query_part) = match link_body.find('?') {
            Some(pos) => (&link_body[..pos], Some(&link_body[pos + 1..])),
            None => (link_body, None),
        };

        let (method, password, host, port) = if address_part.contains('@') {
            let (user_info, host_port) = uri::split_userinfo(address_part)?;
            let user_str = decode_base64(&uri::decode_or_raw(user_info))?;
            let (method, password) = split_method_password(&user_str)?;
            let (host, port) = uri::split_host_port(host_port)?;
            (method, password, host, port)
        } else {
            // Legacy: base64(method:password@host:port)
            let decoded = decode_base64(&uri::decode_or_raw(address_part.trim_end_matches('/')))?;
            let (user_str, host_port) = uri::split_userinfo(&decoded)?;
            let (method, password) = split_method_password(user_str)?;
            let (host, port) = uri::split_host_port(host_port)?;
            (method, password, host, port)
        };

        let params = query_part.map(uri::parse_query).unwrap_or_default();
        let (plugin, plugin_opts) = match params.get("plugin").filter(|p| !p.is_empty()) {
            Some(raw) => match raw.split_once(';') {
                Some((name, opts)) => (
                    Some(name.to_string()),
                    Some(opts.to_string()).filter(|o| !o.is_empty()),
                ),
                None => (Some(raw.clone()), None),
            },
            None => (None, None),
        };

        let mut record = ProxyRecord::new(Scheme::Shadowsocks, host, port, password);
        record.cipher = CipherParams::Shadowsocks {
            method,
            plugin,
            plugin_opts,
            obfs: uri::non_empty(&params, "obfs"),
            obfs_host: uri::non_empty(&params, "obfs-host"),
        };

        Ok(record)
    }
}

/// Decodes userinfo Base64 in any of the alphabets clients emit.
fn decode_base64(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let decoded = URL_SAFE_NO_PAD
        .decode(trimmed.trim_end_matches('='))
        .or_else(|_| URL_SAFE.decode(trimmed))
        .or_else(|_| STANDARD.decode(trimmed))
        .or_else(|_| STANDARD_NO_PAD.decode(trimmed.trim_end_matches('=')))?;
    Ok(String::from_utf8(decoded)?)
}

fn split_method_password(user_str: &str) -> Result<(String, String)> {
    let (method, password) = user_str.split_once(':').ok_or_else(|| {
        ConvertError::MalformedLink(error_msg::MISSING_COLON_METHOD.to_string())
    })?;
    if method.is_empty() || password.is_empty() {
        return Err(ConvertError::MalformedLink(
            error_msg::MISSING_CREDENTIAL.to_string(),
        ));
    }
    Ok((method.to_string(), password.to_string()))
}
