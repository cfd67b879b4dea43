//! Surge proxy lines
//!
//! `name = type, host, port, key=value, ...`
//!
//! Surge has no VLESS support. Shadowsocks with a plugin switches to the
//! `custom` line shape, which hands the connection to an external SSEncrypt
//! module: `name = custom, host, port, method, password, module-url, k=v, ...`.
//! simple-obfs becomes `obfs=`/`obfs-host=`; any other plugin is written as
//! `plugin=name` followed by its own options.
//!
//! Names and passwords holding `,` or `"` are double-quoted.

use super::{push_opt, quote};
use crate::constants::SURGE_SS_MODULE;
use crate::defaults;
use crate::error::{ConvertError, Result};
use crate::format::Format;
use crate::record::{CipherParams, Network, ProxyRecord, Scheme};
use serde_json::Value;

/// Builds the Surge line for `record`.
///
/// # Errors
///
/// `UnsupportedCombination` for VLESS.
pub fn serialize(record: &ProxyRecord, name: &str) -> Result<String> {
    let name = quote(name);
    let mut opts = Vec::new();

    let kind = match &record.cipher {
        CipherParams::Shadowsocks {
            method,
            plugin,
            plugin_opts,
            ..
        } => {
            let obfs = defaults::obfs_settings(record);
            if obfs.is_some() || plugin.is_some() {
                let mut line = vec![
                    format!("{} = custom", name),
                    record.host.clone(),
                    record.port.to_string(),
                    method.clone(),
                    quote(&record.identity),
                    SURGE_SS_MODULE.to_string(),
                ];
                match (obfs, plugin) {
                    (Some(obfs), _) => {
                        push_opt(&mut line, "obfs", &obfs.mode);
                        if let Some(host) = obfs.host {
                            push_opt(&mut line, "obfs-host", host);
                        }
                    }
                    (None, Some(plugin)) => {
                        push_opt(&mut line, "plugin", quote(plugin));
                        let options = defaults::parse_plugin_options(
                            plugin_opts.as_deref().unwrap_or_default(),
                        );
                        for (key, value) in &options {
                            let value = match value {
                                Value::String(s) => quote(s),
                                other => other.to_string(),
                            };
                            push_opt(&mut line, key, value);
                        }
                    }
                    (None, None) => {}
                }
                return Ok(line.join(", "));
            }
            push_opt(&mut opts, "encrypt-method", method);
            push_opt(&mut opts, "password", quote(&record.identity));
            push_opt(&mut opts, "udp-relay", true);
            "ss"
        }
        CipherParams::Vmess { alter_id, .. } => {
            push_opt(&mut opts, "username", &record.identity);
            if *alter_id == 0 {
                push_opt(&mut opts, "vmess-aead", true);
            }
            "vmess"
        }
        CipherParams::None if record.scheme() == Scheme::Trojan => {
            push_opt(&mut opts, "password", quote(&record.identity));
            "trojan"
        }
        CipherParams::None => return Err(unsupported(record)),
    };

    if record.scheme() != Scheme::Shadowsocks {
        if record.scheme() == Scheme::Vmess {
            push_opt(&mut opts, "tls", record.tls_enabled());
        }
        if record.tls_enabled() {
            push_opt(&mut opts, "sni", defaults::server_name(record));
            push_opt(&mut opts, "skip-cert-verify", record.allow_insecure);
        }
        if record.transport.network == Network::Ws {
            push_opt(&mut opts, "ws", true);
            if let Some(path) = defaults::ws_path(record) {
                push_opt(&mut opts, "ws-path", path);
            }
            push_opt(
                &mut opts,
                "ws-headers",
                format!("Host:{}", defaults::ws_host(record)),
            );
        }
    }

    let mut line = vec![
        format!("{} = {}", name, kind),
        record.host.clone(),
        record.port.to_string(),
    ];
    line.extend(opts);
    Ok(line.join(", "))
}

fn unsupported(record: &ProxyRecord) -> ConvertError {
    ConvertError::UnsupportedCombination {
        format: Format::Surge.id().to_string(),
        scheme: record.scheme().as_str().to_string(),
    }
}
