//! Fallback chains and derived values shared by every serializer
//!
//! Each target format reconstructs the same defaults from the canonical record
//! through these functions, so a value such as the TLS server name has exactly
//! one definition.

use crate::record::{CipherParams, Network, ProxyRecord};
use serde_json::{Map, Value};

/// Fingerprint REALITY falls back to when the link sets none.
pub const REALITY_DEFAULT_FINGERPRINT: &str = "chrome";

/// ALPN comma string → ordered list of trimmed, non-empty tokens.
pub fn alpn_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// ALPN list of a record.
pub fn record_alpn(record: &ProxyRecord) -> Vec<String> {
    alpn_list(record.tls.alpn.as_deref())
}

/// Plugin options string → option map.
///
/// `key=value` maps to a string, a bare `tls` maps to `true`, any other bare
/// token is dropped.
pub fn parse_plugin_options(raw: &str) -> Map<String, Value> {
    let mut opts = Map::new();
    for token in raw.split(';').map(str::trim).filter(|t| !t.is_empty()) {
        match token.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                opts.insert(key.to_string(), Value::String(value.to_string()));
            }
            Some(_) => {}
            None if token == "tls" => {
                opts.insert("tls".to_string(), Value::Bool(true));
            }
            None => {}
        }
    }
    opts
}

/// TLS server name: explicit `sni`, then the `Host` header, then the server host.
pub fn server_name(record: &ProxyRecord) -> String {
    record
        .tls
        .sni
        .clone()
        .or_else(|| record.transport.host_header.clone())
        .unwrap_or_else(|| record.host.clone())
}

/// WebSocket `Host` header: explicit header, then the server host.
pub fn ws_host(record: &ProxyRecord) -> String {
    record
        .transport
        .host_header
        .clone()
        .unwrap_or_else(|| record.host.clone())
}

/// Request path for WebSocket transports; `None` for every other network.
pub fn ws_path(record: &ProxyRecord) -> Option<String> {
    match record.transport.network {
        Network::Ws => Some(
            record
                .transport
                .path
                .clone()
                .unwrap_or_else(|| "/".to_string()),
        ),
        _ => None,
    }
}

/// gRPC service name, with the path as a legacy spelling.
pub fn grpc_service_name(record: &ProxyRecord) -> Option<String> {
    match record.transport.network {
        Network::Grpc => record
            .transport
            .service_name
            .clone()
            .or_else(|| record.transport.path.clone()),
        _ => None,
    }
}

/// Fingerprint used in REALITY mode, independent of the plain-TLS fingerprint.
pub fn reality_fingerprint(record: &ProxyRecord) -> String {
    record
        .tls
        .fingerprint
        .clone()
        .unwrap_or_else(|| REALITY_DEFAULT_FINGERPRINT.to_string())
}

/// Fingerprint for the current security mode: defaulted for REALITY, explicit-only for TLS.
pub fn client_fingerprint(record: &ProxyRecord) -> Option<String> {
    if record.is_reality() {
        Some(reality_fingerprint(record))
    } else if record.tls_enabled() {
        record.tls.fingerprint.clone()
    } else {
        None
    }
}

/// Shadowsocks simple-obfs settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObfsSettings {
    /// `http` or `tls`
    pub mode: String,
    /// Camouflage host
    pub host: Option<String>,
}

/// True for the plugin names that implement simple-obfs.
pub fn is_obfs_plugin(plugin: &str) -> bool {
    matches!(plugin, "obfs-local" | "simple-obfs" | "obfs")
}

/// simple-obfs settings from plugin options, falling back to the legacy query fields.
pub fn obfs_settings(record: &ProxyRecord) -> Option<ObfsSettings> {
    let CipherParams::Shadowsocks {
        plugin,
        plugin_opts,
        obfs,
        obfs_host,
        ..
    } = &record.cipher
    else {
        return None;
    };

    if let Some(name) = plugin.as_deref().filter(|p| is_obfs_plugin(p)) {
        let opts = parse_plugin_options(plugin_opts.as_deref().unwrap_or_default());
        let mode = opts
            .get("obfs")
            .and_then(Value::as_str)
            .unwrap_or("http")
            .to_string();
        let host = opts
            .get("obfs-host")
            .and_then(Value::as_str)
            .map(str::to_string);
        tracing::trace!(plugin = name, mode = %mode, "Resolved obfs plugin settings");
        return Some(ObfsSettings { mode, host });
    }

    obfs.as_ref().map(|mode| ObfsSettings {
        mode: mode.clone(),
        host: obfs_host.clone(),
    })
}
