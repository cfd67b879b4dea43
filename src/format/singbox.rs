//! sing-box outbounds
//!
//! One outbound object per proxy. VLESS, VMess and Trojan always carry a `tls`
//! object, with `enabled: false` when the link has no TLS, so templates can
//! rely on its presence. Transports go into a nested `transport` object.

use crate::defaults;
use crate::record::{CipherParams, Network, ProxyRecord, Scheme};
use serde_json::{Map, Value, json};

/// Builds the sing-box outbound for `record`.
pub fn serialize(record: &ProxyRecord, name: &str) -> Value {
    let mut outbound = Map::new();
    outbound.insert("type".into(), json!(singbox_type(record.scheme())));
    outbound.insert("tag".into(), json!(name));
    outbound.insert("server".into(), json!(record.host));
    outbound.insert("server_port".into(), json!(record.port));

    match &record.cipher {
        CipherParams::Shadowsocks {
            method,
            plugin,
            plugin_opts,
            ..
        } => {
            outbound.insert("method".into(), json!(method));
            outbound.insert("password".into(), json!(record.identity));
            if let Some(obfs) = defaults::obfs_settings(record) {
                let mut opts = format!("obfs={}", obfs.mode);
                if let Some(host) = obfs.host {
                    opts.push_str(&format!(";obfs-host={}", host));
                }
                outbound.insert("plugin".into(), json!("obfs-local"));
                outbound.insert("plugin_opts".into(), json!(opts));
            } else if let Some(plugin) = plugin {
                outbound.insert("plugin".into(), json!(plugin));
                if let Some(opts) = plugin_opts {
                    outbound.insert("plugin_opts".into(), json!(opts));
                }
            }
            return Value::Object(outbound);
        }
        CipherParams::Vmess { alter_id, cipher } => {
            outbound.insert("uuid".into(), json!(record.identity));
            outbound.insert("security".into(), json!(cipher));
            outbound.insert("alter_id".into(), json!(alter_id));
        }
        CipherParams::None if record.scheme() == Scheme::Trojan => {
            outbound.insert("password".into(), json!(record.identity));
        }
        CipherParams::None => {
            outbound.insert("uuid".into(), json!(record.identity));
            if let Some(flow) = &record.flow {
                outbound.insert("flow".into(), json!(flow));
            }
        }
    }

    outbound.insert("tls".into(), tls_object(record));
    if let Some(transport) = transport_object(record) {
        outbound.insert("transport".into(), transport);
    }

    Value::Object(outbound)
}

fn singbox_type(scheme: Scheme) -> &'static str {
    match scheme {
        Scheme::Vless => "vless",
        Scheme::Vmess => "vmess",
        Scheme::Trojan => "trojan",
        Scheme::Shadowsocks => "shadowsocks",
    }
}

fn tls_object(record: &ProxyRecord) -> Value {
    if !record.tls_enabled() {
        return json!({ "enabled": false });
    }

    let mut tls = Map::new();
    tls.insert("enabled".into(), json!(true));
    tls.insert("server_name".into(), json!(defaults::server_name(record)));
    tls.insert("insecure".into(), json!(record.allow_insecure));

    let alpn = defaults::record_alpn(record);
    if !alpn.is_empty() {
        tls.insert("alpn".into(), json!(alpn));
    }
    if let Some(fp) = defaults::client_fingerprint(record) {
        tls.insert("utls".into(), json!({ "enabled": true, "fingerprint": fp }));
    }
    if record.is_reality() {
        let mut reality = Map::new();
        reality.insert("enabled".into(), json!(true));
        if let Some(pbk) = &record.tls.public_key {
            reality.insert("public_key".into(), json!(pbk));
        }
        if let Some(sid) = &record.tls.short_id {
            reality.insert("short_id".into(), json!(sid));
        }
        tls.insert("reality".into(), Value::Object(reality));
    }

    Value::Object(tls)
}

fn transport_object(record: &ProxyRecord) -> Option<Value> {
    match record.transport.network {
        Network::Ws => Some(json!({
            "type": "ws",
            "path": defaults::ws_path(record),
            "headers": { "Host": defaults::ws_host(record) },
        })),
        Network::Grpc => Some(json!({
            "type": "grpc",
            "service_name": defaults::grpc_service_name(record).unwrap_or_default(),
        })),
        Network::Other(ref kind) if kind == "httpupgrade" => Some(json!({
            "type": "httpupgrade",
            "host": defaults::ws_host(record),
            "path": record.transport.path.clone().unwrap_or_else(|| "/".to_string()),
        })),
        _ => None,
    }
}
