//! Clash / mihomo proxy mappings
//!
//! One mapping per proxy with kebab-case keys. WebSocket settings live under
//! `ws-opts` with the `Host` header nested in `headers`, REALITY under
//! `reality-opts`, and Shadowsocks plugins under `plugin` / `plugin-opts`.

use crate::defaults;
use crate::record::{CipherParams, Network, ProxyRecord, Scheme};
use serde_json::{Map, Value, json};

/// Builds the Clash mapping for `record`.
pub fn serialize(record: &ProxyRecord, name: &str) -> Value {
    let mut proxy = Map::new();
    proxy.insert("name".into(), json!(name));
    proxy.insert("type".into(), json!(clash_type(record.scheme())));
    proxy.insert("server".into(), json!(record.host));
    proxy.insert("port".into(), json!(record.port));

    match &record.cipher {
        CipherParams::Shadowsocks { method, .. } => {
            proxy.insert("cipher".into(), json!(method));
            proxy.insert("password".into(), json!(record.identity));
            proxy.insert("udp".into(), json!(true));
            insert_plugin(&mut proxy, record);
            return Value::Object(proxy);
        }
        CipherParams::Vmess { alter_id, cipher } => {
            proxy.insert("uuid".into(), json!(record.identity));
            proxy.insert("alterId".into(), json!(alter_id));
            proxy.insert("cipher".into(), json!(cipher));
        }
        CipherParams::None if record.scheme() == Scheme::Trojan => {
            proxy.insert("password".into(), json!(record.identity));
        }
        CipherParams::None => {
            proxy.insert("uuid".into(), json!(record.identity));
        }
    }

    proxy.insert("udp".into(), json!(true));
    if record.scheme() != Scheme::Trojan {
        proxy.insert("tls".into(), json!(record.tls_enabled()));
    }
    if let Some(flow) = &record.flow {
        proxy.insert("flow".into(), json!(flow));
    }

    if record.tls_enabled() {
        let sni_key = if record.scheme() == Scheme::Trojan {
            "sni"
        } else {
            "servername"
        };
        proxy.insert(sni_key.into(), json!(defaults::server_name(record)));

        let alpn = defaults::record_alpn(record);
        if !alpn.is_empty() {
            proxy.insert("alpn".into(), json!(alpn));
        }
        if let Some(fp) = defaults::client_fingerprint(record) {
            proxy.insert("client-fingerprint".into(), json!(fp));
        }
        proxy.insert("skip-cert-verify".into(), json!(record.allow_insecure));
    }

    if record.is_reality() {
        let mut opts = Map::new();
        if let Some(pbk) = &record.tls.public_key {
            opts.insert("public-key".into(), json!(pbk));
        }
        if let Some(sid) = &record.tls.short_id {
            opts.insert("short-id".into(), json!(sid));
        }
        proxy.insert("reality-opts".into(), Value::Object(opts));
    }

    proxy.insert("network".into(), json!(record.transport.network.as_str()));
    match record.transport.network {
        Network::Ws => {
            proxy.insert(
                "ws-opts".into(),
                json!({
                    "path": defaults::ws_path(record),
                    "headers": { "Host": defaults::ws_host(record) },
                }),
            );
        }
        Network::Grpc => {
            if let Some(service) = defaults::grpc_service_name(record) {
                proxy.insert(
                    "grpc-opts".into(),
                    json!({ "grpc-service-name": service }),
                );
            }
        }
        _ => {}
    }

    Value::Object(proxy)
}

fn clash_type(scheme: Scheme) -> &'static str {
    match scheme {
        Scheme::Vless => "vless",
        Scheme::Vmess => "vmess",
        Scheme::Trojan => "trojan",
        Scheme::Shadowsocks => "ss",
    }
}

fn insert_plugin(proxy: &mut Map<String, Value>, record: &ProxyRecord) {
    let CipherParams::Shadowsocks {
        plugin, plugin_opts, ..
    } = &record.cipher
    else {
        return;
    };

    if let Some(obfs) = defaults::obfs_settings(record) {
        let mut opts = Map::new();
        opts.insert("mode".into(), json!(obfs.mode));
        if let Some(host) = obfs.host {
            opts.insert("host".into(), json!(host));
        }
        proxy.insert("plugin".into(), json!("obfs"));
        proxy.insert("plugin-opts".into(), Value::Object(opts));
        return;
    }

    if let Some(name) = plugin {
        let opts = defaults::parse_plugin_options(plugin_opts.as_deref().unwrap_or_default());
        proxy.insert("plugin".into(), json!(name));
        if !opts.is_empty() {
            proxy.insert("plugin-opts".into(), Value::Object(opts));
        }
    }
}
