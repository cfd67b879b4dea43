//! Quantumult X server lines
//!
//! `type=host:port, key=value, ..., tag=name`
//!
//! VLESS and VMess share the `vmess` line type with `method=none`; the UUID
//! goes into `password`. WebSocket is expressed through `obfs=ws`/`wss`.
//! Passwords and tags holding `,` or `"` are double-quoted.

use super::{push_opt, quote};
use crate::defaults;
use crate::record::{CipherParams, Network, ProxyRecord, Scheme};

/// Builds the Quantumult X line for `record`.
pub fn serialize(record: &ProxyRecord, name: &str) -> String {
    let kind = match record.scheme() {
        Scheme::Vless | Scheme::Vmess => "vmess",
        Scheme::Trojan => "trojan",
        Scheme::Shadowsocks => "shadowsocks",
    };
    let mut opts = vec![format!("{}={}:{}", kind, host_literal(&record.host), record.port)];

    match &record.cipher {
        CipherParams::Shadowsocks { method, .. } => {
            push_opt(&mut opts, "method", method);
            push_opt(&mut opts, "password", quote(&record.identity));
            if let Some(obfs) = defaults::obfs_settings(record) {
                push_opt(&mut opts, "obfs", &obfs.mode);
                push_opt(
                    &mut opts,
                    "obfs-host",
                    obfs.host.unwrap_or_else(|| record.host.clone()),
                );
            }
            push_opt(&mut opts, "udp-relay", true);
        }
        _ => {
            if kind == "vmess" {
                push_opt(&mut opts, "method", "none");
            }
            push_opt(&mut opts, "password", quote(&record.identity));
            push_transport(&mut opts, record);
            if let CipherParams::Vmess { alter_id: 0, .. } = record.cipher {
                push_opt(&mut opts, "aead", true);
            }
        }
    }

    push_opt(&mut opts, "fast-open", false);
    push_opt(&mut opts, "tag", quote(name));
    opts.join(", ")
}

fn push_transport(opts: &mut Vec<String>, record: &ProxyRecord) {
    let tls = record.tls_enabled();
    match record.transport.network {
        Network::Ws => {
            push_opt(opts, "obfs", if tls { "wss" } else { "ws" });
            push_opt(opts, "obfs-host", defaults::ws_host(record));
            if let Some(path) = defaults::ws_path(record) {
                push_opt(opts, "obfs-uri", path);
            }
            if tls {
                push_opt(opts, "tls-host", defaults::server_name(record));
            }
        }
        _ if tls => {
            if record.scheme() == Scheme::Trojan {
                push_opt(opts, "over-tls", true);
            } else {
                push_opt(opts, "obfs", "over-tls");
            }
            push_opt(opts, "tls-host", defaults::server_name(record));
        }
        _ => {}
    }

    if tls {
        push_opt(opts, "tls-verification", !record.allow_insecure);
        if record.is_reality() {
            if let Some(pbk) = &record.tls.public_key {
                push_opt(opts, "reality-base64-pubkey", pbk);
            }
            if let Some(sid) = &record.tls.short_id {
                push_opt(opts, "reality-hex-shortid", sid);
            }
        }
    }
}

fn host_literal(host: &str) -> String {
    if host.contains(':') {
        format!("[{}]", host)
    } else {
        host.to_string()
    }
}
