//! Canonical proxy record
//!
//! Every link parser produces a [`ProxyRecord`] and every format serializer
//! consumes one. The record keeps what the link said, not what a client
//! should use: fallbacks such as the SNI chain or the WebSocket path default
//! are computed on demand by [`crate::defaults`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Link scheme of a record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// `vless://`
    Vless,
    /// `vmess://`
    Vmess,
    /// `trojan://`
    Trojan,
    /// `ss://`
    Shadowsocks,
}

impl Scheme {
    /// Lowercase scheme name
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Vless => "vless",
            Scheme::Vmess => "vmess",
            Scheme::Trojan => "trojan",
            Scheme::Shadowsocks => "shadowsocks",
        }
    }

    /// Display name used when a link carries no usable remark
    pub fn placeholder_name(self) -> &'static str {
        match self {
            Scheme::Vless => "VLESS Node",
            Scheme::Vmess => "VMess Node",
            Scheme::Trojan => "Trojan Node",
            Scheme::Shadowsocks => "Shadowsocks Node",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport security mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Security {
    /// Plain transport
    None,
    /// Standard TLS
    Tls,
    /// REALITY TLS camouflage
    Reality,
}

impl Security {
    /// Maps a `security` query value; unknown values are treated as TLS-less.
    pub fn from_query(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "tls" | "xtls" => Security::Tls,
            "reality" => Security::Reality,
            _ => Security::None,
        }
    }
}

/// Network layer carried inside the proxy protocol
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Raw TCP
    #[default]
    Tcp,
    /// WebSocket
    Ws,
    /// gRPC
    Grpc,
    /// Anything else the link names (h2, httpupgrade, kcp, ...)
    Other(String),
}

impl Network {
    /// Maps a `type`/`net` value; empty means TCP.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "" | "tcp" => Network::Tcp,
            "ws" | "websocket" => Network::Ws,
            "grpc" => Network::Grpc,
            other => Network::Other(other.to_string()),
        }
    }

    /// Lowercase network name
    pub fn as_str(&self) -> &str {
        match self {
            Network::Tcp => "tcp",
            Network::Ws => "ws",
            Network::Grpc => "grpc",
            Network::Other(s) => s,
        }
    }
}

/// Transport parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Transport {
    /// Network layer
    pub network: Network,
    /// Request path (ws/h2)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// `Host` header (ws/h2)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_header: Option<String>,
    /// gRPC service name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    /// Header obfuscation type (e.g. `none`, `http`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_type: Option<String>,
}

/// TLS parameters, as written in the link
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TlsParams {
    /// Explicit server name indication
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sni: Option<String>,
    /// Raw comma-separated ALPN list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpn: Option<String>,
    /// uTLS client fingerprint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    /// REALITY public key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    /// REALITY short id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_id: Option<String>,
    /// REALITY spider-x path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spider_x: Option<String>,
}

/// Scheme-specific cipher parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CipherParams {
    /// VLESS and Trojan carry no cipher settings
    #[default]
    None,
    /// VMess alter id and cipher
    Vmess {
        /// Alter id (0 enables AEAD)
        alter_id: u16,
        /// Cipher name (`auto`, `aes-128-gcm`, ...)
        cipher: String,
    },
    /// Shadowsocks method and plugin
    Shadowsocks {
        /// Encryption method
        method: String,
        /// Plugin name (e.g. `obfs-local`, `v2ray-plugin`)
        #[serde(skip_serializing_if = "Option::is_none")]
        plugin: Option<String>,
        /// Residual `;`-joined plugin options
        #[serde(skip_serializing_if = "Option::is_none")]
        plugin_opts: Option<String>,
        /// Legacy `obfs` query value
        #[serde(skip_serializing_if = "Option::is_none")]
        obfs: Option<String>,
        /// Legacy `obfs-host` query value
        #[serde(skip_serializing_if = "Option::is_none")]
        obfs_host: Option<String>,
    },
}

/// Canonical configuration of one proxy endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProxyRecord {
    scheme: Scheme,
    /// Server host (IPv6 without brackets)
    pub host: String,
    /// Server port (1–65535)
    pub port: u16,
    /// UUID (vless/vmess) or password (trojan/shadowsocks)
    pub identity: String,
    /// Security mode; `None` for Shadowsocks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Security>,
    /// Transport parameters
    pub transport: Transport,
    /// TLS parameters
    pub tls: TlsParams,
    /// Cipher parameters
    pub cipher: CipherParams,
    /// XTLS flow (vless)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    /// Skip certificate verification
    pub allow_insecure: bool,
    /// Human-readable name
    pub display_name: String,
}

impl ProxyRecord {
    /// Creates a record with empty optional groups; the scheme is fixed from here on.
    pub fn new(scheme: Scheme, host: String, port: u16, identity: String) -> Self {
        Self {
            scheme,
            host,
            port,
            identity,
            security: None,
            transport: Transport::default(),
            tls: TlsParams::default(),
            cipher: CipherParams::None,
            flow: None,
            allow_insecure: false,
            display_name: scheme.placeholder_name().to_string(),
        }
    }

    /// Scheme this record was parsed from
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// True for TLS and REALITY
    pub fn tls_enabled(&self) -> bool {
        matches!(self.security, Some(Security::Tls) | Some(Security::Reality))
    }

    /// True for REALITY
    pub fn is_reality(&self) -> bool {
        self.security == Some(Security::Reality)
    }
}
