//! 四种分享链接解析的完整测试用例
//!
//! 覆盖 VLESS、VMess、Trojan、Shadowsocks 四种链接的：
//! - 前缀大小写不敏感与未知前缀
//! - 输入校验（空输入、超长）
//! - 必填字段与结构错误（MalformedLink、InvalidPayload）
//! - 百分号解码与显示名回退
//! - 查询参数与插件参数

#![cfg(test)]

use crate::defaults;
use crate::error::ConvertError;
use crate::record::{CipherParams, Network, Scheme, Security};
use crate::{LinkParser, Shadowsocks, Trojan, VLess, VMess, parse_link, parse_link_with_limit};
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use serde_json::json;

fn vmess_link(body: &serde_json::Value) -> String {
    format!("vmess://{}", STANDARD.encode(body.to_string()))
}

fn ss_userinfo(method_password: &str) -> String {
    STANDARD.encode(method_password)
}

// =============================================================================
// 统一约定：前缀与输入校验
// =============================================================================

#[test]
fn protocols_prefix_case_insensitive() {
    let vmess_body = STANDARD.encode(r#"{"add":"127.0.0.1","port":443,"id":"uuid-123"}"#);
    let ss_user = ss_userinfo("aes-256-gcm:pass");
    let cases = [
        ("VLESS://id@host:443".to_string(), Scheme::Vless),
        ("VLeSs://id@host:443".to_string(), Scheme::Vless),
        (format!("VMESS://{}", vmess_body), Scheme::Vmess),
        ("TROJAN://pw@host:443".to_string(), Scheme::Trojan),
        (format!("SS://{}@host:8388", ss_user), Scheme::Shadowsocks),
    ];
    for (link, scheme) in cases {
        let record = parse_link(&link).unwrap_or_else(|e| panic!("{} rejected: {}", link, e));
        assert_eq!(record.scheme(), scheme, "{}", link);
    }
}

#[test]
fn protocols_unknown_scheme_is_unsupported() {
    for link in ["hysteria2://host:443", "unknown://something", "http://example.com"] {
        let err = parse_link(link).unwrap_err();
        assert!(
            matches!(err, ConvertError::UnsupportedScheme(_)),
            "{} gave {:?}",
            link,
            err
        );
    }
}

#[test]
fn protocols_parser_rejects_foreign_prefix() {
    let err = VLess::parse("trojan://pw@host:443").unwrap_err();
    assert!(matches!(err, ConvertError::UnsupportedScheme(_)));
    let err = Trojan::parse("vless://id@host:443").unwrap_err();
    assert!(matches!(err, ConvertError::UnsupportedScheme(_)));
}

#[test]
fn protocols_empty_input_is_invalid() {
    for link in ["", "   ", "\n\t"] {
        assert!(matches!(
            parse_link(link).unwrap_err(),
            ConvertError::InvalidInput(_)
        ));
    }
}

#[test]
fn protocols_oversized_input_is_invalid() {
    let link = format!("trojan://{}@host:443", "p".repeat(2000));
    assert!(matches!(
        parse_link(&link).unwrap_err(),
        ConvertError::InvalidInput(_)
    ));
    assert!(matches!(
        Trojan::parse(&link).unwrap_err(),
        ConvertError::InvalidInput(_)
    ));
}

#[test]
fn protocols_length_limit_is_configurable() {
    let link = "trojan://password@example.com:443";
    assert!(parse_link_with_limit(link, link.len()).is_ok());
    assert!(matches!(
        parse_link_with_limit(link, link.len() - 1).unwrap_err(),
        ConvertError::InvalidInput(_)
    ));
}

#[test]
fn protocols_surrounding_whitespace_is_trimmed() {
    let record = parse_link("  trojan://pw@host:443#Name \n").unwrap();
    assert_eq!(record.host, "host");
    assert_eq!(record.display_name, "Name");
}

// =============================================================================
// VLESS
// =============================================================================

#[test]
fn vless_minimal_uses_defaults() {
    let record = VLess::parse("vless://uuid-1@example.com:443").unwrap();
    assert_eq!(record.scheme(), Scheme::Vless);
    assert_eq!(record.identity, "uuid-1");
    assert_eq!(record.host, "example.com");
    assert_eq!(record.port, 443);
    assert_eq!(record.security, Some(Security::None));
    assert_eq!(record.transport.network, Network::Tcp);
    assert_eq!(record.display_name, "VLESS Node");
    assert!(!record.tls_enabled());
    assert_eq!(defaults::ws_path(&record), None);
}

#[test]
fn vless_reality_full_query() {
    let link = "vless://uuid-1@1.2.3.4:443?security=reality&sni=www.apple.com&fp=safari\
                &pbk=PUBKEY&sid=ab12&spx=%2F&flow=xtls-rprx-vision&type=tcp#Reality%20Node";
    let record = VLess::parse(link).unwrap();
    assert_eq!(record.security, Some(Security::Reality));
    assert!(record.is_reality());
    assert!(record.tls_enabled());
    assert_eq!(record.tls.sni.as_deref(), Some("www.apple.com"));
    assert_eq!(record.tls.fingerprint.as_deref(), Some("safari"));
    assert_eq!(record.tls.public_key.as_deref(), Some("PUBKEY"));
    assert_eq!(record.tls.short_id.as_deref(), Some("ab12"));
    assert_eq!(record.tls.spider_x.as_deref(), Some("/"));
    assert_eq!(record.flow.as_deref(), Some("xtls-rprx-vision"));
    assert_eq!(record.display_name, "Reality Node");
}

#[test]
fn vless_reality_fingerprint_defaults_to_chrome() {
    let record = VLess::parse("vless://id@host:443?security=reality&pbk=K").unwrap();
    assert_eq!(defaults::client_fingerprint(&record).as_deref(), Some("chrome"));

    let tls = VLess::parse("vless://id@host:443?security=tls").unwrap();
    assert_eq!(defaults::client_fingerprint(&tls), None);
}

#[test]
fn vless_ws_transport_and_path_default() {
    let record = VLess::parse("vless://id@host:443?type=ws&host=cdn.example.com").unwrap();
    assert_eq!(record.transport.network, Network::Ws);
    assert_eq!(record.transport.path, None);
    assert_eq!(defaults::ws_path(&record).as_deref(), Some("/"));
    assert_eq!(defaults::ws_host(&record), "cdn.example.com");

    let record = VLess::parse("vless://id@host:443?type=ws&path=%2Fray%3Fed%3D2048").unwrap();
    assert_eq!(defaults::ws_path(&record).as_deref(), Some("/ray?ed=2048"));
}

#[test]
fn vless_query_uses_form_decoding() {
    let record = VLess::parse("vless://id@host:443?type=ws&path=%2Fa+b").unwrap();
    assert_eq!(record.transport.path.as_deref(), Some("/a b"));
    let record = VLess::parse("vless://id@host:443?type=ws&path=%2Fa%2Bb").unwrap();
    assert_eq!(record.transport.path.as_deref(), Some("/a+b"));
}

#[test]
fn vless_sni_fallback_chain() {
    let explicit = VLess::parse("vless://id@host:443?security=tls&sni=a.com&host=b.com").unwrap();
    assert_eq!(defaults::server_name(&explicit), "a.com");

    let header = VLess::parse("vless://id@host:443?security=tls&host=b.com").unwrap();
    assert_eq!(defaults::server_name(&header), "b.com");

    let bare = VLess::parse("vless://id@bare.example.com:443?security=tls").unwrap();
    assert_eq!(defaults::server_name(&bare), "bare.example.com");
}

#[test]
fn vless_grpc_service_name() {
    let record = VLess::parse("vless://id@host:443?type=grpc&serviceName=svc").unwrap();
    assert_eq!(record.transport.network, Network::Grpc);
    assert_eq!(defaults::grpc_service_name(&record).as_deref(), Some("svc"));
}

#[test]
fn vless_fragment_after_query() {
    let record = VLess::parse("vless://id@host:443?type=ws&path=%2Fws#My%20Node").unwrap();
    assert_eq!(record.transport.path.as_deref(), Some("/ws"));
    assert_eq!(record.display_name, "My Node");
}

#[test]
fn vless_fragment_without_query() {
    let record = VLess::parse("vless://id@host:443#%E9%A6%99%E6%B8%AF").unwrap();
    assert_eq!(record.display_name, "香港");
    assert_eq!(record.port, 443);
}

#[test]
fn vless_undecodable_fragment_kept_raw() {
    let record = VLess::parse("vless://id@host:443#bad%E9%A6").unwrap();
    assert_eq!(record.display_name, "bad%E9%A6");
}

#[test]
fn vless_ipv6_host() {
    let record = VLess::parse("vless://id@[2001:db8::1]:8443").unwrap();
    assert_eq!(record.host, "2001:db8::1");
    assert_eq!(record.port, 8443);
}

#[test]
fn vless_allow_insecure_flags() {
    for query in ["allowInsecure=1", "allowInsecure=true", "insecure=1"] {
        let link = format!("vless://id@host:443?security=tls&{}", query);
        assert!(VLess::parse(&link).unwrap().allow_insecure, "{}", query);
    }
    assert!(!VLess::parse("vless://id@host:443?allowInsecure=0").unwrap().allow_insecure);
}

#[test]
fn vless_structural_errors() {
    let cases = [
        "vless://host:443",
        "vless://id@host",
        "vless://id@host:abc",
        "vless://id@host:0",
        "vless://id@host:70000",
        "vless://id@:443",
        "vless://@host:443",
    ];
    for link in cases {
        let err = VLess::parse(link).unwrap_err();
        assert!(
            matches!(err, ConvertError::MalformedLink(_)),
            "{} gave {:?}",
            link,
            err
        );
    }
}

// =============================================================================
// VMess
// =============================================================================

#[test]
fn vmess_standard_body() {
    let link = vmess_link(&json!({
        "v": "2",
        "ps": "HK 01",
        "add": "hk.example.com",
        "port": 443,
        "id": "uuid-123",
        "aid": 0,
        "net": "ws",
        "type": "none",
        "host": "cdn.example.com",
        "path": "/vmess",
        "tls": "tls",
        "sni": "sni.example.com"
    }));
    let record = VMess::parse(&link).unwrap();
    assert_eq!(record.scheme(), Scheme::Vmess);
    assert_eq!(record.host, "hk.example.com");
    assert_eq!(record.port, 443);
    assert_eq!(record.identity, "uuid-123");
    assert_eq!(record.display_name, "HK 01");
    assert_eq!(record.security, Some(Security::Tls));
    assert_eq!(record.transport.network, Network::Ws);
    assert_eq!(record.transport.path.as_deref(), Some("/vmess"));
    assert_eq!(record.transport.host_header.as_deref(), Some("cdn.example.com"));
    assert_eq!(record.tls.sni.as_deref(), Some("sni.example.com"));
    assert_eq!(
        record.cipher,
        CipherParams::Vmess {
            alter_id: 0,
            cipher: "auto".to_string()
        }
    );
}

#[test]
fn vmess_string_port_and_aid() {
    let link = vmess_link(&json!({
        "add": "1.2.3.4",
        "port": "8080",
        "id": "u",
        "aid": "64",
        "scy": "aes-128-gcm"
    }));
    let record = VMess::parse(&link).unwrap();
    assert_eq!(record.port, 8080);
    assert_eq!(
        record.cipher,
        CipherParams::Vmess {
            alter_id: 64,
            cipher: "aes-128-gcm".to_string()
        }
    );
    assert_eq!(record.security, Some(Security::None));
    assert_eq!(record.display_name, "VMess Node");
}

#[test]
fn vmess_tls_only_for_exact_value() {
    let link = vmess_link(&json!({"add": "h", "port": 1, "id": "u", "tls": "none"}));
    assert!(!VMess::parse(&link).unwrap().tls_enabled());
    let link = vmess_link(&json!({"add": "h", "port": 1, "id": "u", "tls": ""}));
    assert!(!VMess::parse(&link).unwrap().tls_enabled());
}

#[test]
fn vmess_non_string_scalars_read_as_text() {
    let link = vmess_link(&json!({"add": "h", "port": 443, "id": "u", "tls": true, "ps": 123}));
    let record = VMess::parse(&link).unwrap();
    assert!(!record.tls_enabled());
    assert_eq!(record.display_name, "123");

    let link = vmess_link(&json!({
        "add": "h", "port": 443.0, "id": "u", "aid": 2, "net": null, "path": 7, "sni": false
    }));
    let record = VMess::parse(&link).unwrap();
    assert_eq!(record.port, 443);
    assert_eq!(record.transport.network, Network::Tcp);
    assert_eq!(record.transport.path.as_deref(), Some("7"));
    assert_eq!(record.tls.sni.as_deref(), Some("false"));
    assert!(matches!(record.cipher, CipherParams::Vmess { alter_id: 2, .. }));

    let link = vmess_link(&json!({"add": "h", "port": 443, "id": "u", "ps": null}));
    assert_eq!(VMess::parse(&link).unwrap().display_name, Scheme::Vmess.placeholder_name());
}

#[test]
fn vmess_url_safe_unpadded_body() {
    let body = json!({"add": "h.example.com", "port": 443, "id": "u?>>", "ps": "名字"}).to_string();
    let link = format!("vmess://{}", URL_SAFE_NO_PAD.encode(body));
    let record = VMess::parse(&link).unwrap();
    assert_eq!(record.identity, "u?>>");
    assert_eq!(record.display_name, "名字");
}

#[test]
fn vmess_grpc_path_is_service_name() {
    let link = vmess_link(&json!({"add": "h", "port": 443, "id": "u", "net": "grpc", "path": "svc"}));
    let record = VMess::parse(&link).unwrap();
    assert_eq!(record.transport.service_name.as_deref(), Some("svc"));
    assert_eq!(defaults::grpc_service_name(&record).as_deref(), Some("svc"));
}

#[test]
fn vmess_bad_base64_is_invalid_payload() {
    let err = VMess::parse("vmess://!!!not-base64!!!").unwrap_err();
    assert!(matches!(err, ConvertError::InvalidPayload(_)));
}

#[test]
fn vmess_bad_json_is_invalid_payload() {
    let link = format!("vmess://{}", STANDARD.encode("not json at all"));
    let err = VMess::parse(&link).unwrap_err();
    assert!(matches!(err, ConvertError::InvalidPayload(_)));
}

#[test]
fn vmess_missing_fields_are_malformed() {
    let cases = [
        json!({"port": 443, "id": "u"}),
        json!({"add": "h", "port": 443}),
        json!({"add": "h", "id": "u"}),
        json!({"add": "h", "port": "x", "id": "u"}),
        json!({"add": "h", "port": 0, "id": "u"}),
    ];
    for body in cases {
        let err = VMess::parse(&vmess_link(&body)).unwrap_err();
        assert!(
            matches!(err, ConvertError::MalformedLink(_)),
            "{} gave {:?}",
            body,
            err
        );
    }
}

// =============================================================================
// Trojan
// =============================================================================

#[test]
fn trojan_password_percent_decoded() {
    let record = Trojan::parse("trojan://p%40ss%23word@example.com:443").unwrap();
    assert_eq!(record.identity, "p@ss#word");
    assert_eq!(record.host, "example.com");
    assert_eq!(record.port, 443);
}

#[test]
fn trojan_always_tls() {
    let record = Trojan::parse("trojan://pw@host:443").unwrap();
    assert_eq!(record.security, Some(Security::Tls));
    assert_eq!(defaults::server_name(&record), "host");
    assert_eq!(record.display_name, "Trojan Node");
}

#[test]
fn trojan_query_then_fragment() {
    let record =
        Trojan::parse("trojan://pw@host:443?sni=s.example.com&alpn=h2%2Chttp%2F1.1#Node%201")
            .unwrap();
    assert_eq!(record.tls.sni.as_deref(), Some("s.example.com"));
    assert_eq!(defaults::record_alpn(&record), vec!["h2", "http/1.1"]);
    assert_eq!(record.display_name, "Node 1");
}

#[test]
fn trojan_fragment_then_query() {
    let record = Trojan::parse("trojan://pw@host:443#Node?sni=s.example.com").unwrap();
    assert_eq!(record.display_name, "Node");
    assert_eq!(record.tls.sni.as_deref(), Some("s.example.com"));
}

#[test]
fn trojan_peer_is_sni_alias() {
    let record = Trojan::parse("trojan://pw@host:443?peer=p.example.com").unwrap();
    assert_eq!(record.tls.sni.as_deref(), Some("p.example.com"));
}

#[test]
fn trojan_ws_transport() {
    let record = Trojan::parse("trojan://pw@host:443?type=ws&path=%2Ftj&host=cdn.com").unwrap();
    assert_eq!(record.transport.network, Network::Ws);
    assert_eq!(defaults::ws_path(&record).as_deref(), Some("/tj"));
    assert_eq!(defaults::server_name(&record), "cdn.com");
}

#[test]
fn trojan_structural_errors() {
    for link in [
        "trojan://host:443",
        "trojan://@host:443",
        "trojan://pw@host:port",
        "trojan://pw@host",
    ] {
        let err = Trojan::parse(link).unwrap_err();
        assert!(
            matches!(err, ConvertError::MalformedLink(_)),
            "{} gave {:?}",
            link,
            err
        );
    }
}

// =============================================================================
// Shadowsocks
// =============================================================================

#[test]
fn ss_sip002_userinfo() {
    let link = format!("ss://{}@1.2.3.4:8388#Tokyo", ss_userinfo("aes-256-gcm:secret"));
    let record = Shadowsocks::parse(&link).unwrap();
    assert_eq!(record.scheme(), Scheme::Shadowsocks);
    assert_eq!(record.host, "1.2.3.4");
    assert_eq!(record.port, 8388);
    assert_eq!(record.identity, "secret");
    assert_eq!(record.display_name, "Tokyo");
    assert_eq!(record.security, None);
    match &record.cipher {
        CipherParams::Shadowsocks { method, plugin, .. } => {
            assert_eq!(method, "aes-256-gcm");
            assert!(plugin.is_none());
        }
        other => panic!("unexpected cipher {:?}", other),
    }
}

#[test]
fn ss_url_safe_userinfo_without_padding() {
    let user = URL_SAFE_NO_PAD.encode("chacha20-ietf-poly1305:p@ss:word");
    let record = Shadowsocks::parse(&format!("ss://{}@host:443", user)).unwrap();
    assert_eq!(record.identity, "p@ss:word");
}

#[test]
fn ss_legacy_whole_body_base64() {
    let body = STANDARD.encode("aes-128-gcm:pw@legacy.example.com:8000");
    let record = Shadowsocks::parse(&format!("ss://{}#Legacy", body)).unwrap();
    assert_eq!(record.host, "legacy.example.com");
    assert_eq!(record.port, 8000);
    assert_eq!(record.identity, "pw");
    assert_eq!(record.display_name, "Legacy");
}

#[test]
fn ss_tag_stripped_before_parsing() {
    let link = format!("ss://{}@host:8388#a@b:c?d", ss_userinfo("aes-256-gcm:pw"));
    let record = Shadowsocks::parse(&link).unwrap();
    assert_eq!(record.host, "host");
    assert_eq!(record.display_name, "a@b:c?d");
}

#[test]
fn ss_plugin_split_into_name_and_options() {
    let link = format!(
        "ss://{}@host:8388/?plugin=obfs-local%3Bobfs%3Dhttp%3Bobfs-host%3Dexample.com#Obfs",
        ss_userinfo("aes-256-gcm:pw")
    );
    let record = Shadowsocks::parse(&link).unwrap();
    let CipherParams::Shadowsocks {
        plugin,
        plugin_opts,
        ..
    } = &record.cipher
    else {
        panic!("not a shadowsocks cipher");
    };
    assert_eq!(plugin.as_deref(), Some("obfs-local"));
    assert_eq!(plugin_opts.as_deref(), Some("obfs=http;obfs-host=example.com"));

    let opts = defaults::parse_plugin_options(plugin_opts.as_deref().unwrap());
    assert_eq!(opts.get("obfs"), Some(&json!("http")));
    assert_eq!(opts.get("obfs-host"), Some(&json!("example.com")));
}

#[test]
fn ss_plugin_without_options() {
    let link = format!("ss://{}@host:8388?plugin=v2ray-plugin", ss_userinfo("aes-256-gcm:pw"));
    let record = Shadowsocks::parse(&link).unwrap();
    let CipherParams::Shadowsocks {
        plugin,
        plugin_opts,
        ..
    } = &record.cipher
    else {
        panic!("not a shadowsocks cipher");
    };
    assert_eq!(plugin.as_deref(), Some("v2ray-plugin"));
    assert!(plugin_opts.is_none());
}

#[test]
fn ss_legacy_obfs_query() {
    let link = format!(
        "ss://{}@host:8388?obfs=tls&obfs-host=cloud.example.com",
        ss_userinfo("aes-256-gcm:pw")
    );
    let record = Shadowsocks::parse(&link).unwrap();
    let obfs = defaults::obfs_settings(&record).unwrap();
    assert_eq!(obfs.mode, "tls");
    assert_eq!(obfs.host.as_deref(), Some("cloud.example.com"));
}

#[test]
fn ss_bad_base64_is_invalid_payload() {
    let err = Shadowsocks::parse("ss://!!!@host:8388").unwrap_err();
    assert!(matches!(err, ConvertError::InvalidPayload(_)));
}

#[test]
fn ss_missing_method_separator_is_malformed() {
    let link = format!("ss://{}@host:8388", ss_userinfo("no-separator"));
    let err = Shadowsocks::parse(&link).unwrap_err();
    assert!(matches!(err, ConvertError::MalformedLink(_)));
}

#[test]
fn ss_bad_port_is_malformed() {
    let link = format!("ss://{}@host:99999", ss_userinfo("aes-256-gcm:pw"));
    let err = Shadowsocks::parse(&link).unwrap_err();
    assert!(matches!(err, ConvertError::MalformedLink(_)));
}

// =============================================================================
// Plugin option parsing
// =============================================================================

#[test]
fn plugin_options_bare_tls_and_unknown_tokens() {
    let opts = defaults::parse_plugin_options("tls;mode=websocket;mux;host=a.com;=x");
    assert_eq!(opts.get("tls"), Some(&json!(true)));
    assert_eq!(opts.get("mode"), Some(&json!("websocket")));
    assert_eq!(opts.get("host"), Some(&json!("a.com")));
    assert!(!opts.contains_key("mux"));
    assert_eq!(opts.len(), 3);
}

#[test]
fn alpn_list_trims_and_drops_empty() {
    assert_eq!(
        defaults::alpn_list(Some(" h2 ,, http/1.1 ,")),
        vec!["h2".to_string(), "http/1.1".to_string()]
    );
    assert!(defaults::alpn_list(None).is_empty());
}
