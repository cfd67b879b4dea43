//! VLess link parser
//!
//! URI format (RFC 3986): `vless://<id>@<address>:<port>[?<query>][#<fragment>]`
//!
//! **Required**: `id` (user UUID), `address` (host, IPv4 or bracketed IPv6), `port` (1–65535).
//!
//! **Query parameters** (optional, `application/x-www-form-urlencoded`): `security` (none/tls/reality),
//! `type` (tcp/ws/grpc/...), `host`, `path`, `sni`, `alpn`, `fp`, `pbk` (Reality public key),
//! `sid` (Reality short ID), `spx` (Reality spider-x), `flow`, `serviceName`, `headerType`,
//! `allowInsecure`/`insecure`.
//!
//! **Fragment**: Decoded as display name; the raw text is kept when it is not valid percent-encoding.
//!
//! ## Parsing rules
//!
//! 1. Prefix `vless://` is case-insensitive.
//! 2. `?` is located first, then `#` is searched after it; a query always precedes the fragment.
//! 3. Main part must contain `@` and a `:` for port (`id@address:port`); otherwise `MalformedLink`.
//! 4. Port must parse as a non-zero u16; otherwise `MalformedLink`.
//! 5. Missing `security` means `none`, missing `type` means `tcp`.

use crate::LinkParser;
use crate::constants::{error_msg, scheme};
use crate::error::{ConvertError, Result};
use crate::record::{Network, ProxyRecord, Scheme, Security};
use crate::uri;
use std::collections::HashMap;
use tracing::trace;

/// VLess link parser
#[derive(Debug, Clone, Copy, Default)]
pub struct VLess;

impl LinkParser for VLess {
    const PREFIX: &'static str = scheme::VLESS;

    fn parse_body(link_body: &str) -> Result<ProxyRecord> {
        trace!("Parsing VLESS link");

        // Split into parts: id@host:port[?query][#fragment]
        let (main_part, query_part, fragment) = {
            let query_pos = link_body.find('?');
            let search_from = query_pos.unwrap_or(0);
            let hash_pos = link_body[search_from..].find('#').map(|p| p + search_from);

            let main_end = query_pos.or(hash_pos).unwrap_or(link_body.len());
            let query = query_pos.map(|q| &link_body[q + 1..hash_pos.unwrap_or(link_body.len())]);
            let fragment = hash_pos.map(|h| &link_body[h + 1..]);

            (&link_body[..main_end], query, fragment)
        };

        let (id, host_port) = uri::split_userinfo(main_part)?;
        if id.is_empty() {
            return Err(ConvertError::MalformedLink(
                error_msg::MISSING_CREDENTIAL.to_string(),
            ));
        }
        let (host, port) = uri::split_host_port(host_port)?;

        let mut record = ProxyRecord::new(Scheme::Vless, host, port, uri::decode_or_raw(id));
        record.display_name = uri::display_name(fragment, Scheme::Vless);

        let params = query_part.map(uri::parse_query).unwrap_or_default();
        apply_query(&mut record, &params);
        record.security = Some(
            params
                .get("security")
                .map(|s| Security::from_query(s))
                .unwrap_or(Security::None),
        );

        Ok(record)
    }
}

/// Applies the transport and TLS query keys shared by vless and trojan links.
pub(crate) fn apply_query(record: &mut ProxyRecord, params: &HashMap<String, String>) {
    record.transport.network = params
        .get("type")
        .map(|t| Network::parse(t))
        .unwrap_or_default();
    record.transport.path = uri::non_empty(params, "path");
    record.transport.host_header = uri::non_empty(params, "host");
    record.transport.service_name = uri::non_empty(params, "serviceName");
    record.transport.header_type = uri::non_empty(params, "headerType");

    record.tls.sni = uri::non_empty(params, "sni").or_else(|| uri::non_empty(params, "peer"));
    record.tls.alpn = uri::non_empty(params, "alpn");
    record.tls.fingerprint = uri::non_empty(params, "fp");
    record.tls.public_key = uri::non_empty(params, "pbk");
    record.tls.short_id = uri::non_empty(params, "sid");
    record.tls.spider_x = uri::non_empty(params, "spx");

    record.flow = uri::non_empty(params, "flow");
    record.allow_insecure = uri::flag(params, &["allowInsecure", "insecure"]);
}
