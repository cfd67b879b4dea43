//! Trojan link parser
//!
//! Link format: `trojan://[password]@[host]:[port][?query][#fragment]`
//!
//! **Required**: `password`, `host`, `port` (1–65535). Password must be URL-encoded if it contains
//! special characters; `p%40ss%23word` decodes to `p@ss#word`.
//!
//! **Query parameters** (optional): same keys as VLess (`sni`, `type`, `host`, `path`, `alpn`,
//! `fp`, `allowInsecure`, ...). `security` is ignored: Trojan always runs over TLS.
//!
//! **Fragment**: Decoded as display name.
//!
//! ## Parsing rules
//!
//! 1. Prefix `trojan://` is case-insensitive.
//! 2. The first `?` and the first `#` are located independently; either may be missing and
//!    they may come in any order. The main part ends at whichever comes first.
//! 3. Main part must contain `@` and `:` (`password@address:port`); otherwise `MalformedLink`.
//! 4. Port must parse as a non-zero u16; otherwise `MalformedLink`.

use crate::LinkParser;
use crate::constants::{error_msg, scheme};
use crate::error::{ConvertError, Result};
use crate::record::{ProxyRecord, Scheme, Security};
use crate::uri;
use crate::vless::apply_query;
use tracing::trace;

/// Trojan link parser
#[derive(Debug, Clone, Copy, Default)]
pub struct Trojan;

impl LinkParser for Trojan {
    const PREFIX: &'static str = scheme::TROJAN;

    fn parse_body(link_body: &str) -> Result<ProxyRecord> {
        trace!("Parsing Trojan link");

        let (main_part, query_part, fragment) = split_segments(link_body);

        let (password_raw, host_port) = uri::split_userinfo(main_part)?;
        if password_raw.is_empty() {
            return Err(ConvertError::MalformedLink(
                error_msg::MISSING_CREDENTIAL.to_string(),
            ));
        }
        let password = uri::decode_or_raw(password_raw);
        let (host, port) = uri::split_host_port(host_port)?;

        let mut record = ProxyRecord::new(Scheme::Trojan, host, port, password);
        record.display_name = uri::display_name(fragment, Scheme::Trojan);
        record.security = Some(Security::Tls);

        if let Some(query) = query_part {
            apply_query(&mut record, &uri::parse_query(query));
        }

        Ok(record)
    }
}

/// Splits `main[?query][#fragment]` where `?` and `#` may appear in either order.
fn split_segments(body: &str) -> (&str, Option<&str>, Option<&str>) {
    let query_pos = body.find('?');
    let hash_pos = body.find('#');

    match (query_pos, hash_pos) {
        (None, None) => (body, None, None),
        (Some(q), None) => (&body[..q], Some(&body[q + 1..]), None),
        (None, Some(h)) => (&body[..h], None, Some(&body[h + 1..])),
        (Some(q), Some(h)) if q < h => (&body[..q], Some(&body[q + 1..h]), Some(&body[h + 1..])),
        (Some(q), Some(h)) => (&body[..h], Some(&body[q + 1..]), Some(&body[h + 1..q])),
    }
}
