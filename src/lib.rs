//! # VPN Link Convert
//!
//! Converts proxy share links into client configuration documents.
//!
//! ## Pipeline
//!
//! 1. **Parse**: each link becomes one canonical [`ProxyRecord`] ([`parse_link`]).
//! 2. **Serialize**: the record is rendered for every [`Format`] independently
//!    ([`format::FragmentSet`]).
//! 3. **Batch**: many links are processed in order; bad links become failure
//!    entries instead of aborting ([`BatchProcessor`]).
//! 4. **Render**: the usable fragments are bound into a per-format, per-level
//!    template ([`TemplateRenderer`]).
//!
//! [`Converter`] ties the four steps together behind [`Settings`].
//!
//! ## Supported links
//!
//! - **[VLess]** (`vless://`): TLS, Reality, ws/grpc transports, flow
//! - **[VMess]** (`vmess://`): base64 JSON body (standard or URL-safe alphabet)
//! - **[Trojan]** (`trojan://`): always TLS, query and remark in either order
//! - **[Shadowsocks]** (`ss://`): SIP002 userinfo, legacy whole-body base64, plugins
//!
//! ## Link rules (unified)
//!
//! - **Scheme prefix**: Case-insensitive (e.g. `VLESS://` is valid).
//! - **Length**: At most 2000 characters by default ([`Settings::max_link_length`]).
//! - **Port**: 1–65535; anything else is `MalformedLink`.
//! - **Query string**: Parsed as `application/x-www-form-urlencoded`; names are case-sensitive.
//! - **Fragment (`#`)**: Percent-decoded into the display name; undecodable text is kept as is.
//!
//! ## Targets
//!
//! | Format | Fragment | Levels |
//! |--------|----------|--------|
//! | `clash` | YAML mapping | basic, standard, advanced |
//! | `surge` | profile line | basic, standard |
//! | `quantumult` | profile line | basic, standard |
//! | `singbox` | JSON outbound | basic, standard, advanced |
//!
//! ## Example
//!
//! ```rust
//! use vpn_link_convert::{Converter, Format, LinkInput, Settings};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let converter = Converter::new(Settings::default())?;
//! let conversion = converter.convert(
//!     LinkInput::Delimited("trojan://secret@example.com:443#Home".to_string()),
//!     Format::Clash,
//!     None,
//! )?;
//! assert_eq!(conversion.proxy_count, 1);
//! assert!(conversion.document.contains("example.com"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod batch;
pub mod config;
mod constants;
pub mod convert;
pub mod defaults;
mod error;
pub mod format;
pub mod raw;
pub mod record;
mod shadowsocks;
pub mod template;
mod trojan;
mod uri;
mod vless;
mod vmess;

#[cfg(test)]
mod protocols_comprehensive;

pub use batch::{Batch, BatchEntry, BatchProcessor, split_links};
pub use config::Settings;
pub use constants::level;
pub use convert::{Conversion, Converter, LinkInput};
pub use error::{ConvertError, Result};
pub use format::{Format, Fragment};
pub use raw::RawListing;
pub use record::{ProxyRecord, Scheme};
pub use shadowsocks::Shadowsocks;
pub use template::TemplateRenderer;
pub use trojan::Trojan;
pub use vless::VLess;
pub use vmess::VMess;

use constants::limits;

/// Parser for one link scheme
///
/// Implementors only provide [`LinkParser::parse_body`]; length checks and
/// scheme stripping are shared.
pub trait LinkParser {
    /// Scheme prefix, lowercase with `://`
    const PREFIX: &'static str;

    /// Parses a full link.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for empty or oversized text, `UnsupportedScheme` when the
    /// prefix does not match, otherwise the scheme's own parse errors.
    ///
    /// # Example
    ///
    /// ```rust
    /// use vpn_link_convert::{LinkParser, Trojan};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let record = Trojan::parse("trojan://p%40ss@example.com:443")?;
    /// assert_eq!(record.identity, "p@ss");
    /// # Ok(())
    /// # }
    /// ```
    fn parse(link: &str) -> Result<ProxyRecord> {
        let link = uri::check_input(link, limits::MAX_LINK_LENGTH)?;
        Self::parse_checked(link)
    }

    /// Parses a link that already passed the input checks.
    fn parse_checked(link: &str) -> Result<ProxyRecord> {
        let body = uri::strip_scheme(link, Self::PREFIX)?;
        Self::parse_body(body)
    }

    /// Parses the text after the scheme prefix.
    fn parse_body(link_body: &str) -> Result<ProxyRecord>;
}

/// Parses any supported link, dispatching on its scheme prefix.
///
/// # Errors
///
/// `UnsupportedScheme` for an unknown prefix, `InvalidInput` for empty or
/// oversized text, otherwise the scheme parser's error.
///
/// # Example
///
/// ```rust
/// use vpn_link_convert::{Scheme, parse_link};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let record = parse_link("ss://YWVzLTI1Ni1nY206cGFzcw@1.2.3.4:8388#Tokyo")?;
/// assert_eq!(record.scheme(), Scheme::Shadowsocks);
/// assert_eq!(record.display_name, "Tokyo");
/// # Ok(())
/// # }
/// ```
pub fn parse_link(link: &str) -> Result<ProxyRecord> {
    parse_link_with_limit(link, limits::MAX_LINK_LENGTH)
}

/// [`parse_link`] with a custom maximum link length.
pub fn parse_link_with_limit(link: &str, max_len: usize) -> Result<ProxyRecord> {
    let link = uri::check_input(link, max_len)?;
    match uri::detect_scheme(link)? {
        Scheme::Vless => VLess::parse_checked(link),
        Scheme::Vmess => VMess::parse_checked(link),
        Scheme::Trojan => Trojan::parse_checked(link),
        Scheme::Shadowsocks => Shadowsocks::parse_checked(link),
    }
}
