//! Shared constants for link schemes, limits and error messages.
//!
//! Centralizes magic strings so parsers, serializers and the renderer agree
//! on the same spelling.

/// Link URI scheme prefixes (lowercase, with `://`).
pub mod scheme {
    /// VMess: `vmess://`
    pub const VMESS: &str = "vmess://";
    /// VLESS: `vless://`
    pub const VLESS: &str = "vless://";
    /// Shadowsocks: `ss://`
    pub const SHADOWSOCKS: &str = "ss://";
    /// Trojan: `trojan://`
    pub const TROJAN: &str = "trojan://";
}

/// Input limits.
pub mod limits {
    /// Maximum accepted link length, in characters.
    pub const MAX_LINK_LENGTH: usize = 2000;
}

/// Level names shared by the template catalog and the renderer.
pub mod level {
    /// Baseline level every format ships; target of level fallback.
    pub const BASIC: &str = "basic";
    /// Level used when the caller does not ask for one.
    pub const STANDARD: &str = "standard";
    /// Extended level with extra groups and rules.
    pub const ADVANCED: &str = "advanced";
}

/// Surge module that implements Shadowsocks plugins for the `custom` proxy type.
pub const SURGE_SS_MODULE: &str =
    "https://raw.githubusercontent.com/ConnersHua/SSEncrypt/master/SSEncrypt.module";

/// Common error message fragments for link parsing.
pub mod error_msg {
    /// Missing `@` in userinfo@host part.
    pub const MISSING_AT: &str = "Missing '@' in main part";
    /// Missing `:` in host:port part.
    pub const MISSING_COLON_HOST_PORT: &str = "Missing ':' in host:port";
    /// Invalid port value.
    pub const INVALID_PORT: &str = "Invalid port";
    /// Empty host part.
    pub const MISSING_HOST: &str = "Missing host";
    /// Empty credential part (UUID or password).
    pub const MISSING_CREDENTIAL: &str = "Missing credential";
    /// Missing `:` between method and password.
    pub const MISSING_COLON_METHOD: &str = "Missing ':' in method:password";
    /// Empty link text.
    pub const EMPTY_INPUT: &str = "Link is empty";
    /// Link over the length limit (placeholder: use with format!).
    pub const TOO_LONG: &str = "Link exceeds maximum length of";
}
