//! Client ip extraction.

use std::net::SocketAddr;

pub const REAL_IP_HEADER: &str = "x-real-ip";
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Request metadata the preprocessor needs, detached from the HTTP stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    pub real_ip: Option<String>,
    pub forwarded_for: Option<String>,
    pub remote_addr: Option<SocketAddr>
}

impl RequestMeta {
    /// Builds metadata from header lookups (names are lower-case) and the peer address.
    pub fn from_lookup<'a>(
        header: impl Fn(&str) -> Option<&'a str>,
        remote_addr: Option<SocketAddr>
    ) -> Self {
        Self {
            real_ip: header(REAL_IP_HEADER).map(str::to_string),
            forwarded_for: header(FORWARDED_FOR_HEADER).map(str::to_string),
            remote_addr
        }
    }
}

/// Picks the client ip: `X-Real-IP`, then the first `X-Forwarded-For` hop,
/// then the peer address. Returns an empty string when none is known.
pub fn extract_ip(request: &RequestMeta) -> String {
    if let Some(ip) = request.real_ip.as_deref().map(str::trim).filter(|ip| !ip.is_empty()) {
        return ip.to_string();
    }

    if let Some(ip) = request
        .forwarded_for
        .as_deref()
        .and_then(|hops| hops.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return ip.to_string();
    }

    request
        .remote_addr
        .map(|addr| addr.ip().to_string())
        .unwrap_or_default()
}
