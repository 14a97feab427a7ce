use axum::http::HeaderMap;
use std::net::{IpAddr, SocketAddr};

pub const FORWARDED_FOR: &str = "x-forwarded-for";

// Key shared by every caller whose address can't be determined
pub const UNIDENTIFIED_CLIENT: &str = "unidentified";

/// Resolves the address a request should be rate limited under.
///
/// The first hop of `X-Forwarded-For` wins when it is a valid IP, otherwise
/// the peer address of the connection is used.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<IpAddr> {
    let forwarded = headers
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok());

    forwarded.or_else(|| peer.map(|addr| addr.ip()))
}

pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    match client_ip(headers, peer) {
        Some(ip) => ip.to_string(),
        None => UNIDENTIFIED_CLIENT.to_string(),
    }
}
