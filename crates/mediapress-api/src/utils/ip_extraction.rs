//! Client IP extraction.
//!
//! Derives the rate-limit identity from forwarding headers: the first
//! `x-forwarded-for` entry, then `x-real-ip`, then the transport peer
//! address. Header values that do not parse as IP addresses are ignored so
//! garbage input cannot mint arbitrary identities.

use axum::http::HeaderMap;
use std::net::IpAddr;

/// Extract the client IP for use as a rate-limit partition key.
///
/// Returns "unknown" when no source yields a usable address.
pub fn extract_client_ip(headers: &HeaderMap, socket_addr: Option<&std::net::SocketAddr>) -> String {
    if let Some(forwarded_for) = headers.get("x-forwarded-for").and_then(|h| h.to_str().ok()) {
        if let Some(first) = forwarded_for
            .split(',')
            .map(str::trim)
            .find(|s| !s.is_empty())
        {
            if is_valid_ip(first) {
                return first.to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip").and_then(|h| h.to_str().ok()) {
        let trimmed = real_ip.trim();
        if is_valid_ip(trimmed) {
            return trimmed.to_string();
        }
    }

    if let Some(addr) = socket_addr {
        return addr.ip().to_string();
    }

    "unknown".to_string()
}

fn is_valid_ip(ip_str: &str) -> bool {
    ip_str.parse::<IpAddr>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(name: &'static str, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_first_forwarded_for_entry_wins() {
        let headers = headers_with("x-forwarded-for", "192.168.1.1, 10.0.0.1, 10.0.0.2");
        assert_eq!(extract_client_ip(&headers, None), "192.168.1.1");
    }

    #[test]
    fn test_forwarded_for_single_entry() {
        let headers = headers_with("x-forwarded-for", "203.0.113.7");
        assert_eq!(extract_client_ip(&headers, None), "203.0.113.7");
    }

    #[test]
    fn test_invalid_forwarded_for_falls_through_to_real_ip() {
        let mut headers = headers_with("x-forwarded-for", "not.an.ip.address");
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));
        assert_eq!(extract_client_ip(&headers, None), "198.51.100.4");
    }

    #[test]
    fn test_real_ip_used_without_forwarded_for() {
        let headers = headers_with("x-real-ip", "::1");
        assert_eq!(extract_client_ip(&headers, None), "::1");
    }

    #[test]
    fn test_fallback_to_socket_address() {
        let headers = HeaderMap::new();
        let socket = std::net::SocketAddr::from(([127, 0, 0, 1], 8080));
        assert_eq!(extract_client_ip(&headers, Some(&socket)), "127.0.0.1");
    }

    #[test]
    fn test_fallback_to_unknown() {
        let headers = HeaderMap::new();
        assert_eq!(extract_client_ip(&headers, None), "unknown");
    }

    #[test]
    fn test_is_valid_ip() {
        assert!(is_valid_ip("192.168.1.1"));
        assert!(is_valid_ip("::1"));
        assert!(is_valid_ip("2001:0db8:85a3:0000:0000:8a2e:0370:7334"));
        assert!(!is_valid_ip("not.an.ip"));
        assert!(!is_valid_ip(""));
        assert!(!is_valid_ip("999.999.999.999"));
    }
}
