use std::net::{Ipv4Addr, Ipv6Addr};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use url::{Host, Url};
use validator::ValidateEmail;

use super::config::SanitizationConfig;

/// Largest absolute value accepted for a position/rotation/scale component
pub const MAX_COORDINATE: f64 = 1_000_000.0;

/// Longest document identifier accepted in paths and bodies
pub const MAX_DOCUMENT_ID_LENGTH: usize = 128;

/// Host suffixes that only resolve inside private networks
const INTERNAL_SUFFIXES: &[&str] = &[".local", ".internal", ".localhost"];

/// Digits with an optional leading `+`, separators already removed
static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[1-9][0-9]{6,14}$").expect("Invalid regex pattern for phones"));

/// Input validation utilities
pub struct Validator;

impl Validator {
    /// Allow-list gate for user-supplied URLs.
    ///
    /// Only `http`/`https` with a dotted host pass. In production, loopback,
    /// private, link-local and `.local`/`.internal` hosts are refused.
    pub fn is_safe_url(candidate: &str, config: &SanitizationConfig) -> bool {
        if candidate.is_empty() || candidate.len() > config.max_url_length {
            return false;
        }

        let Ok(url) = Url::parse(candidate) else {
            return false;
        };

        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }

        let Some(host) = url.host() else {
            return false;
        };

        let has_dot = url.host_str().is_some_and(|h| h.contains('.'));
        if !has_dot {
            return false;
        }

        !(config.production && Self::is_internal_host(&host))
    }

    fn is_internal_host(host: &Host<&str>) -> bool {
        match host {
            Host::Domain(name) => {
                let name = name.trim_end_matches('.').to_ascii_lowercase();
                name == "localhost" || INTERNAL_SUFFIXES.iter().any(|s| name.ends_with(s))
            }
            Host::Ipv4(ip) => Self::is_internal_ipv4(ip),
            Host::Ipv6(ip) => Self::is_internal_ipv6(ip),
        }
    }

    fn is_internal_ipv4(ip: &Ipv4Addr) -> bool {
        ip.is_loopback()
            || ip.is_private()
            || ip.is_link_local()
            || ip.is_unspecified()
            || ip.is_broadcast()
            || ip.octets()[0] == 0
    }

    fn is_internal_ipv6(ip: &Ipv6Addr) -> bool {
        let first = ip.segments()[0];
        ip.is_loopback()
            || ip.is_unspecified()
            || (first & 0xfe00) == 0xfc00
            || (first & 0xffc0) == 0xfe80
            || ip
                .to_ipv4_mapped()
                .is_some_and(|v4| Self::is_internal_ipv4(&v4))
    }

    pub fn is_valid_email(input: &str) -> bool {
        input.len() <= 254 && input.validate_email()
    }

    /// Mobile number check; spaces, dashes, dots and parentheses are ignored
    pub fn is_valid_phone(input: &str) -> bool {
        let compact: String = input
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
            .collect();
        PHONE_REGEX.is_match(&compact)
    }

    /// Finite number with absolute value within [`MAX_COORDINATE`]
    pub fn is_bounded_coordinate(value: &Value) -> bool {
        value
            .as_f64()
            .is_some_and(|v| v.is_finite() && v.abs() <= MAX_COORDINATE)
    }

    /// Document ids are opaque but may not address another collection
    pub fn validate_document_id(input: &str, field_name: &str) -> Result<(), String> {
        if input.trim().is_empty() {
            return Err(format!("{} is required", field_name));
        }

        if input.len() > MAX_DOCUMENT_ID_LENGTH {
            return Err(format!(
                "{} is too long (max {} characters)",
                field_name, MAX_DOCUMENT_ID_LENGTH
            ));
        }

        if input.contains('/') || input == "." || input == ".." {
            return Err(format!("{} contains invalid characters", field_name));
        }

        Ok(())
    }
}
