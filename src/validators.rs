//! Input validation for command-line query parameters
//!
//! The listing commands take at most one search parameter. Each one is
//! checked here before any inventory is loaded, so a typo fails fast with a
//! readable message.

use crate::core::address::is_valid_cidr;
use crate::filters::Query;
use std::net::Ipv4Addr;

/// Maximum accepted length of an attribute name or search text
pub const MAX_QUERY_LEN: usize = 256;

/// Validates a single port number.
///
/// # Errors
///
/// Returns `Err` if port is 0 (reserved).
pub fn validate_port(port: u16) -> Result<u16, String> {
    if port == 0 {
        Err("Invalid port number. Port must be an integer between 1 and 65535".to_string())
    } else {
        Ok(port)
    }
}

/// Validates a dotted-quad IPv4 address.
///
/// # Examples
///
/// ```
/// use slcheck::validators::validate_ip;
///
/// assert!(validate_ip("10.0.0.1").is_ok());
/// assert!(validate_ip("10.0.0").is_err());
/// assert!(validate_ip("10.0.0.256").is_err());
/// ```
///
/// # Errors
///
/// Returns `Err` unless the input is four decimal octets between 0 and 255.
pub fn validate_ip(input: &str) -> Result<Ipv4Addr, String> {
    input.trim().parse::<Ipv4Addr>().map_err(|_| {
        "Invalid IP address. IP must be in the format xxx.xxx.xxx.xxx where xxx is a number \
         between 0 and 255"
            .to_string()
    })
}

/// Validates an address block in `a.b.c.d/len` form.
///
/// # Errors
///
/// Returns `Err` for anything but four octets (0-255) and a prefix length
/// between 0 and 32.
pub fn validate_cidr(input: &str) -> Result<String, String> {
    let cidr = input.trim();
    if is_valid_cidr(cidr) {
        Ok(cidr.to_string())
    } else {
        Err(format!(
            "Invalid CIDR '{cidr}'. Expected a.b.c.d/len with octets 0-255 and len 0-32"
        ))
    }
}

/// Validates the name of a JSON attribute to search in.
///
/// Names are the camelCase keys of the inventory (`description`,
/// `displayName`, ...), so only ASCII alphanumerics are accepted.
///
/// # Errors
///
/// Returns `Err` if the name is empty, too long or not alphanumeric.
pub fn validate_attribute_name(name: &str) -> Result<String, String> {
    if name.is_empty() {
        return Err("Attribute name cannot be empty".to_string());
    }
    if name.len() > MAX_QUERY_LEN {
        return Err(format!("Attribute name too long (max {MAX_QUERY_LEN} characters)"));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(format!("Attribute name '{name}' contains invalid characters"));
    }
    Ok(name.to_string())
}

/// Splits a `NAME=VALUE` attribute search into its parts.
///
/// The value may itself contain `=`; only the first one separates.
///
/// # Errors
///
/// Returns `Err` if there is no `=`, the name is invalid or the value is
/// empty or too long.
pub fn parse_attribute(input: &str) -> Result<(String, String), String> {
    let (name, value) = input
        .split_once('=')
        .ok_or_else(|| format!("Expected NAME=VALUE, got '{input}'"))?;

    let name = validate_attribute_name(name.trim())?;
    if value.is_empty() {
        return Err(format!("Search text for '{name}' cannot be empty"));
    }
    if value.len() > MAX_QUERY_LEN {
        return Err(format!("Search text too long (max {MAX_QUERY_LEN} characters)"));
    }
    Ok((name, value.to_string()))
}

/// Builds the query for a listing command from its optional parameters.
///
/// Returns `Ok(None)` when no parameter was given, which lists everything.
///
/// # Errors
///
/// Returns `Err` if more than one parameter is given or the given one is
/// invalid.
pub fn build_query(
    port: Option<u16>,
    ip: Option<&str>,
    attribute: Option<&str>,
) -> Result<Option<Query>, String> {
    let given = [port.is_some(), ip.is_some(), attribute.is_some()]
        .into_iter()
        .filter(|given| *given)
        .count();
    if given > 1 {
        return Err("Invalid arguments. Only one parameter is supported".to_string());
    }

    if let Some(port) = port {
        return validate_port(port).map(|p| Some(Query::Port(p)));
    }
    if let Some(ip) = ip {
        return validate_ip(ip).map(|ip| Some(Query::Ip(ip)));
    }
    if let Some(attribute) = attribute {
        let (name, needle) = parse_attribute(attribute)?;
        return Ok(Some(Query::Attribute { name, needle }));
    }
    Ok(None)
}

/// Checks if an address is in a reserved range and returns an informational
/// note.
///
/// This is informational only and never rejects input.
pub fn check_reserved_ip(ip: Ipv4Addr) -> Option<&'static str> {
    let octets = ip.octets();

    if ip.is_private() {
        return Some("Private range (RFC 1918)");
    }
    if ip.is_loopback() {
        return Some("Loopback range (127.x)");
    }
    if ip.is_link_local() {
        return Some("Link-local range (169.254.x.x)");
    }
    // Shared address space used by carrier-grade NAT
    if octets[0] == 100 && (64..=127).contains(&octets[1]) {
        return Some("Shared address space (RFC 6598)");
    }
    None
}
