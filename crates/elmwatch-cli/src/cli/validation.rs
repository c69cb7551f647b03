use std::net::IpAddr;

/// Parse the `--host` argument.
///
/// Accepts IPv4/IPv6 literals plus `localhost` as a shorthand for 127.0.0.1.
///
/// # Errors
///
/// Returns an error message if the value is not an IP address.
pub fn parse_host(s: &str) -> Result<IpAddr, String> {
    if s.eq_ignore_ascii_case("localhost") {
        return Ok(IpAddr::from([127, 0, 0, 1]));
    }

    s.parse::<IpAddr>()
        .map_err(|_| format!("Host must be an IP address such as 127.0.0.1 or 0.0.0.0: '{}'", s))
}
