use std::net::{IpAddr, SocketAddr};

/// The well-known port of plain DNS.
pub const DNS_PORT: u16 = 53;

/// Returns true if the host is already a textual IPv4 or IPv6 address,
/// which means no DNS lookup is required.
///
/// The check is strict: bracketed IPv6 (`[::1]`), ports and trailing dots
/// are not addresses.
#[inline]
pub fn is_address(host: &str) -> bool {
    host.parse::<IpAddr>().is_ok()
}

/// Parses a nameserver which is either a bare ip (`8.8.8.8`, `2606:4700::1111`)
/// or a socket address (`8.8.8.8:5353`, `[2606:4700::1111]:53`).
pub fn parse_nameserver(s: &str) -> Option<SocketAddr> {
    let s = s.trim();
    if let Ok(ipaddr) = s.parse::<IpAddr>() {
        return Some(SocketAddr::new(ipaddr, DNS_PORT));
    }
    s.parse::<SocketAddr>().ok()
}
