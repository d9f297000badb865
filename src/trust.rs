use anyhow::{Context, Result, anyhow};
use ipnet::IpNet;
use std::net::IpAddr;

/// An ordered list of trusted subnets, built once at configuration time
/// and read-only afterwards.
///
/// Order does not affect the answer, only how early a lookup can exit.
#[derive(Debug, Clone, Default)]
pub struct TrustSet {
    subnets: Vec<IpNet>,
}

impl TrustSet {
    /// Builds a trust set from CIDR literals. A bare IP address (no prefix
    /// length) is accepted as a single-address subnet. Anything else is a
    /// fatal configuration error.
    pub fn from_entries<S: AsRef<str>>(entries: &[S]) -> Result<Self> {
        let mut subnets = Vec::with_capacity(entries.len());
        for entry in entries {
            subnets.push(parse_subnet(entry.as_ref())?);
        }
        Ok(Self { subnets })
    }

    /// Checks whether `addr` falls within any trusted subnet.
    /// A string that does not parse as an IP address is simply not trusted.
    #[must_use]
    pub fn contains(&self, addr: &str) -> bool {
        addr.parse::<IpAddr>()
            .is_ok_and(|ip| self.contains_ip(ip))
    }

    #[must_use]
    pub fn contains_ip(&self, ip: IpAddr) -> bool {
        self.subnets.iter().any(|net| net.contains(&ip))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.subnets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subnets.is_empty()
    }
}

fn parse_subnet(entry: &str) -> Result<IpNet> {
    if let Ok(net) = entry.parse::<IpNet>() {
        return Ok(net);
    }
    let ip = entry
        .parse::<IpAddr>()
        .map_err(|_| anyhow!("Invalid IP address or CIDR in trust list: {entry}"))?;
    IpNet::new(ip, if ip.is_ipv4() { 32 } else { 128 })
        .with_context(|| format!("Failed to build single-address subnet for {entry}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trust_set(entries: &[&str]) -> TrustSet {
        TrustSet::from_entries(entries).unwrap()
    }

    #[test]
    fn contains_address_inside_subnet() {
        let trust = trust_set(&["10.0.0.0/8", "192.0.2.0/24"]);
        assert!(trust.contains("10.1.2.3"));
        assert!(trust.contains("192.0.2.200"));
        assert!(!trust.contains("172.16.0.1"));
    }

    #[test]
    fn supports_ipv6_subnets() {
        let trust = trust_set(&["2001:db8::/32"]);
        assert!(trust.contains("2001:db8::1"));
        assert!(!trust.contains("2001:db9::1"));
        assert!(!trust.contains("203.0.113.9"));
    }

    #[test]
    fn bare_ip_entry_matches_only_itself() {
        let trust = trust_set(&["203.0.113.5", "::1"]);
        assert!(trust.contains("203.0.113.5"));
        assert!(trust.contains("::1"));
        assert!(!trust.contains("203.0.113.6"));
    }

    #[test]
    fn malformed_address_is_never_trusted() {
        let trust = trust_set(&["0.0.0.0/0", "::/0"]);
        assert!(!trust.contains(""));
        assert!(!trust.contains("not-an-ip"));
        assert!(!trust.contains("10.0.0.1:8080"));
    }

    #[test]
    fn empty_set_trusts_nothing() {
        let trust = TrustSet::default();
        assert!(trust.is_empty());
        assert!(!trust.contains("127.0.0.1"));
    }

    #[test]
    fn malformed_entry_is_a_config_error() {
        assert!(TrustSet::from_entries(&["10.0.0.0/8", "bogus/99"]).is_err());
        assert!(TrustSet::from_entries(&["cloudflare"]).is_err());
    }
}
