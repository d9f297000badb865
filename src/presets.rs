use anyhow::{Result, bail};

/// Published edge ranges for Cloudflare, from <https://www.cloudflare.com/ips/>.
const CLOUDFLARE: &[&str] = &[
    "103.21.244.0/22",
    "103.22.200.0/22",
    "103.31.4.0/22",
    "104.16.0.0/12",
    "108.162.192.0/18",
    "131.0.72.0/22",
    "141.101.64.0/18",
    "162.158.0.0/15",
    "172.64.0.0/13",
    "173.245.48.0/20",
    "188.114.96.0/20",
    "190.93.240.0/20",
    "197.234.240.0/22",
    "198.41.128.0/17",
    "2400:cb00::/32",
    "2405:8100::/32",
    "2405:b500::/32",
    "2606:4700::/32",
    "2803:f800::/32",
    "2c0f:f248::/32",
    "2a06:98c0::/29",
];

/// Google Cloud HTTP load-balancer probe ranges,
/// from <https://cloud.google.com/compute/docs/load-balancing/http/#firewall_rules>.
const GCP: &[&str] = &["130.211.0.0/22", "35.191.0.0/16"];

/// Rackspace cloud load-balancer ranges, per region, from
/// <https://support.rackspace.com/how-to/using-cloud-load-balancers-with-rackconnect/>.
const RACKSPACE: &[&str] = &[
    // DFW
    "10.189.254.0/24",
    "10.189.252.0/24",
    "10.183.248.0/24",
    "10.187.186.0/24",
    "10.183.250.0/24",
    // IAD
    "10.187.191.0/24",
    "10.189.255.0/24",
    "10.187.186.0/24",
    "10.189.254.0/24",
    // ORD
    "10.183.253.0/24",
    "10.183.250.0/24",
    "10.189.246.0/24",
    "10.187.187.0/24",
    "10.187.186.0/24",
    "10.183.252.0/24",
    "10.189.245.0/24",
    "10.183.251.0/24",
    // LON
    "10.187.191.0/24",
    "10.190.254.0/24",
    "10.189.246.0/24",
    "10.190.255.0/24",
    "10.187.190.0/24",
    "10.189.247.0/24",
    // SYD
    "10.189.254.0/24",
    // HKG
    "10.189.254.0/24",
];

/// Looks up a named preset group of address ranges.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static [&'static str]> {
    match name {
        "cloudflare" => Some(CLOUDFLARE),
        "gcp" => Some(GCP),
        "rackspace" => Some(RACKSPACE),
        _ => None,
    }
}

/// Flattens a list of trust entries, recursively splicing in the contents of
/// any entry that names a preset group. Everything else passes through as a
/// literal for CIDR validation downstream.
///
/// Expansion happens once at configuration load, never per request.
pub fn expand<S: AsRef<str>>(entries: &[S]) -> Result<Vec<String>> {
    expand_with(&lookup, entries)
}

/// Expansion over an arbitrary preset table. Presets may reference other
/// presets; self-reference, direct or indirect, is a configuration error.
pub fn expand_with<S, F>(table: &F, entries: &[S]) -> Result<Vec<String>>
where
    S: AsRef<str>,
    F: Fn(&str) -> Option<&'static [&'static str]>,
{
    let mut out = Vec::new();
    let mut stack = Vec::new();
    for entry in entries {
        expand_entry(table, entry.as_ref(), &mut stack, &mut out)?;
    }
    Ok(out)
}

fn expand_entry<F>(
    table: &F,
    entry: &str,
    stack: &mut Vec<String>,
    out: &mut Vec<String>,
) -> Result<()>
where
    F: Fn(&str) -> Option<&'static [&'static str]>,
{
    let Some(members) = table(entry) else {
        out.push(entry.to_string());
        return Ok(());
    };
    if stack.iter().any(|seen| seen == entry) {
        let path = stack.join(" -> ");
        bail!("Preset '{entry}' references itself (via {path})");
    }
    stack.push(entry.to_string());
    for member in members {
        expand_entry(table, member, stack, out)?;
    }
    stack.pop();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_pass_through_in_order() {
        let out = expand(&["10.0.0.0/8", "192.0.2.1/32"]).unwrap();
        assert_eq!(out, vec!["10.0.0.0/8", "192.0.2.1/32"]);
    }

    #[test]
    fn preset_name_is_spliced_in_place() {
        let out = expand(&["10.0.0.0/8", "gcp", "192.0.2.1/32"]).unwrap();
        assert_eq!(
            out,
            vec!["10.0.0.0/8", "130.211.0.0/22", "35.191.0.0/16", "192.0.2.1/32"]
        );
    }

    #[test]
    fn known_presets_resolve() {
        assert_eq!(lookup("cloudflare").map(<[_]>::len), Some(21));
        assert_eq!(lookup("gcp").map(<[_]>::len), Some(2));
        assert!(lookup("aws").is_none());
    }

    #[test]
    fn repeated_preset_duplicates_harmlessly() {
        let out = expand(&["gcp", "gcp"]).unwrap();
        assert_eq!(out.len(), 4);
        assert_eq!(out[..2], out[2..]);
    }

    #[test]
    fn presets_can_reference_presets() {
        let table = |name: &str| -> Option<&'static [&'static str]> {
            match name {
                "edge" => Some(&["cdn", "10.0.0.0/8"]),
                "cdn" => Some(&["198.51.100.0/24"]),
                _ => None,
            }
        };
        let out = expand_with(&table, &["edge"]).unwrap();
        assert_eq!(out, vec!["198.51.100.0/24", "10.0.0.0/8"]);
    }

    #[test]
    fn indirect_self_reference_is_rejected() {
        let table = |name: &str| -> Option<&'static [&'static str]> {
            match name {
                "a" => Some(&["b"]),
                "b" => Some(&["a"]),
                _ => None,
            }
        };
        let err = expand_with(&table, &["a"]).unwrap_err();
        assert!(err.to_string().contains("references itself"));
    }
}
