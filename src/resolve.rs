use std::net::IpAddr;

use thiserror::Error;
use tracing::{debug, warn};

use crate::chain::parse_chain;
use crate::config::Config;

/// Why a request was aborted instead of resolved or passed through.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RealIpError {
    /// The directly-connected peer is not a configured proxy (or its
    /// address did not parse). Aborts only in strict mode.
    #[error("untrusted or unparseable remote peer: {0}")]
    UntrustedPeer(String),

    /// A non-leftmost chain entry is not a configured proxy (or did not
    /// parse). Aborts only in strict mode.
    #[error("unrecognized proxy address: {0}")]
    UntrustedHop(String),

    /// The forwarded chain is longer than `maxhops` allows. Always aborts,
    /// in both modes: an oversized chain is treated as abuse.
    #[error("too many forwarded addresses: {hops} exceeds limit of {limit}")]
    TooManyHops { hops: usize, limit: i32 },
}

/// The accepted outcomes of a resolution. Rejection is the `Err` arm of
/// [`resolve`]; it never partially applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The request's effective remote address should become this
    /// `address:port` value (the original connection's port, reattached).
    Resolved(String),
    /// Leave the remote address exactly as it was. Downstream cannot tell
    /// the request apart from one that never passed through this component.
    PassThrough,
}

/// Walks the forwarded-address chain from the connection peer back towards
/// the original client and finds the trust boundary.
///
/// `peer_host` is the immediate peer's address without a port; `peer_port`
/// is reattached to whatever address is resolved. `header_value` is the raw
/// forwarded-address header, or `None` when the request did not carry one.
pub fn resolve(
    config: &Config,
    peer_host: &str,
    peer_port: u16,
    header_value: Option<&str>,
) -> Result<Resolution, RealIpError> {
    // An untrusted (or unreadable) peer is not eligible for rewriting at
    // all; the header is never consulted.
    if !config.trust.contains(peer_host) {
        debug!(peer = %peer_host, "Peer is not a trusted proxy");
        return untrusted(config, RealIpError::UntrustedPeer(peer_host.to_string()));
    }

    let Some(header_value) = header_value.filter(|v| !v.is_empty()) else {
        return Ok(Resolution::PassThrough);
    };

    let hops = parse_chain(header_value);

    if config.max_hops >= 0 && hops.len() > config.max_hops as usize {
        warn!(
            hops = hops.len(),
            limit = config.max_hops,
            "Rejecting oversized forwarded chain"
        );
        return Err(RealIpError::TooManyHops {
            hops: hops.len(),
            limit: config.max_hops,
        });
    }

    // The nearest hop must at least be a well-formed address before any
    // rewriting is considered.
    let nearest = hops[hops.len() - 1];
    if nearest.parse::<IpAddr>().is_err() {
        debug!(entry = %nearest, "Nearest forwarded address does not parse");
        return untrusted(config, RealIpError::UntrustedHop(nearest.to_string()));
    }

    // Walk from the nearest hop back towards the original client. Every
    // intermediary must be a trusted proxy; the leftmost entry is the
    // client itself and is accepted unconditionally.
    for (i, hop) in hops.iter().enumerate().rev() {
        if i > 0 && !config.trust.contains(hop) {
            debug!(entry = %hop, index = i, "Trust boundary hit inside forwarded chain");
            return untrusted(config, RealIpError::UntrustedHop((*hop).to_string()));
        }
    }

    let resolved = join_host_port(hops[0], peer_port);
    debug!(client = %resolved, "Resolved client address from forwarded chain");
    Ok(Resolution::Resolved(resolved))
}

/// Strict mode turns a trust failure into an abort; permissive mode leaves
/// the request untouched for downstream handling. No partial rewrite ever
/// happens on the permissive path.
fn untrusted(config: &Config, err: RealIpError) -> Result<Resolution, RealIpError> {
    if config.strict {
        Err(err)
    } else {
        Ok(Resolution::PassThrough)
    }
}

/// Joins an address and port back into `host:port` form, bracketing IPv6
/// addresses the way socket-address formatting expects.
#[must_use]
pub fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}
