use http::HeaderMap;
use std::net::SocketAddr;
use tracing::warn;

use crate::config::Config;
use crate::resolve::{RealIpError, Resolution, resolve};

/// Resolves the effective remote address for one request.
///
/// Reads the configured forwarded-address header from `headers`, runs the
/// trust-boundary walk, and returns the address the rest of the pipeline
/// should treat as the client: the rewritten `address:port` on a
/// resolution, or the original peer address untouched on a pass-through.
/// An `Err` means the host should abort the request before any downstream
/// processing.
///
/// This is a pure function of its inputs; applying the returned address to
/// the request object is the caller's job.
pub fn resolve_request(
    config: &Config,
    peer: SocketAddr,
    headers: &HeaderMap,
) -> Result<String, RealIpError> {
    let header_value = match headers.get(config.header.as_str()) {
        Some(value) => match value.to_str() {
            Ok(v) => Some(v),
            Err(_) => {
                // A non-UTF-8 chain can never name a valid hop; treat it
                // like an absent header rather than guessing at bytes.
                warn!(header = %config.header, "Ignoring forwarded header with non-UTF-8 value");
                None
            }
        },
        None => None,
    };

    match resolve(config, &peer.ip().to_string(), peer.port(), header_value)? {
        Resolution::Resolved(addr) => Ok(addr),
        Resolution::PassThrough => Ok(peer.to_string()),
    }
}
