//! Trusted-proxy client address resolution.
//!
//! Answers one question for an HTTP pipeline: given the immediate peer
//! address and an optional forwarded-address header, which address should
//! downstream processing treat as the client? The peer must be an
//! authorized proxy, the claimed chain is bounded and walked from nearest
//! to farthest hop, and the first entry outside the configured trust list
//! marks the boundary. Strict mode aborts on any trust failure; permissive
//! mode leaves the request untouched instead.

pub mod chain;
pub mod config;
pub mod handler;
pub mod presets;
pub mod resolve;
pub mod trust;

// Re-export commonly used types and functions
pub use chain::parse_chain;
pub use config::{Config, Settings, load_config};
pub use handler::resolve_request;
pub use resolve::{RealIpError, Resolution, join_host_port, resolve};
pub use trust::TrustSet;
