/// Splits a forwarded-address header value into its chain of hops.
///
/// Tokens are trimmed but otherwise untouched, and empty segments are kept:
/// they fail IP parsing downstream, which is the rejection path a malformed
/// chain should take rather than being silently skipped.
///
/// By convention the leftmost token is the address closest to the original
/// client and the rightmost is the most recent intermediary.
#[must_use]
pub fn parse_chain(header_value: &str) -> Vec<&str> {
    header_value.split(',').map(str::trim).collect()
}
