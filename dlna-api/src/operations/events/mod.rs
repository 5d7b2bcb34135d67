//! UPnP event subscription operations
//!
//! These operations drive the GENA protocol against a service's event URL.
//! SIDs are stored normalized (no `uuid:` prefix, no brackets) and
//! re-prefixed with `uuid:` on the wire.

pub mod renew;
pub mod subscribe;
pub mod unsubscribe;

pub use renew::{RenewOperation, RenewRequest, RenewResponse};
pub use subscribe::{SubscribeOperation, SubscribeRequest, SubscribeResponse};
pub use unsubscribe::{UnsubscribeOperation, UnsubscribeRequest, UnsubscribeResponse};

/// Lease length assumed when the renderer omits or garbles `TIMEOUT`
pub const DEFAULT_TIMEOUT_SECONDS: u32 = 300;

/// Strip bracket and `uuid:` decoration from a raw `SID` header value
pub fn normalize_sid(raw: &str) -> String {
    let trimmed = raw.trim().trim_start_matches('[').trim_end_matches(']').trim();
    match trimmed.get(..5) {
        Some(prefix) if prefix.eq_ignore_ascii_case("uuid:") => trimmed[5..].to_string(),
        _ => trimmed.to_string(),
    }
}

/// The `SID` header value sent for a normalized sid
pub fn wire_sid(sid: &str) -> String {
    format!("uuid:{}", normalize_sid(sid))
}

/// Parse a `TIMEOUT: Second-N` header, falling back to the default lease
///
/// `infinite`, a missing header and anything unparseable all yield
/// [`DEFAULT_TIMEOUT_SECONDS`].
pub fn parse_timeout(header: Option<&str>) -> u32 {
    header
        .map(str::trim)
        .and_then(|value| {
            let prefix = value.get(..7)?;
            if prefix.eq_ignore_ascii_case("Second-") {
                value[7..].trim().parse::<u32>().ok()
            } else {
                None
            }
        })
        .filter(|seconds| *seconds > 0)
        .unwrap_or(DEFAULT_TIMEOUT_SECONDS)
}
