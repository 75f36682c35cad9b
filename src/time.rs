use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch. Used for the `donotcache` and `_`
/// cache-busting query parameters.
pub(crate) fn timestamp_millis() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(n) => n.as_millis() as u64,
        // should never occur
        Err(_) => 0,
    }
}
