use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

/// Mint a fresh entity id. Every id in the document space comes from here.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current UTC time as an ISO-8601 string with millisecond precision.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(new_id(), new_id());
    }

    #[test]
    fn test_timestamp_shape() {
        let ts = now_iso();
        assert!(ts.ends_with('Z'));
        assert!(ts.contains('T'));
    }
}
