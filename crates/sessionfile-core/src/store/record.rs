//! Persisted session record schema

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One client's session state, stored as `<session_dir>/<id>.json`.
///
/// The id is the file stem, not a field of the document. `visits` never
/// decreases over the life of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Number of invocations that have seen this session, starting at 1
    pub visits: u64,

    /// RFC 3339 UTC timestamp of record creation
    pub created: String,

    /// RFC 3339 UTC timestamp of the most recent visit
    pub last_visit: String,

    /// Unknown fields from foreign writers, preserved on read-modify-write
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

impl SessionRecord {
    /// Build the first record of a new session, stamped with the current time.
    pub fn fresh() -> Self {
        let now = now_rfc3339();
        Self {
            visits: 1,
            created: now.clone(),
            last_visit: now,
            unknown_fields: HashMap::new(),
        }
    }

    /// Register another visit: bump the counter and refresh `last_visit`.
    pub fn touch(&mut self) {
        self.visits += 1;
        self.last_visit = now_rfc3339();
    }
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_record_shape() {
        let record = SessionRecord::fresh();
        assert_eq!(record.visits, 1);
        assert_eq!(record.created, record.last_visit);
        assert!(record.unknown_fields.is_empty());
        // Stamp must parse back as RFC 3339
        chrono::DateTime::parse_from_rfc3339(&record.created).unwrap();
    }

    #[test]
    fn test_touch_increments_and_refreshes() {
        let mut record = SessionRecord::fresh();
        let created = record.created.clone();
        record.touch();
        record.touch();
        assert_eq!(record.visits, 3);
        assert_eq!(record.created, created);
    }

    #[test]
    fn test_roundtrip_preserves_unknown_fields() {
        let json = r#"{
            "visits": 7,
            "created": "2026-08-01T09:00:00+00:00",
            "last_visit": "2026-08-02T10:30:00+00:00",
            "theme": "dark",
            "flags": {"beta": true}
        }"#;

        let record: SessionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.visits, 7);
        assert_eq!(record.unknown_fields.len(), 2);

        let reencoded = serde_json::to_string(&record).unwrap();
        let reparsed: SessionRecord = serde_json::from_str(&reencoded).unwrap();
        assert_eq!(record, reparsed);
    }

    #[test]
    fn test_legacy_timestamp_strings_decode() {
        // Timestamps are opaque text; non-RFC-3339 stamps from older
        // writers must still decode.
        let json = r#"{"visits": 1, "created": "2024-05-01 12:00:00.000000", "last_visit": "2024-05-01 12:00:00.000000"}"#;
        let record: SessionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.visits, 1);
    }
}
