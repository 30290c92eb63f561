use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Status of a single channel as served by the proxy.
///
/// Offline records carry no other fields.  The category and viewer count use
/// the short wire names `game` and `viewers`; the long names are accepted
/// when decoding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StatusRecord {
    pub live: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        rename = "game",
        alias = "category",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,
    #[serde(
        default,
        rename = "viewers",
        alias = "viewerCount",
        skip_serializing_if = "Option::is_none"
    )]
    pub viewer_count: Option<u64>,
}

impl StatusRecord {
    pub fn offline() -> Self {
        Self::default()
    }

    /// A live record.  Missing upstream values are stored as empty/zero so
    /// every live record has all three fields.
    pub fn live(
        title: impl Into<String>,
        category: impl Into<String>,
        viewer_count: u64,
    ) -> Self {
        Self {
            live: true,
            title: Some(title.into()),
            category: Some(category.into()),
            viewer_count: Some(viewer_count),
        }
    }

    /// Case-insensitive category comparison.  An empty filter matches
    /// everything; a non-empty filter never matches a record without a
    /// category.
    pub fn category_matches(&self, filter: &str) -> bool {
        if filter.is_empty() {
            return true;
        }
        self.category
            .as_deref()
            .is_some_and(|c| c.to_lowercase() == filter.to_lowercase())
    }
}

/// Result of one status poll: exactly one record per requested identifier,
/// keyed by the caller's original casing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct StatusSnapshot(BTreeMap<String, StatusRecord>);

impl StatusSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, record: StatusRecord) {
        self.0.insert(id.into(), record);
    }

    pub fn get(&self, id: &str) -> Option<&StatusRecord> {
        self.0.get(id)
    }

    /// Unknown identifiers count as offline.
    pub fn is_live(&self, id: &str) -> bool {
        self.0.get(id).is_some_and(|r| r.live)
    }

    pub fn live_count(&self) -> usize {
        self.0.values().filter(|r| r.live).count()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &StatusRecord)> {
        self.0.iter()
    }
}

impl FromIterator<(String, StatusRecord)> for StatusSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, StatusRecord)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// JSON error body returned by the proxy for every non-200 response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status: None,
            details: None,
            message: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_record_serializes_bare() {
        let json = serde_json::to_string(&StatusRecord::offline()).unwrap();
        assert_eq!(json, r#"{"live":false}"#);
    }

    #[test]
    fn test_live_record_uses_wire_names() {
        let rec = StatusRecord::live("speedrun", "Minecraft", 1200);
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["game"], "Minecraft");
        assert_eq!(value["viewers"], 1200);
        assert_eq!(value["title"], "speedrun");
    }

    #[test]
    fn test_decode_accepts_long_names() {
        let rec: StatusRecord =
            serde_json::from_str(r#"{"live":true,"category":"Chess","viewerCount":3}"#).unwrap();
        assert_eq!(rec.category.as_deref(), Some("Chess"));
        assert_eq!(rec.viewer_count, Some(3));
    }

    #[test]
    fn test_category_matches_case_insensitively() {
        let rec = StatusRecord::live("", "Chess", 0);
        assert!(rec.category_matches("chess"));
        assert!(rec.category_matches(""));
        assert!(!rec.category_matches("music"));
        assert!(!StatusRecord::offline().category_matches("chess"));
    }

    #[test]
    fn test_snapshot_is_a_plain_json_object() {
        let snap: StatusSnapshot =
            serde_json::from_str(r#"{"A":{"live":true,"game":"Chess"},"B":{"live":false}}"#)
                .unwrap();
        assert!(snap.is_live("A"));
        assert!(!snap.is_live("B"));
        assert!(!snap.is_live("missing"));
        assert_eq!(snap.live_count(), 1);
    }
}
