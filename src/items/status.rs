//! Item lifecycle status and its text codec.
//!
//! The status is persisted as one of three exact labels and travels over the
//! wire as the same label in a JSON string. Decoding is strict: any other
//! string is rejected rather than mapped to a default.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DatabaseError, StatusError};

/// Lifecycle status of a to-do item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ItemStatus {
    #[default]
    Doing,
    Done,
    /// Logical-delete marker. Rows keep this status forever.
    Deleted,
}

/// Labels indexed by ordinal.
const ALL_STATUSES: [&str; 3] = ["Doing", "Done", "Deleted"];

impl ItemStatus {
    /// Ordinal of this status (`Doing` = 0, `Done` = 1, `Deleted` = 2).
    pub fn ordinal(self) -> usize {
        match self {
            Self::Doing => 0,
            Self::Done => 1,
            Self::Deleted => 2,
        }
    }

    pub fn from_ordinal(ordinal: usize) -> Option<Self> {
        match ordinal {
            0 => Some(Self::Doing),
            1 => Some(Self::Done),
            2 => Some(Self::Deleted),
            _ => None,
        }
    }

    /// Canonical label, as stored and as sent in JSON.
    pub fn label(self) -> &'static str {
        ALL_STATUSES[self.ordinal()]
    }

    /// Exact, case-sensitive match against the three labels.
    pub fn parse(label: &str) -> Result<Self, StatusError> {
        ALL_STATUSES
            .iter()
            .position(|candidate| *candidate == label)
            .and_then(Self::from_ordinal)
            .ok_or_else(|| StatusError::InvalidStatus(label.to_string()))
    }

    /// Decode a status column value.
    ///
    /// Text is parsed as is; blobs are read as UTF-8 first. Anything else, or a
    /// label outside the closed set, is a decode failure.
    pub fn from_sql(value: libsql::Value) -> Result<Self, DatabaseError> {
        let text = match value {
            libsql::Value::Text(text) => text,
            libsql::Value::Blob(bytes) => String::from_utf8(bytes)
                .map_err(|e| DatabaseError::Decode(format!("status is not UTF-8: {e}")))?,
            other => return Err(DatabaseError::Decode(format!("status: {other:?}"))),
        };
        Self::parse(&text).map_err(|_| DatabaseError::Decode(format!("status: {text}")))
    }

    /// Encode for a status column.
    pub fn to_sql(self) -> libsql::Value {
        libsql::Value::Text(self.label().to_string())
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ItemStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ItemStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ItemStatus {
    /// Accepts a JSON string; literal quote characters inside it are dropped
    /// before the exact label match.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let stripped = raw.replace('"', "");
        Self::parse(&stripped).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_parse_roundtrip_for_every_ordinal() {
        for n in 0..3 {
            let status = ItemStatus::from_ordinal(n).unwrap();
            assert_eq!(ItemStatus::parse(status.label()).unwrap().ordinal(), n);
        }
        assert!(ItemStatus::from_ordinal(3).is_none());
    }

    #[test]
    fn parse_known_labels() {
        assert_eq!(ItemStatus::parse("Doing").unwrap(), ItemStatus::Doing);
        assert_eq!(ItemStatus::parse("Done").unwrap(), ItemStatus::Done);
        assert_eq!(ItemStatus::parse("Deleted").unwrap(), ItemStatus::Deleted);
    }

    #[test]
    fn parse_is_exact() {
        assert_eq!(
            ItemStatus::parse("bogus"),
            Err(StatusError::InvalidStatus("bogus".into()))
        );
        assert!(ItemStatus::parse("done").is_err());
        assert!(ItemStatus::parse(" Done").is_err());
        assert!(ItemStatus::parse("").is_err());
    }

    #[test]
    fn json_encodes_quoted_label() {
        assert_eq!(serde_json::to_string(&ItemStatus::Done).unwrap(), "\"Done\"");
        assert_eq!(
            serde_json::to_string(&ItemStatus::Deleted).unwrap(),
            "\"Deleted\""
        );
    }

    #[test]
    fn json_decode_strips_embedded_quotes() {
        let parsed: ItemStatus = serde_json::from_str("\"Done\"").unwrap();
        assert_eq!(parsed, ItemStatus::Done);

        let parsed: ItemStatus = serde_json::from_str(r#""\"Doing\"""#).unwrap();
        assert_eq!(parsed, ItemStatus::Doing);
    }

    #[test]
    fn json_decode_rejects_unknown_and_non_strings() {
        let err = serde_json::from_str::<ItemStatus>("\"Archived\"").unwrap_err();
        assert!(err.to_string().contains("invalid status string"));
        assert!(serde_json::from_str::<ItemStatus>("1").is_err());
    }

    #[test]
    fn sql_decode_text_and_blob() {
        assert_eq!(
            ItemStatus::from_sql(libsql::Value::Text("Done".into())).unwrap(),
            ItemStatus::Done
        );
        assert_eq!(
            ItemStatus::from_sql(libsql::Value::Blob(b"Deleted".to_vec())).unwrap(),
            ItemStatus::Deleted
        );
    }

    #[test]
    fn sql_decode_failures_are_not_defaulted() {
        let err = ItemStatus::from_sql(libsql::Value::Text("Pending".into())).unwrap_err();
        assert!(matches!(err, DatabaseError::Decode(_)));
        assert!(ItemStatus::from_sql(libsql::Value::Blob(vec![0xff, 0xfe])).is_err());
        assert!(ItemStatus::from_sql(libsql::Value::Null).is_err());
        assert!(ItemStatus::from_sql(libsql::Value::Integer(1)).is_err());
    }

    #[test]
    fn sql_encode_is_label() {
        match ItemStatus::Doing.to_sql() {
            libsql::Value::Text(text) => assert_eq!(text, "Doing"),
            other => panic!("expected text, got {other:?}"),
        }
    }
}
