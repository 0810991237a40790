use std::convert::From;
use std::num::ParseIntError;
use std::str::FromStr;
use time::OffsetDateTime;

/// Identifier of a catalog item (movie or show) as the backend knows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ItemId(i64);

impl ItemId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn inner(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ItemId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl FromStr for ItemId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// The signed in user as returned by the backend.
///
/// The embedded watchlist is only as fresh as the response it came from. The session keeps the
/// authoritative in-memory copy and writes it back here when it persists a snapshot.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub watchlist: Vec<ItemId>,
    #[serde(with = "timestamp")]
    pub created_at: OffsetDateTime,
}

impl Identity {
    pub fn with_watchlist(&self, watchlist: &[ItemId]) -> Self {
        Self {
            watchlist: watchlist.to_vec(),
            ..self.clone()
        }
    }
}

/// Timestamps arrive either as RFC 3339 or as naive ISO-8601 in UTC. We always write RFC 3339.
pub mod timestamp {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::format_description::well_known::Rfc3339;
    use time::macros::format_description;
    use time::{OffsetDateTime, PrimitiveDateTime};

    pub fn parse(value: &str) -> Result<OffsetDateTime, time::error::Parse> {
        OffsetDateTime::parse(value, &Rfc3339).or_else(|_| {
            let naive = format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
            );
            PrimitiveDateTime::parse(value, naive).map(PrimitiveDateTime::assume_utc)
        })
    }

    pub fn serialize<S: Serializer>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        let value = value.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OffsetDateTime, D::Error> {
        let value = String::deserialize(deserializer)?;
        parse(&value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn parses_naive_backend_timestamps_as_utc() {
        let parsed = timestamp::parse("2024-03-01T10:15:30.123456").unwrap();
        assert_eq!(parsed, datetime!(2024-03-01 10:15:30.123456 UTC));

        let parsed = timestamp::parse("2024-03-01T10:15:30").unwrap();
        assert_eq!(parsed, datetime!(2024-03-01 10:15:30 UTC));
    }

    #[test]
    fn parses_offset_timestamps() {
        let parsed = timestamp::parse("2024-03-01T12:15:30+02:00").unwrap();
        assert_eq!(parsed, datetime!(2024-03-01 10:15:30 UTC));
        assert!(timestamp::parse("yesterday").is_err());
    }

    #[test]
    fn identity_defaults_missing_watchlist() {
        let identity: Identity = serde_json::from_str(
            r#"{"id":"u1","name":"Ann","email":"ann@example.com","created_at":"2024-01-01T00:00:00"}"#,
        )
        .unwrap();

        assert!(identity.watchlist.is_empty());
        assert_eq!(identity.avatar, None);

        let stored = serde_json::to_string(&identity).unwrap();
        assert!(stored.contains("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn item_id_from_str() {
        assert_eq!("  42".parse::<ItemId>().unwrap(), ItemId::new(42));
        assert!("abc".parse::<ItemId>().is_err());
    }
}
