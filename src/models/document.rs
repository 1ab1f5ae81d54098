use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Document visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Public,
}

impl Visibility {
    /// Parse the value stored in the `visibility` column. Anything that is
    /// not recognised falls back to private.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "public" => Visibility::Public,
            _ => Visibility::Private,
        }
    }
}

/// A collaboratively edited document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: i64,
    pub share_id: Uuid,
    pub title: String,
    pub content: String,
    pub owner_id: Option<i64>,
    pub visibility: Visibility,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Document {
    /// An expired document is treated as gone everywhere.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at <= now,
            None => false,
        }
    }
}

/// A client-supplied document reference.
///
/// Clients address documents either by numeric id (owner links) or by the
/// opaque share id (magic links). Both forms must resolve to the same
/// document, so every code path that takes a reference goes through this
/// one parse: a reference that parses as an integer is an id lookup,
/// anything else is a share id lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocRef {
    Id(i64),
    Share(String),
}

impl DocRef {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<i64>() {
            Ok(id) => DocRef::Id(id),
            Err(_) => DocRef::Share(raw.to_string()),
        }
    }
}

impl std::fmt::Display for DocRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocRef::Id(id) => write!(f, "{}", id),
            DocRef::Share(share) => write!(f, "{}", share),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn doc(expires_at: Option<DateTime<Utc>>) -> Document {
        Document {
            id: 1,
            share_id: Uuid::new_v4(),
            title: "t".to_string(),
            content: String::new(),
            owner_id: Some(1),
            visibility: Visibility::Private,
            expires_at,
        }
    }

    #[test]
    fn numeric_reference_parses_as_id() {
        assert_eq!(DocRef::parse("42"), DocRef::Id(42));
        assert_eq!(DocRef::parse(" 42 "), DocRef::Id(42));
    }

    #[test]
    fn non_numeric_reference_parses_as_share_id() {
        assert_eq!(
            DocRef::parse("abc-123"),
            DocRef::Share("abc-123".to_string())
        );
        // A uuid is never a valid i64
        let share = Uuid::new_v4().to_string();
        assert_eq!(DocRef::parse(&share), DocRef::Share(share));
    }

    #[test]
    fn expiry_is_lazy_and_inclusive_of_past_timestamps() {
        let now = Utc::now();
        assert!(!doc(None).is_expired(now));
        assert!(!doc(Some(now + Duration::hours(1))).is_expired(now));
        assert!(doc(Some(now - Duration::seconds(1))).is_expired(now));
    }

    #[test]
    fn visibility_parse_defaults_to_private() {
        assert_eq!(Visibility::parse("public"), Visibility::Public);
        assert_eq!(Visibility::parse("private"), Visibility::Private);
        assert_eq!(Visibility::parse("garbage"), Visibility::Private);
    }
}
