use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::message::Message;

/// A conversation as stored by the backend.
///
/// The id is assigned server-side on `POST /chat/new_conversation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(rename = "conversation_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Conversation {
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            messages: Vec::new(),
            alias: None,
            created_at: Some(now),
            updated_at: Some(now),
            model: None,
        }
    }
}

/// Response of `POST /chat/new_conversation`. The backend returns the whole
/// conversation record; only the id matters here.
#[derive(Debug, Clone, Deserialize)]
pub struct NewConversation {
    pub conversation_id: String,
}

/// One sidebar row, derived from a [`Conversation`] on each refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectorySummary {
    pub id: String,
    pub label: String,
    #[serde(default, with = "timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Parse a backend timestamp. Accepts RFC 3339 and the offset-less ISO 8601
/// form Python's `datetime.isoformat()` produces (read as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Lenient serde adapter for optional timestamps: unparseable strings become `None`.
pub mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(super::parse_timestamp))
    }
}
