//! Helpdesk record types.
//!
//! Records are parsed leniently: every field is optional on the wire and a
//! field of an unexpected type reads as absent. Only a record without a
//! usable identifier parses to `None`, so callers can skip it.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

/// Placeholder shown for attachments without a display name.
pub const UNNAMED_ATTACHMENT: &str = "(unnamed)";

/// Identifier that may arrive as a JSON string or number.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Int(i64),
    Uint(u64),
}

impl WireId {
    /// Identifier from a raw JSON value, `None` for any other shape.
    fn read(value: &Value) -> Option<String> {
        Self::deserialize(value).ok()?.into_id()
    }

    /// Normalized string form; empty strings count as missing.
    fn into_id(self) -> Option<String> {
        match self {
            Self::Text(s) if s.trim().is_empty() => None,
            Self::Text(s) => Some(s),
            Self::Int(n) => Some(n.to_string()),
            Self::Uint(n) => Some(n.to_string()),
        }
    }
}

/// Ticket status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketStatus {
    /// Closed ticket, the only status swept.
    Closed,
    /// Any other status, kept verbatim.
    Other(String),
}

impl TicketStatus {
    /// Status from a string or a `{"name": ...}` object.
    fn read(value: &Value) -> Option<Self> {
        let raw = value
            .as_str()
            .or_else(|| value.get("name").and_then(Value::as_str))?;
        Some(Self::parse(raw))
    }

    fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("closed") {
            Self::Closed
        } else {
            Self::Other(raw.to_owned())
        }
    }
}

/// First non-null value under any of `keys`.
fn field<'a>(record: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| record.get(*key).filter(|v| !v.is_null()))
}

fn text(record: &Value, keys: &[&str]) -> Option<String> {
    field(record, keys).and_then(Value::as_str).map(str::to_owned)
}

/// Support ticket, read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    /// Ticket identifier.
    pub id: String,
    /// Status, if reported.
    pub status: Option<TicketStatus>,
    /// Closure timestamp as reported (ISO-8601).
    pub closed_at: Option<String>,
}

impl Ticket {
    /// Parse a listing record. Returns `None` when the record has no identifier.
    #[must_use]
    pub fn from_record(record: Value) -> Option<Self> {
        Some(Self {
            id: field(&record, &["id"]).and_then(WireId::read)?,
            status: field(&record, &["status"]).and_then(TicketStatus::read),
            closed_at: text(&record, &["closed_at", "closed_on"]),
        })
    }
}

/// File attached to a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Attachment identifier.
    pub id: String,
    /// Display name, [`UNNAMED_ATTACHMENT`] when absent.
    pub name: String,
    /// Owning ticket identifier.
    pub ticket_id: String,
    /// Activity/update the file was posted with, if reported.
    pub activity_id: Option<String>,
}

impl Attachment {
    /// Parse a listing record for `ticket_id`. Returns `None` when the
    /// record has no identifier.
    #[must_use]
    pub fn from_record(record: Value, ticket_id: &str) -> Option<Self> {
        Some(Self {
            id: field(&record, &["id"]).and_then(WireId::read)?,
            name: text(&record, &["name", "file_name", "filename"])
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| UNNAMED_ATTACHMENT.to_owned()),
            ticket_id: ticket_id.to_owned(),
            activity_id: field(&record, &["activity_id", "update_id", "conversation_id"])
                .and_then(WireId::read),
        })
    }
}

impl fmt::Display for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) on ticket {}", self.name, self.id, self.ticket_id)
    }
}
