use anyhow::Context;
use anyhow::Result;
use chrono::NaiveDateTime;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::LogId;

/// Text layout of `LOGEVENTS.event_datetime`. Lexicographic order matches
/// chronological order, which the window query relies on.
pub const EVENT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Longest description kept for a single event, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 400;

/// A normalized event waiting to be persisted.
///
/// Equality and hashing cover the full `(source_id, timestamp, description)`
/// triple, so a set of `LogEvent`s deduplicates events read twice from a live
/// log and one of its rotated copies.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogEvent {
    pub source_id: LogId,
    pub timestamp: NaiveDateTime,
    pub description: String,
}

impl LogEvent {
    pub fn new(source_id: LogId, timestamp: NaiveDateTime, description: &str) -> Self {
        Self {
            source_id,
            timestamp,
            description: sanitize_description(description),
        }
    }
}

/// Event returned by the cross-log queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventRow {
    pub source_id: LogId,
    pub source_name: String,
    pub timestamp: NaiveDateTime,
    pub description: String,
}

impl EventRow {
    pub(crate) fn try_from_row(row: &SqliteRow) -> Result<Self> {
        let timestamp: String = row.try_get("event_datetime")?;
        let description: Option<String> = row.try_get("event_description")?;
        Ok(Self {
            source_id: row.try_get("source_id")?,
            source_name: row.try_get("source_name")?,
            timestamp: parse_timestamp(&timestamp)?,
            description: description.unwrap_or_default(),
        })
    }
}

/// Event of a single log, including its row id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredEvent {
    pub id: i64,
    pub timestamp: NaiveDateTime,
    pub description: String,
}

impl StoredEvent {
    pub(crate) fn try_from_row(row: &SqliteRow) -> Result<Self> {
        let timestamp: String = row.try_get("event_datetime")?;
        let description: Option<String> = row.try_get("event_description")?;
        Ok(Self {
            id: row.try_get("id")?,
            timestamp: parse_timestamp(&timestamp)?,
            description: description.unwrap_or_default(),
        })
    }
}

/// Result of a bulk insert. Rows are inserted independently, so a batch can
/// partially succeed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PersistOutcome {
    pub inserted: usize,
    pub failed: usize,
}

pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(EVENT_TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, EVENT_TIMESTAMP_FORMAT)
        .with_context(|| format!("invalid stored event timestamp `{value}`"))
}

/// Strip control characters (tab excepted) and cap the length at
/// [`MAX_DESCRIPTION_CHARS`].
pub fn sanitize_description(raw: &str) -> String {
    raw.chars()
        .filter(|ch| *ch == '\t' || !ch.is_control())
        .take(MAX_DESCRIPTION_CHARS)
        .collect()
}
