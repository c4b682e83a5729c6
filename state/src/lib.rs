//! SQLite-backed store for normalized log events.
//!
//! The store keeps two tables: `LOGS`, one row per ingested log family, and
//! `LOGEVENTS`, the deduplicated events of every family. It answers inclusive
//! time-window scans and case-sensitive substring searches across all logs.

mod model;
mod runtime;

pub use model::EVENT_TIMESTAMP_FORMAT;
pub use model::EventRow;
pub use model::LogEvent;
pub use model::LogId;
pub use model::LogSourceMeta;
pub use model::MAX_DESCRIPTION_CHARS;
pub use model::PersistOutcome;
pub use model::StoredEvent;
pub use model::format_timestamp;
pub use model::parse_timestamp;
pub use model::sanitize_description;
/// Preferred entrypoint: owns the connection pool and schema lifecycle.
pub use runtime::LogStore;
pub use runtime::STORE_DB_FILENAME;
