mod event;
mod source;

pub use event::EVENT_TIMESTAMP_FORMAT;
pub use event::EventRow;
pub use event::LogEvent;
pub use event::MAX_DESCRIPTION_CHARS;
pub use event::PersistOutcome;
pub use event::StoredEvent;
pub use event::format_timestamp;
pub use event::parse_timestamp;
pub use event::sanitize_description;
pub use source::LogId;
pub use source::LogSourceMeta;
