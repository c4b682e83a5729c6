//! Ingestion pipeline for heterogeneous Linux logs.
//!
//! Each log family (a base file plus its rotated and compressed copies) is
//! decoded line by line into absolute-time events, deduplicated, and handed
//! to a [`LogStore`](logsift_state::LogStore) in one batch.

pub mod catalog;
mod collector;
pub mod config;
pub mod decoder;
mod error;
mod helper;
mod ingest;
mod reader;
pub mod reconciler;
mod source;
mod window;

pub use collector::EventCollector;
pub use decoder::DecodedEvent;
pub use decoder::DecoderKind;
pub use decoder::FamilyDecoder;
pub use decoder::TimestampDecoder;
pub use error::ConfigError;
pub use error::DecodeError;
pub use error::QueryInputError;
pub use error::SourceError;
pub use helper::SessionHelper;
pub use ingest::IngestSummary;
pub use ingest::Ingestor;
pub use reconciler::AnchorStyle;
pub use reconciler::OffsetReconciler;
pub use source::IngestStats;
pub use source::LogFamily;
pub use source::LogSource;
pub use window::TimeWindow;
