use std::path::Path;
use std::path::PathBuf;

use logsift_state::LogId;
use logsift_state::LogStore;
use serde::Deserialize;
use tracing::info;
use tracing::trace;
use tracing::warn;

use crate::EventCollector;
use crate::SourceError;
use crate::SessionHelper;
use crate::decoder::DecoderKind;
use crate::decoder::FamilyDecoder;
use crate::reader::family_files;
use crate::reader::read_lines;

/// A configured log family: a base path whose rotated and compressed siblings
/// are read with the same decoder.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogFamily {
    pub name: String,
    pub path: PathBuf,
    #[serde(default)]
    pub description: String,
    pub decoder: DecoderKind,
}

impl LogFamily {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        description: impl Into<String>,
        decoder: DecoderKind,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            description: description.into(),
            decoder,
        }
    }
}

/// Counters reported for one ingested family.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub name: String,
    pub source_id: LogId,
    pub files_read: usize,
    pub files_skipped: usize,
    pub lines_read: usize,
    pub lines_skipped: usize,
    /// Offset events still waiting for an anchor when their file ended.
    pub events_pending_dropped: usize,
    pub events_unique: usize,
    pub events_inserted: usize,
    pub events_failed: usize,
}

/// Ingestion state of one family: its decoder, the deduplicating collector
/// and the running counters.
#[derive(Debug)]
pub struct LogSource {
    family: LogFamily,
    source_id: LogId,
    decoder: FamilyDecoder,
    collector: EventCollector,
    stats: IngestStats,
}

impl LogSource {
    pub fn new(family: LogFamily, reference_year: i32) -> Self {
        let decoder = FamilyDecoder::new(family.decoder, reference_year);
        let stats = IngestStats {
            name: family.name.clone(),
            ..IngestStats::default()
        };
        Self {
            family,
            source_id: 0,
            decoder,
            collector: EventCollector::new(),
            stats,
        }
    }

    /// Register the family, read every input belonging to it and persist the
    /// deduplicated events in one batch.
    ///
    /// Unreadable files and failed helper runs are logged and skipped. Errors
    /// registering the family or committing the batch are returned.
    pub async fn ingest(
        mut self,
        store: &LogStore,
        helper: &SessionHelper,
    ) -> anyhow::Result<IngestStats> {
        let path = self.family.path.clone();
        self.source_id = store
            .register_source(
                &self.family.name,
                &path.to_string_lossy(),
                &self.family.description,
            )
            .await?;
        self.stats.source_id = self.source_id;

        let kind = self.family.decoder;
        match kind {
            // One helper run on the base `wtmp` path; rotations are not read.
            DecoderKind::SessionHistory => self.read_helper(helper, &path).await,
            DecoderKind::FailedLogin => {
                for file in self.files() {
                    self.read_helper(helper, &file).await;
                }
            }
            _ => {
                for file in self.files() {
                    self = self.read_file(file).await?;
                }
            }
        }

        let events = self.collector.drain();
        self.stats.events_unique = events.len();
        let outcome = store.persist_events(self.source_id, &events).await?;
        self.stats.events_inserted = outcome.inserted;
        self.stats.events_failed = outcome.failed;
        info!(
            "saved {} unique events for `{}` ({} lines, {} skipped)",
            outcome.inserted,
            path.display(),
            self.stats.lines_read,
            self.stats.lines_skipped
        );
        Ok(self.stats)
    }

    fn files(&self) -> Vec<PathBuf> {
        match family_files(&self.family.path) {
            Ok(files) => {
                if files.is_empty() {
                    warn!("no files found for `{}`", self.family.path.display());
                }
                files
            }
            Err(err) => {
                warn!("skipping `{}`: {err}", self.family.name);
                Vec::new()
            }
        }
    }

    /// Decode one physical file off the async runtime.
    async fn read_file(mut self, file: PathBuf) -> anyhow::Result<Self> {
        let (mut source, result) = tokio::task::spawn_blocking(move || {
            let result = read_lines(&file, |line| self.feed(line));
            (self, result)
        })
        .await?;
        source.finish_input(result.map(|_| ()));
        Ok(source)
    }

    async fn read_helper(&mut self, helper: &SessionHelper, file: &Path) {
        let result = helper.read_history(file).await.map(|text| {
            for line in text.lines() {
                self.feed(line.trim_end());
            }
        });
        self.finish_input(result);
    }

    fn feed(&mut self, line: &str) {
        self.stats.lines_read += 1;
        match self.decoder.decode(line) {
            Ok(events) => {
                for event in events {
                    self.collector
                        .add(self.source_id, event.timestamp, &event.description);
                }
            }
            Err(err) => {
                trace!("skipping line of `{}`: {err}", self.family.name);
                self.stats.lines_skipped += 1;
            }
        }
    }

    /// Close out one input: tally it and forget any anchor it established.
    fn finish_input(&mut self, result: Result<(), SourceError>) {
        match result {
            Ok(()) => self.stats.files_read += 1,
            Err(err) => {
                warn!("{err}");
                self.stats.files_skipped += 1;
            }
        }
        let dropped = self.decoder.reset();
        if dropped > 0 {
            warn!(
                "dropping {dropped} events of `{}` read before any time anchor",
                self.family.name
            );
            self.stats.events_pending_dropped += dropped;
        }
    }
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;
