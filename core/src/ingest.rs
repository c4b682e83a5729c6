use futures::StreamExt;
use futures::stream;
use logsift_state::LogStore;
use tracing::info;
use tracing::warn;

use crate::IngestStats;
use crate::LogFamily;
use crate::LogSource;
use crate::SessionHelper;

/// Outcome of ingesting a list of families.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub families: Vec<IngestStats>,
    /// Families that could not be registered or whose batch did not commit.
    pub failed: Vec<String>,
}

impl IngestSummary {
    pub fn events_inserted(&self) -> usize {
        self.families
            .iter()
            .map(|stats| stats.events_inserted)
            .sum()
    }
}

/// Drives [`LogSource`] ingestion for many families against one store.
#[derive(Clone)]
pub struct Ingestor {
    store: LogStore,
    helper: SessionHelper,
    reference_year: i32,
    concurrency: usize,
}

impl Ingestor {
    pub fn new(store: LogStore, helper: SessionHelper, reference_year: i32) -> Self {
        Self {
            store,
            helper,
            reference_year,
            concurrency: 1,
        }
    }

    /// Number of families read at the same time. Values below 1 are treated
    /// as 1.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Ingest every family. A family that fails is logged and reported in
    /// [`IngestSummary::failed`]; the others still run. Results keep the
    /// order of `families`.
    pub async fn ingest_families(&self, families: Vec<LogFamily>) -> IngestSummary {
        info!(
            "ingesting {} log families, {} at a time",
            families.len(),
            self.concurrency
        );
        let results: Vec<(String, anyhow::Result<IngestStats>)> = stream::iter(families)
            .map(|family| async move {
                let name = family.name.clone();
                let result = LogSource::new(family, self.reference_year)
                    .ingest(&self.store, &self.helper)
                    .await;
                (name, result)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut summary = IngestSummary::default();
        for (name, result) in results {
            match result {
                Ok(stats) => summary.families.push(stats),
                Err(err) => {
                    warn!("failed to ingest `{name}`: {err:#}");
                    summary.failed.push(name);
                }
            }
        }
        summary
    }
}
