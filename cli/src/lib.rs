mod cli;
mod output;

use std::io::Write;

use anyhow::Context;
pub use cli::Cli;
use logsift_core::Ingestor;
use logsift_core::config::Config;
use logsift_state::LogStore;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::output::USER_GUIDE;
use crate::output::event_row_line;
use crate::output::ingest_line;
use crate::output::source_line;
use crate::output::stored_event_line;

const DEFAULT_LOG_FILTER: &str = "logsift_core=info,logsift_state=info,logsift_cli=info";

pub async fn run_main(cli: Cli) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(env_filter);
    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();

    let config = Config::load(cli.config.as_deref(), cli.config_overrides())?;
    let mut stdout = std::io::stdout().lock();
    run(&cli, &config, &mut stdout).await
}

/// Carry out every action requested on the command line, in a fixed order:
/// re-ingest first, then the listings and queries.
pub async fn run(cli: &Cli, config: &Config, out: &mut impl Write) -> anyhow::Result<()> {
    if !cli.has_action() {
        write!(out, "{USER_GUIDE}")?;
        return Ok(());
    }

    let store = LogStore::open(&config.db_path)
        .await
        .with_context(|| format!("cannot open store at {}", config.db_path.display()))?;

    if cli.wants_ingest() {
        info!("re-reading logs under {}", config.root_dir.display());
        store.reset().await.context("store reset failed")?;
        let summary = Ingestor::new(store.clone(), config.helper.clone(), config.reference_year)
            .with_concurrency(config.jobs)
            .ingest_families(config.families())
            .await;
        for stats in &summary.families {
            writeln!(out, "{}", ingest_line(stats))?;
        }
        for name in &summary.failed {
            writeln!(out, "  -  {name:<20}  not ingested")?;
        }
    }

    if cli.logs {
        for source in store.list_sources().await? {
            writeln!(out, "{}", source_line(&source))?;
        }
    }

    if let Some(id) = cli.contents {
        match store.get_source(id).await? {
            Some(source) => {
                writeln!(out, "{}", source_line(&source))?;
                for event in store.events_for_source(id).await? {
                    writeln!(out, "{}", stored_event_line(&event))?;
                }
            }
            None => writeln!(out, "no log with id {id}; see `logsift --logs`")?,
        }
    }

    if let Some(window) = cli.query {
        info!("events from {window}");
        for row in store.query_window(&window.start, &window.end).await? {
            writeln!(out, "{}", event_row_line(&row))?;
        }
    }

    if let Some(needle) = cli.string_match.as_deref() {
        for row in store.query_substring(needle).await? {
            writeln!(out, "{}", event_row_line(&row))?;
        }
    }

    store.close().await;
    Ok(())
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
