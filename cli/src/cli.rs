use std::path::PathBuf;

use clap::Parser;
use logsift_core::TimeWindow;
use logsift_core::config::ConfigOverrides;
use logsift_state::LogId;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Read Linux system logs into one SQLite store and search events across all of them."
)]
pub struct Cli {
    /// Wipe the store and re-read the logs of the running system (run as
    /// root to include failed logins from `/var/log/btmp`).
    #[arg(long = "reset-db", default_value_t = false)]
    pub reset_db: bool,

    /// Wipe the store and re-read the logs of a system whose files were
    /// extracted to DIR, for example from a disk image.
    #[arg(long = "root-dir", value_name = "DIR")]
    pub root_dir: Option<PathBuf>,

    /// List the id, name and path of every stored log.
    #[arg(long = "logs", default_value_t = false)]
    pub logs: bool,

    /// Print every event of the log with this id.
    #[arg(long = "contents", value_name = "ID")]
    pub contents: Option<LogId>,

    /// Events across all logs within N seconds of a time, for example
    /// `--query '2014-02-19 19:07:05, 3'`.
    #[arg(long = "query", value_name = "DATETIME, N", value_parser = TimeWindow::parse)]
    pub query: Option<TimeWindow>,

    /// Events across all logs whose description contains TEXT
    /// (case-sensitive).
    #[arg(long = "string-match", value_name = "TEXT")]
    pub string_match: Option<String>,

    /// SQLite file to use instead of the configured one.
    #[arg(long = "db", value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Read settings from this file instead of `~/.logsift/config.toml`.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Number of log families read at the same time.
    #[arg(long = "jobs", value_name = "N")]
    pub jobs: Option<usize>,

    /// Year given to timestamps that carry none (defaults to the current year).
    #[arg(long = "year", value_name = "YEAR")]
    pub year: Option<i32>,
}

impl Cli {
    /// Whether the store should be wiped and re-populated.
    pub fn wants_ingest(&self) -> bool {
        self.reset_db || self.root_dir.is_some()
    }

    pub fn has_action(&self) -> bool {
        self.wants_ingest()
            || self.logs
            || self.contents.is_some()
            || self.query.is_some()
            || self.string_match.is_some()
    }

    pub fn config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            db_path: self.db_path.clone(),
            root_dir: self.root_dir.clone(),
            jobs: self.jobs,
            reference_year: self.year,
        }
    }
}
