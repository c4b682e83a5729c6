//! Settings loaded from `config.toml` and merged with command-line overrides.
//!
//! The file lives in the logsift home (`$LOGSIFT_HOME`, else `~/.logsift`).
//! A missing default file means built-in defaults; an explicitly named file
//! must exist.

use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use chrono::Datelike;
use dirs::home_dir;
use logsift_state::STORE_DB_FILENAME;
use serde::Deserialize;
use tracing::debug;

use crate::ConfigError;
use crate::LogFamily;
use crate::SessionHelper;
use crate::catalog::linux_families;

pub const CONFIG_TOML_FILE: &str = "config.toml";

/// On-disk shape of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigToml {
    /// SQLite file holding the store.
    pub db_path: Option<PathBuf>,
    /// Where the system under analysis is mounted.
    pub root_dir: Option<PathBuf>,
    pub helper_program: Option<PathBuf>,
    pub helper_args: Option<Vec<String>>,
    /// Families ingested at the same time.
    pub jobs: Option<usize>,
    /// Year assigned to timestamps that carry none.
    pub reference_year: Option<i32>,
    /// Families ingested after the built-in Linux catalog.
    pub families: Vec<LogFamily>,
}

/// Values from the command line; they win over the file.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub db_path: Option<PathBuf>,
    pub root_dir: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub reference_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub root_dir: PathBuf,
    pub helper: SessionHelper,
    pub jobs: usize,
    pub reference_year: i32,
    pub extra_families: Vec<LogFamily>,
}

impl Config {
    /// Load `path`, or the default config file when `path` is `None`, and
    /// apply `overrides`.
    pub fn load(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let toml = match path {
            Some(path) => read_config_toml(path)?,
            None => match find_logsift_home() {
                Ok(home) => {
                    let path = home.join(CONFIG_TOML_FILE);
                    match read_config_toml(&path) {
                        Err(ConfigError::Read { source, .. })
                            if source.kind() == ErrorKind::NotFound =>
                        {
                            debug!("no config at {}, using defaults", path.display());
                            ConfigToml::default()
                        }
                        other => other?,
                    }
                }
                Err(err) => {
                    debug!("no logsift home ({err}), using defaults");
                    ConfigToml::default()
                }
            },
        };
        Self::from_toml(toml, overrides)
    }

    pub fn from_toml(toml: ConfigToml, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let jobs = overrides.jobs.or(toml.jobs).unwrap_or(1);
        if jobs == 0 {
            return Err(ConfigError::ZeroJobs);
        }
        let default_helper = SessionHelper::default();
        Ok(Self {
            db_path: overrides
                .db_path
                .or(toml.db_path)
                .unwrap_or_else(|| PathBuf::from(STORE_DB_FILENAME)),
            root_dir: overrides
                .root_dir
                .or(toml.root_dir)
                .unwrap_or_else(|| PathBuf::from("/")),
            helper: SessionHelper::new(
                toml.helper_program.unwrap_or(default_helper.program),
                toml.helper_args.unwrap_or(default_helper.args),
            ),
            jobs,
            reference_year: overrides
                .reference_year
                .or(toml.reference_year)
                .unwrap_or_else(|| chrono::Local::now().year()),
            extra_families: toml.families,
        })
    }

    /// The built-in Linux catalog under `root_dir` followed by any families
    /// from the config file.
    pub fn families(&self) -> Vec<LogFamily> {
        let mut families = linux_families(&self.root_dir);
        families.extend(self.extra_families.iter().cloned());
        families
    }
}

fn read_config_toml(path: &Path) -> Result<ConfigToml, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Returns the logsift home directory: `$LOGSIFT_HOME` when set and
/// non-empty, otherwise `~/.logsift`. The directory is not required to exist.
pub fn find_logsift_home() -> std::io::Result<PathBuf> {
    let home_env = std::env::var("LOGSIFT_HOME")
        .ok()
        .filter(|val| !val.is_empty());
    find_logsift_home_from_env(home_env.as_deref())
}

fn find_logsift_home_from_env(home_env: Option<&str>) -> std::io::Result<PathBuf> {
    match home_env {
        Some(val) => Ok(PathBuf::from(val)),
        None => {
            let mut p = home_dir().ok_or_else(|| {
                std::io::Error::new(ErrorKind::NotFound, "Could not find home directory")
            })?;
            p.push(".logsift");
            Ok(p)
        }
    }
}
