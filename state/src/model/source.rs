use anyhow::Result;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

/// Identifier of a row in `LOGS`. Assigned sequentially starting at 1.
pub type LogId = i64;

/// One ingested log family.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogSourceMeta {
    pub id: LogId,
    pub name: String,
    /// Base path of the family; rotated copies share it as a prefix.
    pub path: String,
    pub description: String,
}

impl LogSourceMeta {
    pub(crate) fn try_from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("log_name")?,
            path: row.try_get("log_file")?,
            description: row.try_get("log_description")?,
        })
    }
}
