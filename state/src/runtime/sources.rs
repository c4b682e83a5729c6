use super::*;

impl LogStore {
    /// Register a log family and return its identifier.
    ///
    /// The identifier is `MAX(id) + 1` (or 1 on an empty table), computed and
    /// inserted by one statement while holding the writer lock, so concurrent
    /// registrations still receive distinct, consecutive ids. When the insert
    /// fails nothing is stored and the error is returned; the next call will
    /// hand out the same id again.
    pub async fn register_source(
        &self,
        name: &str,
        path: &str,
        description: &str,
    ) -> anyhow::Result<LogId> {
        let _schema = self.schema_guard.read().await;
        let _writer = self.write_lock.lock().await;
        let row = sqlx::query(
            r#"
INSERT INTO LOGS (id, log_name, log_file, log_description)
SELECT COALESCE(MAX(id), 0) + 1, ?, ?, ?
FROM LOGS
RETURNING id
            "#,
        )
        .bind(name)
        .bind(path)
        .bind(description)
        .fetch_one(self.pool.as_ref())
        .await?;
        let id: LogId = row.try_get("id")?;
        info!("new log id={id} for `{path}`");
        Ok(id)
    }

    /// All registered log families, ordered by id.
    pub async fn list_sources(&self) -> anyhow::Result<Vec<LogSourceMeta>> {
        let _schema = self.schema_guard.read().await;
        let rows = sqlx::query(
            r#"
SELECT id, log_file, log_name, log_description
FROM LOGS
ORDER BY id ASC
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;
        rows.iter().map(LogSourceMeta::try_from_row).collect()
    }

    pub async fn get_source(&self, id: LogId) -> anyhow::Result<Option<LogSourceMeta>> {
        let _schema = self.schema_guard.read().await;
        let row = sqlx::query(
            r#"
SELECT id, log_file, log_name, log_description
FROM LOGS
WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;
        row.as_ref().map(LogSourceMeta::try_from_row).transpose()
    }

    /// Delete one log family; its events go with it through the cascade.
    /// Returns whether a row was removed.
    #[cfg(test)]
    pub(crate) async fn delete_source(&self, id: LogId) -> anyhow::Result<bool> {
        let _schema = self.schema_guard.read().await;
        let _writer = self.write_lock.lock().await;
        let result = sqlx::query("DELETE FROM LOGS WHERE id = ?")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
