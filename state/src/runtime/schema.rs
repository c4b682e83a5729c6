use super::*;

const CREATE_STATEMENTS: [&str; 3] = [
    r#"
CREATE TABLE IF NOT EXISTS LOGS (
    id              INTEGER PRIMARY KEY,
    log_file        TEXT NOT NULL,
    log_name        TEXT NOT NULL,
    log_description TEXT NOT NULL
)
    "#,
    r#"
CREATE TABLE IF NOT EXISTS LOGEVENTS (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    fk_logid          INTEGER NOT NULL,
    event_datetime    TEXT NOT NULL,
    event_description TEXT,
    FOREIGN KEY (fk_logid) REFERENCES LOGS (id) ON DELETE CASCADE ON UPDATE CASCADE
)
    "#,
    "CREATE INDEX IF NOT EXISTS idx_LOGEVENTS ON LOGEVENTS (fk_logid)",
];

// Children before parents.
const DROP_STATEMENTS: [&str; 3] = [
    "DROP INDEX IF EXISTS idx_LOGEVENTS",
    "DROP TABLE IF EXISTS LOGEVENTS",
    "DROP TABLE IF EXISTS LOGS",
];

impl LogStore {
    /// Create both tables and the foreign-key index. No-op when they exist.
    pub async fn create_schema(&self) -> anyhow::Result<()> {
        let _guard = self.schema_guard.write().await;
        self.run_statements(&CREATE_STATEMENTS).await
    }

    /// Drop the index and both tables. No-op when they are already gone.
    pub async fn drop_schema(&self) -> anyhow::Result<()> {
        let _guard = self.schema_guard.write().await;
        self.run_statements(&DROP_STATEMENTS).await
    }

    /// Wipe the store: drop, then recreate, holding exclusive access for the
    /// whole sequence. Recreate is only attempted once drop succeeded.
    pub async fn reset(&self) -> anyhow::Result<()> {
        let _guard = self.schema_guard.write().await;
        self.run_statements(&DROP_STATEMENTS).await.map_err(|err| {
            warn!("failed to drop log store schema: {err}");
            err.context("failed to drop log store schema")
        })?;
        self.run_statements(&CREATE_STATEMENTS)
            .await
            .map_err(|err| {
                warn!("failed to recreate log store schema: {err}");
                err.context("failed to recreate log store schema")
            })?;
        info!("log store reset");
        Ok(())
    }

    async fn run_statements(&self, statements: &[&str]) -> anyhow::Result<()> {
        let _writer = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await?;
        for statement in statements {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
