use super::*;

const EVENT_ROW_SELECT: &str = r#"
SELECT
    LOGS.id AS source_id,
    LOGS.log_name AS source_name,
    LOGEVENTS.event_datetime AS event_datetime,
    LOGEVENTS.event_description AS event_description
FROM LOGEVENTS
JOIN LOGS ON LOGS.id = LOGEVENTS.fk_logid
"#;

impl LogStore {
    /// Insert a batch of events for `source_id`.
    ///
    /// Every row is its own statement: a row that fails (for example a
    /// dangling `source_id`) is logged and counted while the rest of the batch
    /// still lands. The batch shares one transaction, so an error on commit is
    /// returned.
    pub async fn persist_events(
        &self,
        source_id: LogId,
        events: &[LogEvent],
    ) -> anyhow::Result<PersistOutcome> {
        let mut outcome = PersistOutcome::default();
        if events.is_empty() {
            return Ok(outcome);
        }

        let _schema = self.schema_guard.read().await;
        let _writer = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await?;
        for event in events {
            let inserted = sqlx::query(
                r#"
INSERT INTO LOGEVENTS (fk_logid, event_datetime, event_description)
VALUES (?, ?, ?)
                "#,
            )
            .bind(source_id)
            .bind(format_timestamp(&event.timestamp))
            .bind(&event.description)
            .execute(&mut *tx)
            .await;
            match inserted {
                Ok(_) => outcome.inserted += 1,
                Err(err) => {
                    debug!("skipping event for log id={source_id}: {err}");
                    outcome.failed += 1;
                }
            }
        }
        tx.commit().await?;
        if outcome.failed > 0 {
            warn!(
                "{} of {} events for log id={source_id} could not be stored",
                outcome.failed,
                events.len()
            );
        }
        Ok(outcome)
    }

    /// Events across all logs with `start <= timestamp <= end`, oldest first.
    pub async fn query_window(
        &self,
        start: &NaiveDateTime,
        end: &NaiveDateTime,
    ) -> anyhow::Result<Vec<EventRow>> {
        let _schema = self.schema_guard.read().await;
        let query = format!(
            "{EVENT_ROW_SELECT}WHERE LOGEVENTS.event_datetime >= ? AND LOGEVENTS.event_datetime <= ?\nORDER BY LOGEVENTS.event_datetime ASC, LOGEVENTS.id ASC"
        );
        let rows = sqlx::query(&query)
            .bind(format_timestamp(start))
            .bind(format_timestamp(end))
            .fetch_all(self.pool.as_ref())
            .await?;
        rows.iter().map(EventRow::try_from_row).collect()
    }

    /// Events across all logs whose description contains `needle`
    /// (case-sensitive), oldest first.
    pub async fn query_substring(&self, needle: &str) -> anyhow::Result<Vec<EventRow>> {
        let _schema = self.schema_guard.read().await;
        // `instr` rather than LIKE: LIKE folds ASCII case and treats `%`/`_`
        // in the needle as wildcards.
        let query = format!(
            "{EVENT_ROW_SELECT}WHERE instr(LOGEVENTS.event_description, ?) > 0\nORDER BY LOGEVENTS.event_datetime ASC, LOGEVENTS.id ASC"
        );
        let rows = sqlx::query(&query)
            .bind(needle)
            .fetch_all(self.pool.as_ref())
            .await?;
        rows.iter().map(EventRow::try_from_row).collect()
    }

    /// Every event of one log, oldest first.
    pub async fn events_for_source(&self, source_id: LogId) -> anyhow::Result<Vec<StoredEvent>> {
        let _schema = self.schema_guard.read().await;
        let rows = sqlx::query(
            r#"
SELECT id, event_datetime, event_description
FROM LOGEVENTS
WHERE fk_logid = ?
ORDER BY event_datetime ASC, id ASC
            "#,
        )
        .bind(source_id)
        .fetch_all(self.pool.as_ref())
        .await?;
        rows.iter().map(StoredEvent::try_from_row).collect()
    }

    /// Number of stored events, across all logs or for a single one.
    #[cfg(test)]
    pub(crate) async fn count_events(&self, source_id: Option<LogId>) -> anyhow::Result<i64> {
        let _schema = self.schema_guard.read().await;
        let row = sqlx::query(
            r#"
SELECT COUNT(*) AS event_count
FROM LOGEVENTS
WHERE ? IS NULL OR fk_logid = ?
            "#,
        )
        .bind(source_id)
        .bind(source_id)
        .fetch_one(self.pool.as_ref())
        .await?;
        Ok(row.try_get("event_count")?)
    }
}
