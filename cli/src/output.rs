use logsift_core::IngestStats;
use logsift_state::EventRow;
use logsift_state::LogSourceMeta;
use logsift_state::StoredEvent;
use logsift_state::format_timestamp;

pub(crate) const USER_GUIDE: &str = "\
No action given. Run `logsift --help` for every option.

USER GUIDE

Forensic investigators, in this order:
  1. Extract every file of the disk image to a directory, for example ./case42
  2. Read, decode and store its logs:
       logsift --root-dir ./case42

System administrators and network security staff, first:
  1. Read, decode and store the logs of this machine (as root, so that
     /var/log/btmp is readable):
       sudo logsift --reset-db

Once the store is populated, in any order and as often as needed:
  A. List the stored logs:
       logsift --logs
  B. Show every event of one log:
       logsift --contents 8
  C. Show events across all logs within N seconds of a time:
       logsift --query '2014-07-24 17:45:06, 2000'
  D. Show events whose description contains a string:
       logsift --string-match 'chown'
";

/// `id  name  timestamp    description`, used by both cross-log queries.
pub(crate) fn event_row_line(row: &EventRow) -> String {
    format!(
        "{:>3}  {:<20}  {}    {}",
        row.source_id,
        row.source_name,
        format_timestamp(&row.timestamp),
        row.description
    )
}

pub(crate) fn stored_event_line(event: &StoredEvent) -> String {
    format!(
        "{} {} {}",
        event.id,
        format_timestamp(&event.timestamp),
        event.description
    )
}

pub(crate) fn source_line(source: &LogSourceMeta) -> String {
    format!("{:>3}  {:<20}  {}", source.id, source.name, source.path)
}

pub(crate) fn ingest_line(stats: &IngestStats) -> String {
    format!(
        "{:>3}  {:<20}  {:>8} events from {} file(s)",
        stats.source_id, stats.name, stats.events_inserted, stats.files_read
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn event_rows_are_aligned() {
        let timestamp = NaiveDate::from_ymd_opt(2014, 7, 12)
            .and_then(|date| date.and_hms_opt(6, 52, 52))
            .expect("timestamp");
        let row = EventRow {
            source_id: 11,
            source_name: "cups access log".to_string(),
            timestamp,
            description: "\"POST / HTTP/1.1\" 401".to_string(),
        };
        assert_eq!(
            event_row_line(&row),
            " 11  cups access log       2014-07-12 06:52:52    \"POST / HTTP/1.1\" 401"
        );
    }

    #[test]
    fn sources_show_id_name_and_path() {
        let source = LogSourceMeta {
            id: 3,
            name: "syslog log".to_string(),
            path: "/var/log/syslog".to_string(),
            description: String::new(),
        };
        assert_eq!(
            source_line(&source),
            "  3  syslog log            /var/log/syslog"
        );
    }
}
