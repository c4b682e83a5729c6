use super::*;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use flate2::Compression;
use flate2::write::GzEncoder;
use pretty_assertions::assert_eq;
use std::io::Write;

const YEAR: i32 = 2014;

fn at(month: u32, day: u32, hour: u32, min: u32, sec: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(YEAR, month, day)
        .and_then(|date| date.and_hms_opt(hour, min, sec))
        .expect("valid timestamp")
}

fn gzip(text: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes()).expect("compress");
    encoder.finish().expect("finish")
}

async fn ingest(family: LogFamily, helper: &SessionHelper) -> (LogStore, IngestStats) {
    let store = LogStore::open_in_memory().await.expect("store");
    let stats = LogSource::new(family, YEAR)
        .ingest(&store, helper)
        .await
        .expect("ingest");
    (store, stats)
}

async fn stored(store: &LogStore, id: LogId) -> Vec<(NaiveDateTime, String)> {
    store
        .events_for_source(id)
        .await
        .expect("events")
        .into_iter()
        .map(|event| (event.timestamp, event.description))
        .collect()
}

const SYSLOG: &str = "\
Jul 11 17:54:32 SpiderMan kernel: imklog started.
Jul 11 17:54:33 SpiderMan rsyslogd: [origin software=\"rsyslogd\"] start
not a syslog line
";

#[tokio::test]
async fn duplicated_rotations_are_stored_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("syslog"), SYSLOG).expect("write");
    std::fs::write(dir.path().join("syslog.1"), SYSLOG).expect("write");
    std::fs::write(dir.path().join("syslog.2.gz"), gzip(SYSLOG)).expect("write");

    let family = LogFamily::new(
        "system log",
        dir.path().join("syslog"),
        "general messages",
        DecoderKind::StandardSyslog,
    );
    let (store, stats) = ingest(family, &SessionHelper::default()).await;

    assert_eq!(
        stats,
        IngestStats {
            name: "system log".to_string(),
            source_id: 1,
            files_read: 3,
            files_skipped: 0,
            lines_read: 9,
            lines_skipped: 3,
            events_pending_dropped: 0,
            events_unique: 2,
            events_inserted: 2,
            events_failed: 0,
        }
    );
    assert_eq!(
        stored(&store, 1).await,
        vec![
            (at(7, 11, 17, 54, 32), "imklog started.".to_string()),
            (
                at(7, 11, 17, 54, 33),
                "[origin software=\"rsyslogd\"] start".to_string()
            ),
        ]
    );
    let sources = store.list_sources().await.expect("sources");
    assert_eq!(sources[0].name, "system log");
    assert_eq!(sources[0].description, "general messages");
}

#[tokio::test]
async fn anchor_does_not_carry_over_to_the_next_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join("dmesg"),
        "[    0.000000] Initializing cgroup subsys cpu\n\
         [    0.178426] RTC time: 22:01:31, date: 07/10/14\n\
         [    3.000000] EXT4-fs mounted\n",
    )
    .expect("write");
    std::fs::write(
        dir.path().join("dmesg.0"),
        "[    0.000000] Linux version 3.11.0\n[    1.000000] ACPI enabled\n",
    )
    .expect("write");

    let family = LogFamily::new(
        "kernel ring buffer",
        dir.path().join("dmesg"),
        "",
        DecoderKind::DmesgOffset,
    );
    let (store, stats) = ingest(family, &SessionHelper::default()).await;

    assert_eq!(stats.files_read, 2);
    assert_eq!(stats.events_pending_dropped, 2);
    assert_eq!(
        stored(&store, stats.source_id).await,
        vec![
            (
                at(7, 10, 22, 1, 31),
                "Initializing cgroup subsys cpu".to_string()
            ),
            (
                at(7, 10, 22, 1, 31),
                "RTC time: 22:01:31, date: 07/10/14".to_string()
            ),
            (at(7, 10, 22, 1, 34), "EXT4-fs mounted".to_string()),
        ]
    );
}

#[tokio::test]
async fn each_file_resolves_against_its_own_anchor() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join("dmesg"),
        "[    0.178426] RTC time: 22:01:31, date: 07/10/14\n\
         [    3.000000] EXT4-fs mounted\n",
    )
    .expect("write");
    std::fs::write(
        dir.path().join("dmesg.0"),
        "[    0.000000] Linux version 3.11.0\n\
         [    0.200000] RTC time: 08:15:00, date: 07/01/14\n\
         [    2.400000] ACPI enabled\n",
    )
    .expect("write");

    let family = LogFamily::new(
        "kernel ring buffer",
        dir.path().join("dmesg"),
        "",
        DecoderKind::DmesgOffset,
    );
    let (store, stats) = ingest(family, &SessionHelper::default()).await;

    assert_eq!(stats.files_read, 2);
    assert_eq!(stats.events_pending_dropped, 0);
    assert_eq!(
        stored(&store, stats.source_id).await,
        vec![
            (at(7, 1, 8, 15, 0), "Linux version 3.11.0".to_string()),
            (
                at(7, 1, 8, 15, 0),
                "RTC time: 08:15:00, date: 07/01/14".to_string()
            ),
            (at(7, 1, 8, 15, 2), "ACPI enabled".to_string()),
            (
                at(7, 10, 22, 1, 31),
                "RTC time: 22:01:31, date: 07/10/14".to_string()
            ),
            (at(7, 10, 22, 1, 34), "EXT4-fs mounted".to_string()),
        ]
    );
}

#[tokio::test]
async fn family_without_files_is_registered_but_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let family = LogFamily::new(
        "cron log",
        dir.path().join("cron.log"),
        "",
        DecoderKind::StandardSyslog,
    );
    let (store, stats) = ingest(family, &SessionHelper::default()).await;

    assert_eq!((stats.source_id, stats.files_read), (1, 0));
    assert_eq!(store.list_sources().await.expect("sources").len(), 1);
    assert_eq!(stored(&store, 1).await, Vec::new());
}

#[tokio::test]
async fn failed_helper_run_is_skipped() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("wtmp"), "").expect("write");
    let helper = SessionHelper::new("/nonexistent/logsift-helper", Vec::new());
    let family = LogFamily::new(
        "login history",
        dir.path().join("wtmp"),
        "",
        DecoderKind::SessionHistory,
    );
    let (_store, stats) = ingest(family, &helper).await;
    assert_eq!((stats.files_read, stats.files_skipped), (0, 1));
    assert_eq!(stats.events_inserted, 0);
}

#[cfg(unix)]
#[tokio::test]
async fn session_history_is_read_through_the_helper() {
    let dir = tempfile::tempdir().expect("tempdir");
    let line = format!(
        "{:<8} {:<12} {:<16} {}",
        "carlos", "pts/1", ":0", "Tue Jul 22 18:53 - 20:18  (01:25)"
    );
    std::fs::write(
        dir.path().join("wtmp"),
        format!("{line}\n\nwtmp begins Wed Jul  2 23:30:12 2014\n"),
    )
    .expect("write");

    let family = LogFamily::new(
        "login history",
        dir.path().join("wtmp"),
        "",
        DecoderKind::SessionHistory,
    );
    let (store, stats) = ingest(family, &SessionHelper::new("cat", Vec::new())).await;

    assert_eq!((stats.lines_read, stats.lines_skipped), (3, 2));
    assert_eq!(
        stored(&store, stats.source_id).await,
        vec![
            (at(7, 22, 18, 53, 0), format!("Log-in: {line}")),
            (at(7, 22, 20, 18, 0), format!("Log-off: {line}")),
        ]
    );
}

#[cfg(unix)]
#[tokio::test]
async fn failed_logins_run_the_helper_once_per_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let line = |day: u32| {
        format!(
            "{:<8} {:<12} {:<16} Tue Jul {day} 20:04    gone - no logout",
            "root", "ssh:notty", "10.0.0.7"
        )
    };
    std::fs::write(dir.path().join("btmp"), format!("{}\n", line(22))).expect("write");
    std::fs::write(dir.path().join("btmp.1"), format!("{}\n", line(15))).expect("write");

    let family = LogFamily::new(
        "failed logins",
        dir.path().join("btmp"),
        "",
        DecoderKind::FailedLogin,
    );
    let (store, stats) = ingest(family, &SessionHelper::new("cat", Vec::new())).await;

    assert_eq!(stats.files_read, 2);
    assert_eq!(
        stored(&store, stats.source_id).await,
        vec![
            (at(7, 15, 20, 4, 0), format!("Failed login: {}", line(15))),
            (at(7, 22, 20, 4, 0), format!("Failed login: {}", line(22))),
        ]
    );
}
