use chrono::NaiveDate;
use chrono::NaiveDateTime;
use tempfile::TempDir;

use super::LogStore;
use crate::STORE_DB_FILENAME;

/// Open a store backed by a file in a fresh temporary directory. Keep the
/// returned `TempDir` alive for as long as the store is used.
pub(super) async fn open_temp_store() -> (TempDir, LogStore) {
    let dir = TempDir::new().expect("temp dir");
    let store = LogStore::open(&dir.path().join(STORE_DB_FILENAME))
        .await
        .expect("open store");
    (dir, store)
}

pub(super) fn at(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, min, sec))
        .expect("valid timestamp")
}
