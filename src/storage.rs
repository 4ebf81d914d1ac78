use crate::errors::AppError;
use crate::models::{DailyLog, SubjectId, SubjectLog};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::Path;
use tokio::fs;
use tracing::{debug, error};

pub const DEFAULT_RETENTION: usize = 30;

/// Where daily logs live. The aggregation code never reads storage itself;
/// callers fetch through this and pass the logs in.
pub trait LogRepository {
    /// Logs for `subject` dated within `range`, oldest first.
    fn get(&self, subject: &SubjectId, range: RangeInclusive<NaiveDate>) -> Vec<DailyLog>;

    /// Stores `log`, replacing any existing entry for the same subject and date.
    fn put(&mut self, subject: &SubjectId, log: DailyLog);

    /// Every log for every subject.
    fn all(&self) -> Vec<SubjectLog>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogStore {
    #[serde(default)]
    subjects: BTreeMap<SubjectId, Vec<DailyLog>>,
    #[serde(skip, default = "default_retention")]
    retention: usize,
}

fn default_retention() -> usize {
    DEFAULT_RETENTION
}

impl Default for LogStore {
    fn default() -> Self {
        Self::with_retention(DEFAULT_RETENTION)
    }
}

impl LogStore {
    pub fn with_retention(retention: usize) -> Self {
        Self {
            subjects: BTreeMap::new(),
            retention: retention.max(1),
        }
    }

    pub fn set_retention(&mut self, retention: usize) {
        self.retention = retention.max(1);
        for logs in self.subjects.values_mut() {
            trim_to(logs, self.retention);
        }
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    pub fn find(&self, subject: &SubjectId, date: NaiveDate) -> Option<DailyLog> {
        self.subjects
            .get(subject)?
            .iter()
            .find(|log| log.date() == date)
            .copied()
    }

    /// All logs for one subject, oldest first.
    pub fn logs_for(&self, subject: &SubjectId) -> &[DailyLog] {
        self.subjects
            .get(subject)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl LogRepository for LogStore {
    fn get(&self, subject: &SubjectId, range: RangeInclusive<NaiveDate>) -> Vec<DailyLog> {
        self.logs_for(subject)
            .iter()
            .filter(|log| range.contains(&log.date()))
            .copied()
            .collect()
    }

    fn put(&mut self, subject: &SubjectId, log: DailyLog) {
        let logs = self.subjects.entry(subject.clone()).or_default();
        logs.retain(|existing| existing.date() != log.date());
        let at = logs.partition_point(|existing| existing.date() < log.date());
        logs.insert(at, log);
        trim_to(logs, self.retention);
    }

    fn all(&self) -> Vec<SubjectLog> {
        self.subjects
            .iter()
            .flat_map(|(subject, logs)| {
                logs.iter().map(move |log| SubjectLog {
                    subject: subject.clone(),
                    log: *log,
                })
            })
            .collect()
    }
}

// Keeps the newest `retention` entries of a date-sorted list.
fn trim_to(logs: &mut Vec<DailyLog>, retention: usize) {
    if logs.len() > retention {
        let excess = logs.len() - retention;
        logs.drain(..excess);
    }
}

pub async fn load_data(path: &Path, retention: usize) -> LogStore {
    let mut store = match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<LogStore>(&bytes) {
            Ok(store) => store,
            Err(err) => {
                error!("failed to parse data file: {err}");
                LogStore::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => LogStore::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            LogStore::default()
        }
    };
    for logs in store.subjects.values_mut() {
        logs.sort_by_key(|log| log.date());
        logs.dedup_by_key(|log| log.date());
    }
    store.set_retention(retention);
    debug!(subjects = store.subjects.len(), "loaded log store");
    store
}

pub async fn persist_data(path: &Path, store: &LogStore) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(store)?;
    fs::write(path, payload).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SymptomRatings;
    use chrono::Duration;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap() + Duration::days(offset)
    }

    fn log(offset: i64, pain: i64) -> DailyLog {
        DailyLog::new(day(offset), SymptomRatings::new(pain, 0, 0, 0).unwrap())
    }

    fn subject(id: &str) -> SubjectId {
        SubjectId::parse(id).unwrap()
    }

    #[test]
    fn put_replaces_same_day() {
        let mut store = LogStore::default();
        let ana = subject("ana");
        store.put(&ana, log(0, 1));
        store.put(&ana, log(0, 3));
        assert_eq!(store.logs_for(&ana).len(), 1);
        assert_eq!(store.find(&ana, day(0)).unwrap().total_score(), 3);
    }

    #[test]
    fn put_keeps_dates_sorted_and_subjects_apart() {
        let mut store = LogStore::default();
        let ana = subject("ana");
        let bo = subject("bo");
        store.put(&ana, log(5, 1));
        store.put(&ana, log(1, 1));
        store.put(&ana, log(3, 1));
        store.put(&bo, log(3, 2));
        let dates: Vec<_> = store.logs_for(&ana).iter().map(|l| l.date()).collect();
        assert_eq!(dates, vec![day(1), day(3), day(5)]);
        assert_eq!(store.logs_for(&bo).len(), 1);
        assert_eq!(store.all().len(), 4);
    }

    #[test]
    fn retention_drops_oldest() {
        let mut store = LogStore::default();
        let ana = subject("ana");
        for offset in 0..35 {
            store.put(&ana, log(offset, 1));
        }
        let logs = store.logs_for(&ana);
        assert_eq!(logs.len(), DEFAULT_RETENTION);
        assert_eq!(logs[0].date(), day(5));
        assert_eq!(logs[DEFAULT_RETENTION - 1].date(), day(34));
    }

    #[test]
    fn get_filters_by_range() {
        let mut store = LogStore::default();
        let ana = subject("ana");
        for offset in 0..10 {
            store.put(&ana, log(offset, 1));
        }
        assert_eq!(store.get(&ana, day(2)..=day(4)).len(), 3);
        assert!(store.get(&subject("nobody"), day(0)..=day(9)).is_empty());
    }

    #[test]
    fn store_json_round_trips_through_file_format() {
        let mut store = LogStore::default();
        store.put(&subject("ana"), log(0, 2));
        let json = serde_json::to_value(&store).unwrap();
        assert_eq!(json["subjects"]["ana"][0]["total_score"], 2);
        assert!(json.get("retention").is_none());
        let back: LogStore = serde_json::from_value(json).unwrap();
        assert_eq!(back.logs_for(&subject("ana")), store.logs_for(&subject("ana")));
        assert_eq!(back.retention(), DEFAULT_RETENTION);
    }

    #[tokio::test]
    async fn load_missing_file_starts_empty() {
        let mut path = std::env::temp_dir();
        path.push(format!("symptom_tracker_missing_{}.json", std::process::id()));
        let store = load_data(&path, 7).await;
        assert!(store.all().is_empty());
        assert_eq!(store.retention(), 7);
    }

    #[tokio::test]
    async fn load_corrupt_file_starts_empty() {
        let mut path = std::env::temp_dir();
        path.push(format!("symptom_tracker_corrupt_{}.json", std::process::id()));
        tokio::fs::write(&path, b"{ not json").await.unwrap();

        let store = load_data(&path, DEFAULT_RETENTION).await;
        assert!(store.all().is_empty());
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn load_sorts_and_dedups_hand_edited_file() {
        let mut path = std::env::temp_dir();
        path.push(format!("symptom_tracker_dupes_{}.json", std::process::id()));
        let raw = r#"{"subjects":{"ana":[
            {"date":"2026-01-03","pain":2},
            {"date":"2026-01-01","pain":1},
            {"date":"2026-01-03","pain":3}
        ]}}"#;
        tokio::fs::write(&path, raw).await.unwrap();

        let store = load_data(&path, DEFAULT_RETENTION).await;
        let logs = store.logs_for(&subject("ana"));
        let dates: Vec<_> = logs.iter().map(|l| l.date()).collect();
        assert_eq!(dates, vec![day(0), day(2)]);
        assert_eq!(logs[1].total_score(), 2);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn persist_then_load() {
        let mut path = std::env::temp_dir();
        path.push(format!("symptom_tracker_persist_{}.json", std::process::id()));
        let mut store = LogStore::default();
        store.put(&subject("ana"), log(0, 2));
        store.put(&subject("ana"), log(1, 3));
        persist_data(&path, &store).await.unwrap();

        let loaded = load_data(&path, 1).await;
        let logs = loaded.logs_for(&subject("ana"));
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].date(), day(1));
        let _ = std::fs::remove_file(&path);
    }
}
