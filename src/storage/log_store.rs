use std::{
    future::Future,
    io::{ErrorKind, Write},
    ops::Deref,
    path::PathBuf,
};

use chrono::{Local, Utc};
use fs4::tokio::AsyncFileExt;
use tokio::{fs::File, io::AsyncReadExt};
use tracing::{debug, warn};

use crate::error::{Error, Result};

use super::entities::{DailyLog, NewDailyLog};

/// Interface for abstracting storage of daily logs.
///
/// The whole collection lives under a single key, so every operation is a
/// read-modify-write of the full list. Reads fail open: a malformed payload
/// is treated as an empty collection rather than an error. Write failures
/// always propagate.
pub trait LogStore {
    /// Full collection, sorted by date descending. Persisted order is a
    /// convention only, readers re-sort.
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<DailyLog>>> + Send;

    /// Log for a specific date, if one exists.
    fn get(&self, date: chrono::NaiveDate) -> impl Future<Output = Result<Option<DailyLog>>> + Send;

    /// Upserts by date: assigns an id (and today's date when absent) to a
    /// new log, or replaces the record already holding that date.
    fn insert(&self, log: NewDailyLog) -> impl Future<Output = Result<DailyLog>> + Send;

    /// Replaces the record with the same id. Fails with [Error::NotFound]
    /// when no such record exists.
    fn replace(&self, log: DailyLog) -> impl Future<Output = Result<DailyLog>> + Send;

    fn remove(&self, id: &str) -> impl Future<Output = Result<()>> + Send;

    /// Atomic bulk overwrite of the full collection. Used after
    /// reconciliation so no partially carried-over state is observable.
    fn replace_all(&self, logs: Vec<DailyLog>) -> impl Future<Output = Result<()>> + Send;
}

impl<T: Deref + Sync> LogStore for T
where
    T::Target: LogStore + Sync,
{
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<DailyLog>>> + Send {
        self.deref().fetch_all()
    }

    fn get(&self, date: chrono::NaiveDate) -> impl Future<Output = Result<Option<DailyLog>>> + Send {
        self.deref().get(date)
    }

    fn insert(&self, log: NewDailyLog) -> impl Future<Output = Result<DailyLog>> + Send {
        self.deref().insert(log)
    }

    fn replace(&self, log: DailyLog) -> impl Future<Output = Result<DailyLog>> + Send {
        self.deref().replace(log)
    }

    fn remove(&self, id: &str) -> impl Future<Output = Result<()>> + Send {
        self.deref().remove(id)
    }

    fn replace_all(&self, logs: Vec<DailyLog>) -> impl Future<Output = Result<()>> + Send {
        self.deref().replace_all(logs)
    }
}

pub fn sort_descending(logs: &mut [DailyLog]) {
    logs.sort_by(|a, b| b.date.cmp(&a.date));
}

/// The main realization of [LogStore]. Keeps the whole collection as one
/// JSON array in a single file under the application directory.
pub struct JsonLogStore {
    path: PathBuf,
}

const LOG_FILE_NAME: &str = "daily_logs.json";

impl JsonLogStore {
    pub fn new(application_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&application_dir)?;

        Ok(Self {
            path: application_dir.join(LOG_FILE_NAME),
        })
    }

    /// Reads fail open: an unreadable or malformed payload becomes an
    /// empty collection with a warning, never an error for the caller.
    async fn read_collection(&self) -> Vec<DailyLog> {
        let payload = match self.read_payload().await {
            Ok(Some(v)) => v,
            Ok(None) => return vec![],
            Err(e) => {
                warn!("Failed to read log collection from {:?}: {e}", self.path);
                return vec![];
            }
        };

        let mut logs = match serde_json::from_str::<Vec<DailyLog>>(&payload) {
            Ok(v) => v,
            Err(e) => {
                // Might happen after a shutdown cutting off a write. Start
                // over from an empty collection instead of refusing to load.
                warn!("Malformed log collection in {:?}: {e}", self.path);
                vec![]
            }
        };
        sort_descending(&mut logs);
        logs
    }

    async fn read_payload(&self) -> std::io::Result<Option<String>> {
        let mut file = match File::open(&self.path).await {
            Ok(v) => v,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        debug!("Reading {:?}", self.path);

        file.lock_shared()?;
        let mut payload = String::new();
        let read_result = file.read_to_string(&mut payload).await;
        file.unlock_async().await?;
        read_result?;
        Ok(Some(payload))
    }

    /// Full-file overwrite through a temp file in the same directory, so a
    /// failed write never leaves a half-written collection behind.
    fn write_collection(&self, mut logs: Vec<DailyLog>) -> Result<()> {
        sort_descending(&mut logs);
        let payload = serde_json::to_vec_pretty(&logs)?;

        let dir = self.path.parent().ok_or_else(|| {
            Error::StorageWrite(std::io::Error::other("log file has no parent directory"))
        })?;
        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(&payload)?;
        temp.flush()?;
        temp.persist(&self.path).map_err(|e| Error::StorageWrite(e.error))?;
        Ok(())
    }
}

impl LogStore for JsonLogStore {
    async fn fetch_all(&self) -> Result<Vec<DailyLog>> {
        Ok(self.read_collection().await)
    }

    async fn get(&self, date: chrono::NaiveDate) -> Result<Option<DailyLog>> {
        let logs = self.read_collection().await;
        Ok(logs.into_iter().find(|l| l.date == date))
    }

    async fn insert(&self, log: NewDailyLog) -> Result<DailyLog> {
        let mut logs = self.read_collection().await;

        let saved = DailyLog {
            id: format!("log-{}", Utc::now().timestamp_millis()),
            date: log.date.unwrap_or_else(|| Local::now().date_naive()),
            tasks: log.tasks,
            pull_requests: log.pull_requests,
            summary: log.summary,
        };

        // One log per date: an insert for an already-logged date replaces
        // that day's record.
        logs.retain(|l| l.date != saved.date);
        logs.push(saved.clone());
        self.write_collection(logs)?;
        Ok(saved)
    }

    async fn replace(&self, log: DailyLog) -> Result<DailyLog> {
        let mut logs = self.read_collection().await;
        let Some(slot) = logs.iter_mut().find(|l| l.id == log.id) else {
            return Err(Error::NotFound(log.id));
        };
        *slot = log.clone();
        self.write_collection(logs)?;
        Ok(log)
    }

    async fn remove(&self, id: &str) -> Result<()> {
        let mut logs = self.read_collection().await;
        logs.retain(|l| l.id != id);
        self.write_collection(logs)?;
        Ok(())
    }

    async fn replace_all(&self, logs: Vec<DailyLog>) -> Result<()> {
        self.write_collection(logs)
    }
}

/// In-memory [LogStore] used by tests. `fail_bulk_writes` makes
/// [LogStore::replace_all] fail with a write error so the reconciliation
/// failure path can be exercised.
#[cfg(test)]
pub struct MemoryLogStore {
    logs: std::sync::Mutex<Vec<DailyLog>>,
    pub fail_bulk_writes: std::sync::atomic::AtomicBool,
}

#[cfg(test)]
impl MemoryLogStore {
    pub fn new(logs: Vec<DailyLog>) -> Self {
        Self {
            logs: std::sync::Mutex::new(logs),
            fail_bulk_writes: std::sync::atomic::AtomicBool::new(false),
        }
    }

    pub fn contents(&self) -> Vec<DailyLog> {
        self.logs.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl LogStore for MemoryLogStore {
    async fn fetch_all(&self) -> Result<Vec<DailyLog>> {
        let mut logs = self.logs.lock().unwrap().clone();
        sort_descending(&mut logs);
        Ok(logs)
    }

    async fn get(&self, date: chrono::NaiveDate) -> Result<Option<DailyLog>> {
        Ok(self.logs.lock().unwrap().iter().find(|l| l.date == date).cloned())
    }

    async fn insert(&self, log: NewDailyLog) -> Result<DailyLog> {
        let saved = DailyLog {
            id: format!("log-{}", Utc::now().timestamp_millis()),
            date: log.date.unwrap_or_else(|| Local::now().date_naive()),
            tasks: log.tasks,
            pull_requests: log.pull_requests,
            summary: log.summary,
        };
        let mut logs = self.logs.lock().unwrap();
        logs.retain(|l| l.date != saved.date);
        logs.push(saved.clone());
        Ok(saved)
    }

    async fn replace(&self, log: DailyLog) -> Result<DailyLog> {
        let mut logs = self.logs.lock().unwrap();
        let Some(slot) = logs.iter_mut().find(|l| l.id == log.id) else {
            return Err(Error::NotFound(log.id));
        };
        *slot = log.clone();
        Ok(log)
    }

    async fn remove(&self, id: &str) -> Result<()> {
        self.logs.lock().unwrap().retain(|l| l.id != id);
        Ok(())
    }

    async fn replace_all(&self, logs: Vec<DailyLog>) -> Result<()> {
        if self.fail_bulk_writes.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(Error::StorageWrite(std::io::Error::other("no space left")));
        }
        *self.logs.lock().unwrap() = logs;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use chrono::NaiveDate;
    use tempfile::tempdir;

    use crate::{
        error::Error,
        storage::entities::{DailyLog, NewDailyLog, Task, TaskStatus},
        utils::logging::TEST_LOGGING,
    };

    use super::{JsonLogStore, LogStore};

    const DAY_1: NaiveDate = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    const DAY_2: NaiveDate = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

    fn task(id: &str) -> Task {
        Task {
            id: id.into(),
            persistent_id: id.into(),
            description: format!("work on {id}"),
            status: TaskStatus::InProgress,
            blockers: vec![],
            time_spent: 1.0,
            start_date: Some(DAY_1),
            end_date: None,
        }
    }

    fn log(id: &str, date: NaiveDate) -> DailyLog {
        DailyLog {
            id: id.into(),
            date,
            tasks: vec![task(&format!("task-{id}"))],
            pull_requests: vec![],
            summary: None,
        }
    }

    fn open_store(dir: &tempfile::TempDir) -> anyhow::Result<JsonLogStore> {
        std::sync::LazyLock::force(&TEST_LOGGING);
        Ok(JsonLogStore::new(dir.path().to_owned())?)
    }

    #[tokio::test]
    async fn replace_all_round_trips() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let store = open_store(&dir)?;

        let logs = vec![log("a", DAY_1), log("b", DAY_2)];
        store.replace_all(logs.clone()).await?;

        let mut fetched = store.fetch_all().await?;
        fetched.sort_by(|a, b| a.date.cmp(&b.date));
        assert_eq!(fetched, logs);
        Ok(())
    }

    #[tokio::test]
    async fn fetch_all_sorts_descending_by_date() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let store = open_store(&dir)?;
        store.replace_all(vec![log("a", DAY_1), log("b", DAY_2)]).await?;

        let fetched = store.fetch_all().await?;
        assert_eq!(fetched[0].date, DAY_2);
        assert_eq!(fetched[1].date, DAY_1);
        Ok(())
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let store = open_store(&dir)?;
        assert!(store.fetch_all().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn malformed_payload_reads_as_empty() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let store = open_store(&dir)?;

        let mut file = std::fs::File::create(dir.path().join("daily_logs.json"))?;
        file.write_all(b"[{\"id\": \"log-1\", \"da")?;

        assert!(store.fetch_all().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn insert_assigns_id_and_upserts_by_date() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let store = open_store(&dir)?;

        let first = store
            .insert(NewDailyLog {
                date: Some(DAY_1),
                tasks: vec![task("a")],
                ..Default::default()
            })
            .await?;
        assert!(first.id.starts_with("log-"));
        assert_eq!(first.date, DAY_1);

        store
            .insert(NewDailyLog {
                date: Some(DAY_1),
                tasks: vec![task("b")],
                ..Default::default()
            })
            .await?;

        let logs = store.fetch_all().await?;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].tasks[0].persistent_id, "b");
        Ok(())
    }

    #[tokio::test]
    async fn replace_unknown_id_is_not_found() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let store = open_store(&dir)?;

        let result = store.replace(log("missing", DAY_1)).await;
        assert!(matches!(result, Err(Error::NotFound(id)) if id == "missing"));
        Ok(())
    }

    #[tokio::test]
    async fn remove_deletes_by_id() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let store = open_store(&dir)?;
        store.replace_all(vec![log("a", DAY_1), log("b", DAY_2)]).await?;

        store.remove("a").await?;

        let logs = store.fetch_all().await?;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].id, "b");
        Ok(())
    }

    #[tokio::test]
    async fn get_finds_by_date() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let store = open_store(&dir)?;
        store.replace_all(vec![log("a", DAY_1)]).await?;

        assert_eq!(store.get(DAY_1).await?.map(|l| l.id), Some("a".to_string()));
        assert_eq!(store.get(DAY_2).await?, None);
        Ok(())
    }
}
