//! Save/update/delete orchestration on top of the store. Every write to a
//! single day's log runs carry-over reconciliation before the caller gets
//! the collection back, so later days can never drift out of sync.

use chrono::NaiveDate;
use tracing::{debug, instrument};

use crate::{
    error::{Error, Result},
    storage::{
        entities::{DailyLog, NewDailyLog},
        log_store::{sort_descending, LogStore},
    },
    utils::clock::Clock,
};

use super::{
    consolidate::{consolidate_tasks, ConsolidatedTaskSpan},
    reconcile::reconcile_forward,
    validate::{scrub_blockers, validate_new_log},
};

pub struct LogService<S> {
    store: S,
    clock: Box<dyn Clock>,
}

impl<S: LogStore> LogService<S> {
    pub fn new(store: S, clock: Box<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Current date as the service sees it. Views that window on "today"
    /// take it from here, never from the system clock directly.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Full collection, newest first.
    pub async fn load_logs(&self) -> Result<Vec<DailyLog>> {
        let mut logs = self.store.fetch_all().await?;
        sort_descending(&mut logs);
        Ok(logs)
    }

    /// Persists one day's log and reconciles every later day against it.
    ///
    /// With `id_to_update` the existing record is replaced in place; its
    /// date stays whatever it was, editing a log never moves it to another
    /// day. Without an id a new log is created, defaulting to today.
    ///
    /// Returns the full, now-consistent collection sorted newest first. The
    /// single-log write, the reconciliation pass and the bulk re-write form
    /// one logical unit: if the bulk write fails the error propagates and
    /// the caller keeps its previous view, no partial carry-over is
    /// observable in the store thanks to the atomic [LogStore::replace_all].
    #[instrument(skip(self, log))]
    pub async fn save_or_update_log(
        &self,
        mut log: NewDailyLog,
        id_to_update: Option<&str>,
    ) -> Result<Vec<DailyLog>> {
        scrub_blockers(&mut log);
        validate_new_log(&log)?;

        let saved = match id_to_update {
            Some(id) => {
                let logs = self.store.fetch_all().await?;
                let existing = logs
                    .iter()
                    .find(|l| l.id == id)
                    .ok_or_else(|| Error::NotFound(id.to_string()))?;
                self.store
                    .replace(DailyLog {
                        id: existing.id.clone(),
                        date: existing.date,
                        tasks: log.tasks,
                        pull_requests: log.pull_requests,
                        summary: log.summary,
                    })
                    .await?
            }
            None => {
                if log.date.is_none() {
                    log.date = Some(self.clock.today());
                }
                self.store.insert(log).await?
            }
        };
        debug!("Saved log {} for {}", saved.id, saved.date);

        let current = self.store.fetch_all().await?;
        let outcome = reconcile_forward(&saved, current);
        if outcome.changed {
            self.store.replace_all(outcome.logs.clone()).await?;
        }
        Ok(outcome.logs)
    }

    pub async fn delete_log(&self, id: &str) -> Result<()> {
        self.store.remove(id).await
    }

    /// Consolidated per-work-item spans over the whole history, with open
    /// tasks extending to today.
    pub async fn consolidated_spans(&self) -> Result<Vec<ConsolidatedTaskSpan>> {
        let logs = self.load_logs().await?;
        Ok(consolidate_tasks(&logs, self.today()))
    }
}
