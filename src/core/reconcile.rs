//! Carry-over reconciliation. After a day's log is saved or edited, every
//! later day must agree with it: unresolved tasks are carried forward,
//! resolved ones stop appearing, and copies that were closed independently
//! on a later day are reopened. Reconciliation only ever looks forward in
//! time. A day's recorded state is a point-in-time snapshot, so editing a
//! past log never rewrites the days before it.

use tracing::debug;

use crate::storage::{
    entities::{DailyLog, TaskStatus},
    log_store::sort_descending,
};

pub struct ReconcileOutcome {
    /// Full collection, sorted descending by date, with carry-over applied.
    pub logs: Vec<DailyLog>,
    /// Whether any future log's task list was mutated. Only then is a bulk
    /// re-write of the collection needed.
    pub changed: bool,
}

/// Propagates the state of `saved` into every strictly later log.
///
/// For each task of the saved log and each future log:
/// - future copy exists, saved task resolved: the copy is removed,
/// - future copy exists but was closed on that later day while the saved
///   task is still open: the copy is reopened (the earlier day wins for the
///   open/closed state it propagates forward),
/// - no future copy and the saved task is open: a fresh carried instance is
///   inserted with a deterministic per-day id.
///
/// Pure with respect to storage. Future logs are processed in ascending
/// date order; each is handled independently, so the order only matters for
/// reproducibility. Running this twice over its own output changes nothing.
pub fn reconcile_forward(saved: &DailyLog, mut logs: Vec<DailyLog>) -> ReconcileOutcome {
    logs.sort_by(|a, b| a.date.cmp(&b.date));

    let mut changed = false;
    for log in logs.iter_mut().filter(|l| l.date > saved.date) {
        if reconcile_into(saved, log) {
            debug!("Carry-over changed log {} ({})", log.id, log.date);
            changed = true;
        }
    }

    sort_descending(&mut logs);
    ReconcileOutcome { logs, changed }
}

fn reconcile_into(saved: &DailyLog, future: &mut DailyLog) -> bool {
    let mut changed = false;

    for task in &saved.tasks {
        let resolved = task.status.is_resolved();
        let existing = future
            .tasks
            .iter()
            .position(|t| t.persistent_id == task.persistent_id);

        match existing {
            Some(index) if resolved => {
                // The work is finished, stop carrying it forward.
                future.tasks.remove(index);
                changed = true;
            }
            Some(index) => {
                let copy = &mut future.tasks[index];
                if copy.status.is_resolved() {
                    copy.status = TaskStatus::InProgress;
                    copy.end_date = None;
                    changed = true;
                }
            }
            None if !resolved => {
                future.tasks.push(task.carried_into(future.date));
                changed = true;
            }
            None => {}
        }
    }

    changed
}
