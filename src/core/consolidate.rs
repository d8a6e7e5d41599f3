//! Task consolidation. The calendar and the duration analytics don't want
//! per-day snapshots, they want one continuous span per work item. This
//! groups every task instance across the whole history by persistent id and
//! collapses each group into a single span. Pure projection, recomputed on
//! every render, never persisted.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::{
    storage::entities::{DailyLog, Task, TaskStatus},
    utils::time::span_days,
};

/// Derived continuous-duration view of one work item.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidatedTaskSpan {
    pub persistent_id: String,
    /// Most recent snapshot wins for display.
    pub description: String,
    pub status: TaskStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_in_days: i64,
}

/// Collapses all task instances sharing a persistent id into one span each.
///
/// The span starts at the first instance's own start date, falling back to
/// the date of the earliest log it appears in. A resolved task ends at its
/// recorded end date (falling back to its last log's date); an open task
/// extends to `today` so it renders as ongoing. Output is sorted by
/// (start date, persistent id) so equal inputs produce equal output.
pub fn consolidate_tasks(logs: &[DailyLog], today: NaiveDate) -> Vec<ConsolidatedTaskSpan> {
    let mut by_identity: HashMap<&str, Vec<(NaiveDate, &Task)>> = HashMap::new();
    for log in logs {
        for task in &log.tasks {
            by_identity
                .entry(task.persistent_id.as_str())
                .or_default()
                .push((log.date, task));
        }
    }

    let mut spans: Vec<ConsolidatedTaskSpan> = by_identity
        .into_iter()
        .map(|(persistent_id, mut instances)| {
            instances.sort_by_key(|(date, _)| *date);
            let (first_date, first) = instances[0];
            let (last_date, last) = *instances.last().expect("group is never empty");

            let start_date = first.start_date.unwrap_or(first_date);
            let end_date = if last.status.is_resolved() {
                last.end_date.unwrap_or(last_date)
            } else {
                last_date.max(today)
            };
            // Tolerate drifted data where the recorded end precedes the start.
            let end_date = end_date.max(start_date);

            ConsolidatedTaskSpan {
                persistent_id: persistent_id.to_string(),
                description: last.description.clone(),
                status: last.status,
                start_date,
                end_date,
                duration_in_days: span_days(start_date, end_date),
            }
        })
        .collect();

    spans.sort_by(|a, b| {
        a.start_date
            .cmp(&b.start_date)
            .then_with(|| a.persistent_id.cmp(&b.persistent_id))
    });
    spans
}
