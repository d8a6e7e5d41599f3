//! Aggregate projections over the whole log history, backing the summary
//! view. Everything here reads the collection and produces derived values,
//! nothing writes.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};

use crate::{
    storage::entities::{DailyLog, Task, TaskStatus},
    utils::time::{date_range, span_days},
};

/// Total hours booked against one task description.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskTime {
    pub description: String,
    pub hours: f64,
}

/// Hours per task description across all days, heaviest first.
pub fn time_ranking(logs: &[DailyLog], top: usize) -> Vec<TaskTime> {
    let mut by_description = HashMap::<&str, f64>::new();
    for task in logs.iter().flat_map(|l| &l.tasks) {
        if task.time_spent > 0.0 {
            *by_description.entry(task.description.trim()).or_default() += task.time_spent;
        }
    }

    let mut ranking: Vec<TaskTime> = by_description
        .into_iter()
        .map(|(description, hours)| TaskTime {
            description: description.to_string(),
            hours,
        })
        .collect();
    ranking.sort_by(|a, b| {
        b.hours
            .partial_cmp(&a.hours)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.description.cmp(&b.description))
    });
    ranking.truncate(top);
    ranking
}

/// How often each blocker description shows up, most frequent first.
pub fn frequent_blockers(logs: &[DailyLog], top: usize) -> Vec<(String, usize)> {
    let mut counts = HashMap::<&str, usize>::new();
    for task in logs.iter().flat_map(|l| &l.tasks) {
        for blocker in &task.blockers {
            let description = blocker.description.trim();
            if !description.is_empty() {
                *counts.entry(description).or_default() += 1;
            }
        }
    }

    let mut blockers: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(description, count)| (description.to_string(), count))
        .collect();
    blockers.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    blockers.truncate(top);
    blockers
}

/// Done-task counts per day over the `days` days ending at `end`, oldest
/// first. Days without a log count as zero.
pub fn completed_per_day(logs: &[DailyLog], end: NaiveDate, days: u32) -> Vec<(NaiveDate, usize)> {
    let by_date: HashMap<NaiveDate, usize> = logs
        .iter()
        .map(|log| {
            let done = log.tasks.iter().filter(|t| t.status == TaskStatus::Done).count();
            (log.date, done)
        })
        .collect();

    let start = end - Duration::days(days as i64 - 1);
    date_range(start, end)
        .map(|date| (date, by_date.get(&date).copied().unwrap_or(0)))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyMetrics {
    /// Distinct work items over the whole history.
    pub total_tasks: usize,
    /// Work items whose latest snapshot is Done or Cancel.
    pub completed: usize,
    /// Open work items whose latest snapshot has an unresolved blocker.
    pub active_blockers: usize,
    /// Mean days from start to end over completed items, inclusive.
    pub avg_completion_days: Option<f64>,
}

/// The headline numbers of the summary view. The latest snapshot of each
/// work item wins; completion times need both a start and an end date.
pub fn key_metrics(logs: &[DailyLog]) -> KeyMetrics {
    let latest = latest_snapshots(logs);

    let mut completion_days = vec![];
    let mut spans = HashMap::<&str, (Option<NaiveDate>, Option<NaiveDate>)>::new();
    let mut ascending: Vec<&DailyLog> = logs.iter().collect();
    ascending.sort_by_key(|l| l.date);
    for log in ascending {
        for task in &log.tasks {
            let entry = spans.entry(task.persistent_id.as_str()).or_default();
            if let Some(start) = task.start_date {
                if entry.0.map_or(true, |current| start < current) {
                    entry.0 = Some(start);
                }
            }
            if task.status.is_resolved() {
                if let Some(end) = task.end_date {
                    entry.1 = Some(end);
                }
            }
        }
    }
    for (start, end) in spans.into_values() {
        if let (Some(start), Some(end)) = (start, end) {
            if end >= start {
                completion_days.push(span_days(start, end) as f64);
            }
        }
    }

    let completed = latest
        .values()
        .filter(|t| t.status.is_resolved())
        .count();
    let active_blockers = latest
        .values()
        .filter(|t| !t.status.is_resolved() && t.has_active_blockers())
        .count();
    let avg_completion_days = if completion_days.is_empty() {
        None
    } else {
        Some(completion_days.iter().sum::<f64>() / completion_days.len() as f64)
    };

    KeyMetrics {
        total_tasks: latest.len(),
        completed,
        active_blockers,
        avg_completion_days,
    }
}

/// Latest-snapshot status counts across all work items.
pub fn status_distribution(logs: &[DailyLog]) -> Vec<(TaskStatus, usize)> {
    let latest = latest_snapshots(logs);
    let mut counts = HashMap::<TaskStatus, usize>::new();
    for task in latest.values() {
        *counts.entry(task.status).or_default() += 1;
    }

    let mut distribution: Vec<(TaskStatus, usize)> = counts.into_iter().collect();
    distribution.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));
    distribution
}

/// Gaps in the history: dates strictly between the earliest and latest
/// logged day that have no log, oldest first.
pub fn missing_dates(logs: &[DailyLog]) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = logs.iter().map(|l| l.date).collect();
    dates.sort();
    dates.dedup();

    let Some((&first, &last)) = dates.first().zip(dates.last()) else {
        return vec![];
    };
    date_range(first, last)
        .filter(|d| dates.binary_search(d).is_err())
        .collect()
}

fn latest_snapshots(logs: &[DailyLog]) -> HashMap<&str, &Task> {
    let mut ascending: Vec<&DailyLog> = logs.iter().collect();
    ascending.sort_by_key(|l| l.date);

    let mut latest = HashMap::new();
    for log in ascending {
        for task in &log.tasks {
            latest.insert(task.persistent_id.as_str(), task);
        }
    }
    latest
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::storage::entities::{Blocker, DailyLog, Task, TaskStatus};

    use super::{
        completed_per_day, frequent_blockers, key_metrics, missing_dates, status_distribution,
        time_ranking,
    };

    const DAY_1: NaiveDate = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    const DAY_2: NaiveDate = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    const DAY_4: NaiveDate = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();

    fn task(persistent_id: &str, status: TaskStatus, time_spent: f64) -> Task {
        Task {
            id: persistent_id.into(),
            persistent_id: persistent_id.into(),
            description: format!("work on {persistent_id}"),
            status,
            blockers: vec![],
            time_spent,
            start_date: Some(DAY_1),
            end_date: if status.is_resolved() { Some(DAY_2) } else { None },
        }
    }

    fn log(date: NaiveDate, tasks: Vec<Task>) -> DailyLog {
        DailyLog {
            id: format!("log-{date}"),
            date,
            tasks,
            pull_requests: vec![],
            summary: None,
        }
    }

    #[test]
    fn time_ranking_sums_across_days() {
        let logs = vec![
            log(DAY_1, vec![task("a", TaskStatus::InProgress, 2.0)]),
            log(DAY_2, vec![task("a", TaskStatus::InProgress, 3.0), task("b", TaskStatus::InProgress, 4.0)]),
        ];

        let ranking = time_ranking(&logs, 10);
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].description, "work on a");
        assert_eq!(ranking[0].hours, 5.0);
    }

    #[test]
    fn frequent_blockers_counts_descriptions() {
        let mut blocked = task("a", TaskStatus::InProgress, 0.0);
        blocked.blockers = vec![Blocker {
            id: "b1".into(),
            description: "waiting on infra".into(),
            resolved: false,
        }];
        let logs = vec![log(DAY_1, vec![blocked.clone()]), log(DAY_2, vec![blocked])];

        let blockers = frequent_blockers(&logs, 5);
        assert_eq!(blockers, vec![("waiting on infra".to_string(), 2)]);
    }

    #[test]
    fn completed_per_day_fills_unlogged_days_with_zero() {
        let logs = vec![log(DAY_2, vec![task("a", TaskStatus::Done, 1.0)])];

        let counts = completed_per_day(&logs, DAY_4, 4);
        assert_eq!(counts.len(), 4);
        assert_eq!(counts[0], (DAY_1, 0));
        assert_eq!(counts[1], (DAY_2, 1));
        assert_eq!(counts[3], (DAY_4, 0));
    }

    #[test]
    fn key_metrics_use_latest_snapshots() {
        let mut blocked = task("b", TaskStatus::WaitTest, 0.0);
        blocked.blockers = vec![Blocker {
            id: "b1".into(),
            description: "flaky ci".into(),
            resolved: false,
        }];
        let logs = vec![
            log(DAY_1, vec![task("a", TaskStatus::InProgress, 1.0)]),
            // Task a completes on day 2, spanning two days inclusive.
            log(DAY_2, vec![task("a", TaskStatus::Done, 1.0), blocked]),
        ];

        let metrics = key_metrics(&logs);
        assert_eq!(metrics.total_tasks, 2);
        assert_eq!(metrics.completed, 1);
        assert_eq!(metrics.active_blockers, 1);
        assert_eq!(metrics.avg_completion_days, Some(2.0));
    }

    #[test]
    fn status_distribution_counts_work_items_once() {
        let logs = vec![
            log(DAY_1, vec![task("a", TaskStatus::InProgress, 0.0)]),
            log(DAY_2, vec![task("a", TaskStatus::Done, 0.0), task("b", TaskStatus::InProgress, 0.0)]),
        ];

        let distribution = status_distribution(&logs);
        assert_eq!(
            distribution,
            vec![(TaskStatus::Done, 1), (TaskStatus::InProgress, 1)]
        );
    }

    #[test]
    fn missing_dates_finds_gaps_between_logs() {
        let logs = vec![log(DAY_1, vec![]), log(DAY_4, vec![])];

        let missing = missing_dates(&logs);
        assert_eq!(
            missing,
            vec![DAY_2, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()]
        );
    }

    #[test]
    fn missing_dates_of_empty_history_is_empty() {
        assert!(missing_dates(&[]).is_empty());
    }
}
