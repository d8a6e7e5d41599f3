//! Mutating commands. Each one edits a single day's log and goes through
//! [LogService::save_or_update_log], so carry-over reconciliation always
//! runs before the command reports success.

use anyhow::{anyhow, bail, Result};
use chrono::{Local, NaiveDate, Utc};

use crate::{
    core::service::LogService,
    storage::{
        entities::{Blocker, DailyLog, NewDailyLog, PullRequest, Task, TaskStatus},
        log_store::LogStore,
    },
    utils::time::format_date,
};

use super::{parse_cli_date, PrStatusArg, StatusArg};

fn resolve_date(date: Option<String>) -> Result<NaiveDate> {
    match date {
        Some(v) => parse_cli_date(&v),
        None => Ok(Local::now().date_naive()),
    }
}

fn as_new_log(log: &DailyLog) -> NewDailyLog {
    NewDailyLog {
        date: Some(log.date),
        tasks: log.tasks.clone(),
        pull_requests: log.pull_requests.clone(),
        summary: log.summary.clone(),
    }
}

pub async fn add_task<S: LogStore>(
    service: &LogService<S>,
    description: String,
    date: Option<String>,
    time_spent: f64,
    blockers: Vec<String>,
    status: StatusArg,
) -> Result<()> {
    let date = resolve_date(date)?;
    let status: TaskStatus = status.into();

    let millis = Utc::now().timestamp_millis();
    let task = Task {
        id: format!("task-{millis}"),
        persistent_id: format!("task-{millis}"),
        description,
        status,
        blockers: blockers
            .into_iter()
            .enumerate()
            .map(|(index, description)| Blocker {
                id: format!("blocker-{millis}-{index}"),
                description,
                resolved: false,
            })
            .collect(),
        time_spent,
        start_date: Some(date),
        end_date: status.is_resolved().then_some(date),
    };

    let existing = service.load_logs().await?.into_iter().find(|l| l.date == date);
    let logs = match existing {
        Some(log) => {
            let id = log.id.clone();
            let mut new_log = as_new_log(&log);
            new_log.tasks.push(task);
            service.save_or_update_log(new_log, Some(&id)).await?
        }
        None => {
            let new_log = NewDailyLog {
                date: Some(date),
                tasks: vec![task],
                ..Default::default()
            };
            service.save_or_update_log(new_log, None).await?
        }
    };

    println!("Recorded task on {} ({} logs total)", format_date(date), logs.len());
    Ok(())
}

pub async fn set_task_status<S: LogStore>(
    service: &LogService<S>,
    task: &str,
    status: StatusArg,
    date: Option<String>,
) -> Result<()> {
    let date = resolve_date(date)?;
    let status: TaskStatus = status.into();

    let logs = service.load_logs().await?;
    let Some(log) = logs.iter().find(|l| l.date == date) else {
        bail!("No log for {}", format_date(date));
    };

    let mut new_log = as_new_log(log);
    let slot = find_task_mut(&mut new_log.tasks, task)?;
    slot.status = status;
    slot.end_date = status.is_resolved().then_some(date);
    let description = slot.description.clone();

    service.save_or_update_log(new_log, Some(&log.id)).await?;
    println!("{:?} is now {status}", description);
    Ok(())
}

/// Matches by persistent id prefix first, then by description substring.
/// Refuses ambiguous matches rather than guessing.
fn find_task_mut<'a>(tasks: &'a mut [Task], query: &str) -> Result<&'a mut Task> {
    let query_lower = query.to_lowercase();
    let matching = |t: &Task| {
        t.persistent_id.starts_with(query) || t.description.to_lowercase().contains(&query_lower)
    };

    let count = tasks.iter().filter(|t| matching(t)).count();
    match count {
        0 => Err(anyhow!("No task matches {query:?}")),
        1 => Ok(tasks
            .iter_mut()
            .find(|t| matching(t))
            .expect("count checked above")),
        _ => Err(anyhow!("{count} tasks match {query:?}, be more specific")),
    }
}

pub async fn add_pull_request<S: LogStore>(
    service: &LogService<S>,
    url: String,
    status: PrStatusArg,
    date: Option<String>,
) -> Result<()> {
    let date = resolve_date(date)?;

    let logs = service.load_logs().await?;
    let Some(log) = logs.iter().find(|l| l.date == date) else {
        bail!("No log for {}, record a task first", format_date(date));
    };

    let mut new_log = as_new_log(log);
    new_log.pull_requests.push(PullRequest {
        id: format!("pr-{}", Utc::now().timestamp_millis()),
        url,
        status: status.into(),
    });

    service.save_or_update_log(new_log, Some(&log.id)).await?;
    println!("Recorded pull request on {}", format_date(date));
    Ok(())
}

pub async fn delete_log<S: LogStore>(service: &LogService<S>, date: &str) -> Result<()> {
    let date = parse_cli_date(date)?;

    let logs = service.load_logs().await?;
    let Some(log) = logs.iter().find(|l| l.date == date) else {
        bail!("No log for {}", format_date(date));
    };

    service.delete_log(&log.id).await?;
    println!("Deleted log for {}", format_date(date));
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::storage::entities::{Task, TaskStatus};

    use super::find_task_mut;

    fn task(persistent_id: &str, description: &str) -> Task {
        Task {
            id: persistent_id.into(),
            persistent_id: persistent_id.into(),
            description: description.into(),
            status: TaskStatus::InProgress,
            blockers: vec![],
            time_spent: 0.0,
            start_date: Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            end_date: None,
        }
    }

    #[test]
    fn finds_by_id_prefix_and_description() {
        let mut tasks = vec![task("task-17", "fix pagination"), task("task-29", "write docs")];

        assert_eq!(find_task_mut(&mut tasks, "task-17").unwrap().description, "fix pagination");
        assert_eq!(find_task_mut(&mut tasks, "docs").unwrap().persistent_id, "task-29");
    }

    #[test]
    fn ambiguous_or_missing_queries_fail() {
        let mut tasks = vec![task("task-17", "fix pagination"), task("task-18", "fix tests")];

        assert!(find_task_mut(&mut tasks, "task-1").is_err());
        assert!(find_task_mut(&mut tasks, "nothing here").is_err());
    }
}
