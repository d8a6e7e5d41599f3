//! Pre-storage validation. Anything rejected here never reaches the store.

use crate::{
    error::{Error, Result},
    storage::entities::NewDailyLog,
};

/// Drops blockers whose description is blank. Entered-but-empty blocker
/// rows carry no information, resolved or not, so they are discarded on
/// submit rather than persisted.
pub fn scrub_blockers(log: &mut NewDailyLog) {
    for task in &mut log.tasks {
        task.blockers.retain(|b| !b.description.trim().is_empty());
    }
}

pub fn validate_new_log(log: &NewDailyLog) -> Result<()> {
    if log.tasks.is_empty() {
        return Err(Error::Validation("a log needs at least one task".into()));
    }

    for task in &log.tasks {
        if task.description.trim().is_empty() {
            return Err(Error::Validation(format!(
                "task {} has an empty description",
                task.id
            )));
        }
        if !task.time_spent.is_finite() || task.time_spent < 0.0 {
            return Err(Error::Validation(format!(
                "task {:?} has an invalid time spent value {}",
                task.description, task.time_spent
            )));
        }
        if task.persistent_id.is_empty() {
            return Err(Error::Validation(format!(
                "task {} is missing its persistent id",
                task.id
            )));
        }

        // Resolved exactly when the end date is set.
        match (task.status.is_resolved(), task.end_date) {
            (true, None) => {
                return Err(Error::Validation(format!(
                    "task {:?} is {} but has no end date",
                    task.description, task.status
                )));
            }
            (false, Some(_)) => {
                return Err(Error::Validation(format!(
                    "task {:?} is still {} but carries an end date",
                    task.description, task.status
                )));
            }
            (true, Some(end)) => {
                if let Some(start) = task.start_date {
                    if end < start {
                        return Err(Error::Validation(format!(
                            "task {:?} ends before it starts",
                            task.description
                        )));
                    }
                }
            }
            (false, None) => {}
        }
    }

    for pr in &log.pull_requests {
        if !pr.url.starts_with("http") {
            return Err(Error::Validation(format!(
                "pull request url {:?} is not a link",
                pr.url
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::{
        error::Error,
        storage::entities::{
            Blocker, NewDailyLog, PullRequest, PullRequestStatus, Task, TaskStatus,
        },
    };

    use super::{scrub_blockers, validate_new_log};

    const DAY: NaiveDate = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();

    fn open_task(description: &str) -> Task {
        Task {
            id: "task-1".into(),
            persistent_id: "task-1".into(),
            description: description.into(),
            status: TaskStatus::InProgress,
            blockers: vec![],
            time_spent: 1.0,
            start_date: Some(DAY),
            end_date: None,
        }
    }

    fn new_log(tasks: Vec<Task>) -> NewDailyLog {
        NewDailyLog {
            date: Some(DAY),
            tasks,
            ..Default::default()
        }
    }

    #[test]
    fn empty_task_list_is_rejected() {
        let result = validate_new_log(&new_log(vec![]));
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn blank_description_is_rejected() {
        let result = validate_new_log(&new_log(vec![open_task("   ")]));
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn open_task_with_end_date_is_rejected() {
        let mut task = open_task("work");
        task.end_date = Some(DAY);
        let result = validate_new_log(&new_log(vec![task]));
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn resolved_task_without_end_date_is_rejected() {
        let mut task = open_task("work");
        task.status = TaskStatus::Done;
        let result = validate_new_log(&new_log(vec![task]));
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn end_before_start_is_rejected() {
        let mut task = open_task("work");
        task.status = TaskStatus::Done;
        task.end_date = Some(DAY.pred_opt().unwrap());
        let result = validate_new_log(&new_log(vec![task]));
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn malformed_pr_url_is_rejected() {
        let mut log = new_log(vec![open_task("work")]);
        log.pull_requests.push(PullRequest {
            id: "pr-1".into(),
            url: "not a url".into(),
            status: PullRequestStatus::Reviewing,
        });
        assert!(matches!(validate_new_log(&log), Err(Error::Validation(_))));
    }

    #[test]
    fn well_formed_log_passes() {
        let mut done = open_task("done work");
        done.status = TaskStatus::Done;
        done.end_date = Some(DAY);
        let mut log = new_log(vec![open_task("work"), done]);
        log.pull_requests.push(PullRequest {
            id: "pr-1".into(),
            url: "https://example.com/pr/1".into(),
            status: PullRequestStatus::Approved,
        });
        assert!(validate_new_log(&log).is_ok());
    }

    #[test]
    fn blank_blockers_are_scrubbed_even_when_resolved() {
        let mut task = open_task("work");
        task.blockers = vec![
            Blocker { id: "b1".into(), description: "waiting on infra".into(), resolved: false },
            Blocker { id: "b2".into(), description: "  ".into(), resolved: true },
        ];
        let mut log = new_log(vec![task]);

        scrub_blockers(&mut log);
        assert_eq!(log.tasks[0].blockers.len(), 1);
        assert_eq!(log.tasks[0].blockers[0].id, "b1");
    }
}
