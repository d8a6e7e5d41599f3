use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;

/// Status of a task as recorded on one day. The wire strings match the
/// values the log file has always used, so existing files keep parsing.
#[derive(PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Clone, Copy)]
pub enum TaskStatus {
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Wait Review")]
    WaitReview,
    #[serde(rename = "Wait Test")]
    WaitTest,
    Done,
    Cancel,
}

impl TaskStatus {
    /// A resolved task stops being carried forward to later days.
    pub fn is_resolved(&self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Cancel)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::InProgress => "In Progress",
            TaskStatus::WaitReview => "Wait Review",
            TaskStatus::WaitTest => "Wait Test",
            TaskStatus::Done => "Done",
            TaskStatus::Cancel => "Cancel",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, Copy)]
pub enum PullRequestStatus {
    Reviewing,
    Approved,
    #[serde(rename = "Request Change")]
    RequestChange,
}

impl std::fmt::Display for PullRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PullRequestStatus::Reviewing => write!(f, "Reviewing"),
            PullRequestStatus::Approved => write!(f, "Approved"),
            PullRequestStatus::RequestChange => write!(f, "Request Change"),
        }
    }
}

/// An obstacle flagged on a task. Blockers are never removed automatically,
/// `resolved` just flips once the obstacle is cleared.
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
pub struct Blocker {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub resolved: bool,
}

/// One unit of work as recorded on one specific day.
///
/// `id` is unique per day-instance only. `persistent_id` is the stable
/// identity of the underlying work item: it equals `id` for the first-ever
/// instance and is copied verbatim onto every carried copy, never
/// recomputed. Lookups across days go through `persistent_id` and must
/// tolerate the link pointing at nothing.
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub persistent_id: String,
    pub description: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub blockers: Vec<Blocker>,
    /// Hours worked on this task on this day.
    #[serde(default)]
    pub time_spent: f64,
    /// Date the work item first appeared. Falls back to the date of the
    /// earliest log it shows up in when absent.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Set exactly when the status is Done or Cancel.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl Task {
    /// Whether any blocker on this task is still unresolved.
    pub fn has_active_blockers(&self) -> bool {
        self.blockers.iter().any(|b| !b.resolved)
    }

    /// Copy of this task carried over into the log for `date`. Time is
    /// tracked per actual day worked, so the copy starts at zero hours.
    pub fn carried_into(&self, date: NaiveDate) -> Task {
        Task {
            id: format!("carryover-{}-{}", self.persistent_id, date.format("%Y-%m-%d")),
            persistent_id: self.persistent_id.clone(),
            description: self.description.clone(),
            status: TaskStatus::InProgress,
            blockers: self.blockers.clone(),
            time_spent: 0.0,
            start_date: self.start_date,
            end_date: None,
        }
    }
}

#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub id: String,
    pub url: String,
    pub status: PullRequestStatus,
}

/// The log for one calendar date. `date` is the natural key, one log per
/// day, and never moves once the log exists.
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DailyLog {
    pub id: String,
    pub date: NaiveDate,
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub pull_requests: Vec<PullRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// A log as submitted by the user, before the store has assigned an id.
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewDailyLog {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub pull_requests: Vec<PullRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{Task, TaskStatus};

    const DAY: NaiveDate = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();

    #[test]
    fn carried_copy_resets_day_state() {
        let task = Task {
            id: "task-1".into(),
            persistent_id: "task-1".into(),
            description: "fix pagination".into(),
            status: TaskStatus::WaitReview,
            blockers: vec![],
            time_spent: 3.5,
            start_date: Some(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()),
            end_date: None,
        };

        let carried = task.carried_into(DAY);
        assert_eq!(carried.id, "carryover-task-1-2024-03-08");
        assert_eq!(carried.persistent_id, "task-1");
        assert_eq!(carried.status, TaskStatus::InProgress);
        assert_eq!(carried.time_spent, 0.0);
        assert_eq!(carried.end_date, None);
        assert_eq!(carried.start_date, task.start_date);
    }

    #[test]
    fn status_wire_names_are_stable() {
        let status: TaskStatus = serde_json::from_str("\"In Progress\"").unwrap();
        assert_eq!(status, TaskStatus::InProgress);
        assert_eq!(serde_json::to_string(&TaskStatus::WaitTest).unwrap(), "\"Wait Test\"");
        assert_eq!(serde_json::to_string(&TaskStatus::Done).unwrap(), "\"Done\"");
    }
}
