//! Standup-style text export of a single day's log, made to be pasted into
//! chat: what happened the day before, today's tasks, blockers and PRs.

use std::fmt::Write;

use crate::storage::entities::{DailyLog, PullRequest, Task};

/// Renders the log with `id` against the most recent log before it.
/// `logs` must be sorted newest first, the way the store hands them out.
/// Returns None when the id is unknown.
pub fn export_log_text(logs: &[DailyLog], id: &str) -> Option<String> {
    let index = logs.iter().position(|l| l.id == id)?;
    let log = &logs[index];
    let previous = logs.get(index + 1);

    let yesterday = previous.map_or_else(|| "-".to_string(), |p| format_tasks(&p.tasks));
    let today = format_tasks(&log.tasks);
    let blockers = format_blockers(&log.tasks);
    let prs = format_pull_requests(&log.pull_requests);

    Some(format!(
        "Yesterday:\n{yesterday}\n\nToday:\n{today}\n\nBlocker\n{blockers}\n\nPull Request: (require 1 pr / day)\n{prs}"
    ))
}

fn format_tasks(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "-".to_string();
    }
    tasks
        .iter()
        .map(|t| format!("- {} ({})", t.description, t.status))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_blockers(tasks: &[Task]) -> String {
    let mut lines = String::new();
    for task in tasks {
        for blocker in &task.blockers {
            if !lines.is_empty() {
                lines.push('\n');
            }
            write!(lines, "- {}: {}", task.description, blocker.description)
                .expect("writing to a string cannot fail");
            if blocker.resolved {
                lines.push_str(" (Resolved)");
            }
        }
    }
    if lines.is_empty() {
        "-".to_string()
    } else {
        lines
    }
}

fn format_pull_requests(pull_requests: &[PullRequest]) -> String {
    if pull_requests.is_empty() {
        return "-".to_string();
    }
    pull_requests
        .iter()
        .map(|pr| format!("- {} ({})", pr.url, pr.status))
        .collect::<Vec<_>>()
        .join("\n")
}
