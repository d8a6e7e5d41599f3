use ansi_term::Style;
use anyhow::{bail, Result};

use crate::{
    core::{export::export_log_text, service::LogService},
    storage::{entities::DailyLog, log_store::LogStore},
    utils::time::format_date,
};

use super::{parse_cli_date, status_colour};

pub async fn print_history<S: LogStore>(
    service: &LogService<S>,
    limit: Option<usize>,
) -> Result<()> {
    let logs = service.load_logs().await?;
    if logs.is_empty() {
        println!("No logs yet.");
        return Ok(());
    }

    let shown = limit.unwrap_or(logs.len());
    for (index, log) in logs.iter().take(shown).enumerate() {
        print_log(log);

        if let Some(older) = logs.get(index + 1) {
            let gap = (log.date - older.date).num_days() - 1;
            if gap > 0 {
                println!(
                    "  ({gap} unlogged {} before {})\n",
                    if gap == 1 { "day" } else { "days" },
                    format_date(log.date)
                );
            }
        }
    }
    Ok(())
}

fn print_log(log: &DailyLog) {
    println!("{}", Style::new().bold().paint(format_date(log.date)));

    for task in &log.tasks {
        let colour = status_colour(task.status);
        print!(
            "  {}\t{}",
            colour.paint(format!("[{}]", task.status)),
            task.description
        );
        if task.time_spent > 0.0 {
            print!("\t{}h", task.time_spent);
        }
        println!();

        for blocker in &task.blockers {
            let mark = if blocker.resolved { "(resolved) " } else { "" };
            println!("      blocked: {mark}{}", blocker.description);
        }
    }

    for pr in &log.pull_requests {
        println!("  PR {} ({})", pr.url, pr.status);
    }

    if let Some(summary) = &log.summary {
        println!("  {summary}");
    }
    println!();
}

pub async fn print_export<S: LogStore>(
    service: &LogService<S>,
    date: Option<String>,
) -> Result<()> {
    let logs = service.load_logs().await?;

    let log = match date {
        Some(v) => {
            let date = parse_cli_date(&v)?;
            let Some(log) = logs.iter().find(|l| l.date == date) else {
                bail!("No log to export for {}", format_date(date));
            };
            log
        }
        // Logs come back newest first.
        None => match logs.first() {
            Some(log) => log,
            None => bail!("No logs yet."),
        },
    };

    let text = export_log_text(&logs, &log.id).expect("log id comes from the collection");
    println!("{text}");
    Ok(())
}
