use ansi_term::Style;
use anyhow::Result;
use chrono::NaiveDate;

use crate::{
    core::{
        analytics::{
            completed_per_day, frequent_blockers, key_metrics, missing_dates, status_distribution,
            time_ranking,
        },
        service::LogService,
    },
    storage::log_store::LogStore,
    utils::{percentage::count_percentage, time::format_date},
};

use super::status_colour;

const HEATMAP_WEEKS: usize = 5;
const RANKING_SIZE: usize = 5;
const RANKING_BAR_WIDTH: f64 = 30.0;

pub async fn print_summary<S: LogStore>(service: &LogService<S>) -> Result<()> {
    let logs = service.load_logs().await?;
    if logs.is_empty() {
        println!("No data available to generate a summary.");
        return Ok(());
    }

    let heading = Style::new().bold();

    let metrics = key_metrics(&logs);
    println!("{}", heading.paint("Key metrics"));
    println!("  Work items\t{}", metrics.total_tasks);
    println!("  Completed\t{}", metrics.completed);
    println!("  Active blockers\t{}", metrics.active_blockers);
    match metrics.avg_completion_days {
        Some(days) => println!("  Avg. completion\t{days:.1} days"),
        None => println!("  Avg. completion\tN/A"),
    }

    println!("\n{}", heading.paint("Status of work items"));
    let distribution = status_distribution(&logs);
    for (status, count) in &distribution {
        let share = count_percentage(*count, metrics.total_tasks);
        println!(
            "  {}\t{count}\t{share}",
            status_colour(*status).paint(status.as_str())
        );
    }

    println!("\n{}", heading.paint("Completed tasks, last 5 weeks"));
    print_heatmap(&logs, service.today());

    let ranking = time_ranking(&logs, RANKING_SIZE);
    if !ranking.is_empty() {
        println!("\n{}", heading.paint("Most time-consuming tasks"));
        let max_hours = ranking[0].hours;
        for entry in &ranking {
            let bar_length = (entry.hours / max_hours * RANKING_BAR_WIDTH).round() as usize;
            println!(
                "  {:5.1}h {} {}",
                entry.hours,
                "▪".repeat(bar_length.max(1)),
                entry.description
            );
        }
    }

    let blockers = frequent_blockers(&logs, RANKING_SIZE);
    if !blockers.is_empty() {
        println!("\n{}", heading.paint("Frequent blockers"));
        for (description, count) in &blockers {
            println!("  {count}x {description}");
        }
    }

    let missing = missing_dates(&logs);
    if !missing.is_empty() {
        println!("\n{} days in the logged range have no log.", missing.len());
    }
    Ok(())
}

fn print_heatmap(logs: &[crate::storage::entities::DailyLog], today: NaiveDate) {
    let days = completed_per_day(logs, today, (HEATMAP_WEEKS * 7) as u32);

    for week in days.chunks(7) {
        let Some((start, _)) = week.first() else {
            continue;
        };
        print!("  {} ", format_date(*start));
        for (_, count) in week {
            let cell = match count {
                0 => " ".to_string(),
                1 => "░".to_string(),
                2..=3 => "▒".to_string(),
                4..=5 => "▓".to_string(),
                _ => "█".to_string(),
            };
            print!("{}", ansi_term::Colour::Blue.paint(cell));
        }
        println!();
    }
}
