use ansi_term::Style;
use anyhow::{anyhow, Result};
use chrono::{Datelike, Local, Months, NaiveDate};
use now::DateTimeNow;

use crate::{
    core::{consolidate::ConsolidatedTaskSpan, service::LogService},
    storage::log_store::LogStore,
    utils::time::date_range,
};

use super::status_colour;

const DESCRIPTION_WIDTH: usize = 24;

/// Gantt-style view of one month: a row per consolidated work item, a
/// column per day, bars colored by the item's latest status.
pub async fn print_calendar<S: LogStore>(
    service: &LogService<S>,
    month: Option<String>,
) -> Result<()> {
    let first = match month {
        Some(v) => parse_month(&v)?,
        None => Local::now().beginning_of_month().date_naive(),
    };
    let last = (first + Months::new(1))
        .pred_opt()
        .expect("month starts never underflow");

    let spans = service.consolidated_spans().await?;
    let visible: Vec<ConsolidatedTaskSpan> = spans
        .into_iter()
        .filter(|s| s.start_date <= last && s.end_date >= first)
        .collect();

    println!(
        "{}",
        Style::new().bold().paint(first.format("%B %Y").to_string())
    );
    if visible.is_empty() {
        println!("No tasks in this month.");
        return Ok(());
    }

    print_day_header(first, last);
    for span in &visible {
        print_span_row(span, first, last);
    }
    Ok(())
}

fn parse_month(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d")
        .map_err(|e| anyhow!("Failed to parse month {value:?}, expected YYYY-MM: {e}"))
}

fn print_day_header(first: NaiveDate, last: NaiveDate) {
    print!("{:DESCRIPTION_WIDTH$} ", "");
    for day in date_range(first, last) {
        let tens = day.day() / 10;
        print!("{}", if tens == 0 { ' ' } else { char::from(b'0' + tens as u8) });
    }
    println!();

    print!("{:DESCRIPTION_WIDTH$} ", "");
    for day in date_range(first, last) {
        print!("{}", day.day() % 10);
    }
    println!();
}

fn print_span_row(span: &ConsolidatedTaskSpan, first: NaiveDate, last: NaiveDate) {
    let mut description: String = span.description.chars().take(DESCRIPTION_WIDTH).collect();
    if description.len() < span.description.len() {
        description.pop();
        description.push('…');
    }
    print!("{description:DESCRIPTION_WIDTH$} ");

    let colour = status_colour(span.status);
    let mut bar = String::new();
    for day in date_range(first, last) {
        bar.push(if day >= span.start_date && day <= span.end_date {
            '█'
        } else {
            ' '
        });
    }
    println!(
        "{} {} ({} {})",
        colour.paint(bar),
        span.status,
        span.duration_in_days,
        if span.duration_in_days == 1 { "day" } else { "days" }
    );
}
