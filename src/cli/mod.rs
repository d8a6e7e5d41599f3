pub mod calendar;
pub mod history;
pub mod log_entry;
pub mod summary;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::level_filters::LevelFilter;

use crate::{
    core::service::LogService,
    storage::{
        entities::{PullRequestStatus, TaskStatus},
        log_store::JsonLogStore,
    },
    utils::{clock::DefaultClock, dir::create_application_default_path, logging::enable_logging},
};

#[derive(Parser, Debug)]
#[command(name = "Daylog", version, long_about = None)]
#[command(about = "Personal daily work log with automatic task carry-over", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Record a task on a day's log")]
    Add {
        description: String,
        #[arg(
            long,
            help = "Day to record on. Examples are \"yesterday\", \"2 days ago\", \"2025-03-15\". Defaults to today"
        )]
        date: Option<String>,
        #[arg(long = "time", default_value_t = 0.0, help = "Hours spent on the task today")]
        time_spent: f64,
        #[arg(long = "blocker", help = "Obstacle blocking the task. Can be given multiple times")]
        blockers: Vec<String>,
        #[arg(long, value_enum, default_value_t = StatusArg::InProgress)]
        status: StatusArg,
    },
    #[command(about = "Change the status of a task on a day's log")]
    Status {
        #[arg(help = "Task to change, matched by id prefix or description")]
        task: String,
        #[arg(value_enum)]
        status: StatusArg,
        #[arg(long, help = "Day whose log to change. Defaults to today")]
        date: Option<String>,
    },
    #[command(about = "Record a pull request on a day's log")]
    Pr {
        url: String,
        #[arg(long, value_enum, default_value_t = PrStatusArg::Reviewing)]
        status: PrStatusArg,
        #[arg(long, help = "Day to record on. Defaults to today")]
        date: Option<String>,
    },
    #[command(about = "Display logged days, newest first")]
    History {
        #[arg(long, help = "Show at most this many days")]
        limit: Option<usize>,
    },
    #[command(about = "Display a month of consolidated task spans")]
    Calendar {
        #[arg(long, help = "Month to display as YYYY-MM. Defaults to the current month")]
        month: Option<String>,
    },
    #[command(about = "Display an aggregate summary of the whole history")]
    Summary {},
    #[command(about = "Print copy-ready standup text for a day's log")]
    Export {
        #[arg(long, help = "Day to export. Defaults to the most recent log")]
        date: Option<String>,
    },
    #[command(about = "Delete the log for a date")]
    Delete { date: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    InProgress,
    WaitReview,
    WaitTest,
    Done,
    Cancel,
}

impl From<StatusArg> for TaskStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::InProgress => TaskStatus::InProgress,
            StatusArg::WaitReview => TaskStatus::WaitReview,
            StatusArg::WaitTest => TaskStatus::WaitTest,
            StatusArg::Done => TaskStatus::Done,
            StatusArg::Cancel => TaskStatus::Cancel,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PrStatusArg {
    Reviewing,
    Approved,
    RequestChange,
}

impl From<PrStatusArg> for PullRequestStatus {
    fn from(value: PrStatusArg) -> Self {
        match value {
            PrStatusArg::Reviewing => PullRequestStatus::Reviewing,
            PrStatusArg::Approved => PullRequestStatus::Approved,
            PrStatusArg::RequestChange => PullRequestStatus::RequestChange,
        }
    }
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let application_dir = match args.dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            dir
        }
        None => create_application_default_path()?,
    };

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(&application_dir, logging_level, args.log)?;

    let service = LogService::new(JsonLogStore::new(application_dir)?, Box::new(DefaultClock));

    match args.commands {
        Commands::Add {
            description,
            date,
            time_spent,
            blockers,
            status,
        } => log_entry::add_task(&service, description, date, time_spent, blockers, status).await,
        Commands::Status { task, status, date } => {
            log_entry::set_task_status(&service, &task, status, date).await
        }
        Commands::Pr { url, status, date } => {
            log_entry::add_pull_request(&service, url, status, date).await
        }
        Commands::History { limit } => history::print_history(&service, limit).await,
        Commands::Calendar { month } => calendar::print_calendar(&service, month).await,
        Commands::Summary {} => summary::print_summary(&service).await,
        Commands::Export { date } => history::print_export(&service, date).await,
        Commands::Delete { date } => log_entry::delete_log(&service, &date).await,
    }
}

/// Accepts both plain ISO dates and the human forms chrono-english knows,
/// like "yesterday" or "2 days ago".
pub(crate) fn parse_cli_date(value: &str) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    parse_date_string(value, Local::now(), chrono_english::Dialect::Uk)
        .map(|v| v.date_naive())
        .map_err(|e| anyhow!("Failed to parse date {value:?}: {e}"))
}

pub(crate) fn status_colour(status: TaskStatus) -> ansi_term::Colour {
    match status {
        TaskStatus::Done => ansi_term::Colour::Green,
        TaskStatus::InProgress => ansi_term::Colour::Blue,
        TaskStatus::WaitReview => ansi_term::Colour::Purple,
        TaskStatus::WaitTest => ansi_term::Colour::Yellow,
        TaskStatus::Cancel => ansi_term::Colour::Red,
    }
}
