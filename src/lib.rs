//! Personal daily work log kept in a single local file. Records tasks,
//! blockers and pull requests per day, carries unfinished tasks forward to
//! later days automatically, and renders history, a calendar of task spans
//! and aggregate summaries straight from the terminal.
//!

pub mod cli;
pub mod core;
pub mod error;
pub mod storage;
pub mod utils;
