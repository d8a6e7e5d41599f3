pub mod analytics;
pub mod consolidate;
pub mod export;
pub mod reconcile;
pub mod service;
pub mod validate;
