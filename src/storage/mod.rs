pub mod entities;
pub mod log_store;
