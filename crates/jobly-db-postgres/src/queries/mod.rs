//! SQL query modules for the PostgreSQL storage backend.

pub mod jobs;
pub mod sql;

pub use sql::{PartialUpdate, SqlValue, sql_for_partial_update};
