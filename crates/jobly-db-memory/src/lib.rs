//! In-memory job storage backend for the Jobly jobs service.
//!
//! This crate provides an in-memory implementation of the `JobStorage` trait
//! from `jobly-storage`, using papaya lock-free HashMap for concurrent access.
//! It is used by the test suite and for running the server without a
//! database.
//!
//! # Example
//!
//! ```ignore
//! use jobly_db_memory::InMemoryStorage;
//! use jobly_storage::{Company, JobStorage, NewJob};
//!
//! let storage = InMemoryStorage::new().with_companies([company]);
//! let job = storage.create(&NewJob::new("Engineer", "c1")).await?;
//! ```

mod storage;

pub use jobly_storage::{JobStorage, StorageError};
pub use storage::InMemoryStorage;
