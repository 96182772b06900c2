//! # jobly-storage
//!
//! Storage abstraction layer for the Jobly jobs service.
//!
//! This crate defines the trait and types that every storage backend must
//! implement. It does not contain any implementations - those live in
//! `jobly-db-postgres` and `jobly-db-memory`.
//!
//! ## Example
//!
//! ```ignore
//! use jobly_storage::{JobFilter, JobStorage, StorageError};
//!
//! async fn engineering_jobs(
//!     storage: &dyn JobStorage,
//! ) -> Result<Vec<jobly_storage::JobListing>, StorageError> {
//!     let filter = JobFilter::new().with_title("engineer").with_min_salary(50_000);
//!     storage.find_all(&filter).await
//! }
//! ```

mod error;
mod traits;
mod types;

pub use error::StorageError;
pub use traits::JobStorage;
pub use types::{Company, Job, JobDetail, JobFilter, JobListing, JobUpdate, NewJob};

/// Type alias for a shared storage trait object.
pub type DynStorage = std::sync::Arc<dyn JobStorage>;
