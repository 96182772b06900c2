//! Storage trait that all job storage backends must implement.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::types::{Job, JobDetail, JobFilter, JobListing, JobUpdate, NewJob};

/// The storage contract for jobs.
///
/// Implementations must be thread-safe (`Send + Sync`); the HTTP layer holds
/// one instance behind an `Arc` and calls it from every request.
///
/// # Example
///
/// ```ignore
/// use jobly_storage::{JobStorage, StorageError};
///
/// async fn title_of(storage: &dyn JobStorage, id: i32) -> Result<String, StorageError> {
///     Ok(storage.get(id).await?.title)
/// }
/// ```
#[async_trait]
pub trait JobStorage: Send + Sync {
    /// Creates a job and returns the persisted row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidResource` if the company does not exist
    /// or a column constraint rejects the data.
    async fn create(&self, job: &NewJob) -> Result<Job, StorageError>;

    /// Lists jobs matching every filter that is set, ordered by title.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues.
    async fn find_all(&self, filter: &JobFilter) -> Result<Vec<JobListing>, StorageError>;

    /// Reads a job and embeds its company.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if there is no job with this id.
    async fn get(&self, id: i32) -> Result<JobDetail, StorageError>;

    /// Applies a partial update and returns the updated row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidResource` if the update is empty and
    /// `StorageError::NotFound` if there is no job with this id.
    async fn update(&self, id: i32, data: &JobUpdate) -> Result<Job, StorageError>;

    /// Deletes a job.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if there is no job with this id.
    async fn remove(&self, id: i32) -> Result<(), StorageError>;

    /// Checks that the backend is reachable.
    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
