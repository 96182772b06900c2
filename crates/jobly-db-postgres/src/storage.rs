//! PostgreSQL implementation of the `JobStorage` trait.

use async_trait::async_trait;
use sqlx_postgres::PgPool;
use tracing::instrument;

use jobly_storage::{
    Job, JobDetail, JobFilter, JobListing, JobStorage, JobUpdate, NewJob, StorageError,
};

use crate::config::PostgresConfig;
use crate::migrations;
use crate::pool;
use crate::queries::jobs;

/// PostgreSQL storage backend for jobs.
#[derive(Debug, Clone)]
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    /// Creates a new `PostgresStorage` with the given configuration.
    ///
    /// This will:
    /// 1. Create a connection pool
    /// 2. Run migrations (if configured)
    ///
    /// # Errors
    ///
    /// Returns an error if the connection pool cannot be created
    /// or if migrations fail.
    pub async fn new(config: PostgresConfig) -> Result<Self, StorageError> {
        let pool = pool::create_pool(&config).await?;

        if config.run_migrations {
            migrations::run(&pool).await?;
        }

        Ok(Self { pool })
    }

    /// Creates a new `PostgresStorage` from an existing connection pool.
    ///
    /// Migrations are not run automatically when using this constructor.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStorage for PostgresStorage {
    #[instrument(skip(self, job), fields(company_handle = %job.company_handle))]
    async fn create(&self, job: &NewJob) -> Result<Job, StorageError> {
        jobs::create(&self.pool, job).await
    }

    #[instrument(skip(self))]
    async fn find_all(&self, filter: &JobFilter) -> Result<Vec<JobListing>, StorageError> {
        jobs::find_all(&self.pool, filter).await
    }

    #[instrument(skip(self))]
    async fn get(&self, id: i32) -> Result<JobDetail, StorageError> {
        jobs::get(&self.pool, id).await
    }

    #[instrument(skip(self, data))]
    async fn update(&self, id: i32, data: &JobUpdate) -> Result<Job, StorageError> {
        jobs::update(&self.pool, id, data).await
    }

    #[instrument(skip(self))]
    async fn remove(&self, id: i32) -> Result<(), StorageError> {
        jobs::remove(&self.pool, id).await
    }

    async fn ping(&self) -> Result<(), StorageError> {
        pool::test_connection(&self.pool).await?;
        Ok(())
    }
}
