use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use papaya::{Compute, HashMap as PapayaHashMap, Operation};
use tracing::debug;

use jobly_storage::{
    Company, Job, JobDetail, JobFilter, JobListing, JobStorage, JobUpdate, NewJob, StorageError,
};

/// In-memory job storage backed by papaya lock-free HashMaps.
///
/// Companies are not managed through `JobStorage`; seed them with
/// [`InMemoryStorage::with_companies`] or [`InMemoryStorage::add_company`].
/// Jobs referencing an unknown company are rejected, and removing a company
/// is not supported, so every stored job always has its company.
#[derive(Debug)]
pub struct InMemoryStorage {
    jobs: PapayaHashMap<i32, Job>,
    companies: PapayaHashMap<String, Company>,
    /// Next job id, starting at 1 like a SERIAL column.
    next_id: AtomicI32,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self {
            jobs: PapayaHashMap::new(),
            companies: PapayaHashMap::new(),
            next_id: AtomicI32::new(1),
        }
    }

    /// Seeds the storage with companies.
    #[must_use]
    pub fn with_companies(self, companies: impl IntoIterator<Item = Company>) -> Self {
        for company in companies {
            self.add_company(company);
        }
        self
    }

    /// Adds or replaces a company.
    pub fn add_company(&self, company: Company) {
        self.companies.pin().insert(company.handle.clone(), company);
    }

    /// Returns the number of stored jobs.
    pub fn len(&self) -> usize {
        self.jobs.pin().len()
    }

    /// Returns `true` if no jobs are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn next_id(&self) -> i32 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

/// Applies the column constraints of the `jobs` table.
fn check_constraints(salary: Option<i32>, equity: Option<&str>) -> Result<(), StorageError> {
    if let Some(salary) = salary
        && salary < 0
    {
        return Err(StorageError::invalid_resource(
            "salary must be greater than or equal to 0",
        ));
    }
    if let Some(equity) = equity {
        let value: f64 = equity
            .parse()
            .map_err(|_| StorageError::invalid_resource(format!("invalid equity: {equity}")))?;
        if !(0.0..=1.0).contains(&value) {
            return Err(StorageError::invalid_resource(
                "equity must be between 0 and 1",
            ));
        }
    }
    Ok(())
}

#[async_trait]
impl JobStorage for InMemoryStorage {
    async fn create(&self, job: &NewJob) -> Result<Job, StorageError> {
        if self.companies.pin().get(&job.company_handle).is_none() {
            return Err(StorageError::invalid_resource(format!(
                "Company not found: {}",
                job.company_handle
            )));
        }
        check_constraints(job.salary, job.equity.as_deref())?;

        let stored = Job {
            id: self.next_id(),
            title: job.title.clone(),
            salary: job.salary,
            equity: job.equity.clone(),
            company_handle: job.company_handle.clone(),
        };
        self.jobs.pin().insert(stored.id, stored.clone());

        debug!(id = stored.id, "Created job");
        Ok(stored)
    }

    async fn find_all(&self, filter: &JobFilter) -> Result<Vec<JobListing>, StorageError> {
        let companies = self.companies.pin();
        let mut listings: Vec<JobListing> = self
            .jobs
            .pin()
            .iter()
            .filter(|(_, job)| filter.matches(job))
            .map(|(_, job)| JobListing {
                id: job.id,
                title: job.title.clone(),
                salary: job.salary,
                equity: job.equity.clone(),
                company_handle: job.company_handle.clone(),
                company_name: companies.get(&job.company_handle).map(|c| c.name.clone()),
            })
            .collect();

        listings.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(listings)
    }

    async fn get(&self, id: i32) -> Result<JobDetail, StorageError> {
        let job = self
            .jobs
            .pin()
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::job_not_found(id))?;
        let company = self.companies.pin().get(&job.company_handle).cloned();

        Ok(JobDetail {
            id: job.id,
            title: job.title,
            salary: job.salary,
            equity: job.equity,
            company,
        })
    }

    async fn update(&self, id: i32, data: &JobUpdate) -> Result<Job, StorageError> {
        if data.is_empty() {
            return Err(StorageError::invalid_resource("No data"));
        }

        // Single read-modify-write; a removed job is never written back.
        let jobs = self.jobs.pin();
        let result = jobs.compute(id, |entry| {
            let Some((_, current)) = entry else {
                return Operation::Abort(StorageError::job_not_found(id));
            };
            let mut job = current.clone();
            data.apply_to(&mut job);
            match check_constraints(job.salary, job.equity.as_deref()) {
                Ok(()) => Operation::Insert(job),
                Err(err) => Operation::Abort(err),
            }
        });

        match result {
            Compute::Updated { new: (_, job), .. } | Compute::Inserted(_, job) => Ok(job.clone()),
            Compute::Aborted(err) => Err(err),
            Compute::Removed(..) => Err(StorageError::internal("job removed during update")),
        }
    }

    async fn remove(&self, id: i32) -> Result<(), StorageError> {
        self.jobs
            .pin()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StorageError::job_not_found(id))
    }
}
