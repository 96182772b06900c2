//! Domain types shared by the storage backends and the HTTP layer.
//!
//! Field names serialize in camelCase, matching the JSON exchanged by the
//! `/jobs` endpoints.

use serde::{Deserialize, Serialize};

/// A job row as stored in the `jobs` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    /// Decimal fraction kept as text, e.g. `"0.05"`.
    pub equity: Option<String>,
    pub company_handle: String,
}

/// A job as returned by listing, joined with its company's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListing {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<String>,
    pub company_handle: String,
    pub company_name: Option<String>,
}

/// A single job with its company embedded in place of the handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<String>,
    pub company: Option<Company>,
}

/// A company as stored in the `companies` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

/// Data for creating a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<String>,
    pub company_handle: String,
}

impl NewJob {
    /// Creates a job payload with no salary or equity.
    #[must_use]
    pub fn new(title: impl Into<String>, company_handle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            salary: None,
            equity: None,
            company_handle: company_handle.into(),
        }
    }

    /// Sets the salary.
    #[must_use]
    pub fn with_salary(mut self, salary: i32) -> Self {
        self.salary = Some(salary);
        self
    }

    /// Sets the equity.
    #[must_use]
    pub fn with_equity(mut self, equity: impl Into<String>) -> Self {
        self.equity = Some(equity.into());
        self
    }
}

/// A partial update to a job.
///
/// The outer `Option` says whether a field is present in the update; for the
/// nullable columns the inner `Option` is the new value, so `Some(None)`
/// clears the column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobUpdate {
    pub title: Option<String>,
    pub salary: Option<Option<i32>>,
    pub equity: Option<Option<String>>,
}

impl JobUpdate {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_salary(mut self, salary: Option<i32>) -> Self {
        self.salary = Some(salary);
        self
    }

    #[must_use]
    pub fn with_equity(mut self, equity: Option<String>) -> Self {
        self.equity = Some(equity);
        self
    }

    /// Returns `true` if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.salary.is_none() && self.equity.is_none()
    }

    /// Applies this update to a job in place.
    pub fn apply_to(&self, job: &mut Job) {
        if let Some(title) = &self.title {
            job.title = title.clone();
        }
        if let Some(salary) = self.salary {
            job.salary = salary;
        }
        if let Some(equity) = &self.equity {
            job.equity = equity.clone();
        }
    }
}

/// Filters for listing jobs. All set filters must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    /// Case-insensitive substring of the title.
    pub title: Option<String>,
    /// Minimum salary, inclusive.
    pub min_salary: Option<i32>,
    /// When `true`, only jobs with equity greater than zero.
    pub has_equity: bool,
}

impl JobFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_min_salary(mut self, min_salary: i32) -> Self {
        self.min_salary = Some(min_salary);
        self
    }

    #[must_use]
    pub fn with_has_equity(mut self, has_equity: bool) -> Self {
        self.has_equity = has_equity;
        self
    }

    /// Returns `true` if the job passes every filter.
    ///
    /// Jobs with a NULL salary never pass a minimum salary filter, and jobs
    /// with a NULL equity never pass the equity filter.
    #[must_use]
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(title) = &self.title
            && !job.title.to_lowercase().contains(&title.to_lowercase())
        {
            return false;
        }
        if let Some(min) = self.min_salary
            && !job.salary.is_some_and(|salary| salary >= min)
        {
            return false;
        }
        if self.has_equity {
            let positive = job
                .equity
                .as_deref()
                .and_then(|e| e.parse::<f64>().ok())
                .is_some_and(|e| e > 0.0);
            if !positive {
                return false;
            }
        }
        true
    }
}
