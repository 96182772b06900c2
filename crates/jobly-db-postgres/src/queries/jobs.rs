//! SQL for the `jobs` table.
//!
//! `equity` is a `NUMERIC` column; it is always read back as `equity::text`
//! and written through a `::numeric` cast so no decimal type crosses the
//! driver boundary.

use sqlx_core::query_as::query_as;
use sqlx_postgres::{PgPool, Postgres};
use tracing::debug;

use jobly_storage::{Company, Job, JobDetail, JobFilter, JobListing, JobUpdate, NewJob, StorageError};

use super::sql::{BindValues, SqlValue, sql_for_partial_update};
use crate::error::{is_foreign_key_violation, query_error};

/// Columns returned for a job row, in `JobRow` order.
const JOB_COLUMNS: &str = "id, title, salary, equity::text AS equity, company_handle";

/// Wire field names that differ from their column names.
const JOB_FIELD_COLUMNS: &[(&str, &str)] = &[("companyHandle", "company_handle")];

/// (id, title, salary, equity, company_handle)
type JobRow = (i32, String, Option<i32>, Option<String>, String);

/// (id, title, salary, equity, company_handle, company_name)
type JobListingRow = (i32, String, Option<i32>, Option<String>, String, Option<String>);

/// (handle, name, description, num_employees, logo_url)
type CompanyRow = (String, String, String, Option<i32>, Option<String>);

fn job_from_row((id, title, salary, equity, company_handle): JobRow) -> Job {
    Job {
        id,
        title,
        salary,
        equity,
        company_handle,
    }
}

/// Escapes `LIKE` metacharacters so the title filter matches literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Builds the listing query and its parameters for a filter.
///
/// Conditions are joined with `AND`; placeholders are numbered in the order
/// the conditions are added. The title is a case-insensitive substring.
pub fn build_find_all_query(filter: &JobFilter) -> (String, Vec<SqlValue>) {
    let mut sql = String::from(
        "SELECT j.id, j.title, j.salary, j.equity::text AS equity, j.company_handle, \
         c.name AS company_name \
         FROM jobs j LEFT JOIN companies AS c ON c.handle = j.company_handle",
    );
    let mut conditions: Vec<String> = Vec::new();
    let mut params: Vec<SqlValue> = Vec::new();

    if let Some(title) = &filter.title {
        params.push(SqlValue::Text(Some(format!("%{}%", escape_like(title)))));
        conditions.push(format!("j.title ILIKE ${} ESCAPE '\\'", params.len()));
    }

    if let Some(min_salary) = filter.min_salary {
        params.push(SqlValue::Integer(Some(min_salary)));
        conditions.push(format!("j.salary >= ${}", params.len()));
    }

    if filter.has_equity {
        conditions.push("j.equity > 0".to_string());
    }

    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }

    sql.push_str(" ORDER BY j.title");

    (sql, params)
}

/// Converts an update into ordered `(field, value)` pairs.
fn update_fields(data: &JobUpdate) -> Vec<(&'static str, SqlValue)> {
    let mut fields = Vec::new();
    if let Some(title) = &data.title {
        fields.push(("title", SqlValue::Text(Some(title.clone()))));
    }
    if let Some(salary) = data.salary {
        fields.push(("salary", SqlValue::Integer(salary)));
    }
    if let Some(equity) = &data.equity {
        fields.push(("equity", SqlValue::Numeric(equity.clone())));
    }
    fields
}

/// Inserts a job and returns the stored row.
pub async fn create(pool: &PgPool, job: &NewJob) -> Result<Job, StorageError> {
    let sql = format!(
        "INSERT INTO jobs (title, salary, equity, company_handle) \
         VALUES ($1, $2, $3::numeric, $4) \
         RETURNING {JOB_COLUMNS}"
    );

    let row: JobRow = query_as(&sql)
        .bind(&job.title)
        .bind(job.salary)
        .bind(job.equity.as_deref())
        .bind(&job.company_handle)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                StorageError::invalid_resource(format!(
                    "Company not found: {}",
                    job.company_handle
                ))
            } else {
                query_error(e, "Failed to create job")
            }
        })?;

    Ok(job_from_row(row))
}

/// Lists jobs matching the filter, ordered by title.
pub async fn find_all(pool: &PgPool, filter: &JobFilter) -> Result<Vec<JobListing>, StorageError> {
    let (sql, params) = build_find_all_query(filter);
    debug!(sql = %sql, params = params.len(), "Listing jobs");

    let rows = query_as::<Postgres, JobListingRow>(&sql)
        .bind_values(&params)
        .fetch_all(pool)
        .await
        .map_err(|e| query_error(e, "Failed to list jobs"))?;

    Ok(rows
        .into_iter()
        .map(
            |(id, title, salary, equity, company_handle, company_name)| JobListing {
                id,
                title,
                salary,
                equity,
                company_handle,
                company_name,
            },
        )
        .collect())
}

/// Reads a job and its company.
pub async fn get(pool: &PgPool, id: i32) -> Result<JobDetail, StorageError> {
    let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1");

    let row: Option<JobRow> = query_as(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| query_error(e, "Failed to read job"))?;

    let job = job_from_row(row.ok_or_else(|| StorageError::job_not_found(id))?);

    let company: Option<CompanyRow> = query_as(
        "SELECT handle, name, description, num_employees, logo_url \
         FROM companies WHERE handle = $1",
    )
    .bind(&job.company_handle)
    .fetch_optional(pool)
    .await
    .map_err(|e| query_error(e, "Failed to read company"))?;

    Ok(JobDetail {
        id: job.id,
        title: job.title,
        salary: job.salary,
        equity: job.equity,
        company: company.map(
            |(handle, name, description, num_employees, logo_url)| Company {
                handle,
                name,
                description,
                num_employees,
                logo_url,
            },
        ),
    })
}

/// Applies a partial update and returns the updated row.
pub async fn update(pool: &PgPool, id: i32, data: &JobUpdate) -> Result<Job, StorageError> {
    let fields = update_fields(data);
    let update = sql_for_partial_update(&fields, JOB_FIELD_COLUMNS)?;

    let sql = format!(
        "UPDATE jobs SET {} WHERE id = ${} RETURNING {JOB_COLUMNS}",
        update.set_cols,
        update.next_placeholder()
    );

    let row = query_as::<Postgres, JobRow>(&sql)
        .bind_values(&update.values)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| query_error(e, "Failed to update job"))?;

    row.map(job_from_row)
        .ok_or_else(|| StorageError::job_not_found(id))
}

/// Deletes a job.
pub async fn remove(pool: &PgPool, id: i32) -> Result<(), StorageError> {
    let row: Option<(i32,)> = query_as("DELETE FROM jobs WHERE id = $1 RETURNING id")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| query_error(e, "Failed to delete job"))?;

    row.map(|_| ()).ok_or_else(|| StorageError::job_not_found(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_all_without_filters() {
        let (sql, params) = build_find_all_query(&JobFilter::new());
        assert!(!sql.contains("WHERE"));
        assert!(sql.contains("LEFT JOIN companies"));
        assert!(sql.ends_with("ORDER BY j.title"));
        assert!(params.is_empty());
    }

    #[test]
    fn find_all_with_every_filter() {
        let filter = JobFilter::new()
            .with_title("Eng")
            .with_min_salary(50_000)
            .with_has_equity(true);
        let (sql, params) = build_find_all_query(&filter);

        assert!(sql.contains(
            r"WHERE j.title ILIKE $1 ESCAPE '\' AND j.salary >= $2 AND j.equity > 0"
        ));
        assert_eq!(
            params,
            vec![
                SqlValue::Text(Some("%Eng%".into())),
                SqlValue::Integer(Some(50_000)),
            ]
        );
    }

    #[test]
    fn title_filter_escapes_like_wildcards() {
        let (_, params) = build_find_all_query(&JobFilter::new().with_title("%"));
        assert_eq!(params, vec![SqlValue::Text(Some(r"%\%%".into()))]);

        let (_, params) = build_find_all_query(&JobFilter::new().with_title(r"j_\x"));
        assert_eq!(params, vec![SqlValue::Text(Some(r"%j\_\\x%".into()))]);
    }

    #[test]
    fn find_all_numbers_placeholders_in_order() {
        let filter = JobFilter::new().with_min_salary(1).with_has_equity(true);
        let (sql, params) = build_find_all_query(&filter);
        assert!(sql.contains("WHERE j.salary >= $1 AND j.equity > 0"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn has_equity_false_adds_nothing() {
        let filter = JobFilter::new().with_has_equity(false);
        let (sql, _) = build_find_all_query(&filter);
        assert!(!sql.contains("equity >"));
    }

    #[test]
    fn update_fields_keep_field_order_and_nulls() {
        let data = JobUpdate::new()
            .with_title("New")
            .with_salary(None)
            .with_equity(Some("0.2".into()));
        let fields = update_fields(&data);
        assert_eq!(
            fields,
            vec![
                ("title", SqlValue::Text(Some("New".into()))),
                ("salary", SqlValue::Integer(None)),
                ("equity", SqlValue::Numeric(Some("0.2".into()))),
            ]
        );

        let update = sql_for_partial_update(&fields, JOB_FIELD_COLUMNS).unwrap();
        assert_eq!(
            update.set_cols,
            r#""title"=$1, "salary"=$2, "equity"=$3::numeric"#
        );
    }

    #[test]
    fn empty_update_has_no_fields() {
        assert!(update_fields(&JobUpdate::new()).is_empty());
    }
}
