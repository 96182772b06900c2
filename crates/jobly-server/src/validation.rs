//! Request validation for the `/jobs` endpoints.
//!
//! Validation runs in two passes. The first walks the raw JSON (or query
//! string), checking types, required and unknown properties. The values that
//! survive are then checked against the field rules declared on
//! [`JobFields`] and [`SearchParams`]. Every failure adds one message and a
//! request with any failures is rejected with all of them at once. Messages
//! follow the wording of JSON Schema validators, e.g.
//! `instance.salary is not of a type(s) integer,null`.

use std::collections::HashMap;
use std::sync::LazyLock;

use jobly_api::ApiError;
use jobly_storage::{JobFilter, JobUpdate, NewJob};
use regex::Regex;
use serde_json::{Map, Value};
use validator::{Validate, ValidationError, ValidationErrors};

/// A decimal between 0 and 1 inclusive.
pub const EQUITY_PATTERN: &str = r"^(0|0?\.[0-9]+|1(\.0+)?)$";

static EQUITY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EQUITY_PATTERN).expect("Invalid equity regex"));

const SEARCH_KEYS: &[&str] = &["title", "minSalary", "hasEquity"];
const NEW_JOB_KEYS: &[&str] = &["title", "salary", "equity", "companyHandle"];
const UPDATE_JOB_KEYS: &[&str] = &["title", "salary", "equity"];

/// Struct field to wire name, in message order.
const WIRE_NAMES: &[(&str, &str)] = &[
    ("title", "title"),
    ("min_salary", "minSalary"),
    ("salary", "salary"),
    ("equity", "equity"),
    ("company_handle", "companyHandle"),
];

/// Job body fields that passed the type checks.
///
/// For the nullable columns `Some(None)` is an explicit null.
#[derive(Debug, Default, Validate)]
pub struct JobFields {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[validate(range(min = 0, max = 2147483647))]
    pub salary: Option<Option<i64>>,
    #[validate(regex(path = *EQUITY_REGEX))]
    pub equity: Option<Option<String>>,
    #[validate(length(min = 1, max = 25))]
    pub company_handle: Option<String>,
}

/// Listing filters that passed the type checks.
#[derive(Debug, Default, Validate)]
pub struct SearchParams {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[validate(range(min = 0.0, max = 2147483647.0))]
    pub min_salary: Option<f64>,
    pub has_equity: bool,
}

#[derive(Debug, Default)]
struct Errors(Vec<String>);

impl Errors {
    fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    fn into_result<T>(self, value: T) -> Result<T, ApiError> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            Err(ApiError::validation(self.0))
        }
    }

    fn additional_properties<'a>(&mut self, keys: impl Iterator<Item = &'a String>, allowed: &[&str]) {
        let mut unknown: Vec<&String> = keys.filter(|k| !allowed.contains(&k.as_str())).collect();
        unknown.sort();
        for key in unknown {
            self.push(format!(
                "instance is not allowed to have the additional property \"{key}\""
            ));
        }
    }

    fn type_error(&mut self, field: &str, types: &str) {
        self.push(format!("instance.{field} is not of a type(s) {types}"));
    }

    /// Adds one message per broken field rule.
    fn field_rules(&mut self, result: Result<(), ValidationErrors>) {
        let Err(failures) = result else {
            return;
        };
        let mut fields: Vec<_> = failures.field_errors().into_iter().collect();
        fields.sort_by_key(|(name, _)| wire_name(name).0);
        for (name, list) in fields {
            let (_, wire) = wire_name(&name);
            for err in list.iter() {
                self.push(describe(wire, err));
            }
        }
    }
}

fn wire_name(field: &str) -> (usize, &str) {
    WIRE_NAMES
        .iter()
        .enumerate()
        .find(|(_, (name, _))| *name == field)
        .map_or((WIRE_NAMES.len(), field), |(pos, (_, wire))| (pos, *wire))
}

fn param(err: &ValidationError, key: &str) -> Option<f64> {
    err.params.get(key).and_then(Value::as_f64)
}

fn describe(field: &str, err: &ValidationError) -> String {
    match err.code.as_ref() {
        "length" => {
            let len = err
                .params
                .get("value")
                .and_then(Value::as_str)
                .map_or(0, |s| s.chars().count());
            match (param(err, "min"), param(err, "max")) {
                (Some(min), _) if (len as f64) < min => {
                    format!("instance.{field} does not meet minimum length of {min}")
                }
                (_, Some(max)) => format!("instance.{field} does not meet maximum length of {max}"),
                _ => format!("instance.{field} has an invalid length"),
            }
        }
        "range" => match (param(err, "value"), param(err, "min"), param(err, "max")) {
            (Some(value), Some(min), _) if value < min => {
                format!("instance.{field} must be greater than or equal to {min}")
            }
            (_, _, Some(max)) => format!("instance.{field} must be less than or equal to {max}"),
            _ => format!("instance.{field} is out of range"),
        },
        "regex" => format!("instance.{field} does not match pattern \"{EQUITY_PATTERN}\""),
        code => format!("instance.{field} failed {code}"),
    }
}

/// Parses a job id from the path.
pub fn parse_job_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>()
        .map_err(|_| ApiError::bad_request(format!("Invalid job id: {raw}")))
}

/// Integral numbers only; `5.0` and `1e3` are accepted like any number
/// with no fractional part.
fn parse_integral(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.fract() == 0.0)
}

/// Builds a listing filter from the query string.
///
/// `minSalary` must be a non-negative integer. `hasEquity` is only `true`
/// for the literal `"true"`; any other value means no equity filter.
pub fn job_filter_from_query(query: &HashMap<String, String>) -> Result<JobFilter, ApiError> {
    let mut errors = Errors::default();
    errors.additional_properties(query.keys(), SEARCH_KEYS);

    let mut params = SearchParams {
        title: query.get("title").cloned(),
        has_equity: query.get("hasEquity").is_some_and(|v| v == "true"),
        ..SearchParams::default()
    };
    if let Some(raw) = query.get("minSalary") {
        match parse_integral(raw) {
            Some(min) => params.min_salary = Some(min),
            None => errors.type_error("minSalary", "integer"),
        }
    }

    errors.field_rules(params.validate());
    errors.into_result(())?;

    Ok(JobFilter {
        title: params.title,
        // within i32 after the range rule
        min_salary: params.min_salary.map(|min| min as i32),
        has_equity: params.has_equity,
    })
}

fn as_object(body: &Value) -> Result<&Map<String, Value>, ApiError> {
    body.as_object()
        .ok_or_else(|| ApiError::validation(vec!["instance is not of a type(s) object".into()]))
}

fn read_string(field: &str, value: &Value, errors: &mut Errors) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        _ => {
            errors.type_error(field, "string");
            None
        }
    }
}

fn read_salary(value: &Value, errors: &mut Errors) -> Option<Option<i64>> {
    match value {
        Value::Null => Some(None),
        Value::Number(n) if n.is_i64() || n.is_u64() => match n.as_i64() {
            Some(v) => Some(Some(v)),
            None => {
                errors.push(format!(
                    "instance.salary must be less than or equal to {}",
                    i32::MAX
                ));
                None
            }
        },
        _ => {
            errors.type_error("salary", "integer,null");
            None
        }
    }
}

fn read_equity(value: &Value, errors: &mut Errors) -> Option<Option<String>> {
    match value {
        Value::Null => Some(None),
        Value::String(s) => Some(Some(s.clone())),
        _ => {
            errors.type_error("equity", "string,null");
            None
        }
    }
}

impl JobFields {
    /// Reads the `allowed` job properties from a body, recording type errors.
    fn read(obj: &Map<String, Value>, allowed: &[&str], errors: &mut Errors) -> Self {
        let get = |key: &str| {
            if allowed.contains(&key) {
                obj.get(key)
            } else {
                None
            }
        };
        Self {
            title: get("title").and_then(|v| read_string("title", v, errors)),
            salary: get("salary").and_then(|v| read_salary(v, errors)),
            equity: get("equity").and_then(|v| read_equity(v, errors)),
            company_handle: get("companyHandle")
                .and_then(|v| read_string("companyHandle", v, errors)),
        }
    }

    fn salary_i32(&self) -> Result<Option<Option<i32>>, ApiError> {
        self.salary
            .map(|salary| {
                salary
                    .map(|v| {
                        i32::try_from(v).map_err(|_| {
                            ApiError::validation(vec![format!(
                                "instance.salary must be less than or equal to {}",
                                i32::MAX
                            )])
                        })
                    })
                    .transpose()
            })
            .transpose()
    }
}

/// Validates the body of `POST /jobs`.
pub fn new_job_from_body(body: &Value) -> Result<NewJob, ApiError> {
    let obj = as_object(body)?;
    let mut errors = Errors::default();
    for required in ["title", "companyHandle"] {
        if !obj.contains_key(required) {
            errors.push(format!("instance requires property \"{required}\""));
        }
    }
    errors.additional_properties(obj.keys(), NEW_JOB_KEYS);

    let fields = JobFields::read(obj, NEW_JOB_KEYS, &mut errors);
    errors.field_rules(fields.validate());
    errors.into_result(())?;

    let salary = fields.salary_i32()?.flatten();
    match (fields.title, fields.company_handle) {
        (Some(title), Some(company_handle)) => Ok(NewJob {
            title,
            salary,
            equity: fields.equity.flatten(),
            company_handle,
        }),
        _ => Err(ApiError::validation(vec![
            "instance requires property \"title\"".into(),
        ])),
    }
}

/// Validates the body of `PATCH /jobs/{id}`.
///
/// `companyHandle` and `id` cannot be changed and are rejected like any
/// other unknown property.
pub fn job_update_from_body(body: &Value) -> Result<JobUpdate, ApiError> {
    let obj = as_object(body)?;
    let mut errors = Errors::default();
    if obj.is_empty() {
        errors.push("instance does not meet minimum property length of 1");
    }
    errors.additional_properties(obj.keys(), UPDATE_JOB_KEYS);

    let fields = JobFields::read(obj, UPDATE_JOB_KEYS, &mut errors);
    errors.field_rules(fields.validate());
    errors.into_result(())?;

    Ok(JobUpdate {
        salary: fields.salary_i32()?,
        title: fields.title,
        equity: fields.equity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn messages(err: ApiError) -> Vec<String> {
        match err {
            ApiError::Validation(messages) => messages,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn search_accepts_known_filters() {
        let filter = job_filter_from_query(&query(&[
            ("title", "eng"),
            ("minSalary", "100"),
            ("hasEquity", "true"),
        ]))
        .unwrap();
        assert_eq!(
            filter,
            JobFilter::new()
                .with_title("eng")
                .with_min_salary(100)
                .with_has_equity(true)
        );
    }

    #[test]
    fn search_has_equity_is_true_only_for_literal_true() {
        for value in ["false", "1", "TRUE", ""] {
            let filter = job_filter_from_query(&query(&[("hasEquity", value)])).unwrap();
            assert!(!filter.has_equity, "hasEquity={value}");
        }
    }

    #[test]
    fn search_rejects_unknown_keys_and_bad_salary() {
        let errs = messages(job_filter_from_query(&query(&[("notafilter", "no")])).unwrap_err());
        assert_eq!(
            errs,
            vec!["instance is not allowed to have the additional property \"notafilter\""]
        );

        let errs = messages(job_filter_from_query(&query(&[("minSalary", "lots")])).unwrap_err());
        assert_eq!(errs, vec!["instance.minSalary is not of a type(s) integer"]);

        assert!(job_filter_from_query(&query(&[("minSalary", "-5")])).is_err());
        assert!(job_filter_from_query(&query(&[("title", "")])).is_err());
    }

    #[test]
    fn new_job_valid() {
        let job = new_job_from_body(&json!({
            "title": "newjob",
            "salary": 5,
            "equity": "0.5",
            "companyHandle": "c1"
        }))
        .unwrap();
        assert_eq!(job, NewJob::new("newjob", "c1").with_salary(5).with_equity("0.5"));

        let job = new_job_from_body(&json!({
            "title": "newjob",
            "salary": null,
            "equity": null,
            "companyHandle": "c1"
        }))
        .unwrap();
        assert_eq!(job, NewJob::new("newjob", "c1"));
    }

    #[test]
    fn new_job_collects_every_error() {
        let errs = messages(
            new_job_from_body(&json!({
                "title": 9,
                "salary": "notanumber",
                "equity": 22,
                "companyHandle": "c1"
            }))
            .unwrap_err(),
        );
        assert_eq!(
            errs,
            vec![
                "instance.title is not of a type(s) string",
                "instance.salary is not of a type(s) integer,null",
                "instance.equity is not of a type(s) string,null",
            ]
        );
    }

    #[test]
    fn new_job_requires_title_and_company() {
        let errs = messages(
            new_job_from_body(&json!({ "equity": "0.1", "companyHandle": "c1" })).unwrap_err(),
        );
        assert_eq!(errs, vec!["instance requires property \"title\""]);

        let errs = messages(new_job_from_body(&json!({ "title": "t" })).unwrap_err());
        assert_eq!(errs, vec!["instance requires property \"companyHandle\""]);
    }

    #[test]
    fn new_job_checks_formats() {
        for equity in ["1.5", "abc", "-0.1", "01"] {
            let result = new_job_from_body(&json!({
                "title": "t", "equity": equity, "companyHandle": "c1"
            }));
            assert!(result.is_err(), "equity {equity} should be rejected");
        }
        for equity in ["0", ".5", "0.25", "1", "1.00"] {
            let result = new_job_from_body(&json!({
                "title": "t", "equity": equity, "companyHandle": "c1"
            }));
            assert!(result.is_ok(), "equity {equity} should be accepted");
        }

        assert!(
            new_job_from_body(&json!({ "title": "t", "salary": -1, "companyHandle": "c1" }))
                .is_err()
        );
        assert!(
            new_job_from_body(&json!({ "title": "t", "salary": 1.5, "companyHandle": "c1" }))
                .is_err()
        );
        assert!(
            new_job_from_body(&json!({ "title": "t", "companyHandle": "x".repeat(26) })).is_err()
        );
        assert!(
            new_job_from_body(&json!({ "title": "t", "companyHandle": "c1", "id": 3 })).is_err()
        );
        assert!(new_job_from_body(&json!(["not", "an", "object"])).is_err());
    }

    #[test]
    fn update_tracks_present_fields_and_nulls() {
        let update = job_update_from_body(&json!({ "title": "updatedjob" })).unwrap();
        assert_eq!(update, JobUpdate::new().with_title("updatedjob"));

        let update = job_update_from_body(&json!({ "salary": null, "equity": "0.3" })).unwrap();
        assert_eq!(
            update,
            JobUpdate::new()
                .with_salary(None)
                .with_equity(Some("0.3".into()))
        );
    }

    #[test]
    fn update_rejects_empty_and_immutable_fields() {
        let errs = messages(job_update_from_body(&json!({})).unwrap_err());
        assert_eq!(errs, vec!["instance does not meet minimum property length of 1"]);

        let errs = messages(job_update_from_body(&json!({ "companyHandle": "c2" })).unwrap_err());
        assert_eq!(
            errs,
            vec!["instance is not allowed to have the additional property \"companyHandle\""]
        );

        assert!(job_update_from_body(&json!({ "salary": "no" })).is_err());
    }

    #[test]
    fn search_min_salary_accepts_integral_numbers() {
        for (raw, expected) in [("5.0", 5), ("1e3", 1000), (" 7 ", 7), ("0", 0)] {
            let filter = job_filter_from_query(&query(&[("minSalary", raw)])).unwrap();
            assert_eq!(filter.min_salary, Some(expected), "minSalary={raw}");
        }

        for raw in ["5.5", "NaN", "inf", ""] {
            let errs = messages(job_filter_from_query(&query(&[("minSalary", raw)])).unwrap_err());
            assert_eq!(
                errs,
                vec!["instance.minSalary is not of a type(s) integer"],
                "minSalary={raw}"
            );
        }

        let errs = messages(job_filter_from_query(&query(&[("minSalary", "-1")])).unwrap_err());
        assert_eq!(errs, vec!["instance.minSalary must be greater than or equal to 0"]);
    }

    #[test]
    fn field_rule_messages() {
        let errs = messages(
            new_job_from_body(&json!({
                "title": "",
                "salary": -1,
                "equity": "1.5",
                "companyHandle": "x".repeat(26)
            }))
            .unwrap_err(),
        );
        assert_eq!(
            errs,
            vec![
                "instance.title does not meet minimum length of 1".to_string(),
                "instance.salary must be greater than or equal to 0".to_string(),
                format!("instance.equity does not match pattern \"{EQUITY_PATTERN}\""),
                "instance.companyHandle does not meet maximum length of 25".to_string(),
            ]
        );

        let errs = messages(job_update_from_body(&json!({ "salary": 3_000_000_000_i64 })).unwrap_err());
        assert_eq!(
            errs,
            vec!["instance.salary must be less than or equal to 2147483647"]
        );
    }

    #[test]
    fn type_errors_come_before_rule_errors() {
        let errs = messages(
            job_update_from_body(&json!({ "title": "", "salary": "no" })).unwrap_err(),
        );
        assert_eq!(
            errs,
            vec![
                "instance.salary is not of a type(s) integer,null",
                "instance.title does not meet minimum length of 1",
            ]
        );
    }

    #[test]
    fn job_id_must_be_an_integer() {
        assert_eq!(parse_job_id("42").unwrap(), 42);
        assert!(matches!(parse_job_id("abc"), Err(ApiError::BadRequest(_))));
        assert!(parse_job_id("1.5").is_err());
    }
}
