//! Helpers for building parameterized SQL.

use jobly_storage::StorageError;
use sqlx_core::query_as::QueryAs;
use sqlx_postgres::{PgArguments, Postgres};

/// A value bound to a query placeholder.
///
/// Every variant carries an `Option` so that NULL is still sent with the
/// column's type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Text(Option<String>),
    Integer(Option<i32>),
    /// A decimal kept as text; its placeholder is cast with `::numeric`.
    Numeric(Option<String>),
}

impl SqlValue {
    /// Renders the placeholder for this value at the given position.
    fn placeholder(&self, index: usize) -> String {
        match self {
            Self::Numeric(_) => format!("${index}::numeric"),
            Self::Text(_) | Self::Integer(_) => format!("${index}"),
        }
    }
}

/// The `SET` clause of an `UPDATE` together with its bound values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialUpdate {
    /// Comma separated assignments: `"title"=$1, "salary"=$2`.
    pub set_cols: String,
    /// Values for the placeholders, in placeholder order.
    pub values: Vec<SqlValue>,
}

impl PartialUpdate {
    /// Index of the next free placeholder, for the `WHERE` clause.
    #[must_use]
    pub fn next_placeholder(&self) -> usize {
        self.values.len() + 1
    }
}

/// Builds the `SET` clause for updating only the given fields.
///
/// `data` holds `(field, value)` pairs in the order they should be
/// assigned. `js_to_sql` maps wire field names to column names; fields
/// missing from the map are used as column names unchanged.
///
/// ```ignore
/// let update = sql_for_partial_update(
///     &[("firstName", SqlValue::Text(Some("Aliya".into()))), ("age", SqlValue::Integer(Some(32)))],
///     &[("firstName", "first_name")],
/// )?;
/// assert_eq!(update.set_cols, r#""first_name"=$1, "age"=$2"#);
/// ```
///
/// # Errors
///
/// Returns `StorageError::InvalidResource` with "No data" if `data` is empty.
pub fn sql_for_partial_update(
    data: &[(&str, SqlValue)],
    js_to_sql: &[(&str, &str)],
) -> Result<PartialUpdate, StorageError> {
    if data.is_empty() {
        return Err(StorageError::invalid_resource("No data"));
    }

    let set_cols = data
        .iter()
        .enumerate()
        .map(|(idx, (field, value))| {
            let column = js_to_sql
                .iter()
                .find(|(js, _)| js == field)
                .map_or(*field, |(_, sql)| *sql);
            format!("\"{column}\"={}", value.placeholder(idx + 1))
        })
        .collect::<Vec<_>>()
        .join(", ");

    let values = data.iter().map(|(_, value)| value.clone()).collect();

    Ok(PartialUpdate { set_cols, values })
}

/// Binds a list of `SqlValue`s to a query in order.
pub(crate) trait BindValues<'q> {
    fn bind_values(self, values: &'q [SqlValue]) -> Self;
}

impl<'q, O> BindValues<'q> for QueryAs<'q, Postgres, O, PgArguments> {
    fn bind_values(mut self, values: &'q [SqlValue]) -> Self {
        for value in values {
            self = match value {
                SqlValue::Text(v) | SqlValue::Numeric(v) => self.bind(v.as_deref()),
                SqlValue::Integer(v) => self.bind(*v),
            };
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> SqlValue {
        SqlValue::Text(Some(s.to_string()))
    }

    #[test]
    fn works_with_one_item() {
        let result = sql_for_partial_update(&[("test", text("test2"))], &[]).unwrap();
        assert_eq!(result.set_cols, r#""test"=$1"#);
        assert_eq!(result.values, vec![text("test2")]);
    }

    #[test]
    fn works_with_two_items() {
        let result = sql_for_partial_update(
            &[("test", text("test2")), ("test2", text("test3"))],
            &[],
        )
        .unwrap();
        assert_eq!(result.set_cols, r#""test"=$1, "test2"=$2"#);
        assert_eq!(result.values, vec![text("test2"), text("test3")]);
        assert_eq!(result.next_placeholder(), 3);
    }

    #[test]
    fn maps_field_names_to_columns() {
        let result = sql_for_partial_update(
            &[
                ("firstName", text("Aliya")),
                ("age", SqlValue::Integer(Some(32))),
            ],
            &[("firstName", "first_name")],
        )
        .unwrap();
        assert_eq!(result.set_cols, r#""first_name"=$1, "age"=$2"#);
        assert_eq!(
            result.values,
            vec![text("Aliya"), SqlValue::Integer(Some(32))]
        );
    }

    #[test]
    fn casts_numeric_placeholders() {
        let result = sql_for_partial_update(
            &[
                ("salary", SqlValue::Integer(None)),
                ("equity", SqlValue::Numeric(Some("0.5".into()))),
            ],
            &[],
        )
        .unwrap();
        assert_eq!(result.set_cols, r#""salary"=$1, "equity"=$2::numeric"#);
        assert_eq!(result.values[0], SqlValue::Integer(None));
    }

    #[test]
    fn rejects_empty_data() {
        let err = sql_for_partial_update(&[], &[("firstName", "first_name")]).unwrap_err();
        assert!(err.is_invalid_resource());
        assert_eq!(err.to_string(), "Invalid data: No data");
    }
}
