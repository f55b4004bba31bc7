use chrono::NaiveDate;
use sqlx::{
    MySql,
    mysql::MySqlArguments,
    query::QueryAs,
};

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    I32(i32),
    Date(NaiveDate),
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::String(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::String(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::I32(v)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

/// ===============================
/// Conjunctive WHERE clause
/// ===============================
///
/// Each condition carries its own `?` placeholders; values are kept in
/// placeholder order so the final query binds them positionally.
#[derive(Debug, Default)]
pub struct WhereClause {
    conditions: Vec<&'static str>,
    values: Vec<SqlValue>,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a condition with a single placeholder.
    pub fn and(&mut self, condition: &'static str, value: impl Into<SqlValue>) -> &mut Self {
        self.conditions.push(condition);
        self.values.push(value.into());
        self
    }

    /// Adds a condition only when a value is present.
    pub fn and_opt<V: Into<SqlValue>>(
        &mut self,
        condition: &'static str,
        value: Option<V>,
    ) -> &mut Self {
        if let Some(value) = value {
            self.and(condition, value);
        }
        self
    }

    /// Adds a condition whose placeholders all take the same value.
    pub fn and_repeated(
        &mut self,
        condition: &'static str,
        value: impl Into<SqlValue>,
    ) -> &mut Self {
        let value = value.into();
        let placeholders = condition.matches('?').count();
        self.conditions.push(condition);
        self.values.extend(std::iter::repeat_n(value, placeholders));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// `WHERE a AND b`, or an empty string when no condition was added.
    pub fn to_sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<SqlValue> {
        self.values
    }
}

/// Escapes LIKE wildcards so user input only ever matches literally.
pub fn like_contains(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// ===============================
/// Bind values onto typed queries
/// ===============================
pub fn bind_values<'q, O>(
    mut query: QueryAs<'q, MySql, O, MySqlArguments>,
    values: Vec<SqlValue>,
) -> QueryAs<'q, MySql, O, MySqlArguments> {
    for value in values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I32(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
        };
    }
    query
}
