use chrono::NaiveDate;
use sqlx::MySql;
use sqlx::mysql::MySqlArguments;
use sqlx::query::{QueryAs, QueryScalar};

/// ===============================
/// SQL bindable filter value
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    U64(u64),
    Str(String),
    Date(NaiveDate),
}

/// ===============================
/// WHERE clause container
/// ===============================
/// Clauses are AND-ed; each clause owns the values for its `?` placeholders,
/// in order.
#[derive(Debug, Default)]
pub struct Conditions {
    clauses: Vec<&'static str>,
    values: Vec<SqlValue>,
}

impl Conditions {
    pub fn new(always: &'static str) -> Self {
        Self {
            clauses: vec![always],
            values: Vec::new(),
        }
    }

    pub fn push(&mut self, clause: &'static str, value: SqlValue) {
        self.clauses.push(clause);
        self.values.push(value);
    }

    pub fn push_many(&mut self, clause: &'static str, values: impl IntoIterator<Item = SqlValue>) {
        self.clauses.push(clause);
        self.values.extend(values);
    }

    pub fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }
}

pub fn bind_scalar<'q, O>(
    mut query: QueryScalar<'q, MySql, O, MySqlArguments>,
    values: &'q [SqlValue],
) -> QueryScalar<'q, MySql, O, MySqlArguments> {
    for value in values {
        query = match value {
            SqlValue::U64(v) => query.bind(*v),
            SqlValue::Str(s) => query.bind(s.as_str()),
            SqlValue::Date(d) => query.bind(*d),
        };
    }
    query
}

pub fn bind_rows<'q, O>(
    mut query: QueryAs<'q, MySql, O, MySqlArguments>,
    values: &'q [SqlValue],
) -> QueryAs<'q, MySql, O, MySqlArguments> {
    for value in values {
        query = match value {
            SqlValue::U64(v) => query.bind(*v),
            SqlValue::Str(s) => query.bind(s.as_str()),
            SqlValue::Date(d) => query.bind(*d),
        };
    }
    query
}
