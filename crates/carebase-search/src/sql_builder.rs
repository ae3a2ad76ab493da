//! Parameterized SQL assembly.
//!
//! Conditions are collected as SQL fragments that reference `$N`
//! placeholders; values are pushed as typed parameters and bound by the
//! storage backend in order.

use time::Date;

/// A SQL parameter value with its type information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Text(String),
    Id(u64),
    Date(Date),
}

/// A rendered statement and its bind parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlQuery {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

/// Collects conditions and parameters for one statement.
#[derive(Debug, Default)]
pub struct SqlBuilder {
    conditions: Vec<String>,
    params: Vec<SqlParam>,
}

impl SqlBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raw SQL condition that references already-added placeholders.
    pub fn add_condition(&mut self, condition: impl Into<String>) {
        self.conditions.push(condition.into());
    }

    /// Add a parameter and return its placeholder number.
    pub fn add_param(&mut self, param: SqlParam) -> usize {
        self.params.push(param);
        self.params.len()
    }

    /// Adds `column = $N` for each column, OR-ed together, all sharing one
    /// parameter.
    pub fn add_equals_any(&mut self, columns: &[&str], param: SqlParam) {
        let n = self.add_param(param);
        let conditions: Vec<String> = columns.iter().map(|c| format!("{c} = ${n}")).collect();
        self.add_condition(Self::build_or_clause(&conditions));
    }

    /// Build the final WHERE clause by joining conditions with AND.
    ///
    /// Returns `None` if there are no conditions.
    pub fn build_where_clause(&self) -> Option<String> {
        if self.conditions.is_empty() {
            return None;
        }

        Some(self.conditions.join(" AND "))
    }

    /// Wraps alternatives in parentheses when there is more than one.
    pub fn build_or_clause(conditions: &[String]) -> String {
        if conditions.len() == 1 {
            conditions[0].clone()
        } else {
            format!("({})", conditions.join(" OR "))
        }
    }

    /// Renders `SELECT <columns> FROM <table> [WHERE ...] [ORDER BY ...]`.
    pub fn into_select(self, columns: &str, table: &str, order_by: Option<&str>) -> SqlQuery {
        let mut sql = format!("SELECT {columns} FROM {table}");
        if let Some(clause) = self.build_where_clause() {
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
        }
        if let Some(order) = order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }

        SqlQuery {
            sql,
            params: self.params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_are_numbered_in_order() {
        let mut builder = SqlBuilder::new();
        let first = builder.add_param(SqlParam::Id(1));
        let second = builder.add_param(SqlParam::Text("x".into()));
        builder.add_condition(format!("a = ${first} AND b = ${second}"));

        assert_eq!((first, second), (1, 2));
        let query = builder.into_select("id", "t", None);
        assert_eq!(query.sql, "SELECT id FROM t WHERE a = $1 AND b = $2");
        assert_eq!(query.params, vec![SqlParam::Id(1), SqlParam::Text("x".into())]);
    }

    #[test]
    fn test_equals_any() {
        let mut builder = SqlBuilder::new();
        builder.add_equals_any(&["a"], SqlParam::Text("1".into()));
        builder.add_equals_any(&["b", "c"], SqlParam::Text("2".into()));

        assert_eq!(
            builder.build_where_clause().unwrap(),
            "a = $1 AND (b = $2 OR c = $2)"
        );
    }

    #[test]
    fn test_into_select() {
        let builder = SqlBuilder::new();
        let query = builder.into_select("id", "t", Some("id"));
        assert_eq!(query.sql, "SELECT id FROM t ORDER BY id");
        assert!(query.params.is_empty());
    }
}
