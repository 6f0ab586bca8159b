//! Explicit query specification
//!
//! List endpoints build a [`QuerySpec`] (field / operator / value conditions
//! plus an allow-listed sort and pagination) and the repositories translate
//! it to SQL. Field names are always `&'static str` from the repository's own
//! allow-list, never request input, so interpolation stays safe; values are
//! always bound.

use sqlx::Sqlite;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;

/// A bindable condition value
#[derive(Debug, Clone)]
pub enum SqlValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl SqlValue {
    fn bind_to<'q>(
        self,
        q: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        match self {
            SqlValue::Int(v) => q.bind(v),
            SqlValue::Float(v) => q.bind(v),
            SqlValue::Text(v) => q.bind(v),
        }
    }
}

/// Comparison operator
#[derive(Debug, Clone, Copy)]
pub enum Op {
    Eq,
    Gte,
    Lte,
}

impl Op {
    fn sql(&self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Gte => ">=",
            Op::Lte => "<=",
        }
    }
}

/// One AND-ed condition
#[derive(Debug, Clone)]
struct Condition {
    field: &'static str,
    op: Op,
    value: SqlValue,
}

/// Query specification for list endpoints
#[derive(Debug, Clone)]
pub struct QuerySpec {
    conditions: Vec<Condition>,
    /// Case-insensitive substring search OR-ed over several fields
    search: Option<(Vec<&'static str>, String)>,
    sort_field: &'static str,
    sort_desc: bool,
    page: u32,
    limit: u32,
}

impl QuerySpec {
    pub fn new(default_sort: &'static str) -> Self {
        Self {
            conditions: Vec::new(),
            search: None,
            sort_field: default_sort,
            sort_desc: true,
            page: 1,
            limit: 20,
        }
    }

    pub fn filter(mut self, field: &'static str, op: Op, value: SqlValue) -> Self {
        self.conditions.push(Condition { field, op, value });
        self
    }

    pub fn filter_opt(self, field: &'static str, op: Op, value: Option<SqlValue>) -> Self {
        match value {
            Some(v) => self.filter(field, op, v),
            None => self,
        }
    }

    pub fn search(mut self, fields: Vec<&'static str>, term: &str) -> Self {
        if !term.trim().is_empty() {
            self.search = Some((fields, term.trim().to_string()));
        }
        self
    }

    pub fn order_by(mut self, field: &'static str, desc: bool) -> Self {
        self.sort_field = field;
        self.sort_desc = desc;
        self
    }

    /// Page is 1-based; limit is clamped to [1, 100]
    pub fn paginate(mut self, page: u32, limit: u32) -> Self {
        self.page = page.max(1);
        self.limit = limit.clamp(1, 100);
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    fn where_clause(&self) -> (String, Vec<SqlValue>) {
        let mut parts = Vec::new();
        let mut values = Vec::new();

        for cond in &self.conditions {
            parts.push(format!("{} {} ?", cond.field, cond.op.sql()));
            values.push(cond.value.clone());
        }

        if let Some((fields, term)) = &self.search {
            let pattern = format!("%{}%", term);
            let ors: Vec<String> = fields.iter().map(|f| format!("{f} LIKE ?")).collect();
            parts.push(format!("({})", ors.join(" OR ")));
            for _ in fields {
                values.push(SqlValue::Text(pattern.clone()));
            }
        }

        if parts.is_empty() {
            (String::new(), values)
        } else {
            (format!(" WHERE {}", parts.join(" AND ")), values)
        }
    }

    /// `SELECT {projection} FROM {table} ... LIMIT ? OFFSET ?` plus binds
    pub fn to_select(&self, table: &str, projection: &str) -> (String, Vec<SqlValue>) {
        let (where_sql, mut values) = self.where_clause();
        let dir = if self.sort_desc { "DESC" } else { "ASC" };
        let sql = format!(
            "SELECT {projection} FROM {table}{where_sql} ORDER BY {} {} LIMIT ? OFFSET ?",
            self.sort_field, dir
        );
        values.push(SqlValue::Int(self.limit as i64));
        values.push(SqlValue::Int(((self.page - 1) * self.limit) as i64));
        (sql, values)
    }

    /// `SELECT COUNT(*) FROM {table} ...` plus binds
    pub fn to_count(&self, table: &str) -> (String, Vec<SqlValue>) {
        let (where_sql, values) = self.where_clause();
        (format!("SELECT COUNT(*) FROM {table}{where_sql}"), values)
    }
}

/// Bind a value list onto a query in order
pub fn bind_values<'q>(
    mut q: Query<'q, Sqlite, SqliteArguments<'q>>,
    values: Vec<SqlValue>,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for value in values {
        q = value.bind_to(q);
    }
    q
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_spec() {
        let spec = QuerySpec::new("created_at");
        let (sql, values) = spec.to_select("member", "*");
        assert_eq!(
            sql,
            "SELECT * FROM member ORDER BY created_at DESC LIMIT ? OFFSET ?"
        );
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_conditions_and_search() {
        let spec = QuerySpec::new("created_at")
            .filter("payment_status", Op::Eq, SqlValue::Text("Pending".into()))
            .filter("fee", Op::Gte, SqlValue::Float(100.0))
            .search(vec!["name", "phone"], "ana");

        let (sql, values) = spec.to_select("member", "*");
        assert!(sql.contains("WHERE payment_status = ? AND fee >= ? AND (name LIKE ? OR phone LIKE ?)"));
        // 2 conditions + 2 search patterns + limit + offset
        assert_eq!(values.len(), 6);

        let (count_sql, count_values) = spec.to_count("member");
        assert!(count_sql.starts_with("SELECT COUNT(*) FROM member WHERE"));
        assert_eq!(count_values.len(), 4);
    }

    #[test]
    fn test_pagination_clamps() {
        let spec = QuerySpec::new("created_at").paginate(0, 500);
        assert_eq!(spec.page(), 1);
        assert_eq!(spec.limit(), 100);

        let (_, values) = spec.to_select("member", "*");
        match &values[values.len() - 2] {
            SqlValue::Int(limit) => assert_eq!(*limit, 100),
            other => panic!("unexpected bind {:?}", other),
        }
    }

    #[test]
    fn test_blank_search_ignored() {
        let spec = QuerySpec::new("created_at").search(vec!["name"], "   ");
        let (sql, _) = spec.to_select("member", "*");
        assert!(!sql.contains("LIKE"));
    }

    #[test]
    fn test_order_by_asc() {
        let spec = QuerySpec::new("created_at").order_by("fee", false);
        let (sql, _) = spec.to_select("member", "*");
        assert!(sql.contains("ORDER BY fee ASC"));
    }
}
