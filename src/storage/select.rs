//! Incremental composition of filtered SELECT statements.

use rusqlite::types::ToSql;
use rusqlite::{params_from_iter, Connection, Row};

use crate::errors::Result;
use crate::models::File;

/// Upper bound on bound parameters per statement for key lookups.
pub(crate) const LOOKUP_CHUNK: usize = 500;

/// A SELECT with a fixed head (columns, FROM and JOINs) and AND-ed
/// conditions added one filter at a time.
pub(crate) struct Select {
    head: String,
    conditions: Vec<String>,
    params: Vec<Box<dyn ToSql>>,
}

impl Select {
    pub(crate) fn new(head: impl Into<String>) -> Self {
        Self {
            head: head.into(),
            conditions: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Append a JOIN clause to the head.
    pub(crate) fn join(&mut self, clause: &str) -> &mut Self {
        self.head.push(' ');
        self.head.push_str(clause);
        self
    }

    pub(crate) fn filter_eq<T: ToSql + 'static>(&mut self, column: &str, value: T) -> &mut Self {
        self.conditions.push(format!("{column} = ?"));
        self.params.push(Box::new(value));
        self
    }

    /// `column IN (...)`. An empty set matches nothing.
    pub(crate) fn filter_in<T: ToSql + Clone + 'static>(
        &mut self,
        column: &str,
        values: &[T],
    ) -> &mut Self {
        if values.is_empty() {
            self.conditions.push("0".to_string());
            return self;
        }
        self.conditions
            .push(format!("{column} IN ({})", placeholders(values.len())));
        for v in values {
            self.params.push(Box::new(v.clone()));
        }
        self
    }

    /// `column NOT IN (...)`. An empty set excludes nothing.
    pub(crate) fn filter_not_in<T: ToSql + Clone + 'static>(
        &mut self,
        column: &str,
        values: &[T],
    ) -> &mut Self {
        if values.is_empty() {
            return self;
        }
        self.conditions
            .push(format!("{column} NOT IN ({})", placeholders(values.len())));
        for v in values {
            self.params.push(Box::new(v.clone()));
        }
        self
    }

    pub(crate) fn to_sql(&self, order_by: &str) -> String {
        let mut sql = self.head.clone();
        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conditions.join(" AND "));
        }
        if !order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(order_by);
        }
        sql
    }

    /// Run the statement and map every row.
    pub(crate) fn fetch<T, F>(&self, conn: &Connection, order_by: &str, map: F) -> Result<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let sql = self.to_sql(order_by);
        let params: Vec<&dyn ToSql> = self.params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params.as_slice(), map)?
            .collect::<rusqlite::Result<Vec<T>>>()?;
        Ok(rows)
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Fetch the files whose `column` matches one of `keys`, in no particular
/// order. Keys are looked up in chunks to stay under SQLite's parameter limit.
pub(crate) fn files_by<T: ToSql>(conn: &Connection, column: &str, keys: &[T]) -> Result<Vec<File>> {
    let mut out = Vec::new();
    for chunk in keys.chunks(LOOKUP_CHUNK) {
        let sql = format!(
            "SELECT {} FROM file f WHERE {column} IN ({})",
            File::COLUMNS,
            placeholders(chunk.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(chunk.iter()), File::from_row)?
            .collect::<rusqlite::Result<Vec<File>>>()?;
        out.extend(rows);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_sql_composition() {
        let mut q = Select::new("SELECT c.id FROM client c");
        q.join("JOIN file f ON f.client_id = c.id");
        q.filter_eq("c.sgroup", "world".to_string());
        q.filter_in("c.gender", &["male".to_string(), "female".to_string()]);
        q.filter_not_in("c.id", &[5_i64]);
        assert_eq!(
            q.to_sql("c.id"),
            "SELECT c.id FROM client c JOIN file f ON f.client_id = c.id \
             WHERE c.sgroup = ? AND c.gender IN (?, ?) AND c.id NOT IN (?) ORDER BY c.id"
        );
    }

    #[test]
    fn test_empty_sets() {
        let mut q = Select::new("SELECT 1");
        q.filter_not_in::<i64>("x", &[]);
        assert_eq!(q.to_sql(""), "SELECT 1");
        q.filter_in::<i64>("x", &[]);
        assert_eq!(q.to_sql(""), "SELECT 1 WHERE 0");
    }

    #[test]
    fn test_fetch_binds_parameters() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE t (id INTEGER, tag TEXT);
             INSERT INTO t VALUES (1, 'a'), (2, 'b'), (3, 'a');",
        )
        .unwrap();

        let mut q = Select::new("SELECT t.id FROM t");
        q.filter_eq("t.tag", "a".to_string());
        q.filter_not_in("t.id", &[1_i64]);
        let ids: Vec<i64> = q.fetch(&conn, "t.id", |row| row.get(0)).unwrap();
        assert_eq!(ids, vec![3]);
    }
}
