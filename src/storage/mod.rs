//! Storage boundary: schema, SQL composition and the connection-level
//! interface shared by every accessor over the SQLite file.

pub mod schema;
pub(crate) mod select;
pub(crate) mod sqlite;

use std::collections::HashMap;

use rusqlite::Connection;

use crate::errors::Result;
use crate::models::File;
use crate::storage::select::files_by;

/// Connection-level interface — session access plus the file-id/path
/// translations that only need the `file` table.
pub trait SqliteDatabase {
    /// The connection held for the accessor's lifetime.
    fn connection(&self) -> &Connection;

    /// Tells whether the connected store carries the expected tables.
    fn is_valid(&self) -> Result<bool> {
        schema::has_schema(self.connection())
    }

    /// Full paths of the given file ids, in input order.
    ///
    /// Unknown ids produce no entry; repeated ids produce repeated entries.
    fn paths(&self, ids: &[i64], prefix: Option<&str>, suffix: Option<&str>) -> Result<Vec<String>> {
        let files: HashMap<i64, File> = files_by(self.connection(), "f.id", ids)?
            .into_iter()
            .map(|f| (f.id, f))
            .collect();
        Ok(ids
            .iter()
            .filter_map(|id| files.get(id))
            .map(|f| f.make_path(prefix, suffix))
            .collect())
    }

    /// File ids of the given path stems, in input order.
    ///
    /// Unknown stems produce no entry.
    fn reverse<S: AsRef<str>>(&self, paths: &[S]) -> Result<Vec<i64>>
    where
        Self: Sized,
    {
        let stems: Vec<&str> = paths.iter().map(AsRef::as_ref).collect();
        let ids: HashMap<String, i64> = files_by(self.connection(), "f.path", &stems)?
            .into_iter()
            .map(|f| (f.path, f.id))
            .collect();
        Ok(stems.iter().filter_map(|p| ids.get(*p).copied()).collect())
    }
}
