//! SQLite connection handling — opens the shipped database read-only.

use std::path::Path;

use rusqlite::{Connection, OpenFlags};

use crate::errors::{DbError, Result};
use crate::storage::schema::create_schema;

/// Open an existing database file without write access.
pub(crate) fn open_read_only(path: &Path) -> Result<Connection> {
    if !path.exists() {
        return Err(DbError::Unavailable(path.to_path_buf()));
    }
    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(path, flags)?;
    conn.execute_batch("PRAGMA query_only=ON;")?;
    Ok(conn)
}

/// Create an in-memory database with the schema applied (for testing).
pub(crate) fn in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    create_schema(&conn)?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::has_schema;

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.sql3");
        match open_read_only(&path) {
            Err(DbError::Unavailable(p)) => assert_eq!(p, path),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("opened a missing database"),
        }
    }

    #[test]
    fn test_open_read_only_rejects_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.sql3");
        {
            let conn = Connection::open(&path).unwrap();
            create_schema(&conn).unwrap();
        }

        let conn = open_read_only(&path).unwrap();
        assert!(has_schema(&conn).unwrap());
        let res = conn.execute(
            "INSERT INTO client (id, gender, sgroup) VALUES (1, 'male', 'dev')",
            [],
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_in_memory_has_schema() {
        let conn = in_memory().unwrap();
        assert!(has_schema(&conn).unwrap());
    }
}
