//! Table layout of the MOBIO database.
//!
//! The accessor only reads these tables. The DDL is kept here so that
//! synthetic stores (tests, benches) match the shipped database exactly.

use rusqlite::Connection;

use crate::errors::Result;

pub const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS client (
        id INTEGER PRIMARY KEY,
        gender TEXT NOT NULL CHECK (gender IN ('female', 'male')),
        sgroup TEXT NOT NULL CHECK (sgroup IN ('dev', 'eval', 'world'))
    );

    CREATE TABLE IF NOT EXISTS subworld (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS subworld_client (
        subworld_id INTEGER NOT NULL,
        client_id INTEGER NOT NULL,
        PRIMARY KEY (subworld_id, client_id),
        FOREIGN KEY (subworld_id) REFERENCES subworld(id),
        FOREIGN KEY (client_id) REFERENCES client(id)
    );

    CREATE TABLE IF NOT EXISTS file (
        id INTEGER PRIMARY KEY,
        client_id INTEGER NOT NULL,
        path TEXT NOT NULL UNIQUE,
        session_id INTEGER NOT NULL,
        speech_type TEXT NOT NULL,
        shot_id INTEGER NOT NULL,
        device TEXT NOT NULL,
        FOREIGN KEY (client_id) REFERENCES client(id)
    );

    CREATE TABLE IF NOT EXISTS subworld_file (
        subworld_id INTEGER NOT NULL,
        file_id INTEGER NOT NULL,
        PRIMARY KEY (subworld_id, file_id),
        FOREIGN KEY (subworld_id) REFERENCES subworld(id),
        FOREIGN KEY (file_id) REFERENCES file(id)
    );

    CREATE TABLE IF NOT EXISTS protocol (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS protocol_purpose (
        id INTEGER PRIMARY KEY,
        protocol_id INTEGER NOT NULL,
        sgroup TEXT NOT NULL CHECK (sgroup IN ('dev', 'eval', 'world')),
        purpose TEXT NOT NULL CHECK (purpose IN ('enrol', 'probe')),
        UNIQUE (protocol_id, sgroup, purpose),
        FOREIGN KEY (protocol_id) REFERENCES protocol(id)
    );

    CREATE TABLE IF NOT EXISTS protocol_purpose_file (
        protocol_purpose_id INTEGER NOT NULL,
        file_id INTEGER NOT NULL,
        PRIMARY KEY (protocol_purpose_id, file_id),
        FOREIGN KEY (protocol_purpose_id) REFERENCES protocol_purpose(id),
        FOREIGN KEY (file_id) REFERENCES file(id)
    );

    CREATE TABLE IF NOT EXISTS tmodel (
        id TEXT PRIMARY KEY,
        client_id INTEGER NOT NULL,
        FOREIGN KEY (client_id) REFERENCES client(id)
    );

    CREATE TABLE IF NOT EXISTS tmodel_file (
        tmodel_id TEXT NOT NULL,
        file_id INTEGER NOT NULL,
        PRIMARY KEY (tmodel_id, file_id),
        FOREIGN KEY (tmodel_id) REFERENCES tmodel(id),
        FOREIGN KEY (file_id) REFERENCES file(id)
    );

    CREATE INDEX IF NOT EXISTS idx_client_sgroup ON client(sgroup);
    CREATE INDEX IF NOT EXISTS idx_file_client ON file(client_id);
    CREATE INDEX IF NOT EXISTS idx_subworld_file_file ON subworld_file(file_id);
    CREATE INDEX IF NOT EXISTS idx_ppf_file ON protocol_purpose_file(file_id);
    CREATE INDEX IF NOT EXISTS idx_tmodel_file_file ON tmodel_file(file_id);
";

/// Applies the schema to an empty database.
pub fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Tells whether `conn` holds the tables the accessor reads.
pub fn has_schema(conn: &Connection) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
         AND name IN ('client', 'file', 'protocol', 'protocol_purpose')",
        [],
        |row| row.get(0),
    )?;
    Ok(count == 4)
}
