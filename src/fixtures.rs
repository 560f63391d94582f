//! Synthetic in-memory database shared by the unit tests.
//!
//! Layout:
//! ```text
//! protocols   1 female, 2 male
//! subworlds   1 onethird {10, 11}, 2 twothirds {10, 11, 12},
//!             3 twothirds-subsampled {12}
//! dev         1 m, 2 f, 3 m, 4 f
//! eval        5 m, 6 f, 7 m
//! world       10 m, 11 f, 12 m, 13 f
//! ```
//!
//! Dev/eval client `c` owns files `10c+1` (probe, s2 r shot 2 laptop),
//! `10c+2` (enrol, s1 p shot 1 mobile) and `10c+3` (probe, s2 r shot 1
//! mobile), so listing order differs from id order. World client `c` owns
//! files `10c+1` and `10c+2` and one T-model `"{c:03}_1"` built from both.

use rusqlite::{params, Connection};

use crate::query::Database;
use crate::storage::SqliteDatabase;

const CLIENTS: &[(i64, &str, &str)] = &[
    (1, "male", "dev"),
    (2, "female", "dev"),
    (3, "male", "dev"),
    (4, "female", "dev"),
    (5, "male", "eval"),
    (6, "female", "eval"),
    (7, "male", "eval"),
    (10, "male", "world"),
    (11, "female", "world"),
    (12, "male", "world"),
    (13, "female", "world"),
];

const SUBWORLDS: &[(i64, &str, &[i64])] = &[
    (1, "onethird", &[10, 11]),
    (2, "twothirds", &[10, 11, 12]),
    (3, "twothirds-subsampled", &[12]),
];

const PROTOCOLS: &[(i64, &str)] = &[(1, "female"), (2, "male")];

pub(crate) fn database() -> Database {
    let db = Database::in_memory().unwrap();
    populate(db.connection());
    db
}

pub(crate) fn populate(conn: &Connection) {
    for (id, name) in PROTOCOLS {
        conn.execute(
            "INSERT INTO protocol (id, name) VALUES (?1, ?2)",
            params![id, name],
        )
        .unwrap();
    }

    for (id, gender, group) in CLIENTS {
        conn.execute(
            "INSERT INTO client (id, gender, sgroup) VALUES (?1, ?2, ?3)",
            params![id, gender, group],
        )
        .unwrap();

        if *group == "world" {
            for shot in 1..=2_i64 {
                insert_file(conn, id * 10 + shot, *id, group, 1, "p", shot, "mobile");
            }
            let tmodel = format!("{id:03}_1");
            conn.execute(
                "INSERT INTO tmodel (id, client_id) VALUES (?1, ?2)",
                params![tmodel, id],
            )
            .unwrap();
            for shot in 1..=2_i64 {
                conn.execute(
                    "INSERT INTO tmodel_file (tmodel_id, file_id) VALUES (?1, ?2)",
                    params![tmodel, id * 10 + shot],
                )
                .unwrap();
            }
            continue;
        }

        insert_file(conn, id * 10 + 1, *id, group, 2, "r", 2, "laptop");
        insert_file(conn, id * 10 + 2, *id, group, 1, "p", 1, "mobile");
        insert_file(conn, id * 10 + 3, *id, group, 2, "r", 1, "mobile");

        let protocol_id = PROTOCOLS
            .iter()
            .find(|(_, name)| name == gender)
            .map(|(pid, _)| *pid)
            .unwrap();
        for (file_id, purpose) in [(id * 10 + 1, "probe"), (id * 10 + 2, "enrol"), (id * 10 + 3, "probe")] {
            let pp = purpose_id(conn, protocol_id, group, purpose);
            conn.execute(
                "INSERT INTO protocol_purpose_file (protocol_purpose_id, file_id) VALUES (?1, ?2)",
                params![pp, file_id],
            )
            .unwrap();
        }
    }

    for (id, name, members) in SUBWORLDS {
        conn.execute(
            "INSERT INTO subworld (id, name) VALUES (?1, ?2)",
            params![id, name],
        )
        .unwrap();
        for client in members.iter() {
            conn.execute(
                "INSERT INTO subworld_client (subworld_id, client_id) VALUES (?1, ?2)",
                params![id, client],
            )
            .unwrap();
            for shot in 1..=2_i64 {
                conn.execute(
                    "INSERT INTO subworld_file (subworld_id, file_id) VALUES (?1, ?2)",
                    params![id, client * 10 + shot],
                )
                .unwrap();
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn insert_file(
    conn: &Connection,
    id: i64,
    client_id: i64,
    group: &str,
    session_id: i64,
    speech_type: &str,
    shot_id: i64,
    device: &str,
) {
    let path = format!("{group}/{client_id:03}/{session_id:02}_{speech_type}_{shot_id:02}_{device}");
    conn.execute(
        "INSERT INTO file (id, client_id, path, session_id, speech_type, shot_id, device)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![id, client_id, path, session_id, speech_type, shot_id, device],
    )
    .unwrap();
}

/// Id of the (protocol, group, purpose) row, created on first use.
fn purpose_id(conn: &Connection, protocol_id: i64, group: &str, purpose: &str) -> i64 {
    conn.execute(
        "INSERT OR IGNORE INTO protocol_purpose (protocol_id, sgroup, purpose) VALUES (?1, ?2, ?3)",
        params![protocol_id, group, purpose],
    )
    .unwrap();
    conn.query_row(
        "SELECT id FROM protocol_purpose WHERE protocol_id = ?1 AND sgroup = ?2 AND purpose = ?3",
        params![protocol_id, group, purpose],
        |row| row.get(0),
    )
    .unwrap()
}
