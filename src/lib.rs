//! MOBIO database access.
//!
//! Typed, validated queries over the pre-populated SQLite file describing
//! the MOBIO verification dataset: clients, protocols, enrolment/probe
//! purposes, subworld splits and T-norm models. Query results are plain
//! records; [`SqliteDatabase::paths`] turns file ids into filesystem paths.
//!
//! ```no_run
//! use mobio_db::{Database, DatabaseConfig, ObjectFilter, SqliteDatabase};
//!
//! let db = Database::open(&DatabaseConfig::from_env())?;
//! let probes = db.objects(
//!     &ObjectFilter::new()
//!         .protocol("female")
//!         .groups("dev")
//!         .purposes("probe")
//!         .classes("impostor")
//!         .model_ids(5),
//! )?;
//! let ids: Vec<i64> = probes.iter().map(|f| f.id).collect();
//! let paths = db.paths(&ids, Some("/data/mobio"), Some(".wav"))?;
//! # Ok::<(), mobio_db::DbError>(())
//! ```

pub mod config;
pub mod dumplist;
pub mod errors;
pub mod models;
pub mod params;
pub mod query;
pub mod storage;
pub mod ztnorm;

#[cfg(test)]
mod fixtures;

pub use config::DatabaseConfig;
pub use errors::{DbError, Result};
pub use models::{Class, Client, File, Gender, Group, Protocol, ProtocolPurpose, Purpose, Subworld, TModel};
pub use params::{ClientFilter, Dimension, ModelIds, NormFilter, ObjectFilter, Values};
pub use query::Database;
pub use storage::SqliteDatabase;
pub use ztnorm::ZtNorm;
