//! The MOBIO dataset accessor.
//!
//! [`Database`] holds one read-only connection for its lifetime and answers
//! every query with a fully materialized, deterministically ordered list.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::errors::{DbError, Result};
use crate::models::{Class, Client, File, Gender, Group, Protocol, ProtocolPurpose, Purpose, Subworld};
use crate::params::{check_dimension, check_names, ClientFilter, Dimension, ObjectFilter};
use crate::storage::select::Select;
use crate::storage::{sqlite, SqliteDatabase};

/// Listing order of files.
pub(crate) const FILE_ORDER: &str =
    "f.client_id, f.session_id, f.speech_type, f.shot_id, f.device, f.id";

pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteDatabase for Database {
    fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Database {
    /// Open the database file named by `config`, read-only.
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        let conn = sqlite::open_read_only(&config.path)?;
        info!(path = %config.path.display(), "opened MOBIO database");
        Ok(Self {
            conn,
            path: Some(config.path.clone()),
        })
    }

    /// Empty in-memory database with the schema applied.
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            conn: sqlite::in_memory()?,
            path: None,
        })
    }

    /// Backing file, `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn groups(&self) -> &'static [Group] {
        Group::ALL
    }

    pub fn genders(&self) -> &'static [Gender] {
        Gender::ALL
    }

    pub fn purposes(&self) -> &'static [Purpose] {
        Purpose::ALL
    }

    pub fn subworlds(&self) -> Result<Vec<Subworld>> {
        Select::new("SELECT s.id, s.name FROM subworld s").fetch(
            &self.conn,
            "s.id",
            Subworld::from_row,
        )
    }

    pub fn subworld_names(&self) -> Result<Vec<String>> {
        Ok(self.subworlds()?.into_iter().map(|s| s.name).collect())
    }

    pub fn has_subworld(&self, name: &str) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM subworld WHERE name = ?1)",
            params![name],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Clients matching `filter`, sorted by id.
    ///
    /// A protocol restricts clients to the gender it is named after. A
    /// subworld keeps only the world clients belonging to that split.
    pub fn clients(&self, filter: &ClientFilter) -> Result<Vec<Client>> {
        let protocols = check_names("protocol", &filter.protocol, &self.protocol_names()?, false)?;
        let groups: Vec<Group> = check_dimension(&filter.groups)?;
        let subworlds = check_names("subworld", &filter.subworld, &self.subworld_names()?, false)?;
        let genders: Vec<Gender> = check_dimension(&filter.gender)?;

        let mut q = Select::new(format!("SELECT DISTINCT {} FROM client c", Client::COLUMNS));
        if !protocols.is_empty() {
            q.filter_in("c.gender", &protocols);
        }
        q.filter_in("c.sgroup", &groups);
        if !subworlds.is_empty() {
            q.join("JOIN subworld_client sc ON sc.client_id = c.id");
            q.join("JOIN subworld s ON s.id = sc.subworld_id");
            q.filter_in("s.name", &subworlds);
        }
        q.filter_in("c.gender", &genders);

        let clients = q.fetch(&self.conn, "c.id", Client::from_row)?;
        debug!(?protocols, ?groups, ?subworlds, count = clients.len(), "clients");
        Ok(clients)
    }

    pub fn has_client_id(&self, id: i64) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM client WHERE id = ?1)",
            params![id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// The client with the given id, or `NotFound`.
    pub fn client(&self, id: i64) -> Result<Client> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM client c WHERE c.id = ?1", Client::COLUMNS),
                params![id],
                Client::from_row,
            )
            .optional()?
            .ok_or_else(|| DbError::NotFound(format!("client {id}")))
    }

    /// Models are clients: every client can be enrolled as a target.
    pub fn models(&self, filter: &ClientFilter) -> Result<Vec<Client>> {
        self.clients(filter)
    }

    pub fn model_ids(&self, filter: &ClientFilter) -> Result<Vec<i64>> {
        Ok(self.clients(filter)?.into_iter().map(|c| c.id).collect())
    }

    /// Model ids and client ids share one id space.
    pub fn get_client_id_from_model_id(&self, model_id: i64) -> i64 {
        model_id
    }

    /// Files matching `filter`, without duplicates, in listing order.
    ///
    /// World files carry no enrol/probe distinction, so purposes and
    /// classes only shape the dev/eval part of the result. For impostor
    /// probes the model ids act as an exclusion, and only when exactly one
    /// id is claimed.
    pub fn objects(&self, filter: &ObjectFilter) -> Result<Vec<File>> {
        let protocols = check_names("protocol", &filter.protocol, &self.protocol_names()?, true)?;
        let purposes: Vec<Purpose> = check_dimension(&filter.purposes)?;
        let groups: Vec<Group> = check_dimension(&filter.groups)?;
        let classes: Vec<Class> = check_dimension(&filter.classes)?;
        let subworlds = check_names("subworld", &filter.subworld, &self.subworld_names()?, false)?;
        let genders: Vec<Gender> = check_dimension(&filter.gender)?;
        let model_ids = filter.model_ids.resolve();

        let mut files = Vec::new();

        if groups.contains(&Group::World) {
            let mut q = Select::new(format!(
                "SELECT DISTINCT {} FROM file f JOIN client c ON c.id = f.client_id",
                File::COLUMNS
            ));
            q.filter_eq("c.sgroup", Group::World);
            if !subworlds.is_empty() {
                q.join("JOIN subworld_file sf ON sf.file_id = f.id");
                q.join("JOIN subworld s ON s.id = sf.subworld_id");
                q.filter_in("s.name", &subworlds);
            }
            q.filter_in("c.gender", &genders);
            if !model_ids.is_empty() {
                q.filter_in("f.client_id", &model_ids);
            }
            files.extend(q.fetch(&self.conn, FILE_ORDER, File::from_row)?);
        }

        let evaluation: Vec<Group> = groups
            .iter()
            .copied()
            .filter(|g| *g != Group::World)
            .collect();
        if !evaluation.is_empty() {
            if purposes.contains(&Purpose::Enrol) {
                let mut q = purpose_select(&protocols, &evaluation, Purpose::Enrol, &genders);
                if !model_ids.is_empty() {
                    q.filter_in("c.id", &model_ids);
                }
                files.extend(q.fetch(&self.conn, FILE_ORDER, File::from_row)?);
            }

            if purposes.contains(&Purpose::Probe) {
                if classes.contains(&Class::Client) {
                    let mut q = purpose_select(&protocols, &evaluation, Purpose::Probe, &genders);
                    if !model_ids.is_empty() {
                        q.filter_in("c.id", &model_ids);
                    }
                    files.extend(q.fetch(&self.conn, FILE_ORDER, File::from_row)?);
                }

                if classes.contains(&Class::Impostor) {
                    let mut q = purpose_select(&protocols, &evaluation, Purpose::Probe, &genders);
                    if model_ids.len() == 1 {
                        q.filter_not_in("f.client_id", &model_ids);
                    }
                    files.extend(q.fetch(&self.conn, FILE_ORDER, File::from_row)?);
                }
            }
        }

        let files = unique_sorted(files);
        debug!(
            ?protocols,
            ?purposes,
            ?groups,
            ?classes,
            ?model_ids,
            count = files.len(),
            "objects"
        );
        Ok(files)
    }

    pub fn protocols(&self) -> Result<Vec<Protocol>> {
        Select::new("SELECT p.id, p.name FROM protocol p").fetch(
            &self.conn,
            "p.id",
            Protocol::from_row,
        )
    }

    pub fn protocol_names(&self) -> Result<Vec<String>> {
        Ok(self.protocols()?.into_iter().map(|p| p.name).collect())
    }

    pub fn has_protocol(&self, name: &str) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM protocol WHERE name = ?1)",
            params![name],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// The protocol with the given name, or `NotFound`.
    pub fn protocol(&self, name: &str) -> Result<Protocol> {
        self.conn
            .query_row(
                "SELECT p.id, p.name FROM protocol p WHERE p.name = ?1",
                params![name],
                Protocol::from_row,
            )
            .optional()?
            .ok_or_else(|| DbError::NotFound(format!("protocol '{name}'")))
    }

    pub fn protocol_purposes(&self) -> Result<Vec<ProtocolPurpose>> {
        Select::new("SELECT pp.id, pp.protocol_id, pp.sgroup, pp.purpose FROM protocol_purpose pp")
            .fetch(&self.conn, "pp.id", ProtocolPurpose::from_row)
    }
}

/// Files attached to `purpose` for the given protocols and groups.
fn purpose_select(
    protocols: &[String],
    groups: &[Group],
    purpose: Purpose,
    genders: &[Gender],
) -> Select {
    let mut q = Select::new(format!(
        "SELECT DISTINCT {} FROM file f JOIN client c ON c.id = f.client_id",
        File::COLUMNS
    ));
    q.join("JOIN protocol_purpose_file ppf ON ppf.file_id = f.id");
    q.join("JOIN protocol_purpose pp ON pp.id = ppf.protocol_purpose_id");
    q.join("JOIN protocol p ON p.id = pp.protocol_id");
    q.filter_in("p.name", protocols);
    q.filter_in("pp.sgroup", groups);
    q.filter_eq("pp.purpose", purpose);
    q.filter_in("c.gender", genders);
    q
}

/// Drop repeated files (by id) and restore listing order.
pub(crate) fn unique_sorted(files: Vec<File>) -> Vec<File> {
    let mut seen = HashSet::new();
    let mut out: Vec<File> = files.into_iter().filter(|f| seen.insert(f.id)).collect();
    out.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    out
}
