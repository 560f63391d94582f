//! T-norm and Z-norm extensions.
//!
//! Normalization sets come from the world population only, so they are the
//! same for the dev and eval groups. Every query defaults to the
//! `onethird` subworld through [`NormFilter::default`].

use tracing::debug;

use crate::errors::{DbError, Result};
use crate::models::{Client, File, Gender, TModel};
use crate::params::{check_dimension, check_names, ClientFilter, NormFilter, ObjectFilter};
use crate::query::{Database, FILE_ORDER};
use crate::storage::select::Select;
use crate::storage::SqliteDatabase;

/// Score-normalization queries of a verification database.
pub trait ZtNorm {
    /// World clients usable for T-norm. Honours protocol, subworld, gender.
    fn tclients(&self, filter: &NormFilter) -> Result<Vec<Client>>;

    /// World clients usable for Z-norm. Honours protocol, subworld, gender.
    fn zclients(&self, filter: &NormFilter) -> Result<Vec<Client>>;

    /// T-norm models sorted by id. Honours subworld, gender. Claimed
    /// `model_ids` are rejected; select T-models with `tmodel_ids`.
    fn tmodels(&self, filter: &NormFilter) -> Result<Vec<TModel>>;

    fn tmodel_ids(&self, filter: &NormFilter) -> Result<Vec<String>> {
        Ok(self.tmodels(filter)?.into_iter().map(|t| t.id).collect())
    }

    /// Files enrolling the T-norm models. Honours tmodel_ids, subworld,
    /// gender. Claimed `model_ids` are rejected.
    fn tobjects(&self, filter: &NormFilter) -> Result<Vec<File>>;

    /// World files probing for Z-norm. Honours protocol, model_ids,
    /// subworld, gender.
    fn zobjects(&self, filter: &NormFilter) -> Result<Vec<File>>;
}

/// T-model queries select by `tmodel_ids`; a claimed client id has no meaning there.
fn reject_model_ids(filter: &NormFilter) -> Result<()> {
    match filter.model_ids.resolve().first() {
        Some(id) => Err(DbError::invalid("model_id", id.to_string())),
        None => Ok(()),
    }
}

impl Database {
    fn world_clients(&self, filter: &NormFilter) -> Result<Vec<Client>> {
        self.clients(&ClientFilter {
            protocol: filter.protocol.clone(),
            groups: "world".into(),
            subworld: filter.subworld.clone(),
            gender: filter.gender.clone(),
        })
    }
}

impl ZtNorm for Database {
    fn tclients(&self, filter: &NormFilter) -> Result<Vec<Client>> {
        self.world_clients(filter)
    }

    fn zclients(&self, filter: &NormFilter) -> Result<Vec<Client>> {
        self.world_clients(filter)
    }

    fn tmodels(&self, filter: &NormFilter) -> Result<Vec<TModel>> {
        reject_model_ids(filter)?;
        let subworlds = check_names("subworld", &filter.subworld, &self.subworld_names()?, false)?;
        let genders: Vec<Gender> = check_dimension(&filter.gender)?;

        let mut q = Select::new(
            "SELECT DISTINCT t.id, t.client_id FROM tmodel t JOIN client c ON c.id = t.client_id",
        );
        if !subworlds.is_empty() {
            q.join("JOIN subworld_client sc ON sc.client_id = c.id");
            q.join("JOIN subworld s ON s.id = sc.subworld_id");
            q.filter_in("s.name", &subworlds);
        }
        q.filter_in("c.gender", &genders);

        let tmodels = q.fetch(self.connection(), "t.id", TModel::from_row)?;
        debug!(?subworlds, ?genders, count = tmodels.len(), "tmodels");
        Ok(tmodels)
    }

    fn tobjects(&self, filter: &NormFilter) -> Result<Vec<File>> {
        reject_model_ids(filter)?;
        let subworlds = check_names("subworld", &filter.subworld, &self.subworld_names()?, false)?;
        let genders: Vec<Gender> = check_dimension(&filter.gender)?;
        let tmodel_ids: Vec<String> = filter.tmodel_ids.iter().map(str::to_string).collect();

        let mut q = Select::new(format!(
            "SELECT DISTINCT {} FROM file f JOIN client c ON c.id = f.client_id",
            File::COLUMNS
        ));
        q.join("JOIN tmodel_file tf ON tf.file_id = f.id");
        q.join("JOIN tmodel t ON t.id = tf.tmodel_id");
        if !subworlds.is_empty() {
            q.join("JOIN subworld_file sf ON sf.file_id = f.id");
            q.join("JOIN subworld s ON s.id = sf.subworld_id");
            q.filter_in("s.name", &subworlds);
        }
        if !tmodel_ids.is_empty() {
            q.filter_in("t.id", &tmodel_ids);
        }
        q.filter_in("c.gender", &genders);

        let files = q.fetch(self.connection(), FILE_ORDER, File::from_row)?;
        debug!(?subworlds, ?tmodel_ids, count = files.len(), "tobjects");
        Ok(files)
    }

    fn zobjects(&self, filter: &NormFilter) -> Result<Vec<File>> {
        self.objects(&ObjectFilter {
            protocol: filter.protocol.clone(),
            model_ids: filter.model_ids.clone(),
            groups: "world".into(),
            subworld: filter.subworld.clone(),
            gender: filter.gender.clone(),
            ..ObjectFilter::default()
        })
    }
}
