//! Filter arguments for the query operations and their validation.
//!
//! Every filter dimension accepts either nothing, a single value or a list.
//! Values are checked against the legal set of their dimension before any
//! SQL runs; an empty filter stands for the whole legal set.

use std::fmt;
use std::str::FromStr;

use crate::errors::{DbError, Result};

/// Subworld used by the normalization queries when none is given.
pub const DEFAULT_SUBWORLD: &str = "onethird";

/// A closed value domain with a fixed, compile-time legal set.
pub trait Dimension: Copy + Eq + fmt::Display + 'static {
    /// Name reported in `InvalidArgument` errors.
    const NAME: &'static str;
    /// Every legal value, in canonical order.
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;
}

/// Textual filter values: one, several, or none.
///
/// Empty strings are treated as "unset", so `""` and `None` both mean no
/// restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Values(Vec<String>);

impl Values {
    pub fn none() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    fn collect<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for item in items {
            let item = item.into();
            if !item.is_empty() && !out.contains(&item) {
                out.push(item);
            }
        }
        Self(out)
    }
}

impl From<&str> for Values {
    fn from(value: &str) -> Self {
        Self::collect([value])
    }
}

impl From<String> for Values {
    fn from(value: String) -> Self {
        Self::collect([value])
    }
}

impl From<Option<&str>> for Values {
    fn from(value: Option<&str>) -> Self {
        Self::collect(value)
    }
}

impl From<Option<String>> for Values {
    fn from(value: Option<String>) -> Self {
        Self::collect(value)
    }
}

impl From<Vec<&str>> for Values {
    fn from(values: Vec<&str>) -> Self {
        Self::collect(values)
    }
}

impl From<Vec<String>> for Values {
    fn from(values: Vec<String>) -> Self {
        Self::collect(values)
    }
}

impl From<&[&str]> for Values {
    fn from(values: &[&str]) -> Self {
        Self::collect(values.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for Values {
    fn from(values: [&str; N]) -> Self {
        Self::collect(values)
    }
}

/// Claimed client ids restricting a file query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ModelIds {
    #[default]
    None,
    Single(i64),
    Many(Vec<i64>),
}

impl ModelIds {
    /// Unique ids in first-seen order. `None` resolves to an empty list.
    pub fn resolve(&self) -> Vec<i64> {
        match self {
            Self::None => Vec::new(),
            Self::Single(id) => vec![*id],
            Self::Many(ids) => {
                let mut out = Vec::with_capacity(ids.len());
                for id in ids {
                    if !out.contains(id) {
                        out.push(*id);
                    }
                }
                out
            }
        }
    }
}

impl From<i64> for ModelIds {
    fn from(id: i64) -> Self {
        Self::Single(id)
    }
}

impl From<Option<i64>> for ModelIds {
    fn from(id: Option<i64>) -> Self {
        id.map_or(Self::None, Self::Single)
    }
}

impl From<Vec<i64>> for ModelIds {
    fn from(ids: Vec<i64>) -> Self {
        Self::Many(ids)
    }
}

impl From<&[i64]> for ModelIds {
    fn from(ids: &[i64]) -> Self {
        Self::Many(ids.to_vec())
    }
}

impl<const N: usize> From<[i64; N]> for ModelIds {
    fn from(ids: [i64; N]) -> Self {
        Self::Many(ids.to_vec())
    }
}

/// Validates `values` against the legal set of `T`.
///
/// An empty filter yields every legal value.
pub(crate) fn check_dimension<T>(values: &Values) -> Result<Vec<T>>
where
    T: Dimension + FromStr<Err = DbError>,
{
    if values.is_empty() {
        return Ok(T::ALL.to_vec());
    }
    let mut out = Vec::new();
    for value in values.iter() {
        let parsed: T = value.parse()?;
        if !out.contains(&parsed) {
            out.push(parsed);
        }
    }
    Ok(out)
}

/// Validates `values` against names registered in the database.
///
/// An empty filter yields `allowed` when `default_all` is set and nothing
/// otherwise.
pub(crate) fn check_names(
    dimension: &'static str,
    values: &Values,
    allowed: &[String],
    default_all: bool,
) -> Result<Vec<String>> {
    if values.is_empty() {
        return Ok(if default_all { allowed.to_vec() } else { Vec::new() });
    }
    values
        .iter()
        .map(|value| {
            if allowed.iter().any(|a| a == value) {
                Ok(value.to_string())
            } else {
                Err(DbError::invalid(dimension, value))
            }
        })
        .collect()
}

/// Filters for `clients`, `models` and `model_ids`.
#[derive(Debug, Clone, Default)]
pub struct ClientFilter {
    pub protocol: Values,
    pub groups: Values,
    pub subworld: Values,
    pub gender: Values,
}

impl ClientFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn protocol(mut self, protocol: impl Into<Values>) -> Self {
        self.protocol = protocol.into();
        self
    }

    pub fn groups(mut self, groups: impl Into<Values>) -> Self {
        self.groups = groups.into();
        self
    }

    pub fn subworld(mut self, subworld: impl Into<Values>) -> Self {
        self.subworld = subworld.into();
        self
    }

    pub fn gender(mut self, gender: impl Into<Values>) -> Self {
        self.gender = gender.into();
        self
    }
}

/// Filters for `objects`.
#[derive(Debug, Clone, Default)]
pub struct ObjectFilter {
    pub protocol: Values,
    /// Ignored for world files.
    pub purposes: Values,
    pub model_ids: ModelIds,
    pub groups: Values,
    /// Ignored for world files.
    pub classes: Values,
    pub subworld: Values,
    pub gender: Values,
}

impl ObjectFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn protocol(mut self, protocol: impl Into<Values>) -> Self {
        self.protocol = protocol.into();
        self
    }

    pub fn purposes(mut self, purposes: impl Into<Values>) -> Self {
        self.purposes = purposes.into();
        self
    }

    pub fn model_ids(mut self, model_ids: impl Into<ModelIds>) -> Self {
        self.model_ids = model_ids.into();
        self
    }

    pub fn groups(mut self, groups: impl Into<Values>) -> Self {
        self.groups = groups.into();
        self
    }

    pub fn classes(mut self, classes: impl Into<Values>) -> Self {
        self.classes = classes.into();
        self
    }

    pub fn subworld(mut self, subworld: impl Into<Values>) -> Self {
        self.subworld = subworld.into();
        self
    }

    pub fn gender(mut self, gender: impl Into<Values>) -> Self {
        self.gender = gender.into();
        self
    }
}

/// Filters for the T-norm and Z-norm queries.
///
/// `subworld` starts out as [`DEFAULT_SUBWORLD`]; set it to
/// [`Values::none`] to drop the subworld restriction. Each query documents
/// which fields it honours.
#[derive(Debug, Clone)]
pub struct NormFilter {
    pub protocol: Values,
    /// Claimed client ids (Z-norm files). `tmodels` and `tobjects` reject
    /// a non-empty set; use `tmodel_ids` there.
    pub model_ids: ModelIds,
    /// T-model ids (T-norm enrolment files).
    pub tmodel_ids: Values,
    pub subworld: Values,
    pub gender: Values,
}

impl Default for NormFilter {
    fn default() -> Self {
        Self {
            protocol: Values::none(),
            model_ids: ModelIds::None,
            tmodel_ids: Values::none(),
            subworld: Values::from(DEFAULT_SUBWORLD),
            gender: Values::none(),
        }
    }
}

impl NormFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn protocol(mut self, protocol: impl Into<Values>) -> Self {
        self.protocol = protocol.into();
        self
    }

    pub fn model_ids(mut self, model_ids: impl Into<ModelIds>) -> Self {
        self.model_ids = model_ids.into();
        self
    }

    pub fn tmodel_ids(mut self, tmodel_ids: impl Into<Values>) -> Self {
        self.tmodel_ids = tmodel_ids.into();
        self
    }

    pub fn subworld(mut self, subworld: impl Into<Values>) -> Self {
        self.subworld = subworld.into();
        self
    }

    pub fn gender(mut self, gender: impl Into<Values>) -> Self {
        self.gender = gender.into();
        self
    }
}
