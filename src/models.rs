//! Table records and fixed value domains of the MOBIO database.
//!
//! Records are plain owned values decoded from rows; the accessor never
//! writes them back.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::errors::{DbError, Result};
use crate::params::Dimension;

/// Declares a closed value domain stored as text in the database.
macro_rules! dimension {
    (
        $(#[$meta:meta])*
        $name:ident as $label:literal { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl Dimension for $name {
            const NAME: &'static str = $label;
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = DbError;

            fn from_str(s: &str) -> Result<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| DbError::invalid($label, s))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: DbError| FromSqlError::Other(Box::new(e)))
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }
    };
}

dimension! {
    /// Gender of a client. Protocol names share this domain.
    Gender as "gender" {
        Female => "female",
        Male => "male",
    }
}

dimension! {
    /// Population group a client belongs to.
    Group as "group" {
        Dev => "dev",
        Eval => "eval",
        World => "world",
    }
}

dimension! {
    /// Role a file plays within a protocol/group.
    Purpose as "purpose" {
        Enrol => "enrol",
        Probe => "probe",
    }
}

dimension! {
    /// Access type of a probe: genuine claim or impostor claim.
    Class as "class" {
        Client => "client",
        Impostor => "impostor",
    }
}

/// One enrolled subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub gender: Gender,
    pub group: Group,
}

impl Client {
    pub(crate) const COLUMNS: &'static str = "c.id, c.gender, c.sgroup";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            gender: row.get(1)?,
            group: row.get(2)?,
        })
    }
}

/// One recording, addressed on disk by its path stem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    pub id: i64,
    pub client_id: i64,
    /// Path stem relative to the dataset root, without extension.
    pub path: String,
    pub session_id: i64,
    pub speech_type: String,
    pub shot_id: i64,
    pub device: String,
}

impl File {
    pub(crate) const COLUMNS: &'static str =
        "f.id, f.client_id, f.path, f.session_id, f.speech_type, f.shot_id, f.device";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            client_id: row.get(1)?,
            path: row.get(2)?,
            session_id: row.get(3)?,
            speech_type: row.get(4)?,
            shot_id: row.get(5)?,
            device: row.get(6)?,
        })
    }

    /// Joins `prefix`, the path stem and `suffix` into a full path.
    ///
    /// An empty or missing prefix yields a path relative to the dataset root.
    pub fn make_path(&self, prefix: Option<&str>, suffix: Option<&str>) -> String {
        let name = format!("{}{}", self.path, suffix.unwrap_or(""));
        match prefix {
            Some(dir) if !dir.is_empty() => Path::new(dir).join(name).to_string_lossy().into_owned(),
            _ => name,
        }
    }

    /// Ordering used by every file listing. The id breaks remaining ties.
    pub(crate) fn sort_key(&self) -> (i64, i64, &str, i64, &str, i64) {
        (
            self.client_id,
            self.session_id,
            &self.speech_type,
            self.shot_id,
            &self.device,
            self.id,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Protocol {
    pub id: i64,
    pub name: String,
}

impl Protocol {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }
}

/// Marks which files of a protocol/group are enrolment or probe material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolPurpose {
    pub id: i64,
    pub protocol_id: i64,
    pub group: Group,
    pub purpose: Purpose,
}

impl ProtocolPurpose {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            protocol_id: row.get(1)?,
            group: row.get(2)?,
            purpose: row.get(3)?,
        })
    }
}

/// Named split of the world clients used for score normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subworld {
    pub id: i64,
    pub name: String,
}

impl Subworld {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }
}

/// Model enrolled for T-norm score normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TModel {
    pub id: String,
    pub client_id: i64,
}

impl TModel {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            client_id: row.get(1)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str) -> File {
        File {
            id: 1,
            client_id: 7,
            path: path.to_string(),
            session_id: 1,
            speech_type: "p".to_string(),
            shot_id: 1,
            device: "mobile".to_string(),
        }
    }

    #[test]
    fn test_parse_known_values() {
        assert_eq!("dev".parse::<Group>().unwrap(), Group::Dev);
        assert_eq!("female".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!("probe".parse::<Purpose>().unwrap(), Purpose::Probe);
        assert_eq!("impostor".parse::<Class>().unwrap(), Class::Impostor);
    }

    #[test]
    fn test_parse_unknown_value() {
        match "train".parse::<Group>() {
            Err(DbError::InvalidArgument { dimension, value }) => {
                assert_eq!(dimension, "group");
                assert_eq!(value, "train");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_serialized_form_is_lowercase() {
        let client = Client {
            id: 3,
            gender: Gender::Male,
            group: Group::World,
        };
        let json = serde_json::to_value(&client).unwrap();
        assert_eq!(json["gender"], "male");
        assert_eq!(json["group"], "world");
    }

    #[test]
    fn test_make_path() {
        let f = file("f/007/s1_1");
        assert_eq!(f.make_path(None, None), "f/007/s1_1");
        assert_eq!(f.make_path(Some(""), Some(".wav")), "f/007/s1_1.wav");
        assert_eq!(
            f.make_path(Some("/data/mobio"), Some(".wav")),
            "/data/mobio/f/007/s1_1.wav"
        );
    }
}
