//! Database location.

use std::ffi::OsString;
use std::path::PathBuf;

/// Environment variable overriding the database location.
pub const DATABASE_ENV: &str = "MOBIO_DATABASE";

/// File name of the database shipped inside the package directory.
pub const DATABASE_FILE: &str = "db.sql3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl DatabaseConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `MOBIO_DATABASE` if set, else the packaged default.
    pub fn from_env() -> Self {
        Self::resolve(std::env::var_os(DATABASE_ENV))
    }

    /// Resolve from an optional override; empty overrides are ignored.
    pub fn resolve(env_value: Option<OsString>) -> Self {
        match env_value {
            Some(path) if !path.is_empty() => Self::new(path),
            _ => Self::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(DATABASE_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_override() {
        let cfg = DatabaseConfig::resolve(Some(OsString::from("/srv/mobio/db.sql3")));
        assert_eq!(cfg.path, PathBuf::from("/srv/mobio/db.sql3"));
    }

    #[test]
    fn test_resolve_default() {
        let cfg = DatabaseConfig::resolve(None);
        assert!(cfg.path.ends_with(DATABASE_FILE));
        assert_eq!(DatabaseConfig::resolve(Some(OsString::new())), cfg);
    }
}
