//! Registrar configuration file.
//!
//! # Responsibility
//! - Describe which backend to open and where its files live.
//! - Load/save the TOML representation and apply environment overrides.
//!
//! # Invariants
//! - Every field has a default; an empty file is a valid configuration.
//! - After `load`, relative paths are anchored at the config file's directory.

use crate::logging::default_log_level;
use crate::repo::instructor_repo::InstructorDeletePolicy;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Overrides `database_path` when set to a non-blank value.
pub const DB_PATH_ENV: &str = "REGISTRAR_DB_PATH";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    NotFound(PathBuf),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    Serialize(toml::ser::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "config file `{}` not found", path.display()),
            Self::Io { path, source } => {
                write!(f, "failed to access config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::Serialize(source) => write!(f, "failed to serialize config: {source}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Serialize(source) => Some(source),
        }
    }
}

/// Storage backend behind the record store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    #[default]
    Sqlite,
    /// One JSON file per collection under `documents_dir`.
    Json,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Json => "json",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// File logging is off when no directory is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrarConfig {
    pub backend: Backend,
    pub database_path: PathBuf,
    /// Directory of the JSON collection files.
    pub documents_dir: PathBuf,
    /// Target of the flat CSV export.
    pub table_path: PathBuf,
    pub instructor_delete_policy: InstructorDeletePolicy,
    pub logging: LoggingConfig,
}

impl Default for RegistrarConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            database_path: PathBuf::from("university.db"),
            documents_dir: PathBuf::from("."),
            table_path: PathBuf::from("merged_data.csv"),
            instructor_delete_policy: InstructorDeletePolicy::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl RegistrarConfig {
    /// Reads a TOML config file and resolves its relative paths.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let contents = fs::read_to_string(path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let mut config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let contents = self.to_toml()?;
        fs::write(path, contents).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_toml(&self) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Anchors every relative path at `base`.
    pub fn resolve_relative_to(&mut self, base: &Path) {
        let anchor = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(path.as_path());
            }
        };
        anchor(&mut self.database_path);
        anchor(&mut self.documents_dir);
        anchor(&mut self.table_path);
        if let Some(dir) = self.logging.dir.as_mut() {
            anchor(dir);
        }
    }

    /// Applies overrides read through `lookup` (an environment accessor).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = lookup(DB_PATH_ENV) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                self.database_path = PathBuf::from(trimmed);
            }
        }
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }
}

#[cfg(test)]
mod tests {
    use super::{Backend, ConfigError, RegistrarConfig, DB_PATH_ENV};
    use crate::repo::instructor_repo::InstructorDeletePolicy;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn defaults_use_historical_file_names() {
        let config = RegistrarConfig::default();
        assert_eq!(config.backend, Backend::Sqlite);
        assert_eq!(config.database_path, PathBuf::from("university.db"));
        assert_eq!(config.table_path, PathBuf::from("merged_data.csv"));
        assert_eq!(config.instructor_delete_policy, InstructorDeletePolicy::Cascade);
    }

    #[test]
    fn load_resolves_relative_paths_against_config_dir() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("registrar.toml");
        fs::write(
            &path,
            r#"
backend = "json"
documents_dir = "records"
instructor_delete_policy = "clear_reference"

[logging]
level = "warn"
dir = "logs"
"#,
        )
        .unwrap();

        let config = RegistrarConfig::load(&path).unwrap();
        assert_eq!(config.backend, Backend::Json);
        assert_eq!(config.documents_dir, temp.path().join("records"));
        assert_eq!(config.database_path, temp.path().join("university.db"));
        assert_eq!(
            config.instructor_delete_policy,
            InstructorDeletePolicy::ClearReference
        );
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.dir, Some(temp.path().join("logs")));
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let temp = TempDir::new().unwrap();
        let err = RegistrarConfig::load(&temp.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn load_rejects_unknown_backend() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("registrar.toml");
        fs::write(&path, "backend = \"mysql\"\n").unwrap();
        assert!(matches!(
            RegistrarConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn save_then_load_keeps_settings() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("registrar.toml");
        let mut config = RegistrarConfig {
            backend: Backend::Json,
            ..RegistrarConfig::default()
        };
        config.resolve_relative_to(temp.path());
        config.save(&path).unwrap();

        assert_eq!(RegistrarConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn env_override_replaces_database_path() {
        let mut config = RegistrarConfig::default();
        config.apply_overrides(|key| (key == DB_PATH_ENV).then(|| " /tmp/other.db ".to_string()));
        assert_eq!(config.database_path, PathBuf::from("/tmp/other.db"));

        config.apply_overrides(|_| Some("   ".to_string()));
        assert_eq!(config.database_path, PathBuf::from("/tmp/other.db"));
    }
}
