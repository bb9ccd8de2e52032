//! Configuration management for redacty

use crate::error::{AnonymizeError, Result as AnonymizeResult};
use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Excludes nothing real: no address ends with a space.
pub const DEFAULT_EXCLUDED_DOMAIN: &str = " ";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub anonymize: AnonymizeConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnonymizeConfig {
    /// Minimum age of a row, in days, before it is anonymized.
    pub age_days: i64,
    /// Addresses ending with this suffix are left untouched.
    pub exclude: String,
    pub skip_confirm: bool,
}

impl Default for AnonymizeConfig {
    fn default() -> Self {
        Self {
            age_days: 0,
            exclude: DEFAULT_EXCLUDED_DOMAIN.to_string(),
            skip_confirm: false,
        }
    }
}

impl AnonymizeConfig {
    pub fn validate(&self) -> AnonymizeResult<()> {
        if self.age_days < 0 {
            return Err(AnonymizeError::InvalidAge(self.age_days));
        }
        Ok(())
    }
}

/// Table and text column to anonymize.
///
/// Both names end up in SQL text, so they are restricted to plain identifiers
/// and always emitted quoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableTarget {
    pub table: String,
    pub column: String,
}

impl TableTarget {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn validate(&self) -> AnonymizeResult<()> {
        validate_identifier("table", &self.table)?;
        validate_identifier("column", &self.column)
    }

    pub fn quoted_table(&self) -> String {
        quote_identifier(&self.table)
    }

    pub fn quoted_column(&self) -> String {
        quote_identifier(&self.column)
    }
}

fn validate_identifier(kind: &'static str, name: &str) -> AnonymizeResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(AnonymizeError::InvalidIdentifier {
            kind,
            name: name.to_string(),
        })
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name)
}

impl Config {
    pub fn get_app_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("com", "redacty", "redacty")
            .ok_or_else(|| anyhow::anyhow!("Failed to determine application directories"))
    }

    pub fn get_default_config_path() -> Result<PathBuf> {
        let project_dirs = Self::get_app_dirs()?;
        Ok(project_dirs.config_dir().join("redacty.toml"))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file {}: {}", path.display(), e))?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Loads `path` when given, otherwise the default location if a file
    /// exists there, otherwise built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            info!("Loading configuration from: {}", path.display());
            return Self::from_file(path);
        }

        match Self::get_default_config_path() {
            Ok(default_path) if default_path.exists() => {
                info!("Loading configuration from default location: {}", default_path.display());
                Self::from_file(&default_path)
            }
            _ => {
                info!("Using default configuration");
                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.anonymize.age_days, 0);
        assert_eq!(config.anonymize.exclude, " ");
        assert!(!config.anonymize.skip_confirm);
        config.anonymize.validate().unwrap();
    }

    #[test]
    fn test_negative_age_is_rejected() {
        let settings = AnonymizeConfig {
            age_days: -1,
            ..AnonymizeConfig::default()
        };

        let err = settings.validate().unwrap_err();
        assert!(matches!(err, AnonymizeError::InvalidAge(-1)));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_identifier_validation() {
        TableTarget::new("redacti", "body").validate().unwrap();
        TableTarget::new("_audit_2024", "Body_Text").validate().unwrap();

        for bad in ["", "1table", "body; DROP TABLE x", "my-table", "na\"me", "tæble"] {
            let err = TableTarget::new(bad, "body").validate().unwrap_err();
            assert!(matches!(err, AnonymizeError::InvalidIdentifier { kind: "table", .. }));
        }

        let err = TableTarget::new("redacti", "body text").validate().unwrap_err();
        assert!(matches!(err, AnonymizeError::InvalidIdentifier { kind: "column", .. }));
    }

    #[test]
    fn test_identifiers_are_quoted() {
        let target = TableTarget::new("redacti", "body");
        assert_eq!(target.quoted_table(), "\"redacti\"");
        assert_eq!(target.quoted_column(), "\"body\"");
    }

    #[test]
    fn test_config_file_operations() {
        let mut config = Config::default();
        config.anonymize.age_days = 30;
        config.anonymize.exclude = "example.com".to_string();
        config.anonymize.skip_confirm = true;

        let temp_file = NamedTempFile::new().unwrap();
        config.to_file(temp_file.path()).unwrap();

        let loaded = Config::load(Some(temp_file.path())).unwrap();
        assert_eq!(loaded.anonymize, config.anonymize);
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let temp_file = NamedTempFile::new().unwrap();
        std::fs::write(temp_file.path(), "[anonymize]\nage_days = 14\n").unwrap();

        let loaded = Config::from_file(temp_file.path()).unwrap();
        assert_eq!(loaded.anonymize.age_days, 14);
        assert_eq!(loaded.anonymize.exclude, DEFAULT_EXCLUDED_DOMAIN);
        assert!(!loaded.anonymize.skip_confirm);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(Config::from_file(dir.path().join("absent.toml")).is_err());
    }
}
