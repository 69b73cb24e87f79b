//! File-backed configuration
//!
//! Settings may come from a YAML file, environment variables, or CLI flags.
//! The file is the lowest-precedence layer: CLI and environment values are
//! merged over it by the export command. A missing file is not an error,
//! everything can be supplied through the other layers.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_DIR: &str = ".cfexport";
const CONFIG_FILE: &str = "config.yaml";

/// Persistent exporter settings
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: Option<String>,
    pub admin_user: Option<String>,
    pub admin_password: Option<String>,
    pub output_file: Option<String>,
    pub exclude_env_vars: Vec<String>,
}

impl Config {
    /// Load from an explicit path, or from the default location when none
    /// is given. Absent files yield default settings.
    pub fn load_at(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .map_err(|err| ConfigError::ParseError(format!("{}: {}", path.display(), err)))?;
        let config: Self = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Check that the settings required to reach the platform are present
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::MissingApiUrl);
        }
        if self.admin_user.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::MissingAdminUser);
        }
        if self.admin_password.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::MissingAdminPassword);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn complete() -> Config {
        Config {
            api_url: Some("https://api.example.com".to_string()),
            admin_user: Some("admin".to_string()),
            admin_password: Some("secret".to_string()),
            output_file: None,
            exclude_env_vars: Vec::new(),
        }
    }

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let config = Config::load_at(Some(Path::new("/nonexistent/config.yaml"))).unwrap();
        assert!(config.api_url.is_none());
        assert!(config.exclude_env_vars.is_empty());
    }

    #[test]
    fn test_load_parses_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "api_url: https://api.example.com\nadmin_user: admin\nexclude_env_vars:\n  - SECRET"
        )
        .unwrap();

        let config = Config::load_at(Some(file.path())).unwrap();
        assert_eq!(config.api_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(config.admin_user.as_deref(), Some("admin"));
        assert_eq!(config.exclude_env_vars, vec!["SECRET".to_string()]);
        assert!(config.admin_password.is_none());
    }

    #[test]
    fn test_load_rejects_malformed_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "api_url: [unterminated").unwrap();

        match Config::load_at(Some(file.path())) {
            Err(ConfigError::ParseError(_)) => (),
            other => panic!("Expected ParseError, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(complete().validate().is_ok());
    }

    #[test]
    fn test_validate_reports_first_missing_setting() {
        let mut config = complete();
        config.api_url = None;
        match config.validate() {
            Err(ConfigError::MissingApiUrl) => (),
            other => panic!("Expected MissingApiUrl, got {:?}", other),
        }

        let mut config = complete();
        config.admin_user = Some(String::new());
        match config.validate() {
            Err(ConfigError::MissingAdminUser) => (),
            other => panic!("Expected MissingAdminUser, got {:?}", other),
        }

        let mut config = complete();
        config.admin_password = None;
        match config.validate() {
            Err(ConfigError::MissingAdminPassword) => (),
            other => panic!("Expected MissingAdminPassword, got {:?}", other),
        }
    }
}
