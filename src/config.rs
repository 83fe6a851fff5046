//! Runtime configuration for the casing-api server.

use std::fmt;
use std::path::PathBuf;

use crate::middleware::TransformConfig;
use crate::name_mapper::{FieldMappings, MappingError, NameMapper};

/// Error type for configuration loading
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { var: &'static str, value: String },
    Mappings(MappingError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue { var, value } => {
                write!(f, "Invalid value for {}: '{}'", var, value)
            }
            ConfigError::Mappings(e) => write!(f, "Failed to load field mappings: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<MappingError> for ConfigError {
    fn from(err: MappingError) -> Self {
        ConfigError::Mappings(err)
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// YAML override table; the built-in storefront table when unset.
    pub mappings_file: Option<PathBuf>,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            mappings_file: None,
            max_body_bytes: TransformConfig::default().max_body_bytes,
        }
    }
}

impl ServerConfig {
    /// Read `PORT`, `MAPPINGS_FILE` and `MAX_BODY_BYTES` from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidValue { var: "PORT", value })?,
            None => defaults.port,
        };

        let max_body_bytes = match lookup("MAX_BODY_BYTES") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidValue { var: "MAX_BODY_BYTES", value })?,
            None => defaults.max_body_bytes,
        };

        let mappings_file = lookup("MAPPINGS_FILE")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            port,
            mappings_file,
            max_body_bytes,
        })
    }

    pub fn transform_config(&self) -> TransformConfig {
        TransformConfig {
            max_body_bytes: self.max_body_bytes,
        }
    }

    /// Name mapper backed by the configured override table.
    pub fn name_mapper(&self) -> Result<NameMapper, ConfigError> {
        match &self.mappings_file {
            Some(path) => Ok(NameMapper::new(FieldMappings::load_from_file(path)?)),
            None => Ok(NameMapper::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_body_bytes, 2 * 1024 * 1024);
        assert!(config.mappings_file.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("MAX_BODY_BYTES", "1024"),
            ("MAPPINGS_FILE", "config/field_mappings.yaml"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.transform_config().max_body_bytes, 1024);
        assert_eq!(config.mappings_file, Some(PathBuf::from("config/field_mappings.yaml")));
    }

    #[test]
    fn test_invalid_port() {
        let err = ServerConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: "PORT", .. }));
    }

    #[test]
    fn test_name_mapper_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "zip_code: postalCode").unwrap();

        let config = ServerConfig {
            mappings_file: Some(file.path().to_path_buf()),
            ..Default::default()
        };

        let mapper = config.name_mapper().unwrap();
        assert_eq!(mapper.map_field("zip_code", true), "postalCode");
        assert_eq!(mapper.map_field("image_url", true), "imageUrl");
    }

    #[test]
    fn test_name_mapper_missing_file() {
        let config = ServerConfig {
            mappings_file: Some(PathBuf::from("/nonexistent/mappings.yaml")),
            ..Default::default()
        };
        assert!(matches!(config.name_mapper(), Err(ConfigError::Mappings(MappingError::Io(_)))));
    }
}
