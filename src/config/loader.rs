//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::NodeConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Validation(_) => None,
        }
    }
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<NodeConfig, ConfigError> {
    let config: NodeConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<NodeConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [[routes]]
            pattern = "/health"
            body = "ok"

            [fallback]
            kind = "static"
            "#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.routes.len(), 1);
        assert!(config.fallback.is_some());
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/proxy-mux.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("routes = 5").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_message() {
        let err = parse_config(
            r#"
            [timeouts]
            request_secs = 0
            "#,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: timeouts.request_secs must be greater than zero"
        );
    }

    #[test]
    fn test_cluster_values_any_spelling() {
        use crate::cluster::{ClusterRole, LoadPolicy};

        let config = parse_config(
            r#"
            [cluster]
            role = "Master"
            load_policy = "least-connections"
            "#,
        )
        .unwrap();
        assert_eq!(config.cluster.role(), ClusterRole::Master);
        assert_eq!(config.cluster.load_policy(), &LoadPolicy::LeastConnections);

        let config = parse_config("[cluster]\nload_policy = \"consistent_hash\"\n").unwrap();
        assert_eq!(
            config.cluster.load_policy(),
            &LoadPolicy::Other("consistent_hash".into())
        );

        let err = parse_config("[cluster]\nrole = \"leader\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
