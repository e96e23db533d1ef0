use crate::config::types::ServiceConfig;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads, parses, and validates a configuration file
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: ServiceConfig = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Used to detect configuration drift between deploys.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns it together with its content hash
pub fn load_config_with_hash(path: &Path) -> Result<(ServiceConfig, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let file = create_temp_config(
            r#"
            [crawler]
            default-timeout-ms = 120000
            default-page-limit = 30

            [user-agent]
            service-name = "TestEngine"
            service-version = "0.1"
            contact-url = "https://example.com/bot"
            "#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.crawler.default_timeout_ms, 120_000);
        assert_eq!(config.crawler.default_page_limit, 30);
        assert_eq!(config.user_agent.service_name, "TestEngine");
    }

    #[test]
    fn test_load_empty_file_uses_defaults() {
        let file = create_temp_config("");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.crawler.default_timeout_ms, 600_000);
    }

    #[test]
    fn test_load_invalid_toml() {
        let file = create_temp_config("this is not [toml");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_failing_validation() {
        let file = create_temp_config("[crawler]\ndefault-page-limit = 0\n");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_config_hash_changes_with_content() {
        let a = create_temp_config("[crawler]\ndefault-page-limit = 1\n");
        let b = create_temp_config("[crawler]\ndefault-page-limit = 2\n");
        let hash_a = compute_config_hash(a.path()).unwrap();
        let hash_b = compute_config_hash(b.path()).unwrap();
        assert_ne!(hash_a, hash_b);
        assert_eq!(hash_a.len(), 64);
    }

    #[test]
    fn test_load_with_hash() {
        let file = create_temp_config("");
        let (_, hash) = load_config_with_hash(file.path()).unwrap();
        assert_eq!(hash, compute_config_hash(file.path()).unwrap());
    }
}
