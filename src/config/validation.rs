use crate::config::types::{ApiKeyEntry, CrawlerConfig, ServiceConfig, UserAgentConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &ServiceConfig) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    for entry in &config.auth.keys {
        validate_key_entry(entry)?;
    }
    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.default_timeout_ms < 1 {
        return Err(ConfigError::Validation(
            "default-timeout-ms must be >= 1".to_string(),
        ));
    }

    if config.default_page_limit < 1 {
        return Err(ConfigError::Validation(
            "default-page-limit must be >= 1".to_string(),
        ));
    }

    if config.max_page_limit < config.default_page_limit {
        return Err(ConfigError::Validation(format!(
            "max-page-limit ({}) must be >= default-page-limit ({})",
            config.max_page_limit, config.default_page_limit
        )));
    }

    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-fetches must be between 1 and 100, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.fetch_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "fetch-timeout-ms must be >= 100ms, got {}ms",
            config.fetch_timeout_ms
        )));
    }

    if config.search_result_limit < 1 {
        return Err(ConfigError::Validation(
            "search-result-limit must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.service_name.is_empty() {
        return Err(ConfigError::Validation(
            "service-name cannot be empty".to_string(),
        ));
    }

    if !config
        .service_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "service-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.service_name
        )));
    }

    if !config.contact_url.starts_with("http://") && !config.contact_url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "contact-url must be an http(s) URL, got '{}'",
            config.contact_url
        )));
    }

    Ok(())
}

fn validate_key_entry(entry: &ApiKeyEntry) -> Result<(), ConfigError> {
    if entry.key_hash.len() != 64 || !entry.key_hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ConfigError::Validation(format!(
            "key-hash must be a 64-character hex SHA-256 digest, got '{}'",
            entry.key_hash
        )));
    }

    if entry.tier.is_empty() {
        return Err(ConfigError::Validation("tier cannot be empty".to_string()));
    }

    if entry.credits < 0 {
        return Err(ConfigError::Validation(format!(
            "credits must be >= 0, got {}",
            entry.credits
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&ServiceConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_page_limit_rejected() {
        let mut config = ServiceConfig::default();
        config.crawler.default_page_limit = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_max_below_default_limit_rejected() {
        let mut config = ServiceConfig::default();
        config.crawler.default_page_limit = 50;
        config.crawler.max_page_limit = 10;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_excessive_concurrency_rejected() {
        let mut config = ServiceConfig::default();
        config.crawler.max_concurrent_fetches = 500;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_short_fetch_timeout_rejected() {
        let mut config = ServiceConfig::default();
        config.crawler.fetch_timeout_ms = 10;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_bad_service_name_rejected() {
        let mut config = ServiceConfig::default();
        config.user_agent.service_name = "has spaces".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_bad_key_hash_rejected() {
        let mut config = ServiceConfig::default();
        config.auth.keys.push(ApiKeyEntry {
            key_hash: "not-a-digest".to_string(),
            tier: "standard".to_string(),
            credits: 10,
        });
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_valid_key_entry_accepted() {
        let mut config = ServiceConfig::default();
        config.auth.keys.push(ApiKeyEntry {
            key_hash: crate::auth::hash_key("sk-test"),
            tier: "standard".to_string(),
            credits: 10,
        });
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_negative_credits_rejected() {
        let mut config = ServiceConfig::default();
        config.auth.keys.push(ApiKeyEntry {
            key_hash: crate::auth::hash_key("sk-test"),
            tier: "standard".to_string(),
            credits: -1,
        });
        assert!(validate(&config).is_err());
    }
}
