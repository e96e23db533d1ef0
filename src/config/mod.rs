//! Service configuration
//!
//! Loaded from a TOML file with kebab-case keys, validated after parse.
//! Every field has a serve-safe default so a partial (or absent) file still
//! yields a usable configuration.

mod parser;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use types::{ApiKeyEntry, AuthConfig, CrawlerConfig, ServiceConfig, UserAgentConfig};
pub use validation::validate;
