//! Config file loading
//!
//! The file is read once; the same text is parsed, validated and hashed so
//! the logged hash always describes the configuration actually in use.

use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Parses and validates configuration text
///
/// # Example
///
/// ```
/// use link_spider::config::parse_config;
///
/// let config = parse_config("[output]\ndatabase-path = \"spider.sqlite\"\n").unwrap();
/// assert_eq!(config.crawler.workers, 1);
/// ```
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Hex-encoded SHA-256 of configuration text
pub fn config_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Loads a configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to read, parse, or validate the file
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    parse_config(&std::fs::read_to_string(path)?)
}

/// Loads a configuration file together with the hash of its content
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, config_hash(&content)))
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
        let config_content = r#"
[crawler]
seed = "https://example.com/index.html"
max-pages = 25
workers = 4
fetch-timeout = 10

[tls]
accept-invalid-certs = true

[user-agent]
crawler-name = "TestCrawler"
crawler-version = "1.0"

[output]
database-path = "./test.sqlite"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(
            config.crawler.seed.as_deref(),
            Some("https://example.com/index.html")
        );
        assert_eq!(config.crawler.max_pages, 25);
        assert_eq!(config.crawler.workers, 4);
        assert_eq!(config.crawler.fetch_timeout, 10);
        assert!(config.tls.accept_invalid_certs);
        assert_eq!(config.user_agent.crawler_name, "TestCrawler");
        assert_eq!(config.output.database_path, "./test.sqlite");
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config_content = r#"
[output]
database-path = "./spider.sqlite"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.seed, None);
        assert_eq!(config.crawler.max_pages, 100);
        assert_eq!(config.crawler.workers, 1);
        assert_eq!(config.crawler.fetch_timeout, 30);
        assert!(!config.tls.accept_invalid_certs);
        assert_eq!(config.user_agent.crawler_name, "LinkSpider");
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let config_content = "this is not valid TOML {{{";
        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[crawler]
workers = 0

[output]
database-path = "./test.sqlite"
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_hash_matches_loaded_content() {
        let config_content = "[output]\ndatabase-path = \"./a.sqlite\"\n";
        let file = create_temp_config(config_content);

        let (config, hash) = load_config_with_hash(file.path()).unwrap();

        assert_eq!(config.output.database_path, "./a.sqlite");
        assert_eq!(hash, config_hash(config_content));
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn test_hash_tracks_content() {
        assert_eq!(config_hash("workers = 1"), config_hash("workers = 1"));
        assert_ne!(config_hash("workers = 1"), config_hash("workers = 2"));
    }

    #[test]
    fn test_invalid_config_yields_no_hash() {
        let file = create_temp_config("[crawler]\nworkers = 0\n[output]\ndatabase-path = \"x\"\n");
        assert!(matches!(
            load_config_with_hash(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }
}
