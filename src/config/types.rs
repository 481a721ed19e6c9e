use serde::Deserialize;

/// Main configuration structure for Link-Spider
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub tls: TlsConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// URL the crawl starts from when no pending pages exist
    #[serde(default)]
    pub seed: Option<String>,

    /// Number of fetch steps per run (0 runs until the frontier drains)
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,

    /// Number of pages fetched concurrently
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Deadline for a single fetch, in seconds
    #[serde(rename = "fetch-timeout", default = "default_fetch_timeout")]
    pub fetch_timeout: u64,
}

/// TLS behavior of the HTTP fetcher
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TlsConfig {
    /// Skip certificate and hostname validation
    #[serde(rename = "accept-invalid-certs", default)]
    pub accept_invalid_certs: bool,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

fn default_max_pages() -> usize {
    100
}

fn default_workers() -> usize {
    1
}

fn default_fetch_timeout() -> u64 {
    30
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_pages: default_max_pages(),
            workers: default_workers(),
            fetch_timeout: default_fetch_timeout(),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "LinkSpider".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value (`Name/Version`)
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}
