use serde::Deserialize;

/// Main configuration structure for Forager
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of pages to process per crawl job
    #[serde(default = "default_max_pages", rename = "max-pages")]
    pub max_pages: u32,

    /// Maximum depth to crawl from the seed URL
    #[serde(default = "default_max_depth", rename = "max-depth")]
    pub max_depth: u32,

    /// Pause between consecutive page fetches (milliseconds)
    #[serde(default = "default_politeness_delay", rename = "politeness-delay-ms")]
    pub politeness_delay_ms: u64,

    /// Retry budget per URL for transient failures
    #[serde(default = "default_max_retries", rename = "max-retries-per-url")]
    pub max_retries_per_url: u32,

    /// Base backoff between retries; doubles per attempt (milliseconds)
    #[serde(default = "default_retry_backoff", rename = "retry-backoff-ms")]
    pub retry_backoff_ms: u64,

    /// Hard timeout for a single page fetch (seconds)
    #[serde(default = "default_fetch_timeout", rename = "fetch-timeout-secs")]
    pub fetch_timeout_secs: u64,
}

fn default_max_pages() -> u32 {
    50
}

fn default_max_depth() -> u32 {
    3
}

fn default_politeness_delay() -> u64 {
    2000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff() -> u64 {
    1000
}

fn default_fetch_timeout() -> u64 {
    30
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            max_depth: default_max_depth(),
            politeness_delay_ms: default_politeness_delay(),
            max_retries_per_url: default_max_retries(),
            retry_backoff_ms: default_retry_backoff(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(default = "default_crawler_name", rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(default = "default_crawler_version", rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(default = "default_contact_url", rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(default = "default_contact_email", rename = "contact-email")]
    pub contact_email: String,
}

fn default_crawler_name() -> String {
    "Forager".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_contact_url() -> String {
    "https://github.com/forager/forager".to_string()
}

fn default_contact_email() -> String {
    "crawler@forager.dev".to_string()
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: default_contact_url(),
            contact_email: default_contact_email(),
        }
    }
}

/// Cross-origin relay pool configuration
///
/// Endpoints are URL templates containing a `{url}` placeholder, e.g.
/// `https://relay.example/fetch?target={url}`. An empty pool means all
/// fetches go direct.
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    /// Relay URL templates; each must contain `{url}`
    #[serde(default)]
    pub endpoints: Vec<String>,

    /// Maximum requests per endpoint inside the sliding window
    #[serde(default = "default_window_max", rename = "window-max-requests")]
    pub window_max_requests: u32,

    /// Sliding window length (seconds)
    #[serde(default = "default_window_secs", rename = "window-secs")]
    pub window_secs: u64,

    /// Cool-down before an unhealthy endpoint is retried (seconds)
    #[serde(default = "default_cooldown_secs", rename = "cooldown-secs")]
    pub cooldown_secs: u64,
}

fn default_window_max() -> u32 {
    30
}

fn default_window_secs() -> u64 {
    60
}

fn default_cooldown_secs() -> u64 {
    300
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            window_max_requests: default_window_max(),
            window_secs: default_window_secs(),
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

/// Content extraction and validation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Minimum length of cleaned page text for a page to count
    #[serde(default = "default_min_content", rename = "min-content-length")]
    pub min_content_length: usize,

    /// Minimum length of an individual text fragment in the fallback walk
    #[serde(default = "default_min_fragment", rename = "min-fragment-length")]
    pub min_fragment_length: usize,

    /// Minimum ratio of distinct lines to total lines; below this the page
    /// is rejected as templated chrome
    #[serde(default = "default_distinct_ratio", rename = "min-distinct-line-ratio")]
    pub min_distinct_line_ratio: f64,
}

fn default_min_content() -> usize {
    100
}

fn default_min_fragment() -> usize {
    20
}

fn default_distinct_ratio() -> f64 {
    0.5
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_content_length: default_min_content(),
            min_fragment_length: default_min_fragment(),
            min_distinct_line_ratio: default_distinct_ratio(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite document database
    #[serde(default = "default_database_path", rename = "database-path")]
    pub database_path: String,
}

fn default_database_path() -> String {
    "./forager.db".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}
