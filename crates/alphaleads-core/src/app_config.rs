use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub yelp_api_key: Option<String>,
    pub hunter_api_key: Option<String>,
    pub clearbit_api_key: Option<String>,
    pub osm_enabled: bool,
    pub osm_phone_enrichment: bool,
    pub sec_enabled: bool,
    pub user_agent: String,
    pub source_cache_ttl_secs: u64,
    pub source_max_retries: u32,
    pub source_retry_backoff_ms: u64,
    pub validation_enabled: bool,
    pub validation_batch_size: usize,
    pub validation_batch_delay_ms: u64,
    pub rate_limit_max_requests: usize,
    pub rate_limit_window_secs: u64,
}

fn redact(value: Option<&String>) -> Option<&'static str> {
    value.map(|_| "[redacted]")
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &redact(self.database_url.as_ref()))
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("yelp_api_key", &redact(self.yelp_api_key.as_ref()))
            .field("hunter_api_key", &redact(self.hunter_api_key.as_ref()))
            .field("clearbit_api_key", &redact(self.clearbit_api_key.as_ref()))
            .field("osm_enabled", &self.osm_enabled)
            .field("osm_phone_enrichment", &self.osm_phone_enrichment)
            .field("sec_enabled", &self.sec_enabled)
            .field("user_agent", &self.user_agent)
            .field("source_cache_ttl_secs", &self.source_cache_ttl_secs)
            .field("source_max_retries", &self.source_max_retries)
            .field("source_retry_backoff_ms", &self.source_retry_backoff_ms)
            .field("validation_enabled", &self.validation_enabled)
            .field("validation_batch_size", &self.validation_batch_size)
            .field("validation_batch_delay_ms", &self.validation_batch_delay_ms)
            .field("rate_limit_max_requests", &self.rate_limit_max_requests)
            .field("rate_limit_window_secs", &self.rate_limit_window_secs)
            .finish()
    }
}
