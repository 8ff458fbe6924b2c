use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:9000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Scraping runs synchronously on the backend and can take minutes.
    pub search_timeout: Duration,
    pub max_response_bytes: u64,
    pub max_export_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            search_timeout: Duration::from_secs(15 * 60),
            max_response_bytes: 5 * 1024 * 1024,
            max_export_bytes: 64 * 1024 * 1024,
        }
    }
}

impl ClientSettings {
    pub fn with_base_url(self, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..self
        }
    }
}
