//! Gateway configuration.

/// Configuration for the API gateway.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Base URL of the Benchtop server, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: 30,
        }
    }
}
