//! Client Configuration
//!
//! Connection settings for the research backend and the request body posted
//! to open a stream.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default stall timeout: how long the client waits for the next chunk
/// before declaring the connection lost.
pub const DEFAULT_STALL_TIMEOUT_SECS: u64 = 120;

/// Connection settings for a research backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend, e.g. `http://127.0.0.1:8000`.
    pub base_url: String,
    /// Maximum silence between chunks before the stream is considered
    /// stalled. `None` disables the watchdog entirely.
    pub stall_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            stall_timeout: Some(Duration::from_secs(DEFAULT_STALL_TIMEOUT_SECS)),
        }
    }

    pub fn with_stall_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stall_timeout = timeout;
        self
    }

    /// Full URL of the streaming research endpoint.
    pub fn research_url(&self) -> String {
        format!("{}/research/stream", self.base_url.trim_end_matches('/'))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://127.0.0.1:8000")
    }
}

/// Request body posted to open a research stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchRequest {
    pub query: String,
    /// Protocol generation requested from the backend ("v1" or "v2").
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kb_name: Option<String>,
    pub search_web: bool,
    pub search_local: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<u32>,
}

impl ResearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            version: "v2".to_string(),
            kb_name: None,
            search_web: true,
            search_local: false,
            max_iterations: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_knowledge_base(mut self, kb_name: impl Into<String>) -> Self {
        self.kb_name = Some(kb_name.into());
        self.search_local = true;
        self
    }

    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = Some(max);
        self
    }
}
