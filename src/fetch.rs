//! JSON document fetching.
//!
//! The pipeline only needs "GET a URL and parse JSON". [`JsonFetcher`] is
//! that seam; [`HttpFetcher`] implements it over HTTP and [`StaticFetcher`]
//! serves documents from memory.

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::error::IiifError;

/// Fetches a JSON document by URL.
pub trait JsonFetcher {
    fn fetch_json(&self, url: &str) -> Result<Value, IiifError>;
}

/// Settings for [`HttpFetcher`].
#[derive(Clone, Debug)]
pub struct FetchConfig {
    /// Overall timeout per request. `None` disables the timeout.
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            user_agent: format!("iiif-ingest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Unauthenticated HTTP GET with `Accept: application/json`.
pub struct HttpFetcher {
    agent: ureq::Agent,
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(config.timeout)
            .build();
        Self {
            agent: agent_config.into(),
            user_agent: config.user_agent.clone(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(&FetchConfig::default())
    }
}

impl JsonFetcher for HttpFetcher {
    fn fetch_json(&self, url: &str) -> Result<Value, IiifError> {
        debug!("GET {url}");
        let fetch_error = |message: String| IiifError::Fetch {
            url: url.to_string(),
            message,
        };

        let mut response = self
            .agent
            .get(url)
            .header("Accept", "application/json")
            .header("User-Agent", &self.user_agent)
            .call()
            .map_err(|source| fetch_error(source.to_string()))?;

        response
            .body_mut()
            .read_json::<Value>()
            .map_err(|source| fetch_error(source.to_string()))
    }
}

/// Serves JSON documents from memory; unknown URLs fail.
///
/// Every requested URL is recorded, in request order.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    documents: HashMap<String, Value>,
    requests: RefCell<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, url: impl Into<String>, document: Value) -> Self {
        self.insert(url, document);
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, document: Value) {
        self.documents.insert(url.into(), document);
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl JsonFetcher for StaticFetcher {
    fn fetch_json(&self, url: &str) -> Result<Value, IiifError> {
        self.requests.borrow_mut().push(url.to_string());
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| IiifError::Fetch {
                url: url.to_string(),
                message: "no such document".to_string(),
            })
    }
}
