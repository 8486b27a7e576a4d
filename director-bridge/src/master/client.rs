//! HTTP client for the Master API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Map, Value};

use super::cache::GroupCache;
use super::error::{LookupError, MasterError, TransportError};
use super::listing::GroupListing;
use super::{GroupCommand, GroupControl, COMMAND_LIST, ENTITY_LIVE_ACTIVITY_GROUP, REQUEST_EXT};

/// Field of the listing response that holds the group array
pub const RESPONSE_FIELD_DATA: &str = "data";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone)]
pub struct MasterApiConfig {
    /// Base URL of the master, e.g. `http://lg-head:8080/interactivespaces`
    pub base_url: String,
    pub timeout_ms: u64,
    /// Parse response bodies even when the status is not 200
    pub lenient_status: bool,
}

impl MasterApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            lenient_status: false,
        }
    }
}

/// Client for the master's live activity group endpoints
#[derive(Debug)]
pub struct MasterApi {
    base_url: String,
    lenient_status: bool,
    http: reqwest::Client,
    groups: GroupCache,
}

impl MasterApi {
    pub fn new(config: MasterApiConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            lenient_status: config.lenient_status,
            http,
            groups: GroupCache::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Activate a live activity group by name
    pub async fn activate_group(&self, name: &str) -> Result<(), MasterError> {
        self.manipulate_group(name, GroupCommand::Activate).await
    }

    /// Deactivate a live activity group by name
    pub async fn deactivate_group(&self, name: &str) -> Result<(), MasterError> {
        self.manipulate_group(name, GroupCommand::Deactivate).await
    }

    /// Forget the cached group listing
    pub async fn invalidate_cache(&self) {
        self.groups.invalidate().await;
    }

    /// Cached group listing, if it has been fetched
    pub async fn cached_groups(&self) -> Option<GroupListing> {
        self.groups.snapshot().await
    }

    async fn manipulate_group(&self, name: &str, command: GroupCommand) -> Result<(), MasterError> {
        let id = self.lookup_group_id(name).await.map_err(|source| MasterError::Resolution {
            name: name.to_string(),
            source,
        })?;

        let path = format!("{}/{}/{}{}", ENTITY_LIVE_ACTIVITY_GROUP, id, command.segment(), REQUEST_EXT);
        self.send_request(&path).await.map_err(|source| MasterError::RemoteCall {
            name: name.to_string(),
            id,
            command,
            source,
        })?;

        tracing::info!(group = name, id, %command, "Live activity group command sent");
        Ok(())
    }

    async fn lookup_group_id(&self, name: &str) -> Result<i64, LookupError> {
        self.groups.resolve(name, || self.fetch_group_listing()).await
    }

    async fn fetch_group_listing(&self) -> Result<GroupListing, LookupError> {
        let path = format!("{}/{}{}", ENTITY_LIVE_ACTIVITY_GROUP, COMMAND_LIST, REQUEST_EXT);
        let response = self.send_request(&path).await?;

        response
            .get(RESPONSE_FIELD_DATA)
            .and_then(GroupListing::from_data)
            .ok_or_else(|| LookupError::MalformedListing {
                url: self.url_for(&path),
            })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// GET `path` and parse the body as a JSON object
    async fn send_request(&self, path: &str) -> Result<Map<String, Value>, TransportError> {
        let url = self.url_for(path);
        tracing::info!(%url, "Hitting master");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| TransportError::Request { url: url.clone(), source })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| TransportError::Body { url: url.clone(), source })?;
        tracing::debug!(%url, %status, body = %body, "Master response");

        if status != StatusCode::OK {
            if !self.lenient_status {
                return Err(TransportError::Status { url, status });
            }
            tracing::warn!(%url, %status, "Master request returned non-OK status, parsing body anyway");
        }

        match serde_json::from_str::<Value>(&body) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(TransportError::NotAnObject { url }),
            Err(source) => Err(TransportError::Decode { url, source }),
        }
    }
}

#[async_trait]
impl GroupControl for MasterApi {
    async fn set_group_state(&self, name: &str, command: GroupCommand) -> Result<(), MasterError> {
        self.manipulate_group(name, command).await
    }

    async fn refresh_groups(&self) {
        self.invalidate_cache().await;
    }
}
