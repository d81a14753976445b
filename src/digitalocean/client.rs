//! DigitalOcean Client
//!
//! Main client for the DigitalOcean API, combining the token
//! and HTTP functionality.

use super::http::DoHttpClient;
use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

/// Public API endpoint
pub const DEFAULT_API_URL: &str = "https://api.digitalocean.com";

/// Main DigitalOcean client
#[derive(Clone)]
pub struct DoClient {
    pub http: DoHttpClient,
    token: String,
    base_url: String,
}

impl std::fmt::Debug for DoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DoClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl DoClient {
    /// Create a new client against `base_url` authenticating with `token`
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "No DigitalOcean API token configured. Set DIGITALOCEAN_TOKEN or use --token"
            ));
        }

        let http = DoHttpClient::new()?;

        Ok(Self {
            http,
            token: token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Make a GET request
    pub async fn get(&self, url: &str) -> Result<Value> {
        self.http.get(url, &self.token).await
    }

    /// Make a POST request
    pub async fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<Value> {
        self.http.post(url, &self.token, body).await
    }

    /// Make a PUT request
    pub async fn put<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<Value> {
        self.http.put(url, &self.token, body).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: &str) -> Result<Value> {
        self.http.delete(url, &self.token).await
    }

    // =========================================================================
    // Databases API helpers
    // =========================================================================

    /// Build Databases API URL
    pub fn databases_url(&self, path: &str) -> String {
        format!("{}/v2/databases/{}", self.base_url, path)
    }

    /// Build the logsink collection URL for a cluster
    pub fn logsinks_url(&self, cluster_id: &str) -> String {
        self.databases_url(&format!("{}/logsink", urlencoding::encode(cluster_id)))
    }

    /// Build the URL of a single logsink
    pub fn logsink_url(&self, cluster_id: &str, logsink_id: &str) -> String {
        format!(
            "{}/{}",
            self.logsinks_url(cluster_id),
            urlencoding::encode(logsink_id)
        )
    }

    /// Build the account-wide metrics credentials URL
    pub fn metrics_credentials_url(&self) -> String {
        self.databases_url("metrics/credentials")
    }
}
