//! Managed Databases API
//!
//! Wire types and calls for database logsinks and metrics credentials.

use super::client::DoClient;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Logsink destination kind, serialized as the API's `sink_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkType {
    Rsyslog,
    Elasticsearch,
    Opensearch,
}

impl SinkType {
    pub const ALL: [SinkType; 3] = [Self::Rsyslog, Self::Elasticsearch, Self::Opensearch];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rsyslog => "rsyslog",
            Self::Elasticsearch => "elasticsearch",
            Self::Opensearch => "opensearch",
        }
    }

    /// Terraform resource type name for this sink
    pub fn resource_name(&self) -> &'static str {
        match self {
            Self::Rsyslog => "digitalocean_database_logsink_rsyslog",
            Self::Elasticsearch => "digitalocean_database_logsink_elasticsearch",
            Self::Opensearch => "digitalocean_database_logsink_opensearch",
        }
    }

    /// Resolve the sink type from a resource type name
    pub fn from_resource_name(resource_name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| resource_name.contains(&format!("_{}", t.as_str())))
    }
}

impl fmt::Display for SinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SinkType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown sink type: {}", s))
    }
}

/// Logsink configuration as exchanged with the API
///
/// Every field is optional: unset fields are left out of the request body
/// instead of being sent as zero values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogsinkConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_days_max: Option<u32>,
    /// Delivery timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f32>,
}

impl LogsinkConfig {
    /// Copy with certificate material masked, for logging
    pub fn redacted(&self) -> Self {
        let mask = |v: &Option<String>| v.as_ref().map(|_| "<redacted>".to_string());
        Self {
            ca: mask(&self.ca),
            cert: mask(&self.cert),
            key: mask(&self.key),
            ..self.clone()
        }
    }
}

/// A logsink attached to a database cluster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Logsink {
    #[serde(rename = "sink_id", default)]
    pub id: String,
    #[serde(rename = "sink_name", default)]
    pub name: String,
    #[serde(rename = "sink_type", default)]
    pub sink_type: String,
    #[serde(default)]
    pub config: Option<LogsinkConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateLogsinkRequest {
    #[serde(rename = "sink_name")]
    pub name: String,
    #[serde(rename = "sink_type")]
    pub sink_type: SinkType,
    pub config: LogsinkConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateLogsinkRequest {
    pub config: LogsinkConfig,
}

/// Basic-auth credentials for scraping database metrics
#[derive(Clone, Default, PartialEq, Deserialize)]
pub struct MetricsCredentials {
    #[serde(default)]
    pub basic_auth_username: String,
    #[serde(default)]
    pub basic_auth_password: String,
}

impl fmt::Debug for MetricsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsCredentials")
            .field("basic_auth_username", &self.basic_auth_username)
            .field("basic_auth_password", &"<redacted>")
            .finish()
    }
}

/// Decode a logsink from either `{"sink": {...}}` or a bare object
fn parse_logsink(response: Value) -> Result<Logsink> {
    let value = match response {
        Value::Object(mut map) if map.contains_key("sink") => {
            map.remove("sink").unwrap_or(Value::Null)
        }
        other => other,
    };

    serde_json::from_value(value).context("Failed to decode logsink")
}

/// Create a logsink on a cluster
pub async fn create_logsink(
    client: &DoClient,
    cluster_id: &str,
    request: &CreateLogsinkRequest,
) -> Result<Logsink> {
    let url = client.logsinks_url(cluster_id);
    let response = client.post(&url, request).await?;
    parse_logsink(response)
}

/// Fetch a single logsink
pub async fn get_logsink(client: &DoClient, cluster_id: &str, logsink_id: &str) -> Result<Logsink> {
    let url = client.logsink_url(cluster_id, logsink_id);
    let response = client.get(&url).await?;
    parse_logsink(response)
}

/// Replace a logsink's configuration
pub async fn update_logsink(
    client: &DoClient,
    cluster_id: &str,
    logsink_id: &str,
    request: &UpdateLogsinkRequest,
) -> Result<()> {
    let url = client.logsink_url(cluster_id, logsink_id);
    client.put(&url, request).await?;
    Ok(())
}

/// Delete a logsink
pub async fn delete_logsink(client: &DoClient, cluster_id: &str, logsink_id: &str) -> Result<()> {
    let url = client.logsink_url(cluster_id, logsink_id);
    client.delete(&url).await?;
    Ok(())
}

/// Fetch the account-wide metrics credentials
pub async fn get_metrics_credentials(client: &DoClient) -> Result<MetricsCredentials> {
    let url = client.metrics_credentials_url();
    let mut response = client.get(&url).await?;

    let credentials = response
        .get_mut("credentials")
        .map(Value::take)
        .ok_or_else(|| anyhow::anyhow!("Response is missing 'credentials'"))?;

    serde_json::from_value(credentials).context("Failed to decode metrics credentials")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sink_type_from_resource_name() {
        assert_eq!(
            SinkType::from_resource_name("digitalocean_database_logsink_rsyslog"),
            Some(SinkType::Rsyslog)
        );
        assert_eq!(
            SinkType::from_resource_name("digitalocean_database_logsink_elasticsearch"),
            Some(SinkType::Elasticsearch)
        );
        assert_eq!(
            SinkType::from_resource_name("digitalocean_database_logsink_opensearch"),
            Some(SinkType::Opensearch)
        );
        assert_eq!(
            SinkType::from_resource_name("digitalocean_database_logsink_unknown"),
            None
        );
        assert_eq!(SinkType::from_resource_name("digitalocean_database_cluster"), None);
    }

    #[test]
    fn test_sink_type_from_str() {
        assert_eq!("opensearch".parse::<SinkType>().unwrap(), SinkType::Opensearch);
        assert!("syslog".parse::<SinkType>().is_err());
    }

    #[test]
    fn test_unset_config_fields_are_omitted() {
        let config = LogsinkConfig {
            server: Some("192.168.1.100".into()),
            port: Some(514),
            tls: Some(false),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            json!({"server": "192.168.1.100", "port": 514, "tls": false})
        );
    }

    #[test]
    fn test_parse_wrapped_and_bare_logsink() {
        let wrapped = json!({"sink": {"sink_id": "s1", "sink_name": "n", "sink_type": "rsyslog"}});
        let bare = json!({"sink_id": "s1", "sink_name": "n", "sink_type": "rsyslog"});
        assert_eq!(parse_logsink(wrapped).unwrap(), parse_logsink(bare).unwrap());
    }

    #[test]
    fn test_redacted_masks_only_set_pem_fields() {
        let config = LogsinkConfig {
            ca: Some("-----BEGIN CERTIFICATE-----".into()),
            key: Some("secret".into()),
            server: Some("logs.example.com".into()),
            ..Default::default()
        };
        let redacted = config.redacted();
        assert_eq!(redacted.ca.as_deref(), Some("<redacted>"));
        assert_eq!(redacted.key.as_deref(), Some("<redacted>"));
        assert_eq!(redacted.cert, None);
        assert_eq!(redacted.server.as_deref(), Some("logs.example.com"));
    }

    #[test]
    fn test_metrics_credentials_debug_hides_password() {
        let creds = MetricsCredentials {
            basic_auth_username: "user".into(),
            basic_auth_password: "hunter2".into(),
        };
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }
}
