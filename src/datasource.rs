//! Metrics credentials data source
//!
//! `digitalocean_database_cluster_metrics_credentials` exposes the basic-auth
//! credentials used to scrape database metrics. The credentials are
//! account-wide; `cluster_id` only keys the data source instance.

use crate::digitalocean::client::DoClient;
use crate::digitalocean::databases;
use crate::logsink::validate::no_zero_values;
use crate::logsink::ValidationError;
use crate::schema::{AttrType, Attribute, ResourceData, Schema};
use anyhow::{Context, Result};
use serde_json::{Map, Value};

pub const METRICS_CREDENTIALS: &str = "digitalocean_database_cluster_metrics_credentials";

pub struct MetricsCredentialsDataSource {
    schema: Schema,
}

impl Default for MetricsCredentialsDataSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCredentialsDataSource {
    pub fn new() -> Self {
        let schema = Schema::new()
            .with(
                "cluster_id",
                Attribute::required(AttrType::String).validate_with(no_zero_values),
            )
            .with("username", Attribute::computed(AttrType::String))
            .with("password", Attribute::computed(AttrType::String).sensitive());

        Self { schema }
    }

    pub fn name(&self) -> &'static str {
        METRICS_CREDENTIALS
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub async fn read(&self, client: &DoClient, config: Map<String, Value>) -> Result<ResourceData> {
        let violations = self.schema.validate(&config);
        if !violations.is_empty() {
            return Err(ValidationError { violations }.into());
        }

        let mut data = ResourceData::from_attributes(config);
        let cluster_id = data.str_or_empty("cluster_id").to_string();

        let creds = databases::get_metrics_credentials(client)
            .await
            .context("Error retrieving database metrics credentials")?;

        data.set_id(cluster_id);
        data.set("username", creds.basic_auth_username);
        data.set("password", creds.basic_auth_password);

        Ok(data)
    }
}
