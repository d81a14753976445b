//! Logsink resource handlers
//!
//! Plan, create, read, update, delete and import for the three logsink
//! resources. Every step is a single API call; a 404 on read or delete
//! means the logsink is already gone and is not an error.

use super::id::{self, IdError, LogsinkId};
use super::mapper::{self, mapper_for, SinkMapper};
use super::validate::no_zero_values;
use crate::digitalocean::client::DoClient;
use crate::digitalocean::databases::{self, SinkType};
use crate::digitalocean::http::is_not_found;
use crate::schema::{AttrType, Attribute, ResourceData, Schema};
use anyhow::{Context, Result};
use serde_json::{Map, Value};

/// Configuration rejected before any request was sent
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .violations.join("; "))]
pub struct ValidationError {
    pub violations: Vec<String>,
}

/// Outcome of planning a configuration
#[derive(Debug, Clone)]
pub struct Plan {
    pub planned: ResourceData,
    /// Force-new attributes whose value differs from the prior state
    pub requires_replace: Vec<&'static str>,
}

impl Plan {
    pub fn requires_replacement(&self) -> bool {
        !self.requires_replace.is_empty()
    }
}

/// Handler for one logsink resource type
pub struct LogsinkResource {
    mapper: &'static dyn SinkMapper,
    schema: Schema,
}

impl LogsinkResource {
    pub fn new(sink_type: SinkType) -> Self {
        let mapper = mapper_for(sink_type);
        let schema = mapper.extend_schema(common_schema()).with(
            "logsink_id",
            Attribute::computed(AttrType::String)
                .describe("The API sink_id returned by DigitalOcean"),
        );

        Self { mapper, schema }
    }

    pub fn sink_type(&self) -> SinkType {
        self.mapper.sink_type()
    }

    /// Terraform resource type name
    pub fn name(&self) -> &'static str {
        self.sink_type().resource_name()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Validate a configuration and compute the planned state
    ///
    /// Field and cross-field violations are collected together. When a prior
    /// state is given its id and computed attributes carry over, and any
    /// changed force-new attribute is reported in `requires_replace`.
    pub fn plan(
        &self,
        prior: Option<&ResourceData>,
        mut config: Map<String, Value>,
    ) -> Result<Plan, ValidationError> {
        self.schema.apply_defaults(&mut config);

        let mut violations = self.schema.validate(&config);
        let mut planned = ResourceData::from_attributes(config);
        violations.extend(self.mapper.validate_diff(&planned));

        if !violations.is_empty() {
            return Err(ValidationError { violations });
        }

        let mut requires_replace = Vec::new();
        if let Some(prior) = prior.filter(|p| !p.is_absent()) {
            for name in self.schema.force_new_attributes() {
                if prior.get_ok(name) != planned.get_ok(name) {
                    requires_replace.push(name);
                }
            }
            if requires_replace.is_empty() {
                planned.set_id(prior.id());
                if let Some(sink_id) = prior.get_ok("logsink_id") {
                    planned.set("logsink_id", sink_id.clone());
                }
            }
        }

        Ok(Plan {
            planned,
            requires_replace,
        })
    }

    pub async fn create(&self, client: &DoClient, data: &mut ResourceData) -> Result<()> {
        let sink = self.sink_type();
        let cluster_id = data.str_or_empty("cluster_id").to_string();

        let request = mapper::build_create_request(data, self.mapper)?;
        tracing::debug!(
            "Database logsink {} create configuration: name={} config={:?}",
            sink,
            request.name,
            request.config.redacted()
        );

        let logsink = databases::create_logsink(client, &cluster_id, &request)
            .await
            .with_context(|| format!("Error creating database logsink {}", sink))?;

        tracing::debug!(
            "API response logsink: id='{}' name='{}' type='{}'",
            logsink.id,
            logsink.name,
            logsink.sink_type
        );

        data.set_id(id::compose(&cluster_id, &logsink.id));
        tracing::info!("Database logsink {} ID: {}", sink, logsink.id);

        // Post-create read for consistency
        self.read(client, data).await
    }

    pub async fn read(&self, client: &DoClient, data: &mut ResourceData) -> Result<()> {
        let sink = self.sink_type();
        let id = LogsinkId::parse(data.id())?;

        let logsink =
            match databases::get_logsink(client, &id.cluster_id, &id.logsink_id).await {
                Ok(logsink) => logsink,
                Err(err) if is_not_found(&err) => {
                    tracing::warn!(
                        "Database logsink {} {} not found, removing from state",
                        sink,
                        data.id()
                    );
                    data.clear_id();
                    return Ok(());
                }
                Err(err) => {
                    return Err(err)
                        .with_context(|| format!("Error retrieving database logsink {}", sink));
                }
            };

        data.set("cluster_id", id.cluster_id.as_str());
        mapper::set_resource_data(data, &logsink, self.mapper);

        Ok(())
    }

    pub async fn update(&self, client: &DoClient, data: &mut ResourceData) -> Result<()> {
        let sink = self.sink_type();
        let id = LogsinkId::parse(data.id())?;

        let request = mapper::build_update_request(data, self.mapper)?;
        tracing::debug!(
            "Database logsink {} update configuration: {:?}",
            sink,
            request.config.redacted()
        );

        databases::update_logsink(client, &id.cluster_id, &id.logsink_id, &request)
            .await
            .with_context(|| format!("Error updating database logsink {}", sink))?;

        // Re-read the resource to refresh state
        self.read(client, data).await
    }

    pub async fn delete(&self, client: &DoClient, data: &mut ResourceData) -> Result<()> {
        let sink = self.sink_type();
        let id = LogsinkId::parse(data.id())?;

        tracing::info!("Deleting database logsink {}: {}", sink, data.id());
        match databases::delete_logsink(client, &id.cluster_id, &id.logsink_id).await {
            Ok(()) => {}
            Err(err) if is_not_found(&err) => {
                tracing::info!("Database logsink {} {} was already deleted", sink, data.id());
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Error deleting database logsink {}", sink));
            }
        }

        data.clear_id();
        Ok(())
    }

    /// Start a state from an import id; a following read fills in the rest
    pub fn import(&self, import_id: &str) -> Result<ResourceData, IdError> {
        let id = LogsinkId::parse_import(import_id)?;

        let mut data = ResourceData::new();
        data.set_id(id.to_string());
        data.set("cluster_id", id.cluster_id.as_str());
        Ok(data)
    }
}

/// Attributes shared by every logsink resource
fn common_schema() -> Schema {
    Schema::new()
        .with(
            "cluster_id",
            Attribute::required(AttrType::String)
                .force_new()
                .validate_with(no_zero_values)
                .describe("UUID of the source database cluster that will forward logs"),
        )
        .with(
            "name",
            Attribute::required(AttrType::String)
                .force_new()
                .validate_with(no_zero_values)
                .describe("Display name for the logsink"),
        )
        .with(
            "id",
            Attribute::computed(AttrType::String).describe("Composite ID of the logsink resource"),
        )
}
