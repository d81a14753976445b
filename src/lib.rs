//! DigitalOcean managed-database logsink resources
//!
//! Rsyslog, Elasticsearch and OpenSearch log forwarding for managed database
//! clusters, plus the account's metrics credentials.
//!
//! - [`digitalocean`] - API client and wire types
//! - [`schema`] - Attribute schemas and the flat resource attribute set
//! - [`logsink`] - Identity, validation, mapping and CRUD for logsinks
//! - [`datasource`] - Metrics credentials data source
//! - [`provider`] - Registry of resources and data sources by type name
//! - [`config`] - Persistent CLI configuration

pub mod config;
pub mod datasource;
pub mod digitalocean;
pub mod logsink;
pub mod provider;
pub mod schema;

/// Version injected at compile time via DO_LOGSINK_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("DO_LOGSINK_VERSION") {
    Some(v) => v,
    None => "dev",
};
