//! Database logsink resources
//!
//! Log forwarding from a managed database cluster to an rsyslog server or an
//! Elasticsearch/OpenSearch endpoint.
//!
//! # Architecture
//!
//! - [`id`] - Composite `cluster_id,logsink_id` identifiers
//! - [`pem`] - Certificate/key text normalization
//! - [`validate`] - Single-attribute validators
//! - [`diff`] - Cross-attribute rules checked at plan time
//! - [`mapper`] - Attribute set ↔ API config, one mapper per sink type
//! - [`resource`] - Plan and CRUD handlers driving the API client

pub mod diff;
pub mod id;
pub mod mapper;
pub mod pem;
pub mod resource;
pub mod validate;

pub use id::{compose, decompose, IdError, LogsinkId};
pub use mapper::{mapper_for, SinkMapper};
pub use resource::{LogsinkResource, Plan, ValidationError};
