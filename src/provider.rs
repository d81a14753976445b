//! Provider registry
//!
//! Resource and data source handlers looked up by their type name.

use crate::datasource::MetricsCredentialsDataSource;
use crate::digitalocean::databases::SinkType;
use crate::logsink::LogsinkResource;

pub struct Provider {
    resources: Vec<LogsinkResource>,
    metrics_credentials: MetricsCredentialsDataSource,
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider {
    pub fn new() -> Self {
        Self {
            resources: SinkType::ALL.into_iter().map(LogsinkResource::new).collect(),
            metrics_credentials: MetricsCredentialsDataSource::new(),
        }
    }

    pub fn resource(&self, name: &str) -> Option<&LogsinkResource> {
        self.resources.iter().find(|r| r.name() == name)
    }

    /// Resource by sink type
    pub fn logsink(&self, sink_type: SinkType) -> Option<&LogsinkResource> {
        self.resources.iter().find(|r| r.sink_type() == sink_type)
    }

    pub fn resource_names(&self) -> Vec<&'static str> {
        self.resources.iter().map(LogsinkResource::name).collect()
    }

    pub fn data_source(&self, name: &str) -> Option<&MetricsCredentialsDataSource> {
        (name == self.metrics_credentials.name()).then_some(&self.metrics_credentials)
    }

    pub fn data_source_names(&self) -> Vec<&'static str> {
        vec![self.metrics_credentials.name()]
    }
}

/// Accept either a sink type (`rsyslog`) or a full resource name
pub fn parse_sink_type(s: &str) -> anyhow::Result<SinkType> {
    s.parse::<SinkType>().or_else(|_| {
        SinkType::from_resource_name(s)
            .ok_or_else(|| anyhow::anyhow!("Unknown logsink type: {}", s))
    })
}
