//! Config Mapper
//!
//! Translates between the flat attribute set of a logsink resource and the
//! nested [`LogsinkConfig`] the API speaks. Each sink type has its own
//! [`SinkMapper`], picked once from [`SinkType`] when the resource handler
//! is built.
//!
//! Outbound, only attributes that are set are copied into the request. A set
//! value the wire field cannot hold is an error, never dropped.
//! Inbound, a field is only written back when the API returned a non-empty
//! value, so secrets the API does not echo (such as `client_key`) keep their
//! last known value.

use super::pem;
use super::validate::{
    no_zero_values, validate_https_endpoint, validate_index_days_max, validate_index_prefix,
    validate_port, validate_rsyslog_format, validate_timeout,
};
use crate::digitalocean::databases::{
    CreateLogsinkRequest, Logsink, LogsinkConfig, SinkType, UpdateLogsinkRequest,
};
use crate::schema::{AttrType, Attribute, ResourceData, Schema};
use anyhow::Result;

/// Per-sink-type mapping between attributes and API config
pub trait SinkMapper: Send + Sync {
    fn sink_type(&self) -> SinkType;

    /// Add this sink type's attributes to `schema`
    fn extend_schema(&self, schema: Schema) -> Schema;

    /// Attributes → API config
    fn expand(&self, data: &ResourceData) -> Result<LogsinkConfig>;

    /// API config → attributes, skipping empty remote values
    fn flatten(&self, data: &mut ResourceData, config: &LogsinkConfig);

    /// Cross-field rules, checked at plan time
    fn validate_diff(&self, _data: &ResourceData) -> Vec<String> {
        Vec::new()
    }
}

pub struct RsyslogMapper;
pub struct ElasticsearchMapper;
pub struct OpensearchMapper;

/// Mapper for a sink type
pub fn mapper_for(sink_type: SinkType) -> &'static dyn SinkMapper {
    match sink_type {
        SinkType::Rsyslog => &RsyslogMapper,
        SinkType::Elasticsearch => &ElasticsearchMapper,
        SinkType::Opensearch => &OpensearchMapper,
    }
}

fn string_attr(data: &ResourceData, key: &str) -> Option<String> {
    data.get_str(key).map(str::to_string)
}

fn pem_attr(data: &ResourceData, key: &str) -> Option<String> {
    data.get_str(key).map(pem::normalize)
}

fn int_attr<T: TryFrom<i64>>(data: &ResourceData, key: &str) -> Result<Option<T>> {
    let Some(value) = data.get_ok(key) else {
        return Ok(None);
    };
    value
        .as_i64()
        .and_then(|v| T::try_from(v).ok())
        .map(Some)
        .ok_or_else(|| anyhow::anyhow!("{:?} value {} is out of range", key, value))
}

fn timeout_attr(data: &ResourceData) -> Result<Option<f32>> {
    Ok(int_attr::<i64>(data, "timeout_seconds")?.map(|v| v as f32))
}

fn set_non_empty(data: &mut ResourceData, key: &str, value: &Option<String>) {
    if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
        data.set(key, v);
    }
}

fn set_non_empty_pem(data: &mut ResourceData, key: &str, value: &Option<String>) {
    set_non_empty(data, key, &value.as_deref().map(pem::normalize));
}

fn set_timeout(data: &mut ResourceData, timeout: Option<f32>) {
    if let Some(t) = timeout.filter(|t| *t != 0.0) {
        data.set("timeout_seconds", t as i64);
    }
}

impl SinkMapper for RsyslogMapper {
    fn sink_type(&self) -> SinkType {
        SinkType::Rsyslog
    }

    fn extend_schema(&self, schema: Schema) -> Schema {
        schema
            .with(
                "server",
                Attribute::required(AttrType::String)
                    .validate_with(no_zero_values)
                    .describe("Hostname or IP address of the rsyslog server"),
            )
            .with(
                "port",
                Attribute::required(AttrType::Int)
                    .validate_with(validate_port)
                    .describe("Port number for the rsyslog server (1-65535)"),
            )
            .with(
                "tls",
                Attribute::optional(AttrType::Bool)
                    .default_value(false)
                    .describe("Enable TLS encryption for rsyslog connection"),
            )
            .with(
                "format",
                Attribute::optional(AttrType::String)
                    .default_value("rfc5424")
                    .validate_with(validate_rsyslog_format)
                    .describe("Log format: rfc5424, rfc3164, or custom"),
            )
            .with(
                "logline",
                Attribute::optional(AttrType::String)
                    .describe("Custom logline template (required when format is 'custom')"),
            )
            .with(
                "structured_data",
                Attribute::optional(AttrType::String).describe("Structured data for rsyslog"),
            )
            .with(
                "ca_cert",
                Attribute::optional(AttrType::String)
                    .sensitive()
                    .describe("CA certificate for TLS verification (PEM format)"),
            )
            .with(
                "client_cert",
                Attribute::optional(AttrType::String)
                    .describe("Client certificate for mTLS (PEM format)"),
            )
            .with(
                "client_key",
                Attribute::optional(AttrType::String)
                    .sensitive()
                    .describe("Client private key for mTLS (PEM format)"),
            )
            .with(
                "timeout_seconds",
                Attribute::optional(AttrType::Int)
                    .validate_with(validate_timeout)
                    .describe("Request timeout for log deliveries in seconds (>= 1)"),
            )
    }

    fn expand(&self, data: &ResourceData) -> Result<LogsinkConfig> {
        Ok(LogsinkConfig {
            server: string_attr(data, "server"),
            port: int_attr(data, "port")?,
            tls: data.get_bool("tls"),
            format: string_attr(data, "format"),
            logline: string_attr(data, "logline"),
            sd: string_attr(data, "structured_data"),
            ca: pem_attr(data, "ca_cert"),
            cert: pem_attr(data, "client_cert"),
            key: pem_attr(data, "client_key"),
            timeout: timeout_attr(data)?,
            ..Default::default()
        })
    }

    fn flatten(&self, data: &mut ResourceData, config: &LogsinkConfig) {
        set_non_empty(data, "server", &config.server);
        if let Some(port) = config.port.filter(|p| *p != 0) {
            data.set("port", port);
        }
        data.set("tls", config.tls.unwrap_or(false));
        set_non_empty(data, "format", &config.format);
        set_non_empty(data, "logline", &config.logline);
        set_non_empty(data, "structured_data", &config.sd);
        set_non_empty_pem(data, "ca_cert", &config.ca);
        set_non_empty_pem(data, "client_cert", &config.cert);
        set_non_empty_pem(data, "client_key", &config.key);
        set_timeout(data, config.timeout);
    }

    fn validate_diff(&self, data: &ResourceData) -> Vec<String> {
        super::diff::validate_rsyslog(data)
    }
}

fn extend_search_schema(
    schema: Schema,
    endpoint: &'static str,
    prefix: &'static str,
) -> Schema {
    schema
        .with(
            "endpoint",
            Attribute::required(AttrType::String)
                .validate_with(validate_https_endpoint)
                .describe(endpoint),
        )
        .with(
            "index_prefix",
            Attribute::required(AttrType::String)
                .validate_with(validate_index_prefix)
                .describe(prefix),
        )
        .with(
            "index_days_max",
            Attribute::optional(AttrType::Int)
                .validate_with(validate_index_days_max)
                .describe("Maximum number of days to retain indices (>= 1)"),
        )
        .with(
            "ca_cert",
            Attribute::optional(AttrType::String)
                .sensitive()
                .describe("CA certificate for TLS verification (PEM format)"),
        )
        .with(
            "timeout_seconds",
            Attribute::optional(AttrType::Int)
                .validate_with(validate_timeout)
                .describe("Request timeout for log deliveries in seconds (>= 1)"),
        )
}

fn expand_search(data: &ResourceData) -> Result<LogsinkConfig> {
    Ok(LogsinkConfig {
        url: string_attr(data, "endpoint"),
        index_prefix: string_attr(data, "index_prefix"),
        index_days_max: int_attr(data, "index_days_max")?,
        ca: pem_attr(data, "ca_cert"),
        timeout: timeout_attr(data)?,
        ..Default::default()
    })
}

fn flatten_search(data: &mut ResourceData, config: &LogsinkConfig) {
    set_non_empty(data, "endpoint", &config.url);
    set_non_empty(data, "index_prefix", &config.index_prefix);
    if let Some(days) = config.index_days_max.filter(|d| *d != 0) {
        data.set("index_days_max", days);
    }
    set_non_empty_pem(data, "ca_cert", &config.ca);
    set_timeout(data, config.timeout);
}

impl SinkMapper for ElasticsearchMapper {
    fn sink_type(&self) -> SinkType {
        SinkType::Elasticsearch
    }

    fn extend_schema(&self, schema: Schema) -> Schema {
        extend_search_schema(
            schema,
            "HTTPS URL to Elasticsearch (https://host:port)",
            "Prefix for Elasticsearch indices",
        )
    }

    fn expand(&self, data: &ResourceData) -> Result<LogsinkConfig> {
        expand_search(data)
    }

    fn flatten(&self, data: &mut ResourceData, config: &LogsinkConfig) {
        flatten_search(data, config)
    }
}

impl SinkMapper for OpensearchMapper {
    fn sink_type(&self) -> SinkType {
        SinkType::Opensearch
    }

    fn extend_schema(&self, schema: Schema) -> Schema {
        extend_search_schema(
            schema,
            "HTTPS URL to OpenSearch (https://host:port)",
            "Prefix for OpenSearch indices",
        )
    }

    fn expand(&self, data: &ResourceData) -> Result<LogsinkConfig> {
        expand_search(data)
    }

    fn flatten(&self, data: &mut ResourceData, config: &LogsinkConfig) {
        flatten_search(data, config)
    }
}

/// Full create payload: name, type and config
pub fn build_create_request(
    data: &ResourceData,
    mapper: &dyn SinkMapper,
) -> Result<CreateLogsinkRequest> {
    Ok(CreateLogsinkRequest {
        name: data.str_or_empty("name").to_string(),
        sink_type: mapper.sink_type(),
        config: mapper.expand(data)?,
    })
}

/// Update payload: config only
pub fn build_update_request(
    data: &ResourceData,
    mapper: &dyn SinkMapper,
) -> Result<UpdateLogsinkRequest> {
    Ok(UpdateLogsinkRequest {
        config: mapper.expand(data)?,
    })
}

/// Write an API logsink into the attribute set
pub fn set_resource_data(data: &mut ResourceData, logsink: &Logsink, mapper: &dyn SinkMapper) {
    data.set("name", logsink.name.as_str());
    data.set("logsink_id", logsink.id.as_str());

    if let Some(config) = &logsink.config {
        mapper.flatten(data, config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn data(value: Value) -> ResourceData {
        ResourceData::from_attributes(value.as_object().cloned().unwrap())
    }

    #[test]
    fn test_expand_rsyslog() {
        let d = data(json!({
            "server": "test.example.com",
            "port": 514,
            "tls": true,
            "format": "rfc5424",
            "logline": "%timestamp% %HOSTNAME%",
            "structured_data": "[test@123]",
            "ca_cert": "  \n-----BEGIN CERTIFICATE-----\ntest\n-----END CERTIFICATE-----\n  ",
            "client_cert": "  client-cert  ",
            "client_key": "  client-key  ",
            "timeout_seconds": 30,
        }));

        let config = RsyslogMapper.expand(&d).unwrap();
        assert_eq!(config.server.as_deref(), Some("test.example.com"));
        assert_eq!(config.port, Some(514));
        assert_eq!(config.tls, Some(true));
        assert_eq!(config.format.as_deref(), Some("rfc5424"));
        assert_eq!(config.logline.as_deref(), Some("%timestamp% %HOSTNAME%"));
        assert_eq!(config.sd.as_deref(), Some("[test@123]"));
        assert_eq!(
            config.ca.as_deref(),
            Some("-----BEGIN CERTIFICATE-----\ntest\n-----END CERTIFICATE-----")
        );
        assert_eq!(config.cert.as_deref(), Some("client-cert"));
        assert_eq!(config.key.as_deref(), Some("client-key"));
        assert_eq!(config.timeout, Some(30.0));
        assert_eq!(config.url, None);
    }

    #[test]
    fn test_expand_search() {
        let d = data(json!({
            "endpoint": "https://es.example.com:9200",
            "index_prefix": "test-logs",
            "index_days_max": 14,
            "ca_cert": "  test-ca-cert  ",
            "timeout_seconds": 60,
        }));

        for mapper in [mapper_for(SinkType::Elasticsearch), mapper_for(SinkType::Opensearch)] {
            let config = mapper.expand(&d).unwrap();
            assert_eq!(config.url.as_deref(), Some("https://es.example.com:9200"));
            assert_eq!(config.index_prefix.as_deref(), Some("test-logs"));
            assert_eq!(config.index_days_max, Some(14));
            assert_eq!(config.ca.as_deref(), Some("test-ca-cert"));
            assert_eq!(config.timeout, Some(60.0));
            assert_eq!(config.server, None);
            assert_eq!(config.tls, None);
        }
    }

    #[test]
    fn test_expand_omits_unset_attributes() {
        let config = RsyslogMapper
            .expand(&data(json!({"server": "logs", "port": 514})))
            .unwrap();
        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            json!({"server": "logs", "port": 514})
        );
    }

    #[test]
    fn test_expand_rejects_values_the_wire_cannot_hold() {
        let d = data(json!({
            "endpoint": "https://h:9200",
            "index_prefix": "p",
            "index_days_max": 5_000_000_000u64,
        }));
        let err = OpensearchMapper.expand(&d).unwrap_err();
        assert!(err.to_string().contains("index_days_max"));

        let d = data(json!({"server": "logs", "timeout_seconds": u64::MAX}));
        assert!(RsyslogMapper.expand(&d).is_err());
    }

    #[test]
    fn test_flatten_keeps_secret_when_api_omits_it() {
        let mut d = data(json!({"client_key": "secret", "client_cert": "CERT"}));
        let remote = LogsinkConfig {
            server: Some("logs.example.com".into()),
            cert: Some("CERT\n".into()),
            key: Some(String::new()),
            ..Default::default()
        };

        RsyslogMapper.flatten(&mut d, &remote);
        assert_eq!(d.get_str("client_key"), Some("secret"));
        assert_eq!(d.get_str("client_cert"), Some("CERT"));
        assert_eq!(d.get_str("server"), Some("logs.example.com"));
        assert_eq!(d.get_bool("tls"), Some(false));
    }

    #[test]
    fn test_flatten_skips_zero_numbers() {
        let mut d = data(json!({"port": 6514, "timeout_seconds": 10}));
        let remote = LogsinkConfig {
            port: Some(0),
            timeout: Some(0.0),
            ..Default::default()
        };
        RsyslogMapper.flatten(&mut d, &remote);
        assert_eq!(d.get_int("port"), Some(6514));
        assert_eq!(d.get_int("timeout_seconds"), Some(10));
    }

    #[test]
    fn test_flatten_search() {
        let mut d = ResourceData::new();
        let remote = LogsinkConfig {
            url: Some("https://os.example.com:9200".into()),
            index_prefix: Some("logs".into()),
            index_days_max: Some(7),
            timeout: Some(12.0),
            ..Default::default()
        };
        OpensearchMapper.flatten(&mut d, &remote);
        assert_eq!(d.get_str("endpoint"), Some("https://os.example.com:9200"));
        assert_eq!(d.get_str("index_prefix"), Some("logs"));
        assert_eq!(d.get_int("index_days_max"), Some(7));
        assert_eq!(d.get_int("timeout_seconds"), Some(12));
        assert!(!d.is_set("ca_cert"));
    }

    #[test]
    fn test_build_create_request() {
        let d = data(json!({
            "name": "test-logsink",
            "server": "test.example.com",
            "port": 514,
        }));
        let request = build_create_request(&d, &RsyslogMapper).unwrap();
        assert_eq!(request.name, "test-logsink");
        assert_eq!(request.sink_type, SinkType::Rsyslog);
        assert_eq!(request.config.server.as_deref(), Some("test.example.com"));
    }

    #[test]
    fn test_build_update_request_has_config_only() {
        let d = data(json!({"name": "n", "endpoint": "https://es:9200", "index_prefix": "p"}));
        let request = build_update_request(&d, &ElasticsearchMapper).unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"config": {"url": "https://es:9200", "index_prefix": "p"}})
        );
    }

    #[test]
    fn test_set_resource_data() {
        let mut d = ResourceData::new();
        let logsink = Logsink {
            id: "logsink-123".into(),
            name: "test-logsink".into(),
            sink_type: "rsyslog".into(),
            config: Some(LogsinkConfig {
                server: Some("test.example.com".into()),
                port: Some(514),
                ..Default::default()
            }),
        };
        set_resource_data(&mut d, &logsink, &RsyslogMapper);
        assert_eq!(d.get_str("name"), Some("test-logsink"));
        assert_eq!(d.get_str("logsink_id"), Some("logsink-123"));
        assert_eq!(d.get_int("port"), Some(514));
    }

    #[test]
    fn test_only_rsyslog_has_cross_field_rules() {
        let d = data(json!({"format": "custom"}));
        assert!(!RsyslogMapper.validate_diff(&d).is_empty());
        assert!(ElasticsearchMapper.validate_diff(&d).is_empty());
    }
}
