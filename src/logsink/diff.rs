//! Cross-field rules for rsyslog sinks, checked at plan time

use crate::schema::ResourceData;

/// Check the relationships between rsyslog attributes
///
/// Every rule is evaluated; all violations are returned in rule order.
pub fn validate_rsyslog(data: &ResourceData) -> Vec<String> {
    let mut errors = Vec::new();

    let format = data.str_or_empty("format");
    let logline = data.str_or_empty("logline");
    if format == "custom" && logline.trim().is_empty() {
        errors.push("logline is required when format is 'custom'".to_string());
    }

    let tls = data.get_bool("tls").unwrap_or(false);
    let ca_cert = data.str_or_empty("ca_cert");
    let client_cert = data.str_or_empty("client_cert");
    let client_key = data.str_or_empty("client_key");

    if !tls && (!ca_cert.is_empty() || !client_cert.is_empty() || !client_key.is_empty()) {
        errors.push("tls must be true when ca_cert, client_cert, or client_key is set".to_string());
    }

    if client_cert.is_empty() != client_key.is_empty() {
        errors.push("both client_cert and client_key must be set for mTLS".to_string());
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn data(value: Value) -> ResourceData {
        ResourceData::from_attributes(value.as_object().cloned().unwrap())
    }

    #[test]
    fn test_custom_format_requires_logline() {
        let errors = validate_rsyslog(&data(json!({"format": "custom", "logline": "  "})));
        assert_eq!(errors, vec!["logline is required when format is 'custom'"]);

        let errors = validate_rsyslog(&data(json!({"format": "custom", "logline": "%msg%"})));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_certificates_require_tls() {
        let errors = validate_rsyslog(&data(json!({"tls": false, "ca_cert": "CA"})));
        assert_eq!(
            errors,
            vec!["tls must be true when ca_cert, client_cert, or client_key is set"]
        );
    }

    #[test]
    fn test_mtls_requires_both_halves() {
        let errors =
            validate_rsyslog(&data(json!({"tls": true, "client_cert": "CERT"})));
        assert_eq!(errors, vec!["both client_cert and client_key must be set for mTLS"]);

        let errors = validate_rsyslog(&data(json!({"tls": true, "client_key": "KEY"})));
        assert_eq!(errors, vec!["both client_cert and client_key must be set for mTLS"]);
    }

    #[test]
    fn test_full_mtls_is_accepted() {
        let errors = validate_rsyslog(&data(json!({
            "tls": true,
            "ca_cert": "CA",
            "client_cert": "CERT",
            "client_key": "KEY",
        })));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_violations_accumulate_in_rule_order() {
        let errors = validate_rsyslog(&data(json!({
            "format": "custom",
            "tls": false,
            "client_cert": "CERT",
        })));
        assert_eq!(
            errors,
            vec![
                "logline is required when format is 'custom'",
                "tls must be true when ca_cert, client_cert, or client_key is set",
                "both client_cert and client_key must be set for mTLS",
            ]
        );
    }
}
