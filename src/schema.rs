//! Resource Schemas
//!
//! Attribute definitions for resources and data sources, plan-time
//! validation of a configuration, and the flat attribute set resource
//! handlers read from and write to.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Field validator: raw value and attribute name in, violations out
pub type Validator = fn(&Value, &str) -> Vec<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrType {
    String,
    Int,
    Bool,
}

impl AttrType {
    /// Type-mismatch message for `key`, if `value` is not of this type
    pub fn check(&self, value: &Value, key: &str) -> Option<String> {
        let ok = match self {
            Self::String => value.is_string(),
            Self::Int => value.is_i64() || value.is_u64(),
            Self::Bool => value.is_boolean(),
        };
        if ok {
            return None;
        }
        let expected = match self {
            Self::String => "a string",
            Self::Int => "an integer",
            Self::Bool => "a boolean",
        };
        Some(format!("{:?} must be {}", key, expected))
    }
}

/// One attribute of a schema
#[derive(Debug, Clone)]
pub struct Attribute {
    pub attr_type: AttrType,
    pub required: bool,
    pub computed: bool,
    pub force_new: bool,
    pub sensitive: bool,
    pub default: Option<Value>,
    pub validator: Option<Validator>,
    pub description: &'static str,
}

impl Attribute {
    fn new(attr_type: AttrType) -> Self {
        Self {
            attr_type,
            required: false,
            computed: false,
            force_new: false,
            sensitive: false,
            default: None,
            validator: None,
            description: "",
        }
    }

    pub fn required(attr_type: AttrType) -> Self {
        Self {
            required: true,
            ..Self::new(attr_type)
        }
    }

    pub fn optional(attr_type: AttrType) -> Self {
        Self::new(attr_type)
    }

    pub fn computed(attr_type: AttrType) -> Self {
        Self {
            computed: true,
            ..Self::new(attr_type)
        }
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn validate_with(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }
}

/// Ordered attribute set of a resource or data source
#[derive(Debug, Clone, Default)]
pub struct Schema {
    attributes: Vec<(&'static str, Attribute)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, attribute: Attribute) -> Self {
        self.attributes.push((name, attribute));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, a)| a)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&'static str, &Attribute)> {
        self.attributes.iter().map(|(n, a)| (*n, a))
    }

    /// Names of attributes whose change forces replacement
    pub fn force_new_attributes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.attributes
            .iter()
            .filter(|(_, a)| a.force_new)
            .map(|(n, _)| *n)
    }

    /// Fill in defaults for optional attributes the configuration leaves unset
    pub fn apply_defaults(&self, config: &mut Map<String, Value>) {
        for (name, attribute) in self.attributes() {
            let Some(default) = &attribute.default else {
                continue;
            };
            if config.get(name).map_or(true, Value::is_null) {
                config.insert(name.to_string(), default.clone());
            }
        }
    }

    /// Validate a configuration against this schema
    ///
    /// Every attribute contributes at most one message, in attribute order,
    /// followed by one per unrecognized key. All messages are returned
    /// together.
    pub fn validate(&self, config: &Map<String, Value>) -> Vec<String> {
        let mut errors = Vec::new();

        for (name, attribute) in self.attributes() {
            if attribute.computed {
                if config.get(name).is_some_and(|v| !v.is_null()) {
                    errors.push(format!("{:?} is computed and cannot be set", name));
                }
                continue;
            }
            let value = match config.get(name) {
                Some(v) if !v.is_null() => v,
                _ => {
                    if attribute.required {
                        errors.push(format!("{:?} is required", name));
                    }
                    continue;
                }
            };

            if let Some(mismatch) = attribute.attr_type.check(value, name) {
                errors.push(mismatch);
                continue;
            }
            if let Some(validator) = attribute.validator {
                errors.extend(validator(value, name));
            }
        }

        for key in config.keys() {
            if self.get(key).is_none() {
                errors.push(format!("{:?} is not a recognized attribute", key));
            }
        }

        errors
    }
}

/// Flat attribute set of one resource instance
///
/// An attribute is "set" when its key is present with a non-null value;
/// a missing key and an explicit zero value are different things.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceData {
    /// Empty while the resource is absent
    #[serde(default)]
    id: String,
    #[serde(default)]
    attributes: BTreeMap<String, Value>,
}

impl ResourceData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_attributes(attributes: Map<String, Value>) -> Self {
        Self {
            id: String::new(),
            attributes: attributes.into_iter().collect(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Mark the resource absent
    pub fn clear_id(&mut self) {
        self.id.clear();
    }

    pub fn is_absent(&self) -> bool {
        self.id.is_empty()
    }

    /// Value of `key` if present and non-null
    pub fn get_ok(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key).filter(|v| !v.is_null())
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.get_ok(key).is_some()
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get_ok(key).and_then(Value::as_str)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get_ok(key).and_then(Value::as_i64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get_ok(key).and_then(Value::as_bool)
    }

    /// String value of `key`, empty when unset
    pub fn str_or_empty(&self, key: &str) -> &str {
        self.get_str(key).unwrap_or("")
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.attributes.insert(key.to_string(), value.into());
    }

    /// Copy of the attributes with sensitive values masked
    pub fn redacted(&self, schema: &Schema) -> BTreeMap<String, Value> {
        self.attributes
            .iter()
            .map(|(k, v)| {
                let sensitive = schema.get(k).is_some_and(|a| a.sensitive);
                if sensitive && !v.is_null() {
                    (k.clone(), Value::String("<sensitive>".into()))
                } else {
                    (k.clone(), v.clone())
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn no_empty(value: &Value, key: &str) -> Vec<String> {
        match value.as_str() {
            Some("") => vec![format!("{:?} must not be empty", key)],
            _ => vec![],
        }
    }

    fn schema() -> Schema {
        Schema::new()
            .with(
                "name",
                Attribute::required(AttrType::String)
                    .force_new()
                    .validate_with(no_empty),
            )
            .with("port", Attribute::required(AttrType::Int))
            .with("tls", Attribute::optional(AttrType::Bool).default_value(false))
            .with("key", Attribute::optional(AttrType::String).sensitive())
            .with("id", Attribute::computed(AttrType::String))
    }

    fn config(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_missing_required_attributes() {
        let errors = schema().validate(&config(json!({})));
        assert_eq!(errors, vec!["\"name\" is required", "\"port\" is required"]);
    }

    #[test]
    fn test_type_mismatch_skips_validator() {
        let errors = schema().validate(&config(json!({"name": 5, "port": "514"})));
        assert_eq!(
            errors,
            vec!["\"name\" must be a string", "\"port\" must be an integer"]
        );
    }

    #[test]
    fn test_validator_runs_on_typed_value() {
        let errors = schema().validate(&config(json!({"name": "", "port": 514})));
        assert_eq!(errors, vec!["\"name\" must not be empty"]);
    }

    #[test]
    fn test_unknown_and_computed_attributes_rejected() {
        let errors = schema().validate(&config(json!({
            "bogus": 1,
            "id": "x",
            "name": "",
            "port": 1,
        })));
        assert_eq!(
            errors,
            vec![
                "\"name\" must not be empty",
                "\"id\" is computed and cannot be set",
                "\"bogus\" is not a recognized attribute",
            ]
        );
    }

    #[test]
    fn test_apply_defaults_keeps_explicit_values() {
        let mut unset = config(json!({"name": "a"}));
        schema().apply_defaults(&mut unset);
        assert_eq!(unset["tls"], json!(false));

        let mut explicit = config(json!({"name": "a", "tls": true}));
        schema().apply_defaults(&mut explicit);
        assert_eq!(explicit["tls"], json!(true));
    }

    #[test]
    fn test_get_ok_distinguishes_null_from_zero() {
        let data = ResourceData::from_attributes(config(json!({"port": 0, "server": null})));
        assert_eq!(data.get_int("port"), Some(0));
        assert!(!data.is_set("server"));
        assert_eq!(data.str_or_empty("server"), "");
    }

    #[test]
    fn test_redacted_masks_sensitive_attributes() {
        let data = ResourceData::from_attributes(config(json!({"name": "a", "key": "secret"})));
        let redacted = data.redacted(&schema());
        assert_eq!(redacted["key"], json!("<sensitive>"));
        assert_eq!(redacted["name"], json!("a"));
    }

    #[test]
    fn test_force_new_attributes() {
        let names: Vec<_> = schema().force_new_attributes().collect();
        assert_eq!(names, vec!["name"]);
    }
}
