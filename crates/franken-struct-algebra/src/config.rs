//! Session configuration, loaded from a JSON document.
//!
//! Every field is optional in the document; missing fields take the values of
//! [`AlgebraConfig::default`].

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::attribute::{AttributeModel, DEFAULT_RESERVED_NAMES};
use crate::operation_log::OperationContext;

pub const DEFAULT_MAX_EVENTS: usize = 4096;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config field `{field}`: {detail}")]
    Invalid { field: &'static str, detail: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlgebraConfig {
    /// Attribute names never recursed into.
    pub reserved_names: Vec<String>,
    pub trace_id: String,
    pub decision_id: String,
    pub policy_id: String,
    pub record_events: bool,
    /// Capacity of the event buffer; oldest events are evicted first.
    pub max_events: usize,
}

impl Default for AlgebraConfig {
    fn default() -> Self {
        Self {
            reserved_names: DEFAULT_RESERVED_NAMES.iter().map(|s| s.to_string()).collect(),
            trace_id: "trace-struct-algebra".to_string(),
            decision_id: "decision-struct-algebra".to_string(),
            policy_id: "policy-struct-algebra".to_string(),
            record_events: true,
            max_events: DEFAULT_MAX_EVENTS,
        }
    }
}

impl AlgebraConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = BTreeSet::new();
        for name in &self.reserved_names {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field: "reserved_names",
                    detail: "names must be non-empty".to_string(),
                });
            }
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::Invalid {
                    field: "reserved_names",
                    detail: format!("duplicate name `{name}`"),
                });
            }
        }
        for (field, value) in [
            ("trace_id", &self.trace_id),
            ("decision_id", &self.decision_id),
            ("policy_id", &self.policy_id),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field,
                    detail: "must be non-empty".to_string(),
                });
            }
        }
        if self.record_events && self.max_events == 0 {
            return Err(ConfigError::Invalid {
                field: "max_events",
                detail: "must be positive when record_events is set".to_string(),
            });
        }
        Ok(())
    }

    pub fn attribute_model(&self) -> AttributeModel {
        AttributeModel::with_reserved_names(self.reserved_names.iter().cloned())
    }

    pub fn context(&self) -> OperationContext {
        OperationContext::new(&self.trace_id, &self.decision_id, &self.policy_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object_model::PropertyKey;

    #[test]
    fn defaults_are_valid() {
        let config = AlgebraConfig::default();
        config.validate().unwrap();
        let model = config.attribute_model();
        assert!(model.is_reserved(&PropertyKey::from("constructor")));
        assert!(model.is_reserved(&PropertyKey::from("prototype")));
        assert_eq!(config.context().trace_id, "trace-struct-algebra");
    }

    #[test]
    fn partial_document_fills_defaults() {
        let config = AlgebraConfig::from_json_str(r#"{"trace_id": "t-1", "max_events": 3}"#).unwrap();
        assert_eq!(config.trace_id, "t-1");
        assert_eq!(config.max_events, 3);
        assert_eq!(config.policy_id, "policy-struct-algebra");
        assert_eq!(config.reserved_names.len(), 2);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = AlgebraConfig::from_json_str(r#"{"trace": "t"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn validation_failures() {
        let err = AlgebraConfig::from_json_str(r#"{"reserved_names": ["a", "a"]}"#).unwrap_err();
        assert!(err.to_string().contains("duplicate"));

        let err = AlgebraConfig::from_json_str(r#"{"reserved_names": [" "]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "reserved_names", .. }));

        let err = AlgebraConfig::from_json_str(r#"{"policy_id": ""}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "policy_id", .. }));

        let err = AlgebraConfig::from_json_str(r#"{"max_events": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "max_events", .. }));

        AlgebraConfig::from_json_str(r#"{"max_events": 0, "record_events": false}"#).unwrap();
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = AlgebraConfig::load("/nonexistent/struct-algebra.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/struct-algebra.json"));
    }

    #[test]
    fn custom_reserved_names_reach_the_model() {
        let config = AlgebraConfig::from_json_str(r#"{"reserved_names": ["meta"]}"#).unwrap();
        let model = config.attribute_model();
        assert!(model.is_reserved(&PropertyKey::from("meta")));
        assert!(!model.is_reserved(&PropertyKey::from("prototype")));
    }
}
