//! Composite logsink identifiers: `<cluster_id>,<logsink_id>`

use std::fmt;

const SEPARATOR: char = ',';

/// Example shown when an import id is malformed
const IMPORT_EXAMPLE: &str =
    "deadbeef-dead-4aa5-beef-deadbeef347d,01234567-89ab-cdef-0123-456789abcdef";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("Invalid logsink ID format: {0}")]
    Malformed(String),
    #[error("must use the format 'cluster_id,logsink_id' for import (e.g. '{}')", IMPORT_EXAMPLE)]
    Import(String),
}

/// Join a cluster id and a logsink id
pub fn compose(cluster_id: &str, logsink_id: &str) -> String {
    format!("{}{}{}", cluster_id, SEPARATOR, logsink_id)
}

/// Split on the first separator only; no separator yields two empty strings
pub fn decompose(id: &str) -> (&str, &str) {
    id.split_once(SEPARATOR).unwrap_or(("", ""))
}

/// Both halves of a composite id, each known to be non-empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogsinkId {
    pub cluster_id: String,
    pub logsink_id: String,
}

impl LogsinkId {
    pub fn new(cluster_id: impl Into<String>, logsink_id: impl Into<String>) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            logsink_id: logsink_id.into(),
        }
    }

    /// Parse a stored id; either half being empty is fatal
    pub fn parse(id: &str) -> Result<Self, IdError> {
        match decompose(id) {
            ("", _) | (_, "") => Err(IdError::Malformed(id.to_string())),
            (cluster, sink) => Ok(Self::new(cluster, sink)),
        }
    }

    /// Parse a user-supplied import id
    pub fn parse_import(id: &str) -> Result<Self, IdError> {
        Self::parse(id).map_err(|_| IdError::Import(id.to_string()))
    }
}

impl fmt::Display for LogsinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&compose(&self.cluster_id, &self.logsink_id))
    }
}
