//! Error taxonomy for structural operations.
//!
//! Two kinds only: misuse of the API (`InvalidArgument`) and writes against
//! frozen state (`Immutable`). Both carry a stable code so event logs and CLI
//! output stay comparable across releases.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::object_model::{ObjectHandle, PropertyKey};

pub type AlgebraResult<T> = Result<T, StructError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructErrorCode {
    InvalidArgument,
    Immutable,
}

impl StructErrorCode {
    pub fn stable_code(self) -> &'static str {
        match self {
            Self::InvalidArgument => "FE-STRUCT-0001",
            Self::Immutable => "FE-STRUCT-0002",
        }
    }
}

impl fmt::Display for StructErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stable_code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum StructError {
    /// Wrong arity, a non-container operand, or a stale handle.
    #[error("invalid argument to {operation}: {detail}")]
    InvalidArgument { operation: String, detail: String },
    /// Write attempted against frozen, non-writable or non-extensible state.
    #[error("cannot modify immutable attribute '{key}'")]
    Immutable { key: String },
}

impl StructError {
    pub fn invalid_argument(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidArgument {
            operation: operation.into(),
            detail: detail.into(),
        }
    }

    pub fn immutable(key: &PropertyKey) -> Self {
        Self::Immutable {
            key: key.to_string(),
        }
    }

    pub(crate) fn unknown_handle(handle: ObjectHandle) -> Self {
        Self::invalid_argument("heap_lookup", format!("object#{} not found", handle.0))
    }

    pub fn code(&self) -> StructErrorCode {
        match self {
            Self::InvalidArgument { .. } => StructErrorCode::InvalidArgument,
            Self::Immutable { .. } => StructErrorCode::Immutable,
        }
    }
}
