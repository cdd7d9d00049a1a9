#![forbid(unsafe_code)]

//! Structural set algebra over heap-resident keyed and indexed containers.
//!
//! Operations never mutate their operands; each call allocates fresh result
//! containers on the shared [`ObjectHeap`].

pub mod algebra;
pub mod attribute;
pub mod config;
pub mod copy;
pub mod difference;
pub mod error;
pub mod freeze;
pub mod intersection;
pub mod json_bridge;
pub mod object_model;
pub mod operation_log;
pub mod union;

pub use algebra::{Operation, StructAlgebra};
pub use attribute::{AttributeModel, attributes_equal, own_attributes, validate_operands};
pub use config::{AlgebraConfig, ConfigError};
pub use copy::copy;
pub use difference::{difference, difference_by_key, difference_by_value};
pub use error::{AlgebraResult, StructError, StructErrorCode};
pub use freeze::{freeze, freeze_copy, freeze_proxy};
pub use intersection::{intersection, intersection_by_key, intersection_by_value};
pub use json_bridge::{copy_json, export_json, import_json};
pub use object_model::{
    Attribute, Container, ContainerKind, FunctionId, ObjectHandle, ObjectHeap, PropertyKey, Value,
};
pub use operation_log::{OperationContext, OperationEvent, OperationLog};
pub use union::union;
