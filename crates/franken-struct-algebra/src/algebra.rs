//! Session facade: one heap, one attribute model, one event log.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::attribute::AttributeModel;
use crate::config::AlgebraConfig;
use crate::error::{AlgebraResult, StructError};
use crate::json_bridge;
use crate::object_model::{ObjectHandle, ObjectHeap, Value};
use crate::operation_log::{OperationContext, OperationEvent, OperationLog};
use crate::{copy, difference, freeze, intersection, union};

/// The operations a session can run by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Copy,
    Union,
    IntersectionByKey,
    IntersectionByValue,
    DifferenceByKey,
    DifferenceByValue,
    FreezeCopy,
    FreezeProxy,
    CopyJson,
}

impl Operation {
    pub const ALL: [Operation; 9] = [
        Self::Copy,
        Self::Union,
        Self::IntersectionByKey,
        Self::IntersectionByValue,
        Self::DifferenceByKey,
        Self::DifferenceByValue,
        Self::FreezeCopy,
        Self::FreezeProxy,
        Self::CopyJson,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::Union => "union",
            Self::IntersectionByKey => "intersection_by_key",
            Self::IntersectionByValue => "intersection_by_value",
            Self::DifferenceByKey => "difference_by_key",
            Self::DifferenceByValue => "difference_by_value",
            Self::FreezeCopy => "freeze_copy",
            Self::FreezeProxy => "freeze_proxy",
            Self::CopyJson => "copy_json",
        }
    }

    /// Single-operand operations; the rest take one or more operands.
    pub fn is_unary(self) -> bool {
        matches!(
            self,
            Self::Copy | Self::FreezeCopy | Self::FreezeProxy | Self::CopyJson
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = StructError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| StructError::invalid_argument("operation", format!("unknown operation `{s}`")))
    }
}

/// A JSON document of operands, as read by the command-line front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperandsInput {
    pub operands: Vec<serde_json::Value>,
}

/// Result of [`StructAlgebra::run_json`]: the exported result container and
/// the events recorded while producing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationOutput {
    pub operation: Operation,
    pub result: serde_json::Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<OperationEvent>,
}

#[derive(Debug, Clone)]
pub struct StructAlgebra {
    heap: ObjectHeap,
    model: AttributeModel,
    context: OperationContext,
    log: OperationLog,
}

impl Default for StructAlgebra {
    fn default() -> Self {
        Self::with_config(&AlgebraConfig::default())
    }
}

impl StructAlgebra {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &AlgebraConfig) -> Self {
        Self {
            heap: ObjectHeap::new(),
            model: config.attribute_model(),
            context: config.context(),
            log: OperationLog::new(config.max_events, config.record_events),
        }
    }

    pub fn heap(&self) -> &ObjectHeap {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut ObjectHeap {
        &mut self.heap
    }

    pub fn model(&self) -> &AttributeModel {
        &self.model
    }

    pub fn context(&self) -> &OperationContext {
        &self.context
    }

    pub fn events(&self) -> &VecDeque<OperationEvent> {
        self.log.events()
    }

    pub fn drain_events(&mut self) -> Vec<OperationEvent> {
        self.log.drain()
    }

    pub fn copy(&mut self, value: &Value) -> AlgebraResult<ObjectHandle> {
        let result = copy::copy(&mut self.heap, &self.model, value);
        self.record(Operation::Copy, 1, result)
    }

    pub fn union(&mut self, operands: &[Value]) -> AlgebraResult<ObjectHandle> {
        let result = union::union(&mut self.heap, &self.model, operands);
        self.record(Operation::Union, operands.len(), result)
    }

    pub fn intersection_by_key(&mut self, operands: &[Value]) -> AlgebraResult<ObjectHandle> {
        let result = intersection::intersection_by_key(&mut self.heap, &self.model, operands);
        self.record(Operation::IntersectionByKey, operands.len(), result)
    }

    pub fn intersection_by_value(&mut self, operands: &[Value]) -> AlgebraResult<ObjectHandle> {
        let result = intersection::intersection_by_value(&mut self.heap, &self.model, operands);
        self.record(Operation::IntersectionByValue, operands.len(), result)
    }

    pub fn difference_by_key(&mut self, operands: &[Value]) -> AlgebraResult<ObjectHandle> {
        let result = difference::difference_by_key(&mut self.heap, &self.model, operands);
        self.record(Operation::DifferenceByKey, operands.len(), result)
    }

    pub fn difference_by_value(&mut self, operands: &[Value]) -> AlgebraResult<ObjectHandle> {
        let result = difference::difference_by_value(&mut self.heap, &self.model, operands);
        self.record(Operation::DifferenceByValue, operands.len(), result)
    }

    pub fn freeze_copy(&mut self, value: &Value) -> AlgebraResult<ObjectHandle> {
        let result = freeze::freeze_copy(&mut self.heap, value);
        self.record(Operation::FreezeCopy, 1, result)
    }

    pub fn freeze_proxy(&mut self, value: &Value) -> AlgebraResult<ObjectHandle> {
        let result = freeze::freeze_proxy(&mut self.heap, value);
        self.record(Operation::FreezeProxy, 1, result)
    }

    pub fn copy_json(&mut self, value: &Value) -> AlgebraResult<ObjectHandle> {
        let result = json_bridge::copy_json(&mut self.heap, value);
        self.record(Operation::CopyJson, 1, result)
    }

    pub fn import_json(&mut self, json: &serde_json::Value) -> Value {
        json_bridge::import_json(&mut self.heap, json)
    }

    pub fn export_json(&self, value: &Value) -> AlgebraResult<serde_json::Value> {
        json_bridge::export_json(&self.heap, value)
    }

    /// Run an operation by name. Unary operations require exactly one
    /// operand.
    pub fn run(&mut self, operation: Operation, operands: &[Value]) -> AlgebraResult<ObjectHandle> {
        if operation.is_unary() {
            let [operand] = operands else {
                let err = StructError::invalid_argument(
                    operation.as_str(),
                    format!("expected exactly one operand, got {}", operands.len()),
                );
                return self.record(operation, operands.len(), Err(err));
            };
            return match operation {
                Operation::Copy => self.copy(operand),
                Operation::FreezeCopy => self.freeze_copy(operand),
                Operation::FreezeProxy => self.freeze_proxy(operand),
                _ => self.copy_json(operand),
            };
        }
        match operation {
            Operation::Union => self.union(operands),
            Operation::IntersectionByKey => self.intersection_by_key(operands),
            Operation::IntersectionByValue => self.intersection_by_value(operands),
            Operation::DifferenceByKey => self.difference_by_key(operands),
            _ => self.difference_by_value(operands),
        }
    }

    /// Import every operand, run `operation` and export the result.
    pub fn run_json(
        &mut self,
        operation: Operation,
        input: &OperandsInput,
    ) -> AlgebraResult<OperationOutput> {
        let operands: Vec<Value> = input
            .operands
            .iter()
            .map(|operand| self.import_json(operand))
            .collect();
        let handle = self.run(operation, &operands)?;
        Ok(OperationOutput {
            operation,
            result: self.export_json(&Value::Object(handle))?,
            events: self.drain_events(),
        })
    }

    fn record(
        &mut self,
        operation: Operation,
        operand_count: usize,
        result: AlgebraResult<ObjectHandle>,
    ) -> AlgebraResult<ObjectHandle> {
        match &result {
            Ok(handle) => self.log.record_allow(
                operation.as_str(),
                operand_count,
                format!("object#{}", handle.0),
                &self.context,
            ),
            Err(err) => self
                .log
                .record_deny(operation.as_str(), operand_count, err, &self.context),
        }
        result
    }
}
