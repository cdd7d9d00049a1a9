//! Attribute classification shared by every structural operation.
//!
//! An attribute is *deep* (recursed into) when it is a data attribute holding
//! a container and its name is not reserved. Reserved names are treated as
//! opaque scalars even when their value is a container, so prototypal
//! metadata that shows up as an own attribute is never walked.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{AlgebraResult, StructError};
use crate::object_model::{Attribute, ObjectHandle, ObjectHeap, PropertyKey, Value};

/// Names that are never deep, whatever their value.
pub const DEFAULT_RESERVED_NAMES: [&str; 2] = ["constructor", "prototype"];

/// The deep-classification rule, parameterised by the reserved name set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeModel {
    reserved_names: BTreeSet<String>,
}

impl Default for AttributeModel {
    fn default() -> Self {
        Self::with_reserved_names(DEFAULT_RESERVED_NAMES)
    }
}

impl AttributeModel {
    pub fn with_reserved_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reserved_names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn reserved_names(&self) -> impl Iterator<Item = &str> {
        self.reserved_names.iter().map(String::as_str)
    }

    pub fn is_reserved(&self, key: &PropertyKey) -> bool {
        key.as_name()
            .is_some_and(|name| self.reserved_names.contains(name))
    }

    /// Data attribute, container value, non-reserved name.
    pub fn is_deep(&self, key: &PropertyKey, attr: &Attribute) -> bool {
        matches!(attr.value(), Some(Value::Object(_))) && !self.is_reserved(key)
    }

    /// The container handle of a deep attribute.
    pub(crate) fn deep_handle(&self, key: &PropertyKey, attr: &Attribute) -> Option<ObjectHandle> {
        if self.is_reserved(key) {
            return None;
        }
        attr.value().and_then(Value::as_object)
    }
}

/// Own attributes of a container in iteration order. Indexed containers
/// never report their derived `length`.
pub fn own_attributes(
    heap: &ObjectHeap,
    handle: ObjectHandle,
) -> AlgebraResult<Vec<(PropertyKey, Attribute)>> {
    heap.own_attributes(handle)
}

/// Descriptor-level equality used by by-value operations.
///
/// Containers are compared only by kind; their contents are left to the
/// recursion in the calling operation.
pub fn attributes_equal(heap: &ObjectHeap, a: &Attribute, b: &Attribute) -> bool {
    if a.is_configurable() != b.is_configurable() || a.is_enumerable() != b.is_enumerable() {
        return false;
    }

    match (a, b) {
        (
            Attribute::Data {
                value: av,
                writable: aw,
                ..
            },
            Attribute::Data {
                value: bv,
                writable: bw,
                ..
            },
        ) => {
            if aw != bw {
                return false;
            }
            match (heap.kind_of(av), heap.kind_of(bv)) {
                (None, None) => av.strict_equals(bv),
                (Some(ak), Some(bk)) => ak == bk,
                _ => false,
            }
        }
        (Attribute::Accessor { .. }, Attribute::Accessor { .. }) => {
            a.getter() == b.getter() && a.setter() == b.setter()
        }
        _ => false,
    }
}

/// Check an operand list: at least one operand, every operand a live
/// container. Returns the container handles in order.
pub fn validate_operands(
    heap: &ObjectHeap,
    operation: &str,
    operands: &[Value],
) -> AlgebraResult<Vec<ObjectHandle>> {
    if operands.is_empty() {
        return Err(StructError::invalid_argument(
            operation,
            "not enough arguments",
        ));
    }
    operands
        .iter()
        .enumerate()
        .map(|(position, operand)| validate_container(heap, operation, operand, position))
        .collect()
}

pub(crate) fn validate_container(
    heap: &ObjectHeap,
    operation: &str,
    operand: &Value,
    position: usize,
) -> AlgebraResult<ObjectHandle> {
    match operand {
        Value::Object(handle) => {
            heap.container(*handle)?;
            Ok(*handle)
        }
        other => Err(StructError::invalid_argument(
            operation,
            format!(
                "operand {position} is not an object (got {})",
                other.type_name()
            ),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StructErrorCode;
    use crate::object_model::{ContainerKind, FunctionId};

    fn name(s: &str) -> PropertyKey {
        PropertyKey::from(s)
    }

    #[test]
    fn container_data_is_deep() {
        let mut heap = ObjectHeap::new();
        let inner = heap.alloc(ContainerKind::Keyed);
        let model = AttributeModel::default();
        assert!(model.is_deep(&name("a"), &Attribute::data(Value::Object(inner))));
        assert!(model.is_deep(&PropertyKey::Index(0), &Attribute::data(Value::Object(inner))));
    }

    #[test]
    fn scalars_callables_and_accessors_are_not_deep() {
        let model = AttributeModel::default();
        assert!(!model.is_deep(&name("a"), &Attribute::data(Value::Int(1))));
        assert!(!model.is_deep(&name("a"), &Attribute::data(Value::Null)));
        assert!(!model.is_deep(
            &name("a"),
            &Attribute::data(Value::Function(FunctionId(0)))
        ));
        assert!(!model.is_deep(
            &name("a"),
            &Attribute::accessor(Some(FunctionId(0)), None)
        ));
    }

    #[test]
    fn reserved_names_are_never_deep() {
        let mut heap = ObjectHeap::new();
        let inner = heap.alloc(ContainerKind::Keyed);
        let model = AttributeModel::default();
        let attr = Attribute::data(Value::Object(inner));
        assert!(!model.is_deep(&name("constructor"), &attr));
        assert!(!model.is_deep(&name("prototype"), &attr));
        assert_eq!(model.deep_handle(&name("prototype"), &attr), None);
        assert_eq!(model.deep_handle(&name("other"), &attr), Some(inner));
    }

    #[test]
    fn custom_reserved_names() {
        let mut heap = ObjectHeap::new();
        let inner = heap.alloc(ContainerKind::Keyed);
        let model = AttributeModel::with_reserved_names(["meta"]);
        let attr = Attribute::data(Value::Object(inner));
        assert!(!model.is_deep(&name("meta"), &attr));
        assert!(model.is_deep(&name("constructor"), &attr));
        assert_eq!(model.reserved_names().collect::<Vec<_>>(), vec!["meta"]);
    }

    #[test]
    fn attributes_equal_scalars() {
        let heap = ObjectHeap::new();
        assert!(attributes_equal(
            &heap,
            &Attribute::data(Value::Int(1)),
            &Attribute::data(Value::Int(1))
        ));
        assert!(!attributes_equal(
            &heap,
            &Attribute::data(Value::Int(1)),
            &Attribute::data(Value::Int(2))
        ));
    }

    #[test]
    fn attributes_equal_checks_flags() {
        let heap = ObjectHeap::new();
        let mut frozen = Attribute::data(Value::Int(1));
        frozen.set_non_writable();
        assert!(!attributes_equal(
            &heap,
            &Attribute::data(Value::Int(1)),
            &frozen
        ));
        frozen.set_non_configurable();
        let mut other = Attribute::data(Value::Int(1));
        other.set_non_writable();
        assert!(!attributes_equal(&heap, &other, &frozen));
    }

    #[test]
    fn attributes_equal_containers_by_kind_only() {
        let mut heap = ObjectHeap::new();
        let a = heap.keyed([("x", Value::Int(1))]);
        let b = heap.keyed([("y", Value::Int(2))]);
        let c = heap.indexed([Value::Int(1)]);
        let attr = |h| Attribute::data(Value::Object(h));
        assert!(attributes_equal(&heap, &attr(a), &attr(b)));
        assert!(!attributes_equal(&heap, &attr(a), &attr(c)));
        assert!(!attributes_equal(
            &heap,
            &attr(a),
            &Attribute::data(Value::Null)
        ));
    }

    #[test]
    fn attributes_equal_accessors_by_identity() {
        let heap = ObjectHeap::new();
        let a = Attribute::accessor(Some(FunctionId(1)), None);
        let b = Attribute::accessor(Some(FunctionId(1)), None);
        let c = Attribute::accessor(Some(FunctionId(2)), None);
        assert!(attributes_equal(&heap, &a, &b));
        assert!(!attributes_equal(&heap, &a, &c));
        assert!(!attributes_equal(
            &heap,
            &a,
            &Attribute::data(Value::Undefined)
        ));
    }

    #[test]
    fn validate_rejects_empty_and_scalars() {
        let mut heap = ObjectHeap::new();
        let obj = heap.alloc(ContainerKind::Keyed);

        let err = validate_operands(&heap, "union", &[]).unwrap_err();
        assert_eq!(err.code(), StructErrorCode::InvalidArgument);

        let err = validate_operands(&heap, "union", &[Value::Object(obj), Value::Null])
            .unwrap_err();
        assert!(err.to_string().contains("operand 1"));

        let err = validate_operands(&heap, "union", &[Value::Object(ObjectHandle(99))]).unwrap_err();
        assert_eq!(err.code(), StructErrorCode::InvalidArgument);

        assert_eq!(
            validate_operands(&heap, "union", &[Value::Object(obj)]).unwrap(),
            vec![obj]
        );
    }

    #[test]
    fn own_attributes_omit_length() {
        let mut heap = ObjectHeap::new();
        let arr = heap.indexed([Value::Int(1), Value::Int(2)]);
        let keys: Vec<_> = own_attributes(&heap, arr)
            .unwrap()
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(keys, vec![PropertyKey::Index(0), PropertyKey::Index(1)]);
    }
}
