//! Structural intersection, by key or by value.
//!
//! The first operand is the *major*: the result keeps only the major's own
//! attributes that every other operand also owns. When comparing by value,
//! every minor attribute must additionally be [`attributes_equal`] to the
//! major's. Deep attributes present as containers everywhere are intersected
//! recursively; a depth mismatch collapses to an empty container of the
//! major's kind.

use crate::attribute::{AttributeModel, attributes_equal, validate_operands};
use crate::copy::copy_container;
use crate::error::{AlgebraResult, StructError};
use crate::object_model::{ObjectHandle, ObjectHeap, Value};

pub fn intersection(
    heap: &mut ObjectHeap,
    model: &AttributeModel,
    operands: &[Value],
    by_value: bool,
) -> AlgebraResult<ObjectHandle> {
    let operation = if by_value {
        "intersection_by_value"
    } else {
        "intersection_by_key"
    };
    let handles = validate_operands(heap, operation, operands)?;
    intersect_handles(heap, model, &handles, by_value)
}

pub fn intersection_by_key(
    heap: &mut ObjectHeap,
    model: &AttributeModel,
    operands: &[Value],
) -> AlgebraResult<ObjectHandle> {
    intersection(heap, model, operands, false)
}

pub fn intersection_by_value(
    heap: &mut ObjectHeap,
    model: &AttributeModel,
    operands: &[Value],
) -> AlgebraResult<ObjectHandle> {
    intersection(heap, model, operands, true)
}

fn intersect_handles(
    heap: &mut ObjectHeap,
    model: &AttributeModel,
    handles: &[ObjectHandle],
    by_value: bool,
) -> AlgebraResult<ObjectHandle> {
    let Some((&major, minors)) = handles.split_first() else {
        return Err(StructError::invalid_argument(
            "intersection",
            "not enough arguments",
        ));
    };
    if minors.is_empty() {
        return copy_container(heap, model, major);
    }

    let kind = heap.container(major)?.kind;
    let result = heap.alloc(kind);

    'attributes: for (key, mut major_attr) in heap.own_attributes(major)? {
        let major_deep = model.deep_handle(&key, &major_attr);
        let mut children: Vec<ObjectHandle> = major_deep.into_iter().collect();
        let mut minors_deep = true;

        for &minor in minors {
            let Some(minor_attr) = heap.own_attribute(minor, &key)? else {
                continue 'attributes;
            };
            if by_value && !attributes_equal(heap, &major_attr, minor_attr) {
                continue 'attributes;
            }
            if !minors_deep {
                continue;
            }
            match model.deep_handle(&key, minor_attr) {
                Some(child) => children.push(child),
                None => minors_deep = false,
            }
        }

        if let Some(major_child) = major_deep {
            let value = if children.len() == handles.len() {
                intersect_handles(heap, model, &children, by_value)?
            } else {
                let child_kind = heap.container(major_child)?.kind;
                heap.alloc(child_kind)
            };
            major_attr.set_value(Value::Object(value));
        }
        heap.container_mut(result)?.put(key, major_attr);
    }

    Ok(result)
}
