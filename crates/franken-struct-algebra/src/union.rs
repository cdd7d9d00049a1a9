//! Right-to-left structural union.
//!
//! Operands are applied last to first, so the leftmost operand decides every
//! scalar conflict while deep attributes accumulate contributions from every
//! operand that reaches them. Operands whose kind differs from the first
//! operand's are skipped entirely.

use crate::attribute::{AttributeModel, validate_operands};
use crate::copy::copy_container;
use crate::error::{AlgebraResult, StructError};
use crate::object_model::{ObjectHandle, ObjectHeap, Value};

pub fn union(heap: &mut ObjectHeap, model: &AttributeModel, operands: &[Value]) -> AlgebraResult<ObjectHandle> {
    let handles = validate_operands(heap, "union", operands)?;
    union_handles(heap, model, &handles)
}

pub(crate) fn union_handles(
    heap: &mut ObjectHeap,
    model: &AttributeModel,
    handles: &[ObjectHandle],
) -> AlgebraResult<ObjectHandle> {
    let Some((&first, rest)) = handles.split_first() else {
        return Err(StructError::invalid_argument("union", "not enough arguments"));
    };
    if rest.is_empty() {
        return copy_container(heap, model, first);
    }

    let kind = heap.container(first)?.kind;
    let result = heap.alloc(kind);

    for &operand in handles.iter().rev() {
        if heap.container(operand)?.kind != kind {
            continue;
        }
        for (key, mut attr) in heap.own_attributes(operand)? {
            if let Some(incoming) = model.deep_handle(&key, &attr) {
                let existing = heap
                    .own_attribute(result, &key)?
                    .and_then(|current| current.value())
                    .and_then(Value::as_object);
                let merged = match existing {
                    Some(existing) => union_handles(heap, model, &[incoming, existing])?,
                    None => copy_container(heap, model, incoming)?,
                };
                attr.set_value(Value::Object(merged));
            }
            heap.container_mut(result)?.put(key, attr);
        }
    }

    Ok(result)
}
