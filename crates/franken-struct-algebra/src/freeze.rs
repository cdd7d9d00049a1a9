//! Immutable snapshots.
//!
//! Two strategies share one entry point:
//!
//! - **Owning** ([`freeze_copy`]): a fresh, fully materialised copy. Getters
//!   are invoked once and their results captured as data; setters vanish.
//!   Nothing in the result observes later edits to the source.
//! - **Delegating** ([`freeze_proxy`]): a view whose prototype is the source.
//!   Only accessors (setter stripped) and container-valued data attributes
//!   get own entries; every other read falls through to the live source.
//!
//! Either way the produced containers are frozen, so `set_property`,
//! `define_property` and `delete_property` against them fail with
//! `Immutable`.

use crate::attribute::validate_container;
use crate::error::AlgebraResult;
use crate::object_model::{Attribute, ObjectHandle, ObjectHeap, Value};

/// Freeze `value`, delegating to it when `inherit` is set.
pub fn freeze(heap: &mut ObjectHeap, value: &Value, inherit: bool) -> AlgebraResult<ObjectHandle> {
    let operation = if inherit { "freeze_proxy" } else { "freeze_copy" };
    let source = validate_container(heap, operation, value, 0)?;
    if inherit {
        freeze_delegating(heap, source)
    } else {
        freeze_owning(heap, source)
    }
}

pub fn freeze_copy(heap: &mut ObjectHeap, value: &Value) -> AlgebraResult<ObjectHandle> {
    freeze(heap, value, false)
}

pub fn freeze_proxy(heap: &mut ObjectHeap, value: &Value) -> AlgebraResult<ObjectHandle> {
    freeze(heap, value, true)
}

fn freeze_owning(heap: &mut ObjectHeap, source: ObjectHandle) -> AlgebraResult<ObjectHandle> {
    let kind = heap.container(source)?.kind;
    let attributes = heap.own_attributes(source)?;
    let result = heap.alloc(kind);

    for (key, attr) in attributes {
        let mut snapshot = match attr {
            Attribute::Data { .. } => attr,
            Attribute::Accessor {
                get,
                enumerable,
                configurable,
                ..
            } => {
                let value = match get {
                    Some(getter) => heap.call_function(getter, source, &[])?,
                    None => Value::Undefined,
                };
                Attribute::Data {
                    value,
                    writable: false,
                    enumerable,
                    configurable,
                }
            }
        };
        if let Some(Value::Object(child)) = snapshot.value() {
            let frozen = freeze_owning(heap, *child)?;
            snapshot.set_value(Value::Object(frozen));
        }
        heap.container_mut(result)?.put(key, snapshot);
    }

    heap.freeze(result)?;
    Ok(result)
}

fn freeze_delegating(heap: &mut ObjectHeap, source: ObjectHandle) -> AlgebraResult<ObjectHandle> {
    let kind = heap.container(source)?.kind;
    let attributes = heap.own_attributes(source)?;
    let result = heap.alloc_with_prototype(kind, Some(source));

    for (key, mut attr) in attributes {
        if attr.is_accessor() {
            attr.strip_setter();
        } else if let Some(Value::Object(child)) = attr.value() {
            let frozen = freeze_delegating(heap, *child)?;
            attr.set_value(Value::Object(frozen));
        } else {
            continue;
        }
        heap.container_mut(result)?.put(key, attr);
    }

    heap.freeze(result)?;
    Ok(result)
}
