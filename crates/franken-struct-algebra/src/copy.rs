//! Deep structural copy.

use crate::attribute::{AttributeModel, validate_container};
use crate::error::AlgebraResult;
use crate::object_model::{ObjectHandle, ObjectHeap, Value};

/// Copy a container, recursing into every deep attribute.
///
/// Accessors, scalars, callables and reserved-name containers are carried
/// over as-is; attribute flags are preserved verbatim.
pub fn copy(heap: &mut ObjectHeap, model: &AttributeModel, value: &Value) -> AlgebraResult<ObjectHandle> {
    let handle = validate_container(heap, "copy", value, 0)?;
    copy_container(heap, model, handle)
}

pub(crate) fn copy_container(
    heap: &mut ObjectHeap,
    model: &AttributeModel,
    source: ObjectHandle,
) -> AlgebraResult<ObjectHandle> {
    let kind = heap.container(source)?.kind;
    let attributes = heap.own_attributes(source)?;
    let result = heap.alloc(kind);

    for (key, mut attr) in attributes {
        if let Some(child) = model.deep_handle(&key, &attr) {
            let cloned = copy_container(heap, model, child)?;
            attr.set_value(Value::Object(cloned));
        }
        heap.container_mut(result)?.put(key, attr);
    }

    Ok(result)
}
