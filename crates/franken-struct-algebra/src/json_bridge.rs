//! Bridge between heap values and `serde_json` documents.
//!
//! Export follows JSON serialisation rules for plain data: only enumerable
//! own data attributes are written, callables and `Undefined` are omitted
//! from keyed containers and become `null` inside indexed ones, holes become
//! `null`, and accessors are discarded. Import is lossless for anything
//! export can produce. [`copy_json`] chains the two as a lossy clone.

use serde_json::{Map, Number};

use crate::attribute::validate_container;
use crate::error::{AlgebraResult, StructError};
use crate::object_model::{Attribute, ContainerKind, ObjectHandle, ObjectHeap, PropertyKey, Value};

/// Allocate heap containers for every object and array in `json`.
///
/// Objects become keyed containers in document order, arrays dense indexed
/// containers. Numbers fitting `i64` become `Int`, all others `Float`.
pub fn import_json(heap: &mut ObjectHeap, json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::Str(s.clone()),
        serde_json::Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(|item| import_json(heap, item)).collect();
            Value::Object(heap.indexed(values))
        }
        serde_json::Value::Object(map) => {
            let entries: Vec<(String, Value)> = map
                .iter()
                .map(|(key, item)| (key.clone(), import_json(heap, item)))
                .collect();
            Value::Object(heap.keyed(entries))
        }
    }
}

/// Render a value as a JSON document.
pub fn export_json(heap: &ObjectHeap, value: &Value) -> AlgebraResult<serde_json::Value> {
    Ok(match value {
        Value::Undefined | Value::Null | Value::Function(_) => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::Number(Number::from(*i)),
        Value::Float(f) => Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Str(s) => serde_json::Value::String(s.clone()),
        Value::Object(handle) => export_container(heap, *handle)?,
    })
}

fn export_container(heap: &ObjectHeap, handle: ObjectHandle) -> AlgebraResult<serde_json::Value> {
    let container = heap.container(handle)?;
    match container.kind {
        ContainerKind::Keyed => {
            let mut map = Map::new();
            for key in container.own_keys() {
                let Some(value) = exportable(container.get_own_attribute(&key)) else {
                    continue;
                };
                if matches!(value, Value::Undefined | Value::Function(_)) {
                    continue;
                }
                map.insert(key.to_string(), export_json(heap, value)?);
            }
            Ok(serde_json::Value::Object(map))
        }
        ContainerKind::Indexed => {
            let length = u32::try_from(container.own_length()).map_err(|_| {
                StructError::invalid_argument("export_json", "indexed length exceeds u32")
            })?;
            let mut items = Vec::with_capacity(length as usize);
            for index in 0..length {
                let attr = container.get_own_attribute(&PropertyKey::Index(index));
                items.push(match exportable(attr) {
                    Some(value) => export_json(heap, value)?,
                    None => serde_json::Value::Null,
                });
            }
            Ok(serde_json::Value::Array(items))
        }
    }
}

fn exportable(attr: Option<&Attribute>) -> Option<&Value> {
    match attr? {
        Attribute::Data {
            value,
            enumerable: true,
            ..
        } => Some(value),
        _ => None,
    }
}

/// Lossy clone through JSON: drops callables, accessors, non-enumerable
/// attributes and attribute flags.
pub fn copy_json(heap: &mut ObjectHeap, value: &Value) -> AlgebraResult<ObjectHandle> {
    let source = validate_container(heap, "copy_json", value, 0)?;
    let document = export_container(heap, source)?;
    import_json(heap, &document)
        .as_object()
        .ok_or_else(|| StructError::invalid_argument("copy_json", "export produced a scalar"))
}
