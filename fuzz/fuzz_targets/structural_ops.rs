#![no_main]

use frankenengine_struct_algebra::{
    Attribute, ContainerKind, ObjectHandle, PropertyKey, StructAlgebra, Value,
};
use libfuzzer_sys::fuzz_target;

const MAX_OPERANDS: usize = 4;
const MAX_ATTRIBUTES: usize = 6;
const MAX_DEPTH: usize = 3;
const KEYS: [&str; 4] = ["a", "b", "prototype", "length"];

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let mut session = StructAlgebra::new();
    let getter = session
        .heap_mut()
        .register_function("fuzz_getter", |_, _, _| Value::Int(7));

    let count = 1 + usize::from(byte(data, 0)) % MAX_OPERANDS;
    let mut cursor = 1usize;
    let operands: Vec<Value> = (0..count)
        .map(|_| Value::Object(build(&mut session, data, &mut cursor, getter, 0)))
        .collect();
    let snapshots: Vec<Value> = operands
        .iter()
        .filter_map(|operand| session.copy(operand).ok().map(Value::Object))
        .collect();

    let _ = session.union(&operands);
    let _ = session.intersection_by_key(&operands);
    let _ = session.intersection_by_value(&operands);
    let _ = session.difference_by_key(&operands);
    let _ = session.difference_by_value(&operands);
    let _ = session.copy_json(&operands[0]);

    if let Ok(frozen) = session.freeze_copy(&operands[0]) {
        assert!(session.heap().is_frozen(frozen).unwrap_or(false));
    }
    if let Ok(view) = session.freeze_proxy(&operands[0]) {
        assert!(session.heap().is_frozen(view).unwrap_or(false));
    }

    for (operand, snapshot) in operands.iter().zip(&snapshots) {
        assert!(session.heap().deep_equals(operand, snapshot));
    }
});

fn build(
    session: &mut StructAlgebra,
    data: &[u8],
    cursor: &mut usize,
    getter: frankenengine_struct_algebra::FunctionId,
    depth: usize,
) -> ObjectHandle {
    let head = next(data, cursor);
    let kind = if head & 1 == 0 {
        ContainerKind::Keyed
    } else {
        ContainerKind::Indexed
    };
    let handle = session.heap_mut().alloc(kind);
    let attributes = usize::from(head >> 1) % MAX_ATTRIBUTES;

    for _ in 0..attributes {
        let selector = next(data, cursor);
        let key = if kind == ContainerKind::Indexed && selector & 1 == 1 {
            PropertyKey::Index(u32::from(selector >> 1) % 8)
        } else {
            PropertyKey::from(KEYS[usize::from(selector >> 1) % KEYS.len()])
        };
        let attr = match next(data, cursor) % 6 {
            0 => Attribute::data(Value::Null),
            1 => Attribute::data(Value::Int(i64::from(next(data, cursor) % 3))),
            2 => Attribute::data(Value::Str(format!("s{}", next(data, cursor) % 2))),
            3 => Attribute::accessor(Some(getter), None),
            _ if depth < MAX_DEPTH => {
                let child = build(session, data, cursor, getter, depth + 1);
                Attribute::data(Value::Object(child))
            }
            _ => Attribute::data(Value::Bool(true)),
        };
        let _ = session.heap_mut().define_property(handle, key, attr);
    }
    handle
}

fn next(data: &[u8], cursor: &mut usize) -> u8 {
    let value = byte(data, *cursor);
    *cursor = cursor.wrapping_add(1);
    value
}

fn byte(data: &[u8], index: usize) -> u8 {
    if data.is_empty() {
        return 0;
    }
    data[index % data.len()]
}
