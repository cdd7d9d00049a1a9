//! Structural difference with parity semantics.
//!
//! For each attribute of the base (first operand) the subtrahends are
//! scanned right to left. The scan keeps the unbroken run of matching
//! subtrahends adjacent to the base; any mismatch resets it. A scalar
//! attribute survives when that run has even length, so
//! `a \ b \ c == a \ (b \ c)`. Deep attributes recurse into the run and are
//! dropped when nothing enumerable is left.

use std::collections::VecDeque;

use crate::attribute::{AttributeModel, validate_operands};
use crate::copy::copy_container;
use crate::error::{AlgebraResult, StructError};
use crate::object_model::{Attribute, ObjectHandle, ObjectHeap, Value};

pub fn difference(
    heap: &mut ObjectHeap,
    model: &AttributeModel,
    operands: &[Value],
    by_value: bool,
) -> AlgebraResult<ObjectHandle> {
    let operation = if by_value {
        "difference_by_value"
    } else {
        "difference_by_key"
    };
    let handles = validate_operands(heap, operation, operands)?;
    subtract_handles(heap, model, &handles, by_value)
}

pub fn difference_by_key(
    heap: &mut ObjectHeap,
    model: &AttributeModel,
    operands: &[Value],
) -> AlgebraResult<ObjectHandle> {
    difference(heap, model, operands, false)
}

pub fn difference_by_value(
    heap: &mut ObjectHeap,
    model: &AttributeModel,
    operands: &[Value],
) -> AlgebraResult<ObjectHandle> {
    difference(heap, model, operands, true)
}

/// By-value scalar match. Accessors have no stored value and read as
/// `Undefined` here.
fn same_scalar(a: &Attribute, b: &Attribute) -> bool {
    match (a.value(), b.value()) {
        (Some(x), Some(y)) => x.strict_equals(y),
        (Some(v), None) | (None, Some(v)) => v.strict_equals(&Value::Undefined),
        (None, None) => true,
    }
}

fn subtract_handles(
    heap: &mut ObjectHeap,
    model: &AttributeModel,
    handles: &[ObjectHandle],
    by_value: bool,
) -> AlgebraResult<ObjectHandle> {
    let Some((&base, subtrahends)) = handles.split_first() else {
        return Err(StructError::invalid_argument(
            "difference",
            "not enough arguments",
        ));
    };
    let kind = heap.container(base)?.kind;
    let result = heap.alloc(kind);
    if subtrahends.is_empty() {
        return Ok(result);
    }

    for (key, mut attr) in heap.own_attributes(base)? {
        let base_deep = model.deep_handle(&key, &attr);
        let mut run: VecDeque<Option<ObjectHandle>> = VecDeque::new();

        for &subtrahend in subtrahends.iter().rev() {
            let Some(other) = heap.own_attribute(subtrahend, &key)? else {
                run.clear();
                continue;
            };
            let other_deep = model.deep_handle(&key, other);
            if other_deep.is_some() != base_deep.is_some() {
                run.clear();
                continue;
            }
            if base_deep.is_none() && by_value && !same_scalar(&attr, other) {
                run.clear();
                continue;
            }
            run.push_front(other_deep);
        }

        match base_deep {
            Some(child) if run.is_empty() => {
                let copied = copy_container(heap, model, child)?;
                attr.set_value(Value::Object(copied));
            }
            Some(child) => {
                let operands: Vec<ObjectHandle> =
                    std::iter::once(child).chain(run.into_iter().flatten()).collect();
                let rest = subtract_handles(heap, model, &operands, by_value)?;
                if heap.container(rest)?.enumerable_count() == 0 {
                    continue;
                }
                attr.set_value(Value::Object(rest));
            }
            None if run.len() % 2 == 1 => continue,
            None => {}
        }
        heap.container_mut(result)?.put(key, attr);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object_model::{ContainerKind, PropertyKey};

    fn name(s: &str) -> PropertyKey {
        PropertyKey::from(s)
    }

    fn obj(h: ObjectHandle) -> Value {
        Value::Object(h)
    }

    #[test]
    fn removes_keys_found_in_subtrahends() {
        let mut heap = ObjectHeap::new();
        let model = AttributeModel::default();
        let a = heap.keyed([("a", Value::Int(1)), ("b", Value::Int(1))]);
        let b = heap.keyed([("a", Value::Int(1)), ("c", Value::Int(2))]);
        let c = heap.keyed([("d", Value::Int(3))]);
        let res = difference_by_key(&mut heap, &model, &[obj(a), obj(b), obj(c)]).unwrap();
        let expected = heap.keyed([("b", Value::Int(1))]);
        assert!(heap.deep_equals(&obj(res), &obj(expected)));
    }

    #[test]
    fn fully_cancelled_nested_attribute_is_dropped() {
        let mut heap = ObjectHeap::new();
        let model = AttributeModel::default();
        let x = heap.keyed([("a", Value::Int(1)), ("b", Value::Int(1))]);
        let y = heap.keyed([("a", Value::Int(2)), ("b", Value::Int(2))]);
        let a = heap.keyed([("a", obj(x))]);
        let b = heap.keyed([("a", obj(y))]);
        let res = difference_by_key(&mut heap, &model, &[obj(a), obj(b)]).unwrap();
        assert!(heap.container(res).unwrap().is_empty());
    }

    #[test]
    fn nested_result_with_only_hidden_attributes_is_dropped() {
        let mut heap = ObjectHeap::new();
        let model = AttributeModel::default();
        let x = heap.alloc(ContainerKind::Keyed);
        heap.define_property(
            x,
            name("h"),
            Attribute::Data {
                value: Value::Int(1),
                writable: true,
                enumerable: false,
                configurable: true,
            },
        )
        .unwrap();
        let y = heap.alloc(ContainerKind::Keyed);
        let a = heap.keyed([("n", obj(x))]);
        let b = heap.keyed([("n", obj(y))]);
        let res = difference_by_key(&mut heap, &model, &[obj(a), obj(b)]).unwrap();
        assert!(heap.container(res).unwrap().is_empty());

        heap.define_property(x, name("v"), Attribute::data(Value::Int(2)))
            .unwrap();
        let res = difference_by_key(&mut heap, &model, &[obj(a), obj(b)]).unwrap();
        let kept = child_keys(&heap, res, "n");
        assert_eq!(kept, vec![name("h"), name("v")]);
    }

    fn child_keys(heap: &ObjectHeap, h: ObjectHandle, key: &str) -> Vec<PropertyKey> {
        let child = heap.get_property(h, &name(key)).unwrap().as_object().unwrap();
        heap.own_keys(child).unwrap()
    }

    #[test]
    fn partially_cancelled_nested_attribute_survives() {
        let mut heap = ObjectHeap::new();
        let model = AttributeModel::default();
        let x = heap.keyed([("a", Value::Int(1)), ("b", Value::Int(1))]);
        let y = heap.keyed([("a", Value::Int(2))]);
        let a = heap.keyed([("n", obj(x))]);
        let b = heap.keyed([("n", obj(y))]);
        let res = difference_by_key(&mut heap, &model, &[obj(a), obj(b)]).unwrap();
        let inner = heap.keyed([("b", Value::Int(1))]);
        let expected = heap.keyed([("n", obj(inner))]);
        assert!(heap.deep_equals(&obj(res), &obj(expected)));
    }

    #[test]
    fn parity_of_matching_run() {
        let mut heap = ObjectHeap::new();
        let model = AttributeModel::default();
        let a = heap.keyed([("a", Value::Int(1))]);
        let b = heap.keyed([("a", Value::Int(2))]);
        let c = heap.keyed([("a", Value::Int(3))]);
        let res = difference_by_key(&mut heap, &model, &[obj(a), obj(b), obj(c)]).unwrap();
        assert_eq!(heap.get_property(res, &name("a")).unwrap(), Value::Int(1));

        let res = difference_by_key(&mut heap, &model, &[obj(a), obj(b)]).unwrap();
        assert!(heap.container(res).unwrap().is_empty());
    }

    #[test]
    fn gap_breaks_the_run() {
        let mut heap = ObjectHeap::new();
        let model = AttributeModel::default();
        let a = heap.keyed([("a", Value::Int(1))]);
        let b = heap.keyed([("b", Value::Int(2))]);
        let c = heap.keyed([("a", Value::Int(3))]);
        // Only the subtrahend adjacent to the base counts, and it lacks `a`.
        let res = difference_by_key(&mut heap, &model, &[obj(a), obj(b), obj(c)]).unwrap();
        assert_eq!(heap.own_keys(res).unwrap(), vec![name("a")]);
    }

    #[test]
    fn classification_mismatch_keeps_attribute() {
        let mut heap = ObjectHeap::new();
        let model = AttributeModel::default();
        let inner = heap.keyed([("x", Value::Int(1))]);
        let a = heap.keyed([("a", obj(inner))]);
        let b = heap.keyed([("a", Value::Int(1))]);
        let res = difference_by_key(&mut heap, &model, &[obj(a), obj(b)]).unwrap();
        let kept = heap.get_property(res, &name("a")).unwrap();
        assert_ne!(kept, obj(inner));
        assert!(heap.deep_equals(&kept, &obj(inner)));
    }

    #[test]
    fn by_value_keeps_differing_scalars() {
        let mut heap = ObjectHeap::new();
        let model = AttributeModel::default();
        let a = heap.keyed([("a", Value::Int(1)), ("b", Value::Int(2))]);
        let b = heap.keyed([("a", Value::Int(1)), ("b", Value::Int(3))]);
        let res = difference_by_value(&mut heap, &model, &[obj(a), obj(b)]).unwrap();
        assert_eq!(heap.own_keys(res).unwrap(), vec![name("b")]);
    }

    #[test]
    fn by_value_treats_accessors_as_undefined() {
        let mut heap = ObjectHeap::new();
        let model = AttributeModel::default();
        let getter = heap.register_function("get", |_, _, _| Value::Int(1));
        let a = heap.alloc(ContainerKind::Keyed);
        heap.define_property(a, name("g"), Attribute::accessor(Some(getter), None))
            .unwrap();
        let b = heap.keyed([("g", Value::Undefined)]);
        let res = difference_by_value(&mut heap, &model, &[obj(a), obj(b)]).unwrap();
        assert!(heap.container(res).unwrap().is_empty());
    }

    #[test]
    fn indexed_difference_leaves_holes() {
        let mut heap = ObjectHeap::new();
        let model = AttributeModel::default();
        let a = heap.indexed([Value::Int(1), Value::Int(1), Value::Int(1)]);
        let b = heap.indexed([Value::Int(2), Value::Int(2)]);
        let c = heap.indexed([Value::Int(3)]);
        let res = difference_by_key(&mut heap, &model, &[obj(a), obj(b), obj(c)]).unwrap();
        assert_eq!(
            heap.own_keys(res).unwrap(),
            vec![PropertyKey::Index(0), PropertyKey::Index(2)]
        );
        assert_eq!(heap.length(res).unwrap(), Some(3));
    }

    #[test]
    fn single_operand_gives_empty_of_same_kind() {
        let mut heap = ObjectHeap::new();
        let model = AttributeModel::default();
        let a = heap.indexed([Value::Int(1)]);
        let res = difference_by_key(&mut heap, &model, &[obj(a)]).unwrap();
        assert!(heap.container(res).unwrap().is_empty());
        assert_eq!(heap.container(res).unwrap().kind, ContainerKind::Indexed);
    }

    #[test]
    fn untouched_nested_attribute_is_copied() {
        let mut heap = ObjectHeap::new();
        let model = AttributeModel::default();
        let inner = heap.keyed([("x", Value::Int(1))]);
        let a = heap.keyed([("n", obj(inner))]);
        let b = heap.keyed([("m", Value::Int(1))]);
        let res = difference_by_key(&mut heap, &model, &[obj(a), obj(b)]).unwrap();
        let kept = heap.get_property(res, &name("n")).unwrap();
        assert_ne!(kept, obj(inner));
        assert!(heap.deep_equals(&kept, &obj(inner)));
    }
}
