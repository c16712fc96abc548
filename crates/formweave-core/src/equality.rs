//! Structural equality over JSON values.
//!
//! Used by dispatch nodes to decide whether freshly derived render props
//! differ from the previous ones. Objects compare by key set regardless of
//! insertion order and numbers compare by numeric value, so `1` equals `1.0`.

use std::rc::Rc;

use serde_json::{Number, Value};

pub fn deep_equal(first: &Value, second: &Value) -> bool {
    match (first, second) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter().all(|(key, value)| {
                    b.get(key)
                        .is_some_and(|other| deep_equal(value, other))
                })
        }
        _ => false,
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// Pointer identity first, structural comparison second.
pub fn rc_equal<T: ?Sized>(first: &Rc<T>, second: &Rc<T>, eq: impl FnOnce(&T, &T) -> bool) -> bool {
    Rc::ptr_eq(first, second) || eq(first, second)
}

pub fn option_equal<T>(
    first: Option<&T>,
    second: Option<&T>,
    eq: impl FnOnce(&T, &T) -> bool,
) -> bool {
    match (first, second) {
        (None, None) => true,
        (Some(a), Some(b)) => eq(a, b),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn objects_ignore_key_order() {
        let a = json!({"name": "Ada", "age": 36});
        let b = json!({"age": 36, "name": "Ada"});
        assert!(deep_equal(&a, &b));
    }

    #[test]
    fn numbers_compare_by_value() {
        assert!(deep_equal(&json!(1), &json!(1.0)));
        assert!(!deep_equal(&json!(1), &json!(2)));
        assert!(!deep_equal(&json!(-1), &json!(u64::MAX)));
    }

    #[test]
    fn nested_arrays_must_match_pairwise() {
        assert!(deep_equal(&json!([1, [2, {"a": null}]]), &json!([1, [2, {"a": null}]])));
        assert!(!deep_equal(&json!([1, 2]), &json!([2, 1])));
        assert!(!deep_equal(&json!([1]), &json!([1, 1])));
    }

    #[test]
    fn different_kinds_never_match() {
        assert!(!deep_equal(&json!(null), &json!(false)));
        assert!(!deep_equal(&json!(0), &json!("0")));
        assert!(!deep_equal(&json!({}), &json!([])));
        assert!(!deep_equal(&json!({"a": 1}), &json!({"b": 1})));
    }

    #[test]
    fn rc_equal_short_circuits_on_identity() {
        let shared = Rc::new(json!({"a": 1}));
        let clone = Rc::clone(&shared);
        assert!(rc_equal(&shared, &clone, |_, _| false));
        let other = Rc::new(json!({"a": 1}));
        assert!(rc_equal(&shared, &other, deep_equal));
    }

    #[test]
    fn option_equal_requires_both_sides() {
        let value = json!(3);
        assert!(option_equal::<Value>(None, None, deep_equal));
        assert!(!option_equal(Some(&value), None, deep_equal));
        assert!(option_equal(Some(&value), Some(&json!(3.0)), deep_equal));
    }
}
