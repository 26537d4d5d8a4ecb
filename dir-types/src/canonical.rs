//! Canonical JSON normalization: recursively sort object keys ascending by
//! code point, leaving array order, string content, and number
//! representation untouched so that independent implementations compute
//! bit-identical bytes from the same record.

/// Recursively rebuild a JSON value with every object's keys sorted
/// ascending by code point.
pub fn canonicalize_value(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = serde_json::Map::with_capacity(map.len());
            for key in keys {
                sorted.insert(key.clone(), canonicalize_value(&map[key]));
            }
            serde_json::Value::Object(sorted)
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(canonicalize_value).collect())
        }
        other => other.clone(),
    }
}

/// Serialize a value to its canonical, whitespace-free byte form after
/// key-sorting.
pub fn canonical_bytes(value: &serde_json::Value) -> Vec<u8> {
    let sorted = canonicalize_value(value);
    serde_json::to_vec(&sorted).expect("canonicalized JSON values always serialize")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::strategy::Strategy;

    #[test]
    fn sorts_object_keys_ascending() {
        let value = serde_json::json!({"b": 1, "a": 2});
        let bytes = canonical_bytes(&value);
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.find("\"a\"").unwrap() < text.find("\"b\"").unwrap());
        assert_eq!(text, r#"{"a":2,"b":1}"#);
    }

    #[test]
    fn sorts_nested_object_keys() {
        let value = serde_json::json!({"outer": {"z": 1, "y": {"b": 1, "a": 2}}});
        let text = String::from_utf8(canonical_bytes(&value)).unwrap();
        assert_eq!(text, r#"{"outer":{"y":{"a":2,"b":1},"z":1}}"#);
    }

    #[test]
    fn leaves_array_order_untouched() {
        let value = serde_json::json!({"a": [3, 1, 2]});
        let text = String::from_utf8(canonical_bytes(&value)).unwrap();
        assert_eq!(text, r#"{"a":[3,1,2]}"#);
    }

    proptest::proptest! {
        /// Canonicalization is idempotent: running it twice is the same as
        /// running it once.
        #[test]
        fn canonicalize_is_idempotent(value in arb_json(3)) {
            let once = canonicalize_value(&value);
            let twice = canonicalize_value(&once);
            proptest::prop_assert_eq!(once, twice);
        }

        /// Two objects that differ only in key insertion order canonicalize
        /// to byte-identical output.
        #[test]
        fn key_order_does_not_affect_canonical_bytes(pairs in proptest::collection::vec((arb_key(), arb_json(2)), 0..8)) {
            let forward: serde_json::Map<String, serde_json::Value> = pairs.iter().cloned().collect();
            let mut reversed_pairs = pairs.clone();
            reversed_pairs.reverse();
            let backward: serde_json::Map<String, serde_json::Value> = reversed_pairs.into_iter().collect();

            let a = canonical_bytes(&serde_json::Value::Object(forward));
            let b = canonical_bytes(&serde_json::Value::Object(backward));
            proptest::prop_assert_eq!(a, b);
        }
    }

    fn arb_key() -> impl proptest::strategy::Strategy<Value = String> {
        "[a-z]{1,6}"
    }

    fn arb_json(depth: u32) -> impl proptest::strategy::Strategy<Value = serde_json::Value> {
        let leaf = proptest::prop_oneof![
            proptest::strategy::Just(serde_json::Value::Null),
            proptest::bool::ANY.prop_map(serde_json::Value::Bool),
            (-1000i64..1000).prop_map(|n| serde_json::json!(n)),
            "[a-zA-Z0-9 ]{0,8}".prop_map(serde_json::Value::String),
        ];
        leaf.prop_recursive(depth, 16, 4, |inner| {
            proptest::prop_oneof![
                proptest::collection::vec(inner.clone(), 0..4).prop_map(serde_json::Value::Array),
                proptest::collection::vec((arb_key(), inner), 0..4)
                    .prop_map(|pairs| serde_json::Value::Object(pairs.into_iter().collect())),
            ]
        })
    }
}
