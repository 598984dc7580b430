//! Deep merge for parsed configuration values.
//!
//! Mappings merge key-by-key; everything else is replaced by the dominant
//! value. Arrays are replaced entirely, not concatenated.

use serde_json::Value;

use crate::formats::Mapping;

/// Merge `overlay` onto `base`, with `overlay` winning.
///
/// - Two mappings merge recursively.
/// - A null overlay leaves the base value alone (null means "unset").
/// - Anything else, arrays included, replaces the base value wholesale.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.remove(&key) {
                    Some(existing) => {
                        base.insert(key, deep_merge(existing, value));
                    }
                    None => {
                        base.insert(key, value);
                    }
                }
            }
            Value::Object(base)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Fold [`deep_merge`] over mappings ordered least dominant first.
pub fn deep_merge_all(mappings: impl IntoIterator<Item = Mapping>) -> Mapping {
    let merged = mappings
        .into_iter()
        .fold(Value::Null, |acc, map| deep_merge(acc, Value::Object(map)));
    match merged {
        Value::Object(map) => map,
        _ => Mapping::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Mapping {
        match value {
            Value::Object(map) => map,
            other => panic!("not a mapping: {other}"),
        }
    }

    #[test]
    fn flat_keys_overlay_wins() {
        let merged = deep_merge(json!({"editor": "vi", "tabs": 4}), json!({"tabs": 8}));
        assert_eq!(merged, json!({"editor": "vi", "tabs": 8}));
    }

    #[test]
    fn nested_mappings_merge_recursively() {
        let base = json!({"paths": {"cache": "/var/cache", "data": "/usr/share"}});
        let overlay = json!({"paths": {"cache": "~/.cache"}});
        assert_eq!(
            deep_merge(base, overlay),
            json!({"paths": {"cache": "~/.cache", "data": "/usr/share"}})
        );
    }

    #[test]
    fn arrays_are_replaced() {
        let merged = deep_merge(json!({"exts": ["yml", "toml"]}), json!({"exts": ["json"]}));
        assert_eq!(merged, json!({"exts": ["json"]}));
    }

    #[test]
    fn null_overlay_keeps_base() {
        let merged = deep_merge(json!({"editor": "vi"}), json!({"editor": null}));
        assert_eq!(merged, json!({"editor": "vi"}));
    }

    #[test]
    fn scalar_and_mapping_replace_each_other() {
        assert_eq!(
            deep_merge(json!({"v": 1}), json!({"v": {"nested": true}})),
            json!({"v": {"nested": true}})
        );
        assert_eq!(
            deep_merge(json!({"v": {"nested": true}}), json!({"v": 1})),
            json!({"v": 1})
        );
    }

    #[test]
    fn merge_all_applies_in_order() {
        let merged = deep_merge_all([
            obj(json!({"a": 1, "b": 1})),
            obj(json!({"b": 2, "c": 2})),
            obj(json!({"c": 3})),
        ]);
        assert_eq!(Value::Object(merged), json!({"a": 1, "b": 2, "c": 3}));
    }

    #[test]
    fn merge_all_of_nothing_is_empty() {
        assert!(deep_merge_all([]).is_empty());
    }
}
