//! Key-value view of metrics
//!
//! Host-language tooling sees metrics as a mapping from field name to
//! value. This view is not part of the wire format; it only exists at the
//! binding boundary and is compiled with the `config-view` feature.
//!
//! Import is validated in full before anything is written, so a rejected
//! mapping leaves the metric untouched.

use crate::error::ConfigError;
use crate::wire::{Schema, ScalarKind, Word};
use serde_json::Value;

/// Field name to value mapping
pub type MetricDict = serde_json::Map<String, Value>;

/// Export a metric as a [`MetricDict`]
pub trait DictView {
    /// Field name to value mapping for host tooling
    fn to_dict(&self) -> MetricDict;
}

/// Insert every scalar of `schema` under its field name
pub fn export_scalars<M>(schema: &Schema<M>, metric: &M, dict: &mut MetricDict) {
    for field in schema.fields() {
        let word = (field.get)(metric);
        let value: Value = match field.kind {
            ScalarKind::I32 | ScalarKind::I64 => (word as i32).into(),
            ScalarKind::U32 | ScalarKind::U64 => word.into(),
        };
        dict.insert(field.name.to_string(), value);
    }
}

fn lookup<'a>(dict: &'a MetricDict, key: &str) -> Result<&'a Value, ConfigError> {
    dict.get(key)
        .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
}

/// Read one integer and check it fits `kind`
pub fn scalar_word(dict: &MetricDict, key: &str, kind: ScalarKind) -> Result<Word, ConfigError> {
    let mismatch = || ConfigError::TypeMismatch {
        key: key.to_string(),
        expected: kind.name(),
    };
    let value = lookup(dict, key)?;
    let int = value
        .as_i64()
        .map(i128::from)
        .or_else(|| value.as_u64().map(i128::from))
        .ok_or_else(mismatch)?;
    let (low, high) = kind.bounds();
    if int < low || int > high {
        return Err(mismatch());
    }
    Ok(int as i64 as Word)
}

/// Read an i32 list of exactly `expected` elements
pub fn i32_array(dict: &MetricDict, key: &str, expected: usize) -> Result<Vec<i32>, ConfigError> {
    let mismatch = || ConfigError::TypeMismatch {
        key: key.to_string(),
        expected: "list of i32",
    };
    let items = lookup(dict, key)?.as_array().ok_or_else(mismatch)?;
    if items.len() != expected {
        return Err(ConfigError::SizeMismatch {
            key: key.to_string(),
            expected,
            actual: items.len(),
        });
    }
    items
        .iter()
        .map(|item| {
            item.as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(mismatch)
        })
        .collect()
}

/// Validate every scalar of `schema`, returning the words in schema order
pub fn import_scalars<M>(schema: &Schema<M>, dict: &MetricDict) -> Result<Vec<Word>, ConfigError> {
    schema
        .fields()
        .iter()
        .map(|field| scalar_word(dict, field.name, field.kind))
        .collect()
}

/// Assign previously validated scalar words
pub fn commit_scalars<M>(schema: &Schema<M>, metric: &mut M, words: &[Word]) {
    for (field, &word) in schema.fields().iter().zip(words) {
        (field.set)(metric, word);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dict(value: Value) -> MetricDict {
        match value {
            Value::Object(map) => map,
            _ => MetricDict::new(),
        }
    }

    #[test]
    fn test_scalar_word_ranges() {
        let d = dict(json!({"neg": -1, "big": 4_000_000_000u64, "f": 1.5, "s": "x"}));

        assert_eq!(scalar_word(&d, "neg", ScalarKind::I32).unwrap(), 0xFFFF_FFFF);
        assert!(matches!(
            scalar_word(&d, "neg", ScalarKind::U32),
            Err(ConfigError::TypeMismatch { .. })
        ));
        assert_eq!(scalar_word(&d, "big", ScalarKind::U32).unwrap(), 4_000_000_000);
        assert!(scalar_word(&d, "big", ScalarKind::I32).is_err());
        assert!(scalar_word(&d, "f", ScalarKind::I32).is_err());
        assert!(scalar_word(&d, "s", ScalarKind::I32).is_err());
        assert_eq!(
            scalar_word(&d, "absent", ScalarKind::I32),
            Err(ConfigError::MissingKey("absent".to_string()))
        );
    }

    #[test]
    fn test_i32_array() {
        let d = dict(json!({"a": [1, 2, 3], "bad": [1, "x", 3], "n": 4}));

        assert_eq!(i32_array(&d, "a", 3).unwrap(), vec![1, 2, 3]);
        assert_eq!(
            i32_array(&d, "a", 4),
            Err(ConfigError::SizeMismatch {
                key: "a".to_string(),
                expected: 4,
                actual: 3
            })
        );
        assert!(matches!(
            i32_array(&d, "bad", 3),
            Err(ConfigError::TypeMismatch { .. })
        ));
        assert!(matches!(
            i32_array(&d, "n", 1),
            Err(ConfigError::TypeMismatch { .. })
        ));
    }
}
