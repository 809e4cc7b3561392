//! Deep copies through the JSON data model.
//!
//! The copy keeps only what JSON can represent: non-finite floats turn into
//! `null`, timestamps into their string form, and maps with non-string keys
//! are rejected.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Deep-copy `value` by serializing it and reading it back.
pub fn deep_clone<T>(value: &T) -> Result<T>
where
    T: Serialize + DeserializeOwned,
{
    reshape(value)
}

/// Serialize `value` and read it back as a different type.
pub fn reshape<T, U>(value: &T) -> Result<U>
where
    T: Serialize + ?Sized,
    U: DeserializeOwned,
{
    let json = serde_json::to_value(value)?;
    Ok(serde_json::from_value(json)?)
}

/// Deep-copy an untyped JSON value.
pub fn clone_value(value: &Value) -> Result<Value> {
    reshape(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use chrono::{DateTime, TimeZone, Utc};
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::HashMap;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Nested {
        one: Inner,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Inner {
        two: Vec<u32>,
        three: Option<String>,
    }

    #[test]
    fn test_nested_struct() {
        let original = Nested {
            one: Inner {
                two: vec![1, 2, 3],
                three: Some("text".to_string()),
            },
        };
        let copy = deep_clone(&original).unwrap();
        assert_eq!(copy, original);
        assert_ne!(copy.one.two.as_ptr(), original.one.two.as_ptr());
    }

    #[test]
    fn test_primitives_and_none() {
        assert_eq!(deep_clone(&42).unwrap(), 42);
        assert_eq!(deep_clone(&"text".to_string()).unwrap(), "text");
        assert!(deep_clone(&true).unwrap());
        assert_eq!(deep_clone(&None::<u8>).unwrap(), None);
        assert_eq!(clone_value(&Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_untyped_value() {
        let value = json!([1, 2, 3, { "one": "text" }, {}]);
        assert_eq!(clone_value(&value).unwrap(), value);
    }

    #[test]
    fn test_timestamp_becomes_string() {
        #[derive(Serialize)]
        struct Dated {
            date: DateTime<Utc>,
        }
        #[derive(Deserialize)]
        struct Plain {
            date: String,
        }

        let dated = Dated {
            date: Utc.with_ymd_and_hms(2025, 12, 15, 0, 0, 0).unwrap(),
        };
        let plain: Plain = reshape(&dated).unwrap();
        assert_eq!(plain.date, "2025-12-15T00:00:00Z");
    }

    #[test]
    fn test_non_string_keys_rejected() {
        let mut map = HashMap::new();
        map.insert((1, 2), "pair".to_string());
        let err = deep_clone(&map).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_nan_becomes_null() {
        let copy: Value = reshape(&vec![1.5, f64::NAN]).unwrap();
        assert_eq!(copy, json!([1.5, null]));
    }
}
