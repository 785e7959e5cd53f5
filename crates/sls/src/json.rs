//! The JSON codec, a thin passthrough over serde_json.

use crate::error::{Location, Result, SerializationError};
use crate::value::Value;

pub fn available() -> bool {
    true
}

pub fn serialize(value: &Value) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|err| SerializationError::unsupported_type(err.to_string()))
}

pub fn deserialize(content: &str) -> Result<Value> {
    serde_json::from_str(content).map_err(|err| {
        SerializationError::parse(
            err.to_string(),
            Location {
                line: err.line(),
                col: err.column(),
            },
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordered_map::OrderedMap;

    #[test]
    fn test_round_trip_preserves_order() {
        let value = deserialize(r#"{"b": 1, "a": [true, null]}"#).unwrap();
        let map = value.as_mapping().unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(serialize(&value).unwrap(), r#"{"b":1,"a":[true,null]}"#);
    }

    #[test]
    fn test_serialize_mapping() {
        let mut map = OrderedMap::new();
        map.insert("foo", Value::from("bar"));
        let out = serialize(&Value::Mapping(map)).unwrap();
        assert_eq!(out, r#"{"foo":"bar"}"#);
    }

    #[test]
    fn test_invalid_json_reports_position() {
        let err = deserialize("{\"a\": }").unwrap_err();
        assert!(matches!(
            err.kind(),
            crate::error::ErrorKind::Parse { .. }
        ));
    }
}
