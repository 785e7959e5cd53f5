//! The plain YAML codec.
//!
//! Identical to the main codec except that the aggregation directive is
//! not recognized; documents using it fail with an unsupported-tag
//! error. Output uses the same canonical dumper.

use crate::emitter::{self, DumpOptions};
use crate::error::Result;
use crate::loader::{self, Dialect};
use crate::value::Value;

pub fn available() -> bool {
    true
}

pub fn deserialize(content: &str) -> Result<Value> {
    loader::load(content, Dialect::Yaml)
}

pub fn serialize(value: &Value) -> Result<String> {
    serialize_with(value, DumpOptions::default())
}

pub fn serialize_with(value: &Value, options: DumpOptions) -> Result<String> {
    Ok(emitter::dump(value, &options))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_yaml_round_trip() {
        let value = deserialize("foo: bar").unwrap();
        assert_eq!(serialize(&value).unwrap(), "{foo: bar}");
    }

    #[test]
    fn test_directive_is_not_recognized() {
        assert!(deserialize("foo: !aggregate bar").is_err());
    }
}
