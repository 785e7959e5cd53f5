//! Type-dependent aggregation of duplicate-key values.

use crate::error::{Result, SerializationError};
use crate::ordered_map::OrderedMap;
use crate::value::Value;

/// Combine an incoming tagged value with the existing value under the
/// same key.
///
/// `existing` is `None` for the first tagged occurrence of a key; a null
/// existing value is treated the same way. A null incoming value never
/// contributes anything to an established value. Sequences concatenate
/// in encounter order; mappings merge recursively with the existing
/// map's key order preserved. Mixing a mapping with anything else fails
/// with a type conflict.
pub(crate) fn aggregate(existing: Option<Value>, incoming: Value) -> Result<Value> {
    let Some(existing) = existing.filter(|value| !value.is_null()) else {
        return Ok(seed(incoming));
    };
    if incoming.is_null() {
        return Ok(existing);
    }
    match (existing, incoming) {
        (Value::Sequence(mut items), Value::Sequence(more)) => {
            items.extend(more);
            Ok(Value::Sequence(items))
        }
        (Value::Sequence(_), incoming @ Value::Mapping(_)) => Err(
            SerializationError::type_conflict("sequence", incoming.type_name()),
        ),
        (Value::Sequence(mut items), scalar) => {
            items.push(scalar);
            Ok(Value::Sequence(items))
        }
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            Ok(Value::Mapping(deep_merge(base, overlay)))
        }
        (existing @ Value::Mapping(_), incoming) => Err(SerializationError::type_conflict(
            existing.type_name(),
            incoming.type_name(),
        )),
        (scalar, incoming @ Value::Mapping(_)) => Err(SerializationError::type_conflict(
            scalar.type_name(),
            incoming.type_name(),
        )),
        // A scalar existing value wraps into a sequence, then the
        // sequence rules apply.
        (scalar, incoming) => aggregate(Some(Value::Sequence(vec![scalar])), incoming),
    }
}

/// First tagged occurrence of a key, nothing to merge with yet.
fn seed(incoming: Value) -> Value {
    match incoming {
        Value::Null => Value::Sequence(Vec::new()),
        Value::Sequence(_) | Value::Mapping(_) => incoming,
        scalar => Value::Sequence(vec![scalar]),
    }
}

/// Recursive mapping merge: the base map's key order wins, brand-new
/// keys append where first introduced, non-mapping leaves overwrite.
fn deep_merge(mut base: OrderedMap, overlay: OrderedMap) -> OrderedMap {
    for (key, value) in overlay {
        match (base.get(&key).cloned(), value) {
            (Some(Value::Mapping(prev)), Value::Mapping(next)) => {
                base.insert(key, Value::Mapping(deep_merge(prev, next)));
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
    base
}
