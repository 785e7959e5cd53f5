//! Order-preserving serialization for configuration documents.
//!
//! The main codec reads a YAML-compatible dialect with two departures
//! from plain YAML: mapping key order is preserved everywhere, and the
//! `!aggregate` directive merges duplicate keys instead of letting the
//! last occurrence win. Output is canonical and compact: collections
//! whose immediate children are all scalars render in flow style, so a
//! flat mapping serializes to a single `{key: value}` line.
//!
//! ```
//! let value = sls::deserialize("foo: !aggregate hello\nfoo: !aggregate world")?;
//! assert_eq!(sls::serialize(&value)?, "foo: [hello, world]");
//! # Ok::<(), sls::SerializationError>(())
//! ```
//!
//! The [`yaml`] module exposes the same pipeline without the directive,
//! and the [`json`] module (feature `json`, on by default) a serde_json
//! passthrough. [`available`] lists which codecs this build carries.

mod codec;
mod emitter;
mod error;
mod loader;
mod merge;
mod node;
mod ordered_map;
mod value;

#[cfg(feature = "json")]
pub mod json;
pub mod yaml;

pub use codec::Codec;
pub use emitter::{flow_string, quoted_scalar, DumpOptions, FlowStyle};
pub use error::{ErrorKind, Location, Result, SerializationError};
pub use ordered_map::OrderedMap;
pub use value::Value;

/// The codecs compiled into this build.
pub fn available() -> Vec<Codec> {
    Codec::ALL
        .into_iter()
        .filter(|codec| codec.is_available())
        .collect()
}

/// Parse a document in the aggregating dialect.
pub fn deserialize(content: &str) -> Result<Value> {
    Codec::Sls.ensure_available()?;
    loader::load(content, loader::Dialect::Sls).inspect_err(|err| {
        tracing::debug!(error = %err, "Failed to deserialize document");
    })
}

/// Serialize a value to the canonical compact form.
pub fn serialize(value: &Value) -> Result<String> {
    serialize_with(value, DumpOptions::default())
}

/// Serialize with explicit dump options.
pub fn serialize_with(value: &Value, options: DumpOptions) -> Result<String> {
    Codec::Sls.ensure_available()?;
    Ok(emitter::dump(value, &options))
}
