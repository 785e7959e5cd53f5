//! Codec registry.

use crate::error::{Result, SerializationError};

/// The serialization formats this crate knows about. Availability is
/// decided at compile time by the enabled features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Codec {
    /// The configuration dialect with the aggregation directive.
    Sls,
    /// The plain YAML subset, without the directive.
    Yaml,
    /// JSON via serde_json.
    Json,
    /// MessagePack. No backend is currently wired in.
    MsgPack,
}

impl Codec {
    pub const ALL: [Codec; 4] = [Codec::Sls, Codec::Yaml, Codec::Json, Codec::MsgPack];

    pub const fn name(self) -> &'static str {
        match self {
            Codec::Sls => "sls",
            Codec::Yaml => "yaml",
            Codec::Json => "json",
            Codec::MsgPack => "msgpack",
        }
    }

    pub const fn is_available(self) -> bool {
        match self {
            Codec::Sls | Codec::Yaml => true,
            Codec::Json => cfg!(feature = "json"),
            Codec::MsgPack => false,
        }
    }

    pub(crate) fn ensure_available(self) -> Result<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(SerializationError::unavailable(self.name()))
        }
    }
}

impl std::fmt::Display for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_core_codecs_always_available() {
        assert!(Codec::Sls.is_available());
        assert!(Codec::Yaml.is_available());
        assert!(!Codec::MsgPack.is_available());
    }

    #[test]
    fn test_unavailable_codec_errors() {
        let err = Codec::MsgPack.ensure_available().unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::SerializerUnavailable("msgpack")
        ));
        assert_eq!(err.to_string(), "the msgpack serializer is unavailable");
    }
}
