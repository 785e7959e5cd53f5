//! Error types for sls serialization.

use std::fmt;
use thiserror::Error;
use yaml_rust2::scanner::{Marker, ScanError};

/// Result type alias for sls operations.
pub type Result<T> = std::result::Result<T, SerializationError>;

/// A position in the source text. Both fields are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub col: usize,
}

impl Location {
    pub(crate) fn from_marker(marker: &Marker) -> Self {
        Location {
            line: marker.line(),
            col: marker.col() + 1,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.col)
    }
}

/// The specific failure behind a [`SerializationError`].
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Malformed document syntax.
    #[error("parse error at {location}: {message}")]
    Parse { message: String, location: Location },

    /// A tag other than the aggregation directive was encountered.
    #[error("unsupported tag `{tag}` at {location}")]
    UnsupportedTag { tag: String, location: Location },

    /// Aggregation between incompatible value types.
    #[error("cannot aggregate {incoming} into {existing}")]
    TypeConflict {
        existing: &'static str,
        incoming: &'static str,
    },

    /// A value the target codec cannot represent.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// The requested codec has no backend in this build.
    #[error("the {0} serializer is unavailable")]
    SerializerUnavailable(&'static str),
}

/// The single public error type for every codec operation.
///
/// Callers that need to distinguish failures inspect [`kind`](Self::kind);
/// everyone else catches one type.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct SerializationError {
    kind: ErrorKind,
}

impl SerializationError {
    /// The specific failure wrapped by this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub(crate) fn parse(message: impl Into<String>, location: Location) -> Self {
        ErrorKind::Parse {
            message: message.into(),
            location,
        }
        .into()
    }

    pub(crate) fn unsupported_tag(tag: impl Into<String>, location: Location) -> Self {
        ErrorKind::UnsupportedTag {
            tag: tag.into(),
            location,
        }
        .into()
    }

    pub(crate) fn type_conflict(existing: &'static str, incoming: &'static str) -> Self {
        ErrorKind::TypeConflict { existing, incoming }.into()
    }

    pub(crate) fn unsupported_type(message: impl Into<String>) -> Self {
        ErrorKind::UnsupportedType(message.into()).into()
    }

    pub(crate) fn unavailable(codec: &'static str) -> Self {
        ErrorKind::SerializerUnavailable(codec).into()
    }
}

impl From<ErrorKind> for SerializationError {
    fn from(kind: ErrorKind) -> Self {
        SerializationError { kind }
    }
}

impl From<ScanError> for SerializationError {
    fn from(err: ScanError) -> Self {
        let location = Location::from_marker(err.marker());
        SerializationError::parse(err.info().to_owned(), location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = SerializationError::parse("unexpected token", Location { line: 3, col: 7 });
        assert_eq!(err.to_string(), "parse error at line 3, column 7: unexpected token");
    }

    #[test]
    fn test_type_conflict_display() {
        let err = SerializationError::type_conflict("sequence", "mapping");
        assert_eq!(err.to_string(), "cannot aggregate mapping into sequence");
    }

    #[test]
    fn test_kind_is_inspectable() {
        let err = SerializationError::unavailable("msgpack");
        assert!(matches!(
            err.kind(),
            ErrorKind::SerializerUnavailable("msgpack")
        ));
    }
}
