//! Aggregating loader built on yaml-rust2 events.
//!
//! The loader works in two phases. A [`MarkedEventReceiver`] builds a
//! [`Node`] tree from parser events, recording scalar styles and tags.
//! Materialization then folds the tree into a [`Value`], resolving the
//! aggregation directive wherever duplicate mapping keys occur.

use crate::emitter;
use crate::error::{Location, Result, SerializationError};
use crate::merge::aggregate;
use crate::node::{Node, NodeKind};
use crate::ordered_map::OrderedMap;
use crate::value::Value;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser, Tag};
use yaml_rust2::scanner::{Marker, TScalarStyle};

/// The aggregation directive tag, spelled `!aggregate` in documents.
const AGGREGATE_TAG: &str = "aggregate";

/// Resolved prefix of the YAML core schema tags (`!!str` and friends).
const CORE_SCHEMA: &str = "tag:yaml.org,2002:";

/// Which dialect the loader speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dialect {
    /// The YAML subset plus the aggregation directive.
    Sls,
    /// The plain YAML subset; `!aggregate` is an unsupported tag.
    Yaml,
}

/// Parse a single document into a [`Value`]. Empty input yields
/// [`Value::Null`]. If the input contains multiple documents, only the
/// first is parsed.
pub(crate) fn load(content: &str, dialect: Dialect) -> Result<Value> {
    let mut parser = Parser::new_from_str(content);
    let mut builder = NodeBuilder::new(dialect);
    parser
        .load(&mut builder, false)
        .map_err(SerializationError::from)?;
    builder.finish()
}

struct NodeBuilder {
    dialect: Dialect,
    stack: Vec<BuildNode>,
    root: Option<Node>,
    /// First failure seen; once set, remaining events are ignored.
    error: Option<SerializationError>,
}

enum BuildNode {
    Sequence {
        aggregate: bool,
        location: Location,
        items: Vec<Node>,
    },
    Mapping {
        aggregate: bool,
        location: Location,
        entries: Vec<(String, Node)>,
        pending_key: Option<String>,
    },
}

impl NodeBuilder {
    fn new(dialect: Dialect) -> Self {
        NodeBuilder {
            dialect,
            stack: Vec::new(),
            root: None,
            error: None,
        }
    }

    fn finish(self) -> Result<Value> {
        if let Some(err) = self.error {
            return Err(err);
        }
        match self.root {
            Some(node) => materialize(node),
            None => Ok(Value::Null),
        }
    }

    fn push_complete(&mut self, node: Node) {
        match self.stack.last_mut() {
            None => self.root = Some(node),
            Some(BuildNode::Sequence { items, .. }) => items.push(node),
            Some(BuildNode::Mapping {
                entries,
                pending_key,
                ..
            }) => match pending_key.take() {
                Some(key) => entries.push((key, node)),
                None => match key_string(&node) {
                    Ok(key) => *pending_key = Some(key),
                    Err(err) => self.error = Some(err),
                },
            },
        }
    }

    fn scalar_node(
        &self,
        text: String,
        style: TScalarStyle,
        tag: Option<Tag>,
        location: Location,
    ) -> Result<Node> {
        let mut aggregate = false;
        let value = match tag {
            Some(tag) if self.is_aggregate_tag(&tag) => {
                aggregate = true;
                parse_scalar(&text, style)
            }
            Some(tag) if tag.handle == CORE_SCHEMA => {
                apply_core_tag(&tag.suffix, &text, location)?
            }
            Some(tag) => return Err(unsupported_tag(&tag, location)),
            None => parse_scalar(&text, style),
        };
        Ok(Node::new(NodeKind::Scalar(value), aggregate, location))
    }

    /// Resolve the tag on a sequence or mapping start event into the
    /// aggregation mark.
    fn collection_mark(&self, tag: Option<Tag>, location: Location) -> Result<bool> {
        let Some(tag) = tag else {
            return Ok(false);
        };
        if self.is_aggregate_tag(&tag) {
            return Ok(true);
        }
        if tag.handle == CORE_SCHEMA && matches!(tag.suffix.as_str(), "seq" | "map") {
            return Ok(false);
        }
        Err(unsupported_tag(&tag, location))
    }

    fn is_aggregate_tag(&self, tag: &Tag) -> bool {
        self.dialect == Dialect::Sls && tag.handle == "!" && tag.suffix == AGGREGATE_TAG
    }

    fn fail(&mut self, err: SerializationError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

impl MarkedEventReceiver for NodeBuilder {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        if self.error.is_some() {
            return;
        }
        let location = Location::from_marker(&marker);
        match ev {
            Event::Nothing
            | Event::StreamStart
            | Event::StreamEnd
            | Event::DocumentStart
            | Event::DocumentEnd => {}

            Event::Scalar(text, style, _anchor_id, tag) => {
                match self.scalar_node(text, style, tag, location) {
                    Ok(node) => self.push_complete(node),
                    Err(err) => self.fail(err),
                }
            }

            Event::SequenceStart(_anchor_id, tag) => match self.collection_mark(tag, location) {
                Ok(aggregate) => self.stack.push(BuildNode::Sequence {
                    aggregate,
                    location,
                    items: Vec::new(),
                }),
                Err(err) => self.fail(err),
            },

            Event::SequenceEnd => {
                let Some(BuildNode::Sequence {
                    aggregate,
                    location,
                    items,
                }) = self.stack.pop()
                else {
                    self.fail(SerializationError::parse(
                        "sequence end without matching start",
                        location,
                    ));
                    return;
                };
                self.push_complete(Node::new(NodeKind::Sequence(items), aggregate, location));
            }

            Event::MappingStart(_anchor_id, tag) => match self.collection_mark(tag, location) {
                Ok(aggregate) => self.stack.push(BuildNode::Mapping {
                    aggregate,
                    location,
                    entries: Vec::new(),
                    pending_key: None,
                }),
                Err(err) => self.fail(err),
            },

            Event::MappingEnd => {
                let Some(BuildNode::Mapping {
                    aggregate,
                    location,
                    entries,
                    pending_key,
                }) = self.stack.pop()
                else {
                    self.fail(SerializationError::parse(
                        "mapping end without matching start",
                        location,
                    ));
                    return;
                };
                if pending_key.is_some() {
                    self.fail(SerializationError::parse(
                        "mapping entry without a value",
                        location,
                    ));
                    return;
                }
                self.push_complete(Node::new(NodeKind::Mapping(entries), aggregate, location));
            }

            Event::Alias(_anchor_id) => {
                self.fail(SerializationError::parse(
                    "aliases are not supported",
                    location,
                ));
            }
        }
    }
}

/// Coerce a key node to its string form. Collection keys and keys
/// carrying the directive are rejected.
fn key_string(node: &Node) -> Result<String> {
    if node.aggregate {
        return Err(SerializationError::parse(
            "the aggregation directive is not allowed on a mapping key",
            node.location,
        ));
    }
    match &node.kind {
        NodeKind::Scalar(Value::String(s)) => Ok(s.clone()),
        NodeKind::Scalar(scalar) => Ok(emitter::scalar_string(scalar)),
        NodeKind::Sequence(_) | NodeKind::Mapping(_) => Err(SerializationError::parse(
            "collection keys are not supported",
            node.location,
        )),
    }
}

fn unsupported_tag(tag: &Tag, location: Location) -> SerializationError {
    let spelled = if tag.handle == "!" {
        format!("!{}", tag.suffix)
    } else if tag.handle == CORE_SCHEMA {
        format!("!!{}", tag.suffix)
    } else {
        format!("{}{}", tag.handle, tag.suffix)
    };
    SerializationError::unsupported_tag(spelled, location)
}

fn parse_scalar(text: &str, style: TScalarStyle) -> Value {
    if style != TScalarStyle::Plain {
        return Value::String(text.to_string());
    }
    resolve_plain(text)
}

/// Resolve a plain-style scalar to its typed value. Shared with the
/// emitter, which quotes any string this function would type otherwise.
pub(crate) fn resolve_plain(text: &str) -> Value {
    match text {
        "" | "~" | "null" | "Null" | "NULL" => return Value::Null,
        "true" | "True" | "TRUE" | "yes" | "Yes" | "YES" | "on" | "On" | "ON" => {
            return Value::Bool(true);
        }
        "false" | "False" | "FALSE" | "no" | "No" | "NO" | "off" | "Off" | "OFF" => {
            return Value::Bool(false);
        }
        ".inf" | ".Inf" | ".INF" | "+.inf" => return Value::Float(f64::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => return Value::Float(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => return Value::Float(f64::NAN),
        _ => {}
    }
    if let Ok(i) = text.parse::<i64>() {
        return Value::Int(i);
    }
    if looks_numeric(text) {
        if let Ok(x) = text.parse::<f64>() {
            return Value::Float(x);
        }
    }
    Value::String(text.to_string())
}

/// Guard against Rust's float parser accepting words like `inf` and
/// `NaN` that YAML treats as strings. Decimal notation only.
fn looks_numeric(text: &str) -> bool {
    let Some(first) = text.chars().next() else {
        return false;
    };
    if !(first.is_ascii_digit() || matches!(first, '+' | '-' | '.')) {
        return false;
    }
    !text
        .chars()
        .any(|c| c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E'))
}

fn apply_core_tag(suffix: &str, text: &str, location: Location) -> Result<Value> {
    match suffix {
        "str" => Ok(Value::String(text.to_string())),
        "null" => Ok(Value::Null),
        "bool" => match resolve_plain(text) {
            Value::Bool(b) => Ok(Value::Bool(b)),
            _ => Err(SerializationError::parse(
                format!("invalid boolean scalar `{text}`"),
                location,
            )),
        },
        "int" => text.parse::<i64>().map(Value::Int).map_err(|_| {
            SerializationError::parse(format!("invalid integer scalar `{text}`"), location)
        }),
        "float" => text.parse::<f64>().map(Value::Float).map_err(|_| {
            SerializationError::parse(format!("invalid float scalar `{text}`"), location)
        }),
        other => Err(SerializationError::unsupported_tag(
            format!("!!{other}"),
            location,
        )),
    }
}

/// Fold a node into its final value, applying the directive when the
/// node carries it.
fn materialize(node: Node) -> Result<Value> {
    let value = materialize_kind(node.kind)?;
    if node.aggregate {
        aggregate(None, value)
    } else {
        Ok(value)
    }
}

fn materialize_kind(kind: NodeKind) -> Result<Value> {
    match kind {
        NodeKind::Scalar(value) => Ok(value),
        NodeKind::Sequence(items) => items
            .into_iter()
            .map(materialize)
            .collect::<Result<Vec<_>>>()
            .map(Value::Sequence),
        NodeKind::Mapping(entries) => build_mapping(entries).map(Value::Mapping),
    }
}

/// Fold mapping entries left to right, resolving duplicate keys.
fn build_mapping(entries: Vec<(String, Node)>) -> Result<OrderedMap> {
    let mut map = OrderedMap::with_capacity(entries.len());
    for (key, node) in entries {
        match map.get(&key).cloned() {
            None => {
                let value = materialize(node)?;
                map.insert(key, value);
            }
            Some(existing) => {
                tracing::trace!(key = %key, "Resolving duplicate mapping key");
                let merged = resolve_duplicate(existing, node)?;
                // Re-insertion keeps the key's original position.
                map.insert(key, merged);
            }
        }
    }
    Ok(map)
}

/// Resolve a later occurrence of an already-present key.
///
/// A tagged occurrence merges with the existing value. An untagged
/// mapping that carries the directive somewhere inside recurses per key
/// so the merge applies at the nested path. Anything else is the
/// ordinary last-occurrence-wins overwrite.
fn resolve_duplicate(existing: Value, node: Node) -> Result<Value> {
    if node.aggregate {
        let incoming = materialize_kind(node.kind)?;
        return aggregate(Some(existing), incoming);
    }
    match (existing, node.kind) {
        (Value::Mapping(mut map), NodeKind::Mapping(entries))
            if entries.iter().any(|(_, child)| child.contains_aggregate()) =>
        {
            for (key, child) in entries {
                match map.get(&key).cloned() {
                    None => {
                        let value = materialize(child)?;
                        map.insert(key, value);
                    }
                    Some(previous) => {
                        let merged = resolve_duplicate(previous, child)?;
                        map.insert(key, merged);
                    }
                }
            }
            Ok(Value::Mapping(map))
        }
        (_, kind) => materialize_kind(kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn load_sls(text: &str) -> Result<Value> {
        load(text, Dialect::Sls)
    }

    #[test]
    fn test_plain_scalars_are_typed() {
        assert_eq!(resolve_plain("42"), Value::Int(42));
        assert_eq!(resolve_plain("-3"), Value::Int(-3));
        assert_eq!(resolve_plain("1.5"), Value::Float(1.5));
        assert_eq!(resolve_plain("1e3"), Value::Float(1000.0));
        assert_eq!(resolve_plain("yes"), Value::Bool(true));
        assert_eq!(resolve_plain("Off"), Value::Bool(false));
        assert_eq!(resolve_plain("~"), Value::Null);
        assert_eq!(resolve_plain(""), Value::Null);
        assert_eq!(resolve_plain("hello"), Value::from("hello"));
        // Words the float parser would accept stay strings.
        assert_eq!(resolve_plain("inf"), Value::from("inf"));
        assert_eq!(resolve_plain("NaN"), Value::from("NaN"));
        assert_eq!(resolve_plain("0x1A"), Value::from("0x1A"));
    }

    #[test]
    fn test_quoted_scalars_stay_strings() {
        let value = load_sls("a: \"42\"\nb: '~'").unwrap();
        let map = value.as_mapping().unwrap();
        assert_eq!(map.get("a"), Some(&Value::from("42")));
        assert_eq!(map.get("b"), Some(&Value::from("~")));
    }

    #[test]
    fn test_empty_document_is_null() {
        assert_eq!(load_sls("").unwrap(), Value::Null);
    }

    #[test]
    fn test_nested_structure() {
        let value = load_sls("project:\n  title: My Project\n  authors:\n    - Alice\n    - Bob")
            .unwrap();
        let project = value.as_mapping().unwrap().get("project").unwrap();
        let authors = project.as_mapping().unwrap().get("authors").unwrap();
        assert_eq!(
            authors.as_sequence().unwrap(),
            &[Value::from("Alice"), Value::from("Bob")]
        );
    }

    #[test]
    fn test_untagged_duplicate_key_last_wins() {
        let value = load_sls("a: 1\na: 2").unwrap();
        let map = value.as_mapping().unwrap();
        assert_eq!(map.get("a"), Some(&Value::from(2)));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_bare_directive_seeds_sequence() {
        let value = load_sls("foo: !aggregate hello").unwrap();
        let map = value.as_mapping().unwrap();
        assert_eq!(
            map.get("foo"),
            Some(&Value::Sequence(vec![Value::from("hello")]))
        );
    }

    #[test]
    fn test_directive_merges_in_original_position() {
        let value = load_sls("a: first\nfoo: !aggregate one\nb: middle\nfoo: !aggregate two")
            .unwrap();
        let map = value.as_mapping().unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "foo", "b"]);
        assert_eq!(
            map.get("foo"),
            Some(&Value::Sequence(vec![
                Value::from("one"),
                Value::from("two")
            ]))
        );
    }

    #[test]
    fn test_directive_on_flow_collections() {
        let value = load_sls("bar: !aggregate [1, 2, 3]").unwrap();
        let map = value.as_mapping().unwrap();
        assert_eq!(
            map.get("bar"),
            Some(&Value::Sequence(vec![
                Value::from(1),
                Value::from(2),
                Value::from(3)
            ]))
        );
    }

    #[test]
    fn test_directive_on_block_mapping() {
        let value = load_sls("baz: !aggregate\n  a: 42\n  b: 666\n  c: the beast").unwrap();
        let baz = value.as_mapping().unwrap().get("baz").unwrap();
        let baz = baz.as_mapping().unwrap();
        assert_eq!(baz.get("a"), Some(&Value::from(42)));
        assert_eq!(baz.get("c"), Some(&Value::from("the beast")));
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        let err = load_sls("foo: !custom bar").unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::UnsupportedTag { tag, .. } if tag == "!custom"
        ));
    }

    #[test]
    fn test_aggregate_tag_rejected_in_plain_yaml_dialect() {
        let err = load("foo: !aggregate bar", Dialect::Yaml).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::UnsupportedTag { tag, .. } if tag == "!aggregate"
        ));
    }

    #[test]
    fn test_core_schema_tags_coerce() {
        let value = load_sls("a: !!str 42\nb: !!int 7\nc: !!bool yes").unwrap();
        let map = value.as_mapping().unwrap();
        assert_eq!(map.get("a"), Some(&Value::from("42")));
        assert_eq!(map.get("b"), Some(&Value::from(7)));
        assert_eq!(map.get("c"), Some(&Value::from(true)));
    }

    #[test]
    fn test_malformed_input_reports_position() {
        let err = load_sls("foo: [1, 2").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Parse { .. }));
    }

    #[test]
    fn test_alias_is_rejected() {
        let err = load_sls("a: &anchor 1\nb: *anchor").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Parse { .. }));
    }

    #[test]
    fn test_scalar_keys_coerce_to_strings() {
        let value = load_sls("42: answer\ntrue: yes").unwrap();
        let map = value.as_mapping().unwrap();
        assert_eq!(map.get("42"), Some(&Value::from("answer")));
        assert_eq!(map.get("true"), Some(&Value::from(true)));
    }

    #[test]
    fn test_collection_key_is_rejected() {
        let err = load_sls("[1, 2]: value").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Parse { .. }));
    }

    #[test]
    fn test_directive_type_conflict_surfaces() {
        let err = load_sls("p: !aggregate [1]\np: !aggregate {a: 1}").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::TypeConflict { .. }));
    }
}
