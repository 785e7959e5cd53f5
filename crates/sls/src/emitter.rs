//! Canonical compact dumper and display formatting.
//!
//! Two independent formatting surfaces live here: [`dump`] produces the
//! canonical re-parseable document form, and [`flow_string`] /
//! [`quoted_scalar`] produce the display forms used when structures are
//! re-embedded into templates.

use crate::loader;
use crate::ordered_map::OrderedMap;
use crate::value::Value;

/// Collection layout policy for [`dump`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowStyle {
    /// Flow for collections whose children are all scalars, block
    /// otherwise. This is the canonical compact form.
    #[default]
    Auto,
    /// Single-line flow everywhere.
    Flow,
    /// Block everywhere; empty collections still render as `[]`/`{}`.
    Block,
}

/// Options for [`serialize_with`](crate::serialize_with).
#[derive(Debug, Clone, Default)]
pub struct DumpOptions {
    pub flow_style: FlowStyle,
}

/// Serialize a value to the canonical textual form. Never emits a
/// trailing newline.
pub(crate) fn dump(value: &Value, options: &DumpOptions) -> String {
    let mut out = String::new();
    match options.flow_style {
        FlowStyle::Flow => write_flow(&mut out, value),
        style @ (FlowStyle::Auto | FlowStyle::Block) => write_node(&mut out, value, 0, style),
    }
    out
}

/// The single-line flow rendering of any value.
pub fn flow_string(value: &Value) -> String {
    let mut out = String::new();
    write_flow(&mut out, value);
    out
}

/// The quoted scalar form used for re-embedding into templates: string
/// scalars are always double-quoted, everything else renders as in the
/// canonical form.
pub fn quoted_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => {
            let mut out = String::new();
            write_quoted(&mut out, s);
            out
        }
        other => flow_string(other),
    }
}

fn write_node(out: &mut String, value: &Value, indent: usize, style: FlowStyle) {
    match value {
        Value::Sequence(items) if !inline_eligible(value, style) => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                push_indent(out, indent);
                if inline_eligible(item, style) {
                    out.push_str("- ");
                    write_flow(out, item);
                } else {
                    out.push('-');
                    out.push('\n');
                    write_node(out, item, indent + 2, style);
                }
            }
        }
        Value::Mapping(map) if !inline_eligible(value, style) => {
            for (i, (key, child)) in map.iter().enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                push_indent(out, indent);
                write_string(out, key);
                out.push(':');
                if inline_eligible(child, style) {
                    out.push(' ');
                    write_flow(out, child);
                } else {
                    out.push('\n');
                    write_node(out, child, indent + 2, style);
                }
            }
        }
        other => write_flow(out, other),
    }
}

/// Whether a value may render on a single line under the given style.
fn inline_eligible(value: &Value, style: FlowStyle) -> bool {
    match value {
        Value::Sequence(items) => {
            items.is_empty() || (style == FlowStyle::Auto && items.iter().all(Value::is_scalar))
        }
        Value::Mapping(map) => {
            map.is_empty()
                || (style == FlowStyle::Auto && map.iter().all(|(_, child)| child.is_scalar()))
        }
        _ => true,
    }
}

pub(crate) fn write_flow(out: &mut String, value: &Value) {
    match value {
        Value::Sequence(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_flow(out, item);
            }
            out.push(']');
        }
        Value::Mapping(map) => write_flow_mapping(out, map),
        scalar => write_scalar(out, scalar),
    }
}

pub(crate) fn write_flow_mapping(out: &mut String, map: &OrderedMap) {
    out.push('{');
    for (i, (key, value)) in map.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_string(out, key);
        out.push_str(": ");
        write_flow(out, value);
    }
    out.push('}');
}

fn write_scalar(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Int(i) => out.push_str(&i.to_string()),
        Value::Float(x) => write_float(out, *x),
        Value::String(s) => write_string(out, s),
        Value::Sequence(_) | Value::Mapping(_) => unreachable!("collection passed to write_scalar"),
    }
}

/// Scalar rendering shared with the loader's key coercion.
pub(crate) fn scalar_string(value: &Value) -> String {
    let mut out = String::new();
    write_scalar(&mut out, value);
    out
}

fn write_float(out: &mut String, x: f64) {
    if x.is_nan() {
        out.push_str(".nan");
    } else if x == f64::INFINITY {
        out.push_str(".inf");
    } else if x == f64::NEG_INFINITY {
        out.push_str("-.inf");
    } else {
        let text = x.to_string();
        out.push_str(&text);
        // Keep a decimal point so the scalar re-parses as a float.
        if !text.contains(['.', 'e', 'E']) {
            out.push_str(".0");
        }
    }
}

fn write_string(out: &mut String, s: &str) {
    if needs_quoting(s) {
        write_quoted(out, s);
    } else {
        out.push_str(s);
    }
}

/// Quote a string when the plain form would be ambiguous with another
/// scalar type or unsafe in flow context.
fn needs_quoting(s: &str) -> bool {
    if s.is_empty() {
        return true;
    }
    if !matches!(loader::resolve_plain(s), Value::String(_)) {
        return true;
    }
    if s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace) {
        return true;
    }
    if s.starts_with([
        '!', '&', '*', '?', '|', '>', '%', '@', '`', '"', '\'', '-', ':', ',', '[', ']', '{', '}',
        '#',
    ]) {
        return true;
    }
    s.chars().any(|c| {
        matches!(
            c,
            ':' | ',' | '[' | ']' | '{' | '}' | '#' | '&' | '*' | '"' | '\''
        ) || c.is_control()
    })
}

fn write_quoted(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn push_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push(' ');
    }
}
