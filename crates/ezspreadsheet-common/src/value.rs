use chrono::NaiveDateTime;
use std::fmt::{self, Display, Write as _};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Text layout used for date-time cells that a backend cannot store natively.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A **stored** cell value. This is the unit a tabular backend reads and
/// writes; anything richer is deflated to `Text` before it reaches a backend.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Number(f64),
    Boolean(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Boolean(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

/// An **attribute** value as seen by records: scalars plus the nested
/// containers a record field may hold.
///
/// Sequences and tuples are kept apart so the lossless token syntax can
/// reproduce `[..]` versus `(..)`; mappings keep insertion order.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Sequence(Vec<Value>),
    Tuple(Vec<Value>),
    Mapping(Vec<(String, Value)>),
    /// A nested record. Never reconstructed from a cell.
    Record {
        name: String,
        fields: Vec<(String, Value)>,
    },
}

/// Coarse classification of a [`Value`], used by field descriptors.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValueKind {
    #[default]
    Any,
    Empty,
    Text,
    Int,
    Float,
    Bool,
    DateTime,
    Sequence,
    Tuple,
    Mapping,
    Record,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Empty => ValueKind::Empty,
            Value::Text(_) => ValueKind::Text,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Bool(_) => ValueKind::Bool,
            Value::DateTime(_) => ValueKind::DateTime,
            Value::Sequence(_) => ValueKind::Sequence,
            Value::Tuple(_) => ValueKind::Tuple,
            Value::Mapping(_) => ValueKind::Mapping,
            Value::Record { .. } => ValueKind::Record,
        }
    }

    pub fn is_container(self) -> bool {
        matches!(
            self,
            ValueKind::Sequence | ValueKind::Tuple | ValueKind::Mapping
        )
    }
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::Any => "any",
            ValueKind::Empty => "empty",
            ValueKind::Text => "text",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Bool => "bool",
            ValueKind::DateTime => "datetime",
            ValueKind::Sequence => "sequence",
            ValueKind::Tuple => "tuple",
            ValueKind::Mapping => "mapping",
            ValueKind::Record => "record",
        })
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        ValueKind::of(self)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The natively storable form of a scalar, or `None` for containers and records.
    pub fn as_cell(&self) -> Option<CellValue> {
        match self {
            Value::Empty => Some(CellValue::Empty),
            Value::Text(s) => Some(CellValue::Text(s.clone())),
            Value::Int(i) => Some(CellValue::Int(*i)),
            Value::Float(n) => Some(CellValue::Number(*n)),
            Value::Bool(b) => Some(CellValue::Boolean(*b)),
            Value::DateTime(dt) => Some(CellValue::DateTime(*dt)),
            Value::Sequence(_) | Value::Tuple(_) | Value::Mapping(_) | Value::Record { .. } => {
                None
            }
        }
    }

    /// Literal rendering: text is quoted, containers use bracket syntax.
    ///
    /// `[..]` for sequences, `(..)` for tuples (a one-element tuple keeps its
    /// trailing comma), `{k: v, ..}` for mappings.
    pub fn repr(&self) -> String {
        let mut out = String::new();
        self.write_repr(&mut out);
        out
    }

    fn write_repr(&self, out: &mut String) {
        match self {
            Value::Text(s) => write_quoted(out, s),
            Value::DateTime(dt) => write_quoted(out, &dt.format(DATETIME_FORMAT).to_string()),
            Value::Sequence(items) => {
                out.push('[');
                write_items(out, items);
                out.push(']');
            }
            Value::Tuple(items) => {
                out.push('(');
                write_items(out, items);
                if items.len() == 1 {
                    out.push(',');
                }
                out.push(')');
            }
            Value::Mapping(entries) => {
                out.push('{');
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write_quoted(out, key);
                    out.push_str(": ");
                    value.write_repr(out);
                }
                out.push('}');
            }
            other => {
                let _ = write!(out, "{other}");
            }
        }
    }
}

fn write_items(out: &mut String, items: &[Value]) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        item.write_repr(out);
    }
}

fn write_quoted(out: &mut String, s: &str) {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    out.push(quote);
    out.push_str(s);
    out.push(quote);
}

/// Plain rendering: text is written as-is, everything else as its literal form.
impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => f.write_str("None"),
            Value::Text(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{i}"),
            // Debug keeps the decimal point on integral floats (`1.0`, not `1`).
            Value::Float(n) => write!(f, "{n:?}"),
            Value::Bool(b) => f.write_str(if *b { "True" } else { "False" }),
            Value::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
            Value::Sequence(_) | Value::Tuple(_) | Value::Mapping(_) => f.write_str(&self.repr()),
            Value::Record { name, fields } => {
                write!(f, "{name}(")?;
                for (i, (field, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{field}={}", value.repr())?;
                }
                f.write_str(")")
            }
        }
    }
}

impl From<CellValue> for Value {
    fn from(cell: CellValue) -> Self {
        match cell {
            CellValue::Empty => Value::Empty,
            CellValue::Text(s) => Value::Text(s),
            CellValue::Int(i) => Value::Int(i),
            CellValue::Number(n) => Value::Float(n),
            CellValue::Boolean(b) => Value::Bool(b),
            CellValue::DateTime(dt) => Value::DateTime(dt),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}
