//! Cell encoding of single attribute values.
//!
//! Scalars are stored natively. Containers become text: either the literal
//! bracket syntax (`['Abby', 'Mike']`, `('a',)`, `{'age': 21}`), which
//! [`ValueCodec::decode`] turns back into a container, or a bulleted list
//! meant for people, which it does not.
//!
//! Decoding is driven by the column's declared kind: a `Text` column gets the
//! stored text verbatim, whatever it looks like.

use std::fmt::Write as _;

use ezspreadsheet_common::{CellValue, Value, ValueKind};
use ezspreadsheet_store::TabularFormat;
use ezspreadsheet_store::infer::{TypeInference, infer_field};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValueCodec {
    readable: bool,
    line_end: &'static str,
    inference: TypeInference,
}

impl ValueCodec {
    pub fn new(readable: bool, line_end: &'static str) -> Self {
        Self {
            readable,
            line_end,
            inference: TypeInference::default(),
        }
    }

    /// How text in columns of unknown kind is typed on decode.
    pub fn with_inference(mut self, inference: TypeInference) -> Self {
        self.inference = inference;
        self
    }

    /// Codec for `format`, using its bullet separator in readable mode.
    pub fn for_format(format: TabularFormat, readable: bool) -> Self {
        Self::new(readable, format.readable_line_end())
    }

    pub fn readable(&self) -> bool {
        self.readable
    }

    /// Never fails: anything without a native cell form degrades to text.
    pub fn encode(&self, value: &Value) -> CellValue {
        if let Some(cell) = value.as_cell() {
            return cell;
        }
        let text = match value {
            Value::Mapping(entries) if self.readable => {
                let mut out = String::new();
                for (key, item) in entries {
                    let _ = write!(out, "- {key}: {item}{}", self.line_end);
                }
                out
            }
            Value::Sequence(items) | Value::Tuple(items) if self.readable => {
                let mut out = String::new();
                for item in items {
                    let _ = write!(out, "- {item}{}", self.line_end);
                }
                out
            }
            Value::Record { .. } => value.to_string(),
            other => other.repr(),
        };
        CellValue::Text(text)
    }

    /// Decode a cell of a column whose kind is unknown.
    pub fn decode(&self, cell: CellValue) -> Value {
        self.decode_as(cell, ValueKind::Any)
    }

    /// Decode a cell of a column declared to hold `kind`.
    ///
    /// Container syntax is only parsed for container and unknown kinds, and
    /// scalar inference never touches a `Text` column.
    pub fn decode_as(&self, cell: CellValue, kind: ValueKind) -> Value {
        let text = match cell {
            CellValue::Text(text) => text,
            CellValue::Empty => return Value::Empty,
            other if kind == ValueKind::Text => return Value::Text(other.to_string()),
            other => return Value::from(other),
        };
        match kind {
            ValueKind::Text => Value::Text(text),
            ValueKind::Sequence | ValueKind::Tuple | ValueKind::Mapping => decode_text(text),
            ValueKind::Int | ValueKind::Float | ValueKind::Bool | ValueKind::DateTime => {
                Value::from(infer_field(&text, TypeInference::ScalarsAndDates))
            }
            ValueKind::Any | ValueKind::Empty | ValueKind::Record => {
                if text.starts_with(['[', '(', '{']) {
                    decode_text(text)
                } else {
                    Value::from(infer_field(&text, self.inference))
                }
            }
        }
    }
}

impl Default for ValueCodec {
    fn default() -> Self {
        Self::for_format(TabularFormat::Xlsx, false)
    }
}

/// Container syntax is recognised by its leading bracket only. Elements are
/// not parsed further: they come back as trimmed, unquoted text.
pub fn decode_text(text: String) -> Value {
    match text.chars().next() {
        Some('[') => Value::Sequence(split_items(body(&text, ']'))),
        Some('(') => Value::Tuple(split_items(body(&text, ')'))),
        Some('{') => Value::Mapping(split_entries(body(&text, '}'))),
        _ => Value::Text(text),
    }
}

/// Text between the opening marker and the closing bracket, if present.
fn body(text: &str, close: char) -> &str {
    let inner = &text[1..];
    inner.strip_suffix(close).unwrap_or(inner)
}

fn segments(body: &str) -> Vec<String> {
    let unquoted = body.replace(['\'', '"'], "");
    let mut parts: Vec<String> = unquoted.split(',').map(|s| s.trim().to_string()).collect();
    // `('a',)` and `[]` leave an empty last segment.
    if parts.last().is_some_and(String::is_empty) {
        parts.pop();
    }
    parts
}

fn split_items(body: &str) -> Vec<Value> {
    segments(body).into_iter().map(Value::Text).collect()
}

fn split_entries(body: &str) -> Vec<(String, Value)> {
    segments(body)
        .into_iter()
        .map(|segment| match segment.split_once(':') {
            Some((key, value)) => (key.trim().to_string(), Value::from(value.trim())),
            None => (segment, Value::from("")),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value::from(s)
    }

    fn names() -> Value {
        Value::Sequence(vec![text("Abby"), text("Mike"), text("Janice")])
    }

    #[test]
    fn scalars_are_stored_natively() {
        let codec = ValueCodec::default();
        assert_eq!(codec.encode(&text("Leopard Gecko")), CellValue::from("Leopard Gecko"));
        assert_eq!(codec.encode(&Value::Int(20)), CellValue::Int(20));
        assert_eq!(codec.encode(&Value::Float(0.5)), CellValue::Number(0.5));
        assert_eq!(codec.encode(&Value::Empty), CellValue::Empty);
        assert_eq!(codec.decode(CellValue::Int(20)), Value::Int(20));
    }

    #[test]
    fn literal_sequence_round_trips() {
        let codec = ValueCodec::default();
        let cell = codec.encode(&names());
        assert_eq!(cell, CellValue::from("['Abby', 'Mike', 'Janice']"));
        assert_eq!(codec.decode(cell), names());
    }

    #[test]
    fn literal_tuple_stays_a_tuple() {
        let codec = ValueCodec::default();
        let pair = Value::Tuple(vec![text("Abby"), text("Mike")]);
        assert_eq!(codec.decode(codec.encode(&pair)), pair);
        let single = Value::Tuple(vec![text("Abby")]);
        assert_eq!(codec.encode(&single), CellValue::from("('Abby',)"));
        assert_eq!(codec.decode(codec.encode(&single)), single);
    }

    #[test]
    fn mapping_values_decode_as_text() {
        let codec = ValueCodec::default();
        let person = Value::Mapping(vec![
            ("age".to_string(), Value::Int(21)),
            ("name".to_string(), text("Francis")),
        ]);
        let cell = codec.encode(&person);
        assert_eq!(cell, CellValue::from("{'age': 21, 'name': 'Francis'}"));
        assert_eq!(
            codec.decode(cell),
            Value::Mapping(vec![
                ("age".to_string(), text("21")),
                ("name".to_string(), text("Francis")),
            ])
        );
    }

    #[test]
    fn empty_containers_have_no_elements() {
        assert_eq!(decode_text("[]".into()), Value::Sequence(vec![]));
        assert_eq!(decode_text("{}".into()), Value::Mapping(vec![]));
    }

    #[test]
    fn malformed_tokens_parse_partially() {
        assert_eq!(
            decode_text("['a', 'b'".into()),
            Value::Sequence(vec![text("a"), text("b")])
        );
        assert_eq!(
            decode_text("{'orphan'}".into()),
            Value::Mapping(vec![("orphan".to_string(), text(""))])
        );
        assert_eq!(decode_text("plain".into()), text("plain"));
    }

    #[test]
    fn readable_bullets_use_format_line_end() {
        let xlsx = ValueCodec::for_format(TabularFormat::Xlsx, true);
        assert_eq!(
            xlsx.encode(&names()),
            CellValue::from("- Abby\n- Mike\n- Janice\n")
        );
        let csv = ValueCodec::for_format(TabularFormat::Csv, true);
        assert_eq!(
            csv.encode(&names()),
            CellValue::from("- Abby \t- Mike \t- Janice \t")
        );
        let person = Value::Mapping(vec![("age".to_string(), Value::Int(21))]);
        assert_eq!(xlsx.encode(&person), CellValue::from("- age: 21\n"));
    }

    #[test]
    fn text_columns_keep_token_like_text() {
        let codec = ValueCodec::default();
        for raw in ["[draft] Kieran", "(555) 123-4567", "{vip}", "true", "1e3", "+5"] {
            assert_eq!(
                codec.decode_as(CellValue::from(raw), ValueKind::Text),
                text(raw),
                "{raw}"
            );
        }
        assert_eq!(
            codec.decode_as(CellValue::Int(7), ValueKind::Text),
            text("7")
        );
        assert_eq!(codec.decode_as(CellValue::Empty, ValueKind::Text), Value::Empty);
    }

    #[test]
    fn unknown_columns_are_inferred() {
        let codec = ValueCodec::default();
        assert_eq!(codec.decode(CellValue::from("21")), Value::Int(21));
        assert_eq!(codec.decode(CellValue::from("true")), Value::Bool(true));
        assert_eq!(codec.decode(CellValue::from("+5")), text("+5"));
        let off = codec.with_inference(TypeInference::Off);
        assert_eq!(off.decode(CellValue::from("21")), text("21"));
        assert_eq!(
            codec.decode_as(CellValue::from("0.5"), ValueKind::Float),
            Value::Float(0.5)
        );
    }

    #[test]
    fn readable_output_does_not_decode_to_a_container() {
        let codec = ValueCodec::for_format(TabularFormat::Xlsx, true);
        let decoded = codec.decode(codec.encode(&names()));
        assert_eq!(decoded, text("- Abby\n- Mike\n- Janice\n"));
    }

    #[test]
    fn nested_records_fall_back_to_their_display() {
        let codec = ValueCodec::default();
        let nested = Value::Record {
            name: "Animal".to_string(),
            fields: vec![("name".to_string(), text("Gecko"))],
        };
        assert_eq!(codec.encode(&nested), CellValue::from("Animal(name='Gecko')"));
    }
}
