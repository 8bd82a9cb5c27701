//! Record shapes: the ordered attribute list that defines a table's columns.

use std::collections::HashSet;
use std::sync::Arc;

use ezspreadsheet_common::{CellValue, Value, ValueKind};

use crate::error::SchemaError;
use crate::record::Record;

/// Widest record a spreadsheet may hold (columns `A` through `AY`).
pub const MAX_ATTRIBUTES: usize = 51;

/// One column: an attribute name and the kind of value it holds.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: ValueKind,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Static schema of a record type, as produced by `#[derive(Record)]`.
#[derive(Clone, Debug)]
pub struct Declaration {
    pub name: &'static str,
    pub fields: Vec<FieldDescriptor>,
}

/// Ordered, validated field list. Cheap to clone and never mutated once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordShape {
    fields: Arc<[FieldDescriptor]>,
}

impl RecordShape {
    /// Validate `fields` (non-empty, unique names, at most [`MAX_ATTRIBUTES`]).
    pub fn new(fields: Vec<FieldDescriptor>) -> Result<Self, SchemaError> {
        if fields.len() > MAX_ATTRIBUTES {
            return Err(SchemaError::TooManyAttributes {
                count: fields.len(),
                max: MAX_ATTRIBUTES,
            });
        }
        let mut seen = HashSet::with_capacity(fields.len());
        for (idx, field) in fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(SchemaError::EmptyAttribute(idx));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateAttribute(field.name.clone()));
            }
        }
        Ok(Self {
            fields: fields.into(),
        })
    }

    /// Shape of a stored header row. Kinds are unknown until data is seen.
    ///
    /// Trailing blank header cells are ignored; an inner blank is an error.
    pub fn from_header(header: &[CellValue]) -> Result<Self, SchemaError> {
        let width = header_width(header);
        let fields = header[..width]
            .iter()
            .map(|cell| FieldDescriptor::new(cell.to_string(), ValueKind::Any))
            .collect();
        Self::new(fields)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, idx: usize) -> Option<&FieldDescriptor> {
        self.fields.get(idx)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Same attribute names in the same order, regardless of kinds.
    pub fn same_names(&self, other: &RecordShape) -> bool {
        self.len() == other.len() && self.names().eq(other.names())
    }

    /// Does a stored header row name exactly these attributes?
    pub fn matches_header(&self, header: &[CellValue]) -> bool {
        let width = header_width(header);
        width == self.len()
            && header[..width]
                .iter()
                .zip(self.names())
                .all(|(cell, name)| cell.to_string() == name)
    }

    /// Fill in `Any` kinds from a decoded sample row. Known kinds are kept.
    pub fn refine(&self, sample: &[Value]) -> RecordShape {
        let fields: Vec<FieldDescriptor> = self
            .fields
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                let kind = match (field.kind, sample.get(idx)) {
                    (ValueKind::Any, Some(value)) if !matches!(value, Value::Empty) => value.kind(),
                    (kind, _) => kind,
                };
                FieldDescriptor::new(field.name.clone(), kind)
            })
            .collect();
        RecordShape {
            fields: fields.into(),
        }
    }
}

fn header_width(header: &[CellValue]) -> usize {
    header
        .iter()
        .rposition(|cell| !cell.is_empty())
        .map_or(0, |idx| idx + 1)
}

/// Ordered attributes of a record type declared with `#[derive(Record)]`.
pub fn extract<R: Record>() -> Result<RecordShape, SchemaError> {
    let declaration = R::declaration()
        .ok_or_else(|| SchemaError::Undeclared(std::any::type_name::<R>().to_string()))?;
    RecordShape::new(declaration.fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<FieldDescriptor> {
        (0..n)
            .map(|i| FieldDescriptor::new(format!("attr_{i}"), ValueKind::Text))
            .collect()
    }

    #[test]
    fn ceiling_is_inclusive() {
        assert_eq!(RecordShape::new(names(MAX_ATTRIBUTES)).unwrap().len(), 51);
        assert_eq!(
            RecordShape::new(names(MAX_ATTRIBUTES + 1)),
            Err(SchemaError::TooManyAttributes { count: 52, max: 51 })
        );
    }

    #[test]
    fn duplicates_and_blanks_are_rejected() {
        let dup = vec![
            FieldDescriptor::new("name", ValueKind::Text),
            FieldDescriptor::new("name", ValueKind::Int),
        ];
        assert_eq!(
            RecordShape::new(dup),
            Err(SchemaError::DuplicateAttribute("name".into()))
        );
        let header = [CellValue::from("a"), CellValue::Empty, CellValue::from("c")];
        assert_eq!(
            RecordShape::from_header(&header),
            Err(SchemaError::EmptyAttribute(1))
        );
    }

    #[test]
    fn header_ignores_trailing_blanks() {
        let header = [
            CellValue::from("name"),
            CellValue::from("conservation_status"),
            CellValue::Empty,
        ];
        let shape = RecordShape::from_header(&header).unwrap();
        assert_eq!(
            shape.names().collect::<Vec<_>>(),
            ["name", "conservation_status"]
        );
        assert!(shape.matches_header(&header));
        assert!(!shape.matches_header(&header[..1]));
    }

    #[test]
    fn refine_only_touches_unknown_kinds() {
        let shape = RecordShape::new(vec![
            FieldDescriptor::new("name", ValueKind::Any),
            FieldDescriptor::new("age", ValueKind::Any),
            FieldDescriptor::new("family", ValueKind::Sequence),
            FieldDescriptor::new("notes", ValueKind::Any),
        ])
        .unwrap();
        let refined = shape.refine(&[
            Value::from("Kieran"),
            Value::Int(21),
            Value::from("not a list"),
            Value::Empty,
        ]);
        let kinds: Vec<_> = refined.fields().iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            [
                ValueKind::Text,
                ValueKind::Int,
                ValueKind::Sequence,
                ValueKind::Any
            ]
        );
        assert!(refined.same_names(&shape));
    }
}
