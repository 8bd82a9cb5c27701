use std::fmt;
use std::ops::Index;

use ezspreadsheet_common::Value;

use crate::convert::ToValue;
use crate::error::DecodeError;
use crate::record::{Instance, Record, RecordType};
use crate::schema::Declaration;

/// A record built from a stored header rather than a Rust type.
///
/// Values are kept in column order and can be read by position or by
/// attribute name.
#[derive(Clone, Debug, PartialEq)]
pub struct GenericRecord {
    ty: RecordType,
    values: Vec<Value>,
}

impl GenericRecord {
    pub fn record_type(&self) -> &RecordType {
        &self.ty
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.ty
            .shape()
            .position(name)
            .and_then(|idx| self.values.get(idx))
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(attribute, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.ty.shape().names().zip(self.values.iter())
    }
}

impl Instance for GenericRecord {
    fn type_name(&self) -> &str {
        self.ty.name()
    }

    fn matches(&self, ty: &RecordType) -> bool {
        ty.is_generic() && ty.name() == self.ty.name() && ty.shape().same_names(self.ty.shape())
    }

    fn values(&self) -> Vec<Value> {
        self.values.clone()
    }
}

impl Record for GenericRecord {
    fn declaration() -> Option<Declaration> {
        None
    }

    fn construct(ty: &RecordType, values: Vec<Value>) -> Result<Self, DecodeError> {
        if values.len() != ty.shape().len() {
            return Err(DecodeError::RowWidth {
                expected: ty.shape().len(),
                found: values.len(),
            });
        }
        Ok(Self {
            ty: ty.clone(),
            values,
        })
    }
}

impl ToValue for GenericRecord {
    fn to_value(&self) -> Value {
        Value::Record {
            name: self.ty.name().to_string(),
            fields: self
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        }
    }
}

impl Index<usize> for GenericRecord {
    type Output = Value;

    fn index(&self, idx: usize) -> &Value {
        &self.values[idx]
    }
}

impl Index<&str> for GenericRecord {
    type Output = Value;

    /// Panics when `name` is not an attribute of this record.
    fn index(&self, name: &str) -> &Value {
        match self.get(name) {
            Some(value) => value,
            None => panic!("{} has no attribute `{name}`", self.ty.name()),
        }
    }
}

/// `Animal(name='Leopard Gecko', conservation_status='Least Concern')`
impl fmt::Display for GenericRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_value(), f)
    }
}
