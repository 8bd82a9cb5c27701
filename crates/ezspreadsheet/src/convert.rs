//! Conversions between field types and [`Value`].
//!
//! `FromValue` is lenient: cells come back from a backend as text or as
//! whatever the backend inferred, and container elements always decode to
//! text, so numbers, booleans and date-times are parsed out of text when the
//! field asks for them.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use chrono::NaiveDateTime;
use ezspreadsheet_common::{Value, ValueKind};
use ezspreadsheet_store::infer::parse_datetime;

use crate::error::CoerceError;

pub trait ToValue {
    fn to_value(&self) -> Value;
}

pub trait FromValue: Sized {
    /// Kind recorded in the field descriptor for this type.
    const KIND: ValueKind;

    fn from_value(value: Value) -> Result<Self, CoerceError>;
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    const KIND: ValueKind = ValueKind::Any;

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        Ok(value)
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl FromValue for String {
    const KIND: ValueKind = ValueKind::Text;

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        Ok(match value {
            Value::Text(s) => s,
            Value::Empty => String::new(),
            other => other.to_string(),
        })
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

fn parse_int(value: &Value) -> Option<i64> {
    match value {
        Value::Int(i) => Some(*i),
        Value::Float(n) if n.fract() == 0.0 && n.is_finite() => Some(*n as i64),
        Value::Text(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|n| n.fract() == 0.0 && n.is_finite())
                    .map(|n| n as i64)
            })
        }
        _ => None,
    }
}

macro_rules! int_value {
    ($($ty:ty),*) => {$(
        impl ToValue for $ty {
            fn to_value(&self) -> Value {
                match i64::try_from(*self) {
                    Ok(i) => Value::Int(i),
                    Err(_) => Value::Text(self.to_string()),
                }
            }
        }

        impl FromValue for $ty {
            const KIND: ValueKind = ValueKind::Int;

            fn from_value(value: Value) -> Result<Self, CoerceError> {
                parse_int(&value)
                    .and_then(|i| <$ty>::try_from(i).ok())
                    .ok_or_else(|| CoerceError::new(ValueKind::Int, value))
            }
        }
    )*};
}

int_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! float_value {
    ($($ty:ty),*) => {$(
        impl ToValue for $ty {
            fn to_value(&self) -> Value {
                Value::Float(f64::from(*self))
            }
        }

        impl FromValue for $ty {
            const KIND: ValueKind = ValueKind::Float;

            fn from_value(value: Value) -> Result<Self, CoerceError> {
                let parsed = match &value {
                    Value::Float(n) => Some(*n),
                    Value::Int(i) => Some(*i as f64),
                    Value::Text(s) => s.trim().parse::<f64>().ok(),
                    _ => None,
                };
                parsed
                    .map(|n| n as $ty)
                    .ok_or_else(|| CoerceError::new(ValueKind::Float, value))
            }
        }
    )*};
}

float_value!(f32, f64);

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FromValue for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        let parsed = match &value {
            Value::Bool(b) => Some(*b),
            Value::Int(0) => Some(false),
            Value::Int(1) => Some(true),
            Value::Text(s) => match s.trim() {
                t if t.eq_ignore_ascii_case("true") => Some(true),
                t if t.eq_ignore_ascii_case("false") => Some(false),
                _ => None,
            },
            _ => None,
        };
        parsed.ok_or_else(|| CoerceError::new(ValueKind::Bool, value))
    }
}

impl ToValue for NaiveDateTime {
    fn to_value(&self) -> Value {
        Value::DateTime(*self)
    }
}

impl FromValue for NaiveDateTime {
    const KIND: ValueKind = ValueKind::DateTime;

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        let parsed = match &value {
            Value::DateTime(dt) => Some(*dt),
            Value::Text(s) => parse_datetime(s.trim()),
            _ => None,
        };
        parsed.ok_or_else(|| CoerceError::new(ValueKind::DateTime, value))
    }
}

/// `None` is stored as an empty cell.
impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Empty,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const KIND: ValueKind = T::KIND;

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        match value {
            Value::Empty => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

fn elements(value: Value, expected: ValueKind) -> Result<Vec<Value>, CoerceError> {
    match value {
        Value::Sequence(items) | Value::Tuple(items) => Ok(items),
        other => Err(CoerceError::new(expected, other)),
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::Sequence(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    const KIND: ValueKind = ValueKind::Sequence;

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        elements(value, ValueKind::Sequence)?
            .into_iter()
            .map(T::from_value)
            .collect()
    }
}

macro_rules! tuple_value {
    ($len:literal => $($name:ident : $idx:tt),+) => {
        impl<$($name: ToValue),+> ToValue for ($($name,)+) {
            fn to_value(&self) -> Value {
                Value::Tuple(vec![$(self.$idx.to_value()),+])
            }
        }

        impl<$($name: FromValue),+> FromValue for ($($name,)+) {
            const KIND: ValueKind = ValueKind::Tuple;

            fn from_value(value: Value) -> Result<Self, CoerceError> {
                let items = elements(value, ValueKind::Tuple)?;
                if items.len() != $len {
                    return Err(CoerceError::new(ValueKind::Tuple, Value::Tuple(items)));
                }
                let mut items = items.into_iter();
                Ok(($(
                    $name::from_value(items.next().unwrap_or_default())?,
                )+))
            }
        }
    };
}

tuple_value!(1 => A: 0);
tuple_value!(2 => A: 0, B: 1);
tuple_value!(3 => A: 0, B: 1, C: 2);
tuple_value!(4 => A: 0, B: 1, C: 2, D: 3);

fn entries(value: Value) -> Result<Vec<(String, Value)>, CoerceError> {
    match value {
        Value::Mapping(entries) => Ok(entries),
        other => Err(CoerceError::new(ValueKind::Mapping, other)),
    }
}

impl<T: ToValue> ToValue for BTreeMap<String, T> {
    fn to_value(&self) -> Value {
        Value::Mapping(
            self.iter()
                .map(|(key, value)| (key.clone(), value.to_value()))
                .collect(),
        )
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    const KIND: ValueKind = ValueKind::Mapping;

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        entries(value)?
            .into_iter()
            .map(|(key, value)| Ok((key, T::from_value(value)?)))
            .collect()
    }
}

/// Entries are written in the map's iteration order.
impl<T: ToValue, S> ToValue for HashMap<String, T, S> {
    fn to_value(&self) -> Value {
        Value::Mapping(
            self.iter()
                .map(|(key, value)| (key.clone(), value.to_value()))
                .collect(),
        )
    }
}

impl<T: FromValue, S: BuildHasher + Default> FromValue for HashMap<String, T, S> {
    const KIND: ValueKind = ValueKind::Mapping;

    fn from_value(value: Value) -> Result<Self, CoerceError> {
        entries(value)?
            .into_iter()
            .map(|(key, value)| Ok((key, T::from_value(value)?)))
            .collect()
    }
}
