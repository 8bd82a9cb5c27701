//! Record types, the traits records implement, and the `store` argument type.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use ezspreadsheet_common::{CellValue, Value};

use crate::error::{DecodeError, SchemaError};
use crate::generic::GenericRecord;
use crate::schema::{self, Declaration, RecordShape};

/// Anything that can be written as one row.
///
/// Object safe so a single `store` call can accept mixed arguments; the
/// session checks [`Instance::matches`] before reading any value.
pub trait Instance {
    fn type_name(&self) -> &str;

    /// Is `self` an instance of `ty`?
    fn matches(&self, ty: &RecordType) -> bool;

    /// Attribute values in declaration order.
    fn values(&self) -> Vec<Value>;
}

/// A record that can also be rebuilt from a stored row.
///
/// Usually derived:
///
/// ```
/// use ezspreadsheet::Record;
///
/// #[derive(Record)]
/// struct Animal {
///     name: String,
///     conservation_status: String,
/// }
/// ```
pub trait Record: Instance + Sized + 'static {
    /// Static schema, or `None` for records whose shape is only known at runtime.
    fn declaration() -> Option<Declaration>;

    /// Build a record from decoded values laid out as `ty.shape()`.
    fn construct(ty: &RecordType, values: Vec<Value>) -> Result<Self, DecodeError>;
}

/// A record type: a name, its shape and, for declared types, the Rust type
/// it stands for.
///
/// This is what `load` hands back as the constructor for the loaded records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordType {
    name: Arc<str>,
    shape: RecordShape,
    type_id: Option<TypeId>,
}

impl RecordType {
    /// The record type of a declared Rust type.
    pub fn of<R: Record>() -> Result<Self, SchemaError> {
        let declaration = R::declaration()
            .ok_or_else(|| SchemaError::Undeclared(std::any::type_name::<R>().to_string()))?;
        let shape = schema::extract::<R>()?;
        Ok(Self {
            name: Arc::from(declaration.name),
            shape,
            type_id: Some(TypeId::of::<R>()),
        })
    }

    /// A type with no Rust counterpart; its instances are [`GenericRecord`]s.
    pub fn generic(name: impl Into<String>, shape: RecordShape) -> Self {
        Self {
            name: Arc::from(name.into()),
            shape,
            type_id: None,
        }
    }

    /// Generic type named `name` whose attributes come from a stored header row.
    pub fn from_header(name: impl Into<String>, header: &[CellValue]) -> Result<Self, SchemaError> {
        Ok(Self::generic(name, RecordShape::from_header(header)?))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &RecordShape {
        &self.shape
    }

    pub fn is_generic(&self) -> bool {
        self.type_id.is_none()
    }

    /// Does this type stand for the Rust type `T`?
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == Some(TypeId::of::<T>())
    }

    pub(crate) fn with_shape(&self, shape: RecordShape) -> Self {
        Self {
            name: Arc::clone(&self.name),
            shape,
            type_id: self.type_id,
        }
    }

    /// Construct a generic instance, like calling a named-tuple constructor.
    pub fn make(&self, values: Vec<Value>) -> Result<GenericRecord, DecodeError> {
        GenericRecord::construct(self, values)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, name) in self.shape.names().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(name)?;
        }
        f.write_str(")")
    }
}

/// One `store` argument: a single instance or a collection expanded element-wise.
pub enum Storable<'a> {
    One(&'a dyn Instance),
    Many(Box<dyn Iterator<Item = &'a dyn Instance> + 'a>),
}

impl<'a> Storable<'a> {
    /// Expand any iterator of instances.
    pub fn many<T, I>(items: I) -> Self
    where
        T: Instance + 'a,
        I: IntoIterator<Item = &'a T>,
        I::IntoIter: 'a,
    {
        Storable::Many(Box::new(
            items.into_iter().map(|item| item as &'a dyn Instance),
        ))
    }
}

impl<'a> IntoIterator for Storable<'a> {
    type Item = &'a dyn Instance;
    type IntoIter = Box<dyn Iterator<Item = &'a dyn Instance> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        match self {
            Storable::One(item) => Box::new(std::iter::once(item)),
            Storable::Many(items) => items,
        }
    }
}

impl<'a, T: Instance> From<&'a T> for Storable<'a> {
    fn from(item: &'a T) -> Self {
        Storable::One(item)
    }
}

impl<'a, T: Instance> From<&'a [T]> for Storable<'a> {
    fn from(items: &'a [T]) -> Self {
        Storable::many(items)
    }
}

impl<'a, T: Instance> From<&'a Vec<T>> for Storable<'a> {
    fn from(items: &'a Vec<T>) -> Self {
        Storable::many(items)
    }
}

impl<'a, T: Instance, const N: usize> From<&'a [T; N]> for Storable<'a> {
    fn from(items: &'a [T; N]) -> Self {
        Storable::many(items)
    }
}
