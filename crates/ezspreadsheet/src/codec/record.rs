use ezspreadsheet_common::{CellValue, Value};

use super::value::ValueCodec;
use crate::convert::FromValue;
use crate::error::{DecodeError, Error};
use crate::record::{Instance, Record, RecordType};
use crate::schema::RecordShape;

/// Header cells for `shape`, one attribute name per column.
pub fn header_row(shape: &RecordShape) -> Vec<CellValue> {
    shape.names().map(CellValue::from).collect()
}

/// Encode one instance as a data row.
///
/// The type check runs before any attribute is read.
pub fn encode_record(
    instance: &dyn Instance,
    ty: &RecordType,
    codec: &ValueCodec,
) -> Result<Vec<CellValue>, Error> {
    if !instance.matches(ty) {
        return Err(Error::TypeMismatch {
            expected: ty.name().to_string(),
            found: instance.type_name().to_string(),
        });
    }
    Ok(instance
        .values()
        .iter()
        .map(|value| codec.encode(value))
        .collect())
}

/// Decode the cells of a data row into one value per field of `shape`, each
/// according to the field's kind.
///
/// Missing trailing cells become `Empty`; extra cells must be blank.
pub fn decode_cells(
    row: Vec<CellValue>,
    shape: &RecordShape,
    codec: &ValueCodec,
) -> Result<Vec<Value>, DecodeError> {
    let width = shape.len();
    let found = row.iter().rposition(|c| !c.is_empty()).map_or(0, |i| i + 1);
    if found > width {
        return Err(DecodeError::RowWidth {
            expected: width,
            found,
        });
    }
    let mut values: Vec<Value> = row
        .into_iter()
        .zip(shape.fields())
        .map(|(cell, field)| codec.decode_as(cell, field.kind))
        .collect();
    values.resize(width, Value::Empty);
    Ok(values)
}

pub fn decode_row<R: Record>(
    row: Vec<CellValue>,
    ty: &RecordType,
    codec: &ValueCodec,
) -> Result<R, DecodeError> {
    let values = decode_cells(row, ty.shape(), codec)?;
    R::construct(ty, values)
}

/// Hands decoded values to a record's fields in column order, naming the
/// field in any coercion error.
pub struct FieldCursor<'a> {
    ty: &'a RecordType,
    values: std::vec::IntoIter<Value>,
    index: usize,
}

impl<'a> FieldCursor<'a> {
    pub fn new(ty: &'a RecordType, values: Vec<Value>) -> Result<Self, DecodeError> {
        if values.len() != ty.shape().len() {
            return Err(DecodeError::RowWidth {
                expected: ty.shape().len(),
                found: values.len(),
            });
        }
        Ok(Self {
            ty,
            values: values.into_iter(),
            index: 0,
        })
    }

    pub fn field<T: FromValue>(&mut self) -> Result<T, DecodeError> {
        let name = self
            .ty
            .shape()
            .field(self.index)
            .map(|f| f.name.clone())
            .unwrap_or_else(|| format!("#{}", self.index));
        self.index += 1;
        let value = self
            .values
            .next()
            .ok_or_else(|| DecodeError::Missing { field: name.clone() })?;
        T::from_value(value).map_err(|source| DecodeError::Coerce {
            field: name,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Record;
    use crate::generic::GenericRecord;
    use ezspreadsheet_store::TabularFormat;

    #[derive(Record, Debug, PartialEq)]
    struct Animal {
        name: String,
        conservation_status: String,
    }

    #[derive(Record, Debug, PartialEq)]
    struct User {
        name: String,
        age: i64,
        family: Vec<String>,
    }

    #[test]
    fn encode_reads_attributes_in_declaration_order() {
        let ty = RecordType::of::<Animal>().unwrap();
        let gecko = Animal {
            name: "Leopard Gecko".into(),
            conservation_status: "Least Concern".into(),
        };
        assert_eq!(
            header_row(ty.shape()),
            vec![CellValue::from("name"), CellValue::from("conservation_status")]
        );
        assert_eq!(
            encode_record(&gecko, &ty, &ValueCodec::default()).unwrap(),
            vec![CellValue::from("Leopard Gecko"), CellValue::from("Least Concern")]
        );
    }

    #[test]
    fn foreign_instances_are_rejected_before_reading() {
        let ty = RecordType::of::<Animal>().unwrap();
        let user = User {
            name: "Kieran".into(),
            age: 21,
            family: vec![],
        };
        let err = encode_record(&user, &ty, &ValueCodec::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch { ref expected, ref found } if expected == "Animal" && found == "User"
        ));
    }

    #[test]
    fn scalar_and_list_attributes_round_trip() {
        let ty = RecordType::of::<User>().unwrap();
        let codec = ValueCodec::for_format(TabularFormat::Csv, false);
        let user = User {
            name: "Kieran".into(),
            age: 21,
            family: vec!["Abby".into(), "Mike".into(), "Janice".into()],
        };
        let row = encode_record(&user, &ty, &codec).unwrap();
        assert_eq!(row[2], CellValue::from("['Abby', 'Mike', 'Janice']"));
        let back: User = decode_row(row, &ty, &codec).unwrap();
        assert_eq!(back, user);
    }

    #[derive(Record, Debug, PartialEq)]
    struct Contact {
        name: String,
        phone: String,
        calls: u32,
    }

    #[test]
    fn text_attributes_are_not_reinterpreted() {
        let ty = RecordType::of::<Contact>().unwrap();
        let codec = ValueCodec::for_format(TabularFormat::Csv, false);
        let row = vec![
            CellValue::from("[draft] Kieran"),
            CellValue::from("(555) 123-4567"),
            CellValue::from("3"),
        ];
        let contact: Contact = decode_row(row, &ty, &codec).unwrap();
        assert_eq!(
            contact,
            Contact {
                name: "[draft] Kieran".into(),
                phone: "(555) 123-4567".into(),
                calls: 3,
            }
        );

        let row = vec![CellValue::from("true"), CellValue::from("1e3"), CellValue::Int(0)];
        let contact: Contact = decode_row(row, &ty, &codec).unwrap();
        assert_eq!((contact.name.as_str(), contact.phone.as_str()), ("true", "1e3"));
    }

    #[test]
    fn short_rows_are_padded_and_wide_rows_rejected() {
        let ty = RecordType::of::<Animal>().unwrap();
        let codec = ValueCodec::default();
        let animal: Animal = decode_row(vec![CellValue::from("Gecko")], &ty, &codec).unwrap();
        assert_eq!(animal.conservation_status, "");

        let wide = vec![
            CellValue::from("a"),
            CellValue::from("b"),
            CellValue::from("c"),
        ];
        assert_eq!(
            decode_row::<Animal>(wide, &ty, &codec).unwrap_err(),
            DecodeError::RowWidth {
                expected: 2,
                found: 3
            }
        );

        let trailing_blank = vec![CellValue::from("a"), CellValue::from("b"), CellValue::Empty];
        assert!(decode_row::<Animal>(trailing_blank, &ty, &codec).is_ok());
    }

    #[test]
    fn coercion_errors_name_the_field() {
        let ty = RecordType::of::<User>().unwrap();
        let row = vec![
            CellValue::from("Kieran"),
            CellValue::from("twenty"),
            CellValue::from("[]"),
        ];
        let err = decode_row::<User>(row, &ty, &ValueCodec::default()).unwrap_err();
        assert!(matches!(err, DecodeError::Coerce { ref field, .. } if field == "age"));
    }

    #[test]
    fn generic_rows_keep_decoded_values() {
        let header = [CellValue::from("name"), CellValue::from("family")];
        let ty = RecordType::from_header("User", &header).unwrap();
        let row = vec![CellValue::from("Kieran"), CellValue::from("('Abby',)")];
        let record: GenericRecord = decode_row(row, &ty, &ValueCodec::default()).unwrap();
        assert_eq!(
            record.get("family"),
            Some(&Value::Tuple(vec![Value::from("Abby")]))
        );
    }
}
