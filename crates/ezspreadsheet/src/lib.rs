//! Store records in `.xlsx`, `.csv` or `.tsv` files and load them back.
//!
//! A record type declares its attributes with `#[derive(Record)]`; every
//! attribute becomes a column, in declaration order, under a header row of
//! attribute names. Containers (`Vec`, tuples, maps) are written either in a
//! literal bracket syntax that loads back into a container, or, with
//! [`StoreOptions::readable`], as a bulleted list meant for people.
//!
//! ```no_run
//! use ezspreadsheet::{Record, Spreadsheet, StoreOptions};
//!
//! #[derive(Record)]
//! struct User {
//!     name: String,
//!     age: i64,
//!     family: Vec<String>,
//! }
//!
//! let users = vec![User {
//!     name: "Kieran".into(),
//!     age: 21,
//!     family: vec!["Abby".into(), "Mike".into(), "Janice".into()],
//! }];
//!
//! Spreadsheet::<User>::bind("users.csv")?
//!     .scoped(|sheet| sheet.store([&users], StoreOptions::default()))?;
//!
//! let (_, loaded) = Spreadsheet::<User>::bind("users.csv")?.load("User")?;
//! assert_eq!(loaded[0].family, ["Abby", "Mike", "Janice"]);
//! # Ok::<(), ezspreadsheet::Error>(())
//! ```
//!
//! Records are limited to [`MAX_ATTRIBUTES`] attributes.

// Lets `#[derive(Record)]` expand to `::ezspreadsheet::...` inside this crate too.
extern crate self as ezspreadsheet;

pub mod codec;
pub mod config;
pub mod convert;
pub mod error;
pub mod generic;
pub mod record;
pub mod retry;
pub mod schema;
pub mod session;

pub use codec::{FieldCursor, ValueCodec};
pub use config::SpreadsheetConfig;
pub use convert::{FromValue, ToValue};
pub use error::{CoerceError, DecodeError, Error, Result, SchemaError};
pub use generic::GenericRecord;
pub use record::{Instance, Record, RecordType, Storable};
pub use retry::{RetryDecision, prompt_on_terminal};
pub use schema::{Declaration, FieldDescriptor, MAX_ATTRIBUTES, RecordShape, extract};
pub use session::{Records, Spreadsheet, StoreOptions};

pub use ezspreadsheet_macros::Record;

pub use ezspreadsheet_common::{CellValue, Value, ValueKind, column_label};
pub use ezspreadsheet_store::{
    BackendOptions, CsvReadOptions, CsvWriteOptions, StoreError, TabularFormat, TypeInference,
    XlsxOptions,
};
