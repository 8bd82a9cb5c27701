pub mod csv;
pub mod xlsx;

pub use self::csv::{CsvReader, CsvWriter};
pub use self::xlsx::{XlsxReader, XlsxWriter};
