pub mod backends;
pub mod error;
pub mod format;
pub mod infer;
pub mod traits;

pub use backends::csv::{CsvReadOptions, CsvReader, CsvWriteOptions, CsvWriter};
pub use backends::xlsx::{XlsxOptions, XlsxReader, XlsxWriter};
pub use error::StoreError;
pub use format::{BackendOptions, TabularFormat, create_writer, open_reader, resolve_path};
pub use infer::TypeInference;
pub use traits::{Row, RowIter, RowStyle, StoreCaps, TabularReader, TabularWriter};

// Re-export for convenience
pub use ezspreadsheet_common::CellValue;
