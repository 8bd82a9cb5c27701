use crate::error::StoreError;
use crate::format::TabularFormat;
use ezspreadsheet_common::CellValue;
use std::path::Path;

/// One stored row, left to right.
pub type Row = Vec<CellValue>;

/// Lazily produced rows, header first. Owns whatever backs it.
pub type RowIter = Box<dyn Iterator<Item = Result<Row, StoreError>>>;

/// Presentation hint attached to a written row. Backends without a styling
/// concept accept and ignore it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowStyle {
    Heading,
    Data,
}

#[derive(Clone, Debug, Default)]
pub struct StoreCaps {
    pub styles: bool,
    pub native_numbers: bool,
    pub native_datetimes: bool,
    pub atomic_save: bool,
}

pub trait TabularWriter {
    fn format(&self) -> TabularFormat;
    fn path(&self) -> &Path;
    fn capabilities(&self) -> StoreCaps;

    /// Append a row below the last written one.
    fn write_row(&mut self, row: &[CellValue], style: RowStyle) -> Result<(), StoreError>;

    fn write_header(&mut self, names: &[&str]) -> Result<(), StoreError> {
        let row: Row = names.iter().map(|n| CellValue::from(*n)).collect();
        self.write_row(&row, RowStyle::Heading)
    }

    /// Rows written so far, header included.
    fn rows_written(&self) -> u32;

    /// Persist everything written to the target path.
    ///
    /// A `StoreError::Locked` leaves the writer intact so the call can be retried.
    fn save(&mut self) -> Result<(), StoreError>;
}

pub trait TabularReader {
    fn format(&self) -> TabularFormat;

    /// Every stored row in order, starting with the header.
    fn into_rows(self: Box<Self>) -> RowIter;
}
