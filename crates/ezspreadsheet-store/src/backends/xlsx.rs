use crate::error::StoreError;
use crate::format::TabularFormat;
use crate::traits::{Row, RowIter, RowStyle, StoreCaps, TabularReader, TabularWriter};
use ezspreadsheet_common::{CellAddress, CellValue, DATETIME_FORMAT};
use std::path::{Path, PathBuf};
use umya_spreadsheet::{CellRawValue, Spreadsheet, Worksheet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Presentation applied to written workbooks.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub struct XlsxOptions {
    pub heading_bold: bool,
    pub heading_size: f64,
    /// Wrap text in every data cell so bullet-rendered values stay legible.
    pub wrap_data: bool,
}

impl Default for XlsxOptions {
    fn default() -> Self {
        Self {
            heading_bold: true,
            heading_size: 14.0,
            wrap_data: true,
        }
    }
}

/// Single-worksheet workbook writer backed by umya-spreadsheet.
///
/// Cells are held in memory and only reach disk through `save`.
pub struct XlsxWriter {
    path: PathBuf,
    book: Spreadsheet,
    sheet_name: String,
    options: XlsxOptions,
    rows: u32,
}

impl XlsxWriter {
    pub fn create(path: impl AsRef<Path>, options: &XlsxOptions) -> Result<Self, StoreError> {
        let book = umya_spreadsheet::new_file();
        let sheet_name = book
            .get_sheet(&0)
            .map(|ws| ws.get_name().to_string())
            .ok_or_else(|| StoreError::from_backend("xlsx", "new workbook has no worksheet"))?;
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            book,
            sheet_name,
            options: options.clone(),
            rows: 0,
        })
    }

    fn worksheet_mut(&mut self) -> Result<&mut Worksheet, StoreError> {
        self.book
            .get_sheet_by_name_mut(&self.sheet_name)
            .ok_or_else(|| StoreError::from_backend("xlsx", "worksheet missing"))
    }
}

impl TabularWriter for XlsxWriter {
    fn format(&self) -> TabularFormat {
        TabularFormat::Xlsx
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn capabilities(&self) -> StoreCaps {
        StoreCaps {
            styles: true,
            native_numbers: true,
            native_datetimes: false,
            atomic_save: false,
        }
    }

    fn write_row(&mut self, row: &[CellValue], style: RowStyle) -> Result<(), StoreError> {
        let row_num = self.rows + 1;
        let options = self.options.clone();
        let ws = self.worksheet_mut()?;
        for (col, value) in row.iter().enumerate() {
            let label = CellAddress::try_new(row_num, col as u32)?.to_string();
            #[cfg(feature = "tracing")]
            tracing::trace!(cell = %label, value = %value, "write cell");

            let cell = ws.get_cell_mut(label.as_str());
            match value {
                CellValue::Empty => {
                    cell.set_blank();
                }
                // `set_value` would re-type text that looks like a number or bool.
                CellValue::Text(s) => {
                    cell.set_value_string(s.clone());
                }
                CellValue::Int(i) => {
                    cell.set_value_number(*i as f64);
                }
                CellValue::Number(n) => {
                    cell.set_value_number(*n);
                }
                CellValue::Boolean(b) => {
                    cell.set_value_bool(*b);
                }
                CellValue::DateTime(dt) => {
                    cell.set_value_string(dt.format(DATETIME_FORMAT).to_string());
                }
            }

            let style_ref = ws.get_style_mut(label.as_str());
            match style {
                RowStyle::Heading => {
                    let font = style_ref.get_font_mut();
                    font.set_bold(options.heading_bold);
                    font.set_size(options.heading_size);
                }
                RowStyle::Data => {
                    if options.wrap_data {
                        style_ref.get_alignment_mut().set_wrap_text(true);
                    }
                }
            }
        }
        self.rows = row_num;
        Ok(())
    }

    fn rows_written(&self) -> u32 {
        self.rows
    }

    fn save(&mut self) -> Result<(), StoreError> {
        match umya_spreadsheet::writer::xlsx::write(&self.book, &self.path) {
            Ok(()) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(path = %self.path.display(), rows = self.rows, "xlsx saved");
                Ok(())
            }
            Err(umya_spreadsheet::XlsxError::Io(e)) => Err(StoreError::from_save(&self.path, e)),
            Err(e) => Err(StoreError::from_backend("xlsx", e)),
        }
    }
}

/// Reads the first worksheet of a workbook row by row.
pub struct XlsxReader {
    book: Spreadsheet,
}

impl XlsxReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StoreError::NotFound {
                path: path.to_path_buf(),
            });
        }
        // Full read (not lazy) so every worksheet is deserialized up front.
        let book = umya_spreadsheet::reader::xlsx::read(path).map_err(|e| match e {
            umya_spreadsheet::XlsxError::Io(io) => StoreError::Io(io),
            other => StoreError::from_backend("xlsx", other),
        })?;
        Ok(Self { book })
    }

    fn convert_cell(ws: &Worksheet, col: u32, row: u32) -> CellValue {
        // umya uses (col, row), both 1-based
        let Some(cell) = ws.get_cell((col, row)) else {
            return CellValue::Empty;
        };
        let cv = cell.get_cell_value();
        match cv.get_raw_value() {
            CellRawValue::Empty => CellValue::Empty,
            CellRawValue::Numeric(n) => numeric_cell(*n),
            CellRawValue::Bool(b) => CellValue::Boolean(*b),
            CellRawValue::String(s) => text_cell(&s.to_string()),
            CellRawValue::RichText(rt) => text_cell(&rt.get_text().to_string()),
            CellRawValue::Lazy(s) => {
                let txt: &str = s.as_ref();
                if let Ok(n) = txt.parse::<f64>() {
                    numeric_cell(n)
                } else if txt.eq_ignore_ascii_case("TRUE") {
                    CellValue::Boolean(true)
                } else if txt.eq_ignore_ascii_case("FALSE") {
                    CellValue::Boolean(false)
                } else {
                    text_cell(txt)
                }
            }
            CellRawValue::Error(_) => CellValue::Text(cv.get_value().to_string()),
        }
    }
}

/// Integral numbers come back as `Int`; the workbook does not record the difference.
fn numeric_cell(n: f64) -> CellValue {
    if n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
        CellValue::Int(n as i64)
    } else {
        CellValue::Number(n)
    }
}

/// String cells are returned as written; date-times are recovered by the
/// caller once it knows the column holds one.
fn text_cell(s: &str) -> CellValue {
    if s.is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(s.to_string())
    }
}

impl TabularReader for XlsxReader {
    fn format(&self) -> TabularFormat {
        TabularFormat::Xlsx
    }

    fn into_rows(self: Box<Self>) -> RowIter {
        let book = self.book;
        let Some((max_col, max_row)) = book
            .get_sheet(&0)
            .map(|ws| (ws.get_highest_column(), ws.get_highest_row()))
        else {
            return Box::new(std::iter::empty());
        };
        Box::new((1..=max_row).map(move |row| {
            let ws = book
                .get_sheet(&0)
                .ok_or_else(|| StoreError::from_backend("xlsx", "worksheet missing"))?;
            Ok((1..=max_col)
                .map(|col| Self::convert_cell(ws, col, row))
                .collect::<Row>())
        }))
    }
}
