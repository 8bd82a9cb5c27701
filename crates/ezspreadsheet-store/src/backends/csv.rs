use crate::error::StoreError;
use crate::format::TabularFormat;
use crate::traits::{Row, RowIter, RowStyle, StoreCaps, TabularReader, TabularWriter};
use ezspreadsheet_common::CellValue;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default)]
pub struct CsvReadOptions {
    /// Field delimiter as a single byte. `None` picks the format's own (`,` or tab).
    pub delimiter: Option<u8>,
    /// Strip surrounding whitespace from every field.
    pub trim: bool,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default)]
pub struct CsvWriteOptions {
    /// Field delimiter as a single byte. `None` picks the format's own (`,` or tab).
    pub delimiter: Option<u8>,
    /// End records with `\r\n` instead of `\n`.
    pub crlf: bool,
}

fn delimiter_for(format: TabularFormat, requested: Option<u8>) -> u8 {
    requested.unwrap_or(match format {
        TabularFormat::Tsv => b'\t',
        _ => b',',
    })
}

enum Sink {
    Open(csv::Writer<NamedTempFile>),
    /// Flushed to the temp file, waiting to replace the target.
    Pending(NamedTempFile),
    Saved,
}

/// Delimited-text writer.
///
/// Rows stream into a temp file next to the target; `save` renames it over
/// the target, so an abandoned writer leaves the target untouched.
pub struct CsvWriter {
    path: PathBuf,
    format: TabularFormat,
    sink: Sink,
    rows: u32,
}

impl CsvWriter {
    pub fn create(
        path: impl AsRef<Path>,
        format: TabularFormat,
        options: &CsvWriteOptions,
    ) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let tmp = NamedTempFile::new_in(&dir)?;

        let terminator = if options.crlf {
            csv::Terminator::CRLF
        } else {
            csv::Terminator::Any(b'\n')
        };
        let mut wb = csv::WriterBuilder::new();
        wb.delimiter(delimiter_for(format, options.delimiter))
            .terminator(terminator)
            .flexible(false);

        Ok(Self {
            path,
            format,
            sink: Sink::Open(wb.from_writer(tmp)),
            rows: 0,
        })
    }
}

impl TabularWriter for CsvWriter {
    fn format(&self) -> TabularFormat {
        self.format
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn capabilities(&self) -> StoreCaps {
        StoreCaps {
            styles: false,
            native_numbers: false,
            native_datetimes: false,
            atomic_save: true,
        }
    }

    fn write_row(&mut self, row: &[CellValue], _style: RowStyle) -> Result<(), StoreError> {
        let Sink::Open(wtr) = &mut self.sink else {
            return Err(StoreError::Backend {
                backend: "csv".to_string(),
                message: "writer already saved".to_string(),
            });
        };
        let record: Vec<String> = row.iter().map(cell_to_csv_field).collect();
        wtr.write_record(&record)
            .map_err(|e| StoreError::from_backend("csv", e))?;
        self.rows += 1;
        Ok(())
    }

    fn rows_written(&self) -> u32 {
        self.rows
    }

    fn save(&mut self) -> Result<(), StoreError> {
        let tmp = match std::mem::replace(&mut self.sink, Sink::Saved) {
            Sink::Open(wtr) => wtr.into_inner().map_err(|e| e.into_error())?,
            Sink::Pending(tmp) => tmp,
            Sink::Saved => return Ok(()),
        };
        match tmp.persist(&self.path) {
            Ok(_) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(path = %self.path.display(), rows = self.rows, "csv saved");
                Ok(())
            }
            Err(err) => {
                self.sink = Sink::Pending(err.file);
                Err(StoreError::from_save(&self.path, err.error))
            }
        }
    }
}

/// Delimited-text reader. Records are parsed lazily from the file.
///
/// Fields come back as text (or `Empty`); typing them is up to the caller,
/// which knows what each column holds.
pub struct CsvReader {
    format: TabularFormat,
    reader: csv::Reader<BufReader<File>>,
}

impl CsvReader {
    pub fn open(
        path: impl AsRef<Path>,
        format: TabularFormat,
        options: &CsvReadOptions,
    ) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StoreError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path)?;

        let mut rb = csv::ReaderBuilder::new();
        rb.delimiter(delimiter_for(format, options.delimiter))
            // The header is read as an ordinary record so it goes through the same iterator.
            .has_headers(false)
            // Allow ragged rows; the record decoder pads short ones.
            .flexible(true);
        if options.trim {
            rb.trim(csv::Trim::All);
        }

        Ok(Self {
            format,
            reader: rb.from_reader(BufReader::new(file)),
        })
    }
}

impl TabularReader for CsvReader {
    fn format(&self) -> TabularFormat {
        self.format
    }

    fn into_rows(self: Box<Self>) -> RowIter {
        Box::new(self.reader.into_records().map(|rec| {
            let rec = rec.map_err(|e| StoreError::from_backend("csv", e))?;
            Ok(rec.iter().map(text_cell).collect::<Row>())
        }))
    }
}

fn text_cell(field: &str) -> CellValue {
    if field.is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(field.to_string())
    }
}

fn cell_to_csv_field(v: &CellValue) -> String {
    match v {
        // Debug keeps the decimal point, so `2.0` is read back as a float.
        CellValue::Number(n) => format!("{n:?}"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(path: &Path, format: TabularFormat) -> Vec<Row> {
        let reader = CsvReader::open(path, format, &CsvReadOptions::default()).unwrap();
        Box::new(reader)
            .into_rows()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn fields_read_back_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.csv");
        let mut w = CsvWriter::create(&path, TabularFormat::Csv, &CsvWriteOptions::default())
            .unwrap();
        w.write_header(&["Name", "Age", "Weight"]).unwrap();
        w.write_row(
            &[CellValue::from("John Doe"), CellValue::Int(20), CellValue::Number(75.0)],
            RowStyle::Data,
        )
        .unwrap();
        assert_eq!(w.rows_written(), 2);
        w.save().unwrap();

        let rows = read_all(&path, TabularFormat::Csv);
        assert_eq!(
            rows[0],
            vec![
                CellValue::from("Name"),
                CellValue::from("Age"),
                CellValue::from("Weight")
            ]
        );
        assert_eq!(
            rows[1],
            vec![
                CellValue::from("John Doe"),
                CellValue::from("20"),
                CellValue::from("75.0")
            ]
        );
    }

    #[test]
    fn quoting_survives_commas_and_newlines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q.csv");
        let mut w = CsvWriter::create(&path, TabularFormat::Csv, &CsvWriteOptions::default())
            .unwrap();
        w.write_header(&["a"]).unwrap();
        w.write_row(&[CellValue::from("['x', 'y']")], RowStyle::Data)
            .unwrap();
        w.write_row(&[CellValue::from("line1\nline2")], RowStyle::Data)
            .unwrap();
        w.save().unwrap();

        let rows = read_all(&path, TabularFormat::Csv);
        assert_eq!(rows[1], vec![CellValue::from("['x', 'y']")]);
        assert_eq!(rows[2], vec![CellValue::from("line1\nline2")]);
    }

    #[test]
    fn number_like_text_is_not_retyped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contacts.csv");
        let fields = ["true", "1e3", "+5", "(555) 123-4567", "[draft] Kieran"];
        let mut w = CsvWriter::create(&path, TabularFormat::Csv, &CsvWriteOptions::default())
            .unwrap();
        let row: Row = fields.iter().map(|f| CellValue::from(*f)).collect();
        w.write_row(&row, RowStyle::Data).unwrap();
        w.save().unwrap();

        assert_eq!(read_all(&path, TabularFormat::Csv), vec![row]);
    }

    #[test]
    fn crlf_terminator() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("w.csv");
        let options = CsvWriteOptions {
            crlf: true,
            ..CsvWriteOptions::default()
        };
        let mut w = CsvWriter::create(&path, TabularFormat::Csv, &options).unwrap();
        w.write_header(&["a", "b"]).unwrap();
        w.save().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a,b\r\n");
    }

    #[test]
    fn tsv_uses_tab_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.tsv");
        let mut w = CsvWriter::create(&path, TabularFormat::Tsv, &CsvWriteOptions::default())
            .unwrap();
        w.write_header(&["a", "b"]).unwrap();
        w.save().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\tb\n");
    }

    #[test]
    fn abandoned_writer_leaves_target_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keep.csv");
        std::fs::write(&path, "old\n").unwrap();
        {
            let mut w =
                CsvWriter::create(&path, TabularFormat::Csv, &CsvWriteOptions::default())
                    .unwrap();
            w.write_header(&["new"]).unwrap();
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old\n");
        // Only the target remains; the temp file was cleaned up on drop.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn write_after_save_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("done.csv");
        let mut w = CsvWriter::create(&path, TabularFormat::Csv, &CsvWriteOptions::default())
            .unwrap();
        w.save().unwrap();
        w.save().unwrap();
        assert!(w.write_row(&[CellValue::Int(1)], RowStyle::Data).is_err());
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = CsvReader::open(
            dir.path().join("nope.csv"),
            TabularFormat::Csv,
            &CsvReadOptions::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
