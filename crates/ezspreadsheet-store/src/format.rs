use crate::backends::csv::{CsvReadOptions, CsvReader, CsvWriteOptions, CsvWriter};
use crate::backends::xlsx::{XlsxOptions, XlsxReader, XlsxWriter};
use crate::error::StoreError;
use crate::traits::{TabularReader, TabularWriter};
use std::fmt;
use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Backing formats, selected purely from a path's extension.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TabularFormat {
    Xlsx,
    Csv,
    Tsv,
}

impl TabularFormat {
    pub fn from_path(path: &Path) -> Result<Self, StoreError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("xlsx") => Ok(TabularFormat::Xlsx),
            Some("csv") => Ok(TabularFormat::Csv),
            Some("tsv") => Ok(TabularFormat::Tsv),
            _ => Err(StoreError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            TabularFormat::Xlsx => "xlsx",
            TabularFormat::Csv => "csv",
            TabularFormat::Tsv => "tsv",
        }
    }

    /// Separator placed after each bullet when containers are rendered readable.
    ///
    /// Spreadsheets wrap on newlines; delimited text keeps a bullet list on one
    /// visual line with tab separators.
    pub fn readable_line_end(self) -> &'static str {
        match self {
            TabularFormat::Xlsx => "\n",
            TabularFormat::Csv | TabularFormat::Tsv => " \t",
        }
    }
}

impl fmt::Display for TabularFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Per-backend options handed to the factory functions.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default)]
pub struct BackendOptions {
    pub csv_read: CsvReadOptions,
    pub csv_write: CsvWriteOptions,
    pub xlsx: XlsxOptions,
}

/// Resolve the on-disk path and format. A path with no extension is a workbook
/// and gets `.xlsx` appended.
pub fn resolve_path(path: impl AsRef<Path>) -> Result<(PathBuf, TabularFormat), StoreError> {
    let path = path.as_ref();
    if path.extension().is_none() {
        let mut with_ext = path.as_os_str().to_owned();
        with_ext.push(".xlsx");
        #[cfg(feature = "tracing")]
        tracing::debug!(path = %path.display(), "added .xlsx extension");
        return Ok((PathBuf::from(with_ext), TabularFormat::Xlsx));
    }
    let format = TabularFormat::from_path(path)?;
    Ok((path.to_path_buf(), format))
}

pub fn create_writer(
    path: &Path,
    format: TabularFormat,
    options: &BackendOptions,
) -> Result<Box<dyn TabularWriter>, StoreError> {
    Ok(match format {
        TabularFormat::Xlsx => Box::new(XlsxWriter::create(path, &options.xlsx)?),
        TabularFormat::Csv | TabularFormat::Tsv => {
            Box::new(CsvWriter::create(path, format, &options.csv_write)?)
        }
    })
}

pub fn open_reader(
    path: &Path,
    format: TabularFormat,
    options: &BackendOptions,
) -> Result<Box<dyn TabularReader>, StoreError> {
    Ok(match format {
        TabularFormat::Xlsx => Box::new(XlsxReader::open(path)?),
        TabularFormat::Csv | TabularFormat::Tsv => {
            Box::new(CsvReader::open(path, format, &options.csv_read)?)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_selects_format() {
        assert_eq!(
            TabularFormat::from_path(Path::new("animals.xlsx")).unwrap(),
            TabularFormat::Xlsx
        );
        assert_eq!(
            TabularFormat::from_path(Path::new("dir/Users.CSV")).unwrap(),
            TabularFormat::Csv
        );
        assert_eq!(
            TabularFormat::from_path(Path::new("t.tsv")).unwrap(),
            TabularFormat::Tsv
        );
        assert!(matches!(
            TabularFormat::from_path(Path::new("notes.txt")),
            Err(StoreError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn bare_name_becomes_workbook() {
        let (path, format) = resolve_path("animals").unwrap();
        assert_eq!(path, PathBuf::from("animals.xlsx"));
        assert_eq!(format, TabularFormat::Xlsx);
    }

    #[test]
    fn readable_line_end_depends_on_format() {
        assert_eq!(TabularFormat::Xlsx.readable_line_end(), "\n");
        assert_eq!(TabularFormat::Csv.readable_line_end(), " \t");
    }
}
