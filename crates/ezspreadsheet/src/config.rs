use ezspreadsheet_store::{BackendOptions, TypeInference};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Session settings. Everything has a working default.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub struct SpreadsheetConfig {
    /// Per-format read/write options (delimiters, heading style).
    pub backend: BackendOptions,
    /// How stored text is typed in columns whose kind is not declared.
    pub type_inference: TypeInference,
    /// Refine the field kinds of a header-built record type from the first data row.
    pub infer_schema: bool,
    /// Reject typed loads whose stored header differs from the bound attributes.
    pub validate_header: bool,
}

impl Default for SpreadsheetConfig {
    fn default() -> Self {
        Self {
            backend: BackendOptions::default(),
            type_inference: TypeInference::default(),
            infer_schema: true,
            validate_header: true,
        }
    }
}

impl SpreadsheetConfig {
    pub fn with_type_inference(mut self, mode: TypeInference) -> Self {
        self.type_inference = mode;
        self
    }

    /// Field delimiter for both reading and writing delimited text.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.backend.csv_read.delimiter = Some(delimiter);
        self.backend.csv_write.delimiter = Some(delimiter);
        self
    }

    pub fn with_heading_style(mut self, bold: bool, size: f64) -> Self {
        self.backend.xlsx.heading_bold = bold;
        self.backend.xlsx.heading_size = size;
        self
    }

    pub fn with_wrap_data(mut self, wrap: bool) -> Self {
        self.backend.xlsx.wrap_data = wrap;
        self
    }

    pub fn with_schema_inference(mut self, enabled: bool) -> Self {
        self.infer_schema = enabled;
        self
    }

    pub fn with_header_validation(mut self, enabled: bool) -> Self {
        self.validate_header = enabled;
        self
    }
}
