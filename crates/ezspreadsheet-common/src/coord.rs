//! A1-style cell addressing shared by the spreadsheet backend and callers.
//!
//! Columns are 0-based internally and rendered as letters (`0 -> A`,
//! `25 -> Z`, `26 -> AA`); rows are 1-based to match what a spreadsheet
//! shows. Row 1 is always the heading row of a stored table.

use core::fmt;

/// Excel's column limit (`XFD`).
pub const MAX_COLUMNS: u32 = 16_384;

/// Errors returned when constructing addresses from unchecked inputs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CoordError {
    ZeroRow,
    ColOverflow(u32),
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::ZeroRow => write!(f, "rows are 1-based"),
            CoordError::ColOverflow(col) => {
                write!(f, "col {col} exceeds {MAX}", MAX = MAX_COLUMNS - 1)
            }
        }
    }
}

impl std::error::Error for CoordError {}

/// Absolute cell position: 1-based row, 0-based column.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    row: u32,
    col: u32,
}

impl CellAddress {
    pub fn try_new(row: u32, col: u32) -> Result<Self, CoordError> {
        if row == 0 {
            return Err(CoordError::ZeroRow);
        }
        if col >= MAX_COLUMNS {
            return Err(CoordError::ColOverflow(col));
        }
        Ok(Self { row, col })
    }

    #[inline(always)]
    pub fn row(self) -> u32 {
        self.row
    }

    #[inline(always)]
    pub fn col(self) -> u32 {
        self.col
    }

    /// Parse `"B7"` style labels. Lowercase letters are rejected.
    pub fn parse(label: &str) -> Option<Self> {
        let split = label.find(|c: char| c.is_ascii_digit())?;
        let (letters, digits) = label.split_at(split);
        let col = column_index(letters)?;
        let row: u32 = digits.parse().ok()?;
        Self::try_new(row, col).ok()
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_label(self.col), self.row)
    }
}

/// Letters for a 0-based column index.
pub fn column_label(mut col: u32) -> String {
    let mut buf = Vec::new();
    loop {
        let rem = (col % 26) as u8;
        buf.push(b'A' + rem);
        col /= 26;
        if col == 0 {
            break;
        }
        col -= 1;
    }
    buf.reverse();
    buf.into_iter().map(char::from).collect()
}

/// 0-based column index for a run of uppercase letters.
pub fn column_index(s: &str) -> Option<u32> {
    if s.is_empty() {
        return None;
    }
    let mut col: u32 = 0;
    for (idx, ch) in s.bytes().enumerate() {
        if !ch.is_ascii_uppercase() {
            return None;
        }
        let val = (ch - b'A') as u32;
        col = col.checked_mul(26)?;
        col = col.checked_add(val)?;
        if idx != s.len() - 1 {
            col = col.checked_add(1)?;
        }
    }
    Some(col)
}

/// `A1` label for a 1-based row and 0-based column.
pub fn cell_label(row: u32, col: u32) -> String {
    format!("{}{row}", column_label(col))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_roll_over_past_z() {
        assert_eq!(column_label(0), "A");
        assert_eq!(column_label(25), "Z");
        assert_eq!(column_label(26), "AA");
        assert_eq!(column_label(27), "AB");
        assert_eq!(column_label(51), "AZ");
        assert_eq!(column_label(52), "BA");
        assert_eq!(column_label(701), "ZZ");
        assert_eq!(column_label(702), "AAA");
    }

    #[test]
    fn every_label_up_to_the_attribute_ceiling_roundtrips() {
        for col in 0..=51 {
            let label = column_label(col);
            assert_eq!(column_index(&label), Some(col), "label {label}");
        }
    }

    #[test]
    fn index_rejects_lowercase_and_empty() {
        assert!(column_index("a").is_none());
        assert!(column_index("").is_none());
        assert!(column_index("A1").is_none());
    }

    #[test]
    fn address_display_and_parse() {
        let addr = CellAddress::try_new(2, 27).unwrap();
        assert_eq!(addr.to_string(), "AB2");
        assert_eq!(CellAddress::parse("AB2"), Some(addr));
        assert_eq!(cell_label(1, 0), "A1");
        assert!(CellAddress::parse("A0").is_none());
        assert_eq!(CellAddress::try_new(0, 0), Err(CoordError::ZeroRow));
    }
}
