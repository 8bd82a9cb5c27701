//! Typing of stored text when nothing better is known about a column.
//!
//! Backends hand text back untouched; callers that know a column's declared
//! kind decide whether to run it through [`infer_field`] at all.

use ezspreadsheet_common::{CellValue, DATETIME_FORMAT};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TypeInference {
    /// Everything non-empty stays text.
    Off,
    /// Booleans, integers and decimals in the forms this crate writes.
    Scalars,
    /// `Scalars`, plus date-times in [`DATETIME_FORMAT`].
    #[default]
    ScalarsAndDates,
}

/// Type one stored field. Only the canonical renderings are recognised, so
/// codes such as `007`, `+5` or `(555) 123` stay text.
pub fn infer_field(field: &str, mode: TypeInference) -> CellValue {
    if field.is_empty() {
        return CellValue::Empty;
    }
    if mode == TypeInference::Off {
        return CellValue::Text(field.to_string());
    }
    if let Some(b) = parse_bool(field) {
        return CellValue::Boolean(b);
    }
    if let Some(number) = parse_number(field) {
        return number;
    }
    if mode == TypeInference::ScalarsAndDates
        && let Some(dt) = parse_datetime(field)
    {
        return CellValue::DateTime(dt);
    }
    CellValue::Text(field.to_string())
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// `-?int`, `-?int.frac` and either followed by `e[+-]exp`; no leading zeros
/// on the integer part.
fn parse_number(s: &str) -> Option<CellValue> {
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((m, e)) => (m, Some(e.strip_prefix(['+', '-']).unwrap_or(e))),
        None => (unsigned, None),
    };
    let (whole, frac) = match mantissa.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (mantissa, None),
    };
    if !all_digits(whole) || (whole.len() > 1 && whole.starts_with('0')) {
        return None;
    }
    if frac.is_some_and(|f| !all_digits(f)) || exponent.is_some_and(|e| !all_digits(e)) {
        return None;
    }
    if frac.is_none() && exponent.is_none() {
        return s.parse().ok().map(CellValue::Int);
    }
    s.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(CellValue::Number)
}

pub fn parse_datetime(s: &str) -> Option<chrono::NaiveDateTime> {
    chrono::NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}
