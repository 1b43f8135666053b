//! Spreadsheet extraction using `calamine`.
//!
//! Every sheet is emitted in workbook order as a `--- Sheet: <name> ---` header
//! followed by the sheet's used range serialized as CSV. The used range spans
//! the first to the last non-empty cell, so rows and columns outside it are
//! never materialized.
//!
//! Supports .xlsx, .xlsm, .xlsb, .xls, and .ods; the container type is
//! detected from the bytes.

use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use chrono::Timelike;
use std::fmt::Write as FmtWrite;
use std::io::Cursor;

use crate::error::{BidscopeError, Result};

/// Extract all sheets of a workbook as sheet-headed CSV text.
pub fn extract_text(file_name: &str, bytes: &[u8]) -> Result<String> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| BidscopeError::decode(file_name, format!("Failed to parse spreadsheet: {}", e)))?;

    let sheet_names = workbook.sheet_names();
    tracing::debug!(file = file_name, sheet_count = sheet_names.len(), "Opened workbook");

    let mut result = String::new();
    for name in &sheet_names {
        let range = workbook.worksheet_range(name).map_err(|e| {
            BidscopeError::decode(file_name, format!("Failed to read sheet '{}': {}", name, e))
        })?;

        write!(result, "--- Sheet: {} ---\n\n", name).map_err(fmt_error)?;
        result.push_str(&range_to_csv(&range).map_err(fmt_error)?);
        result.push_str("\n\n");
    }

    Ok(result)
}

/// Serialize a sheet's used range as CSV rows joined by `\n`.
pub fn range_to_csv(range: &Range<Data>) -> std::result::Result<String, std::fmt::Error> {
    let (Some((first_row, first_col)), Some((last_row, last_col))) = (range.start(), range.end()) else {
        return Ok(String::new());
    };

    let mut csv = String::new();
    let mut cell = String::new();

    for row in first_row..=last_row {
        if row > first_row {
            csv.push('\n');
        }
        for col in first_col..=last_col {
            if col > first_col {
                csv.push(',');
            }
            cell.clear();
            if let Some(value) = range.get_value((row, col)) {
                format_cell_value_into(&mut cell, value)?;
            }
            push_csv_field(&mut csv, &cell);
        }
    }

    Ok(csv)
}

/// Append one CSV field, quoting it when it contains a comma, quote, or line break.
pub fn push_csv_field(buffer: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        buffer.push('"');
        for ch in field.chars() {
            if ch == '"' {
                buffer.push('"');
            }
            buffer.push(ch);
        }
        buffer.push('"');
    } else {
        buffer.push_str(field);
    }
}

#[inline]
fn format_cell_value_into(buffer: &mut String, data: &Data) -> std::fmt::Result {
    match data {
        Data::Empty => {}
        Data::String(s) => buffer.push_str(s),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                write!(buffer, "{}", *f as i64)?;
            } else {
                write!(buffer, "{}", f)?;
            }
        }
        Data::Int(i) => write!(buffer, "{}", i)?,
        Data::Bool(b) => buffer.push_str(if *b { "TRUE" } else { "FALSE" }),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) if datetime.hour() == 0 && datetime.minute() == 0 && datetime.second() == 0 => {
                write!(buffer, "{}", datetime.format("%Y-%m-%d"))?;
            }
            Some(datetime) => write!(buffer, "{}", datetime.format("%Y-%m-%d %H:%M:%S"))?,
            None => write!(buffer, "{}", dt.as_f64())?,
        },
        Data::Error(e) => write!(buffer, "{}", e)?,
        Data::DateTimeIso(s) | Data::DurationIso(s) => buffer.push_str(s),
    }
    Ok(())
}

fn fmt_error(err: std::fmt::Error) -> BidscopeError {
    BidscopeError::Other(format!("Failed to format sheet text: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn csv_field(field: &str) -> String {
        let mut out = String::new();
        push_csv_field(&mut out, field);
        out
    }

    #[test]
    fn test_csv_field_plain() {
        assert_eq!(csv_field("Exam table"), "Exam table");
        assert_eq!(csv_field(""), "");
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("Gloves, nitrile"), "\"Gloves, nitrile\"");
        assert_eq!(csv_field("12\" monitor"), "\"12\"\" monitor\"");
        assert_eq!(csv_field("line one\nline two"), "\"line one\nline two\"");
    }

    #[test]
    fn test_range_to_csv_walks_used_range_only() {
        let mut range = Range::new((2, 1), (3, 2));
        range.set_value((2, 1), Data::String("Item".to_string()));
        range.set_value((2, 2), Data::String("Qty".to_string()));
        range.set_value((3, 1), Data::String("Sterilizer, tabletop".to_string()));
        range.set_value((3, 2), Data::Float(2.0));

        assert_eq!(range_to_csv(&range).unwrap(), "Item,Qty\n\"Sterilizer, tabletop\",2");
    }

    #[test]
    fn test_range_to_csv_single_far_cell() {
        let mut range = Range::new((1_048_575, 16_383), (1_048_575, 16_383));
        range.set_value((1_048_575, 16_383), Data::String("Far".to_string()));
        assert_eq!(range_to_csv(&range).unwrap(), "Far");
    }

    #[test]
    fn test_range_to_csv_value_types() {
        let mut range = Range::new((0, 0), (0, 3));
        range.set_value((0, 0), Data::Int(7));
        range.set_value((0, 1), Data::Float(2.5));
        range.set_value((0, 2), Data::Bool(true));
        range.set_value((0, 3), Data::Empty);

        assert_eq!(range_to_csv(&range).unwrap(), "7,2.5,TRUE,");
    }

    #[test]
    fn test_range_to_csv_empty_sheet() {
        let range: Range<Data> = Range::empty();
        assert_eq!(range_to_csv(&range).unwrap(), "");
    }

    #[test]
    fn test_extract_text_invalid_bytes() {
        let err = extract_text("prices.xlsx", b"definitely not a workbook").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }
}
