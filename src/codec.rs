//! Record codec: raw fixed-length byte blocks to/from typed records.

use chrono::{Datelike, NaiveDate};
use encoding_rs::Encoding;

use crate::config::{ACTIVE_MARKER, DELETION_MARKER, END_OF_FILE_MARK};
use crate::error::{DbfError, DbfResult};
use crate::field::{DbfField, FieldType};
use crate::record::{DbfRecord, Value};

/// Decode one raw record block into a typed record.
///
/// Byte 0 is the deletion marker. Each field is sliced at its descriptor
/// offset and converted per its logical type; malformed field content yields
/// a null or default value rather than failing the whole record.
pub fn decode_record(raw: &[u8], fields: &[DbfField], encoding: &'static Encoding) -> DbfRecord {
    let mut record = DbfRecord::template(fields.to_vec());
    record.set_deleted(raw.first().copied() == Some(DELETION_MARKER));

    for (i, field) in fields.iter().enumerate() {
        let start = field.offset();
        let end = start + field.length();
        let slice = raw.get(start..end).unwrap_or(&[]);

        let value = match field.field_type() {
            FieldType::Character => decode_text(slice, encoding),
            FieldType::Date => Value::Date(decode_date(slice)),
            FieldType::FloatingPoint | FieldType::Number => Value::Number(decode_number(slice)),
            FieldType::Logical => Value::Boolean(decode_logical(slice)),
            FieldType::Unknown => Value::Null,
        };
        record.set_value(i, value);
    }

    record
}

/// Encode a typed record into one raw record block.
///
/// The record's field schema must be identical, position by position, to the
/// table's own schema; any divergence fails with
/// [`DbfError::SchemaMismatch`] instead of silently truncating or
/// reinterpreting. `append_eof_mark` appends the legacy end-of-file byte and
/// is used on append only, never on in-place update.
pub fn encode_record(
    record: &DbfRecord,
    table_fields: &[DbfField],
    encoding: &'static Encoding,
    append_eof_mark: bool,
) -> DbfResult<Vec<u8>> {
    let mut out = Vec::with_capacity(record_byte_length(table_fields) + 1);
    out.push(if record.is_deleted() {
        DELETION_MARKER
    } else {
        ACTIVE_MARKER
    });

    for (i, field) in table_fields.iter().enumerate() {
        match record.field(i) {
            Some(f) if f == field => {}
            Some(f) => {
                return Err(DbfError::SchemaMismatch {
                    index: i,
                    details: format!("record field '{}' differs from table field '{}'", f.name(), field.name()),
                });
            }
            None => {
                return Err(DbfError::SchemaMismatch {
                    index: i,
                    details: format!("record has no field at position {}", i),
                });
            }
        }

        let value = record.value(i).unwrap_or(&Value::Null);
        match field.field_type() {
            FieldType::Character => encode_text(&mut out, value, field, encoding, i)?,
            FieldType::Date => encode_date(&mut out, value, field, i)?,
            FieldType::FloatingPoint | FieldType::Number => {
                encode_number(&mut out, value, field, i)?
            }
            FieldType::Logical => encode_logical(&mut out, value, field, i)?,
            FieldType::Unknown => out.extend(std::iter::repeat(b' ').take(field.length())),
        }
    }

    if append_eof_mark {
        out.push(END_OF_FILE_MARK);
    }

    Ok(out)
}

/// Record byte length implied by a schema: one marker byte plus field bytes.
pub fn record_byte_length(fields: &[DbfField]) -> usize {
    1 + fields.iter().map(DbfField::length).sum::<usize>()
}

fn decode_text(slice: &[u8], encoding: &'static Encoding) -> Value {
    let (text, _, _) = encoding.decode(slice);
    let trimmed = text.trim_end_matches([' ', '\0']);
    Value::Text(trimmed.to_string())
}

fn decode_date(slice: &[u8]) -> Option<NaiveDate> {
    fn part(slice: &[u8], range: std::ops::Range<usize>) -> Option<u32> {
        let s = std::str::from_utf8(slice.get(range)?).ok()?;
        s.trim().parse().ok()
    }
    let year = part(slice, 0..4)?;
    let month = part(slice, 4..6)?;
    let day = part(slice, 6..8)?;
    NaiveDate::from_ymd_opt(year as i32, month, day)
}

fn decode_number(slice: &[u8]) -> f64 {
    // Unparseable numeric content decodes to 0.0, never to a failure.
    std::str::from_utf8(slice)
        .ok()
        .map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn decode_logical(slice: &[u8]) -> bool {
    let upper: Vec<u8> = slice.iter().map(u8::to_ascii_uppercase).collect();
    upper == b"T" || upper == b"Y"
}

fn encode_text(
    out: &mut Vec<u8>,
    value: &Value,
    field: &DbfField,
    encoding: &'static Encoding,
    index: usize,
) -> DbfResult<()> {
    let text = match value {
        Value::Text(s) => s.as_str(),
        Value::Null => "",
        other => return value_mismatch(index, field, other),
    };
    let (bytes, _, _) = encoding.encode(text);
    push_left_justified(out, &bytes, field.length());
    Ok(())
}

fn encode_date(out: &mut Vec<u8>, value: &Value, field: &DbfField, index: usize) -> DbfResult<()> {
    let formatted = match value {
        Value::Date(Some(date)) => {
            format!("{:04}{:02}{:02}", date.year(), date.month(), date.day())
        }
        Value::Date(None) | Value::Null => String::new(),
        other => return value_mismatch(index, field, other),
    };
    push_left_justified(out, formatted.as_bytes(), field.length());
    Ok(())
}

fn encode_number(
    out: &mut Vec<u8>,
    value: &Value,
    field: &DbfField,
    index: usize,
) -> DbfResult<()> {
    let number = match value {
        Value::Number(n) => *n,
        Value::Null => 0.0,
        other => return value_mismatch(index, field, other),
    };
    let formatted = format!("{:.*}", field.precision(), number);
    push_right_justified(out, formatted.as_bytes(), field.length());
    Ok(())
}

fn encode_logical(
    out: &mut Vec<u8>,
    value: &Value,
    field: &DbfField,
    index: usize,
) -> DbfResult<()> {
    let flag = match value {
        Value::Boolean(b) => *b,
        Value::Null => false,
        other => return value_mismatch(index, field, other),
    };
    out.push(if flag { b'T' } else { b'F' });
    Ok(())
}

fn value_mismatch(index: usize, field: &DbfField, value: &Value) -> DbfResult<()> {
    Err(DbfError::SchemaMismatch {
        index,
        details: format!(
            "value {:?} does not match {:?} field '{}'",
            value,
            field.field_type(),
            field.name()
        ),
    })
}

fn push_left_justified(out: &mut Vec<u8>, bytes: &[u8], width: usize) {
    let take = bytes.len().min(width);
    out.extend_from_slice(&bytes[..take]);
    out.extend(std::iter::repeat(b' ').take(width - take));
}

fn push_right_justified(out: &mut Vec<u8>, bytes: &[u8], width: usize) {
    if bytes.len() >= width {
        out.extend_from_slice(&bytes[..width]);
    } else {
        out.extend(std::iter::repeat(b' ').take(width - bytes.len()));
        out.extend_from_slice(bytes);
    }
}
