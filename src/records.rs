//! CSV boundary: raw eight-column rows in, records out, and back again.

use crate::domain::{Overflow, TransactionRecord};
use csv::StringRecord;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::Serialize;
use std::io::{Read, Write};
use std::str::FromStr;
use txaudit_derive::CsvSchema;

/// Positional fields every imported row must carry
pub const FIELD_COUNT: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    InputFormat(#[from] InputFormatError),
    #[error("line {line}: {source}")]
    Overflow { line: u64, source: Overflow },
}

/// A numeric column that could not be parsed, or not without rounding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {column} {value:?} is not a valid {expected}")]
pub struct InputFormatError {
    pub line: u64,
    pub column: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// Column description produced by `#[derive(CsvSchema)]`
#[derive(Debug)]
pub struct CsvField {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}

/// Which columns an export carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    /// The eight import columns
    #[default]
    Core,
    /// Import columns plus profit and validity
    WithDerived,
}

/// Transaction row as it appears in a CSV file
#[derive(Debug, Clone, Serialize, JsonSchema, CsvSchema)]
pub struct RecordRow<'a> {
    /// Bill the line belongs to, need not be unique
    #[serde(rename = "Bill Number")]
    pub bill_number: &'a str,
    /// Letters, digits and underscore only
    #[serde(rename = "Item Code")]
    pub item_code: &'a str,
    /// Cost price per unit (decimal)
    #[serde(rename = "Internal Price")]
    #[schemars(with = "String")]
    pub internal_price: Decimal,
    /// Discount per unit (decimal)
    #[serde(rename = "Discount")]
    #[schemars(with = "String")]
    pub discount: Decimal,
    /// Sale price per unit (decimal, must not be negative)
    #[serde(rename = "Sale Price")]
    #[schemars(with = "String")]
    pub sale_price: Decimal,
    /// Units sold (non-negative integer)
    #[serde(rename = "Quantity")]
    pub quantity: u32,
    /// Sale minus discount, times quantity; recomputed on import
    #[serde(rename = "Line Total")]
    #[schemars(with = "String")]
    pub line_total: Decimal,
    /// Letter, digit and '.' count of the first seven columns
    #[serde(rename = "Checksum")]
    pub checksum: i64,
    /// Line total minus internal price times quantity (export only)
    #[serde(rename = "Profit", skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub profit: Option<Decimal>,
    /// Whether the record passed validation (export only)
    #[serde(rename = "Valid", skip_serializing_if = "Option::is_none")]
    pub valid: Option<bool>,
}

impl<'a> RecordRow<'a> {
    pub fn project(record: &'a TransactionRecord, projection: Projection) -> Self {
        let derived = projection == Projection::WithDerived;
        RecordRow {
            bill_number: record.bill_number(),
            item_code: record.item_code(),
            internal_price: record.internal_price(),
            discount: record.discount(),
            sale_price: record.sale_price(),
            quantity: record.quantity(),
            line_total: record.line_total(),
            checksum: record.checksum(),
            profit: derived.then(|| record.profit()),
            valid: derived.then(|| record.is_valid()),
        }
    }
}

/// Read transaction rows from CSV.
///
/// The first line is a header and is always skipped. Rows with fewer than
/// eight fields are dropped, extra trailing fields are ignored.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<TransactionRecord>, ImportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut skipped = 0;
    for row in rdr.records() {
        let row = row?;
        let line = row.position().map_or(0, |p| p.line());
        if row.len() < FIELD_COUNT {
            log::debug!(
                "Skipping line {}: {} of {} fields",
                line,
                row.len(),
                FIELD_COUNT
            );
            skipped += 1;
            continue;
        }

        let record = parse_row(&row, line)?;
        if !record.is_valid() {
            log::debug!(
                "Line {} (bill {}) failed validation",
                line,
                record.bill_number()
            );
        }
        records.push(record);
    }

    let valid = records.iter().filter(|r| r.is_valid()).count();
    log::info!(
        "Imported {} records ({} valid, {} invalid, {} short rows skipped)",
        records.len(),
        valid,
        records.len() - valid,
        skipped
    );
    Ok(records)
}

fn parse_row(row: &StringRecord, line: u64) -> Result<TransactionRecord, ImportError> {
    let field = |index: usize| row.get(index).unwrap_or_default();

    TransactionRecord::imported(
        field(0),
        field(1),
        parse_decimal(row, 2, line)?,
        parse_decimal(row, 3, line)?,
        parse_decimal(row, 4, line)?,
        parse_integer(row, 5, line)?,
        parse_decimal(row, 6, line)?,
        parse_integer(row, 7, line)?,
    )
    .map_err(|source| ImportError::Overflow { line, source })
}

fn parse_decimal(row: &StringRecord, index: usize, line: u64) -> Result<Decimal, InputFormatError> {
    let value = row.get(index).unwrap_or_default();
    exact_decimal(value).ok_or_else(|| format_error(index, value, line, "decimal"))
}

/// Parse `[+-]digits[.digits]` without losing a digit.
///
/// Exponents and digit separators are refused, and so is anything `Decimal`
/// would have to round to hold. The text written back out, and with it the
/// checksum, then matches what was read.
fn exact_decimal(value: &str) -> Option<Decimal> {
    let unsigned = value.strip_prefix(['+', '-']).unwrap_or(value);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return None;
    }

    let mut parsed = Decimal::from_str(unsigned).ok()?;
    parsed.set_sign_negative(value.starts_with('-') && !parsed.is_zero());
    (parsed.scale() as usize == fraction.len()).then_some(parsed)
}

fn parse_integer<T: FromStr>(row: &StringRecord, index: usize, line: u64) -> Result<T, InputFormatError> {
    let value = row.get(index).unwrap_or_default();
    value
        .parse()
        .map_err(|_| format_error(index, value, line, "integer"))
}

fn format_error(index: usize, value: &str, line: u64, expected: &'static str) -> InputFormatError {
    InputFormatError {
        line,
        column: RecordRow::csv_schema()[index].name,
        value: value.to_string(),
        expected,
    }
}

/// Write records as CSV. The header is written even for an empty batch.
pub fn write_csv<W: Write>(
    records: &[TransactionRecord],
    projection: Projection,
    writer: W,
) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(RecordRow::csv_header(projection == Projection::WithDerived))?;
    for record in records {
        wtr.serialize(RecordRow::project(record, projection))?;
    }
    wtr.flush()?;
    Ok(())
}
