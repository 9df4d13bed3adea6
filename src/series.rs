use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::{error::Error, fs::File, path::Path};
use tracing::{debug, warn};

use crate::error::ConvertError;
use crate::records::RawRecord;

const HEADER: [&str; 2] = ["Date", "Close"];

/// What to do with a `v` cell that does not read as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericPolicy {
    /// Keep going and emit `NaN` for the cell.
    #[default]
    Permissive,
    /// Stop at the first such cell.
    Strict,
}

/// A normalized row, ready to be written out as `Date,Close`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Record {
    #[serde(rename = "Date")]
    pub i: String,
    #[serde(rename = "Close", serialize_with = "serialize_close")]
    pub v: f64,
}

pub fn normalize(
    records: Vec<RawRecord>,
    policy: NumericPolicy,
) -> Result<Vec<Record>, ConvertError> {
    let mut result = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        let v = coerce_number(&record.v);

        if v.is_nan() {
            match policy {
                NumericPolicy::Strict => {
                    return Err(ConvertError::NonNumeric {
                        index,
                        date: record.i,
                        raw: record.v.to_string(),
                    })
                }
                NumericPolicy::Permissive => {
                    warn!(index, date = %record.i, raw = %record.v, "non-numeric value, writing NaN");
                }
            }
        }

        result.push(Record { i: record.i, v });
    }

    Ok(result)
}

/// Loose numeric coercion: blank text and `null` count as zero, booleans as
/// one/zero, anything else that is not a decimal number becomes `NaN`.
pub fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                parse_decimal(trimmed)
            }
        }
        Value::Null => 0.0,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

// str::parse also takes `inf`, `infinity` and `nan` in any case; only the
// exact `Infinity` spelling counts here.
fn parse_decimal(text: &str) -> f64 {
    match text {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ if text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')) =>
        {
            text.parse::<f64>().unwrap_or(f64::NAN)
        }
        _ => f64::NAN,
    }
}

/// Writes the header and one row per record, in order. Returns once the data
/// has been flushed and synced to disk.
pub fn write_csv<P: AsRef<Path>>(path: P, records: &[Record]) -> Result<(), Box<dyn Error>> {
    let file = File::create(path)?;
    // Header is written by hand so an empty series still gets one.
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(file);

    wtr.write_record(HEADER)?;
    for record in records {
        wtr.serialize(record)?;
    }

    wtr.flush()?;
    let file = wtr.into_inner().map_err(|err| err.into_error())?;
    file.sync_all()?;

    debug!(rows = records.len(), "csv synced");

    Ok(())
}

fn serialize_close<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    // Shortest form that reads back to the same value: 100.5, 251, NaN.
    let text = if value.is_infinite() {
        if value.is_sign_positive() {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if *value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    };
    serializer.serialize_str(&text)
}
