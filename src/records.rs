use serde::Deserialize;
use serde_json::Value;
use std::{error::Error, fs, path::Path};

use crate::error::ConvertError;

/// Top level of the exported series document. Only `data.r[0].t[0].d` is read,
/// every other field is ignored.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Document {
    pub data: Data,
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Data {
    pub r: Vec<Region>,
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Region {
    pub t: Vec<Table>,
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Table {
    pub d: Vec<RawRecord>,
}

/// One date/value pair as it appears in the source. `v` is usually a numeric
/// string but plain numbers show up too.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct RawRecord {
    pub i: String,
    pub v: Value,
}

impl Document {
    pub fn into_records(self) -> Result<Vec<RawRecord>, ConvertError> {
        let region = self
            .data
            .r
            .into_iter()
            .next()
            .ok_or(ConvertError::MissingPath("data.r[0]"))?;

        let table = region
            .t
            .into_iter()
            .next()
            .ok_or(ConvertError::MissingPath("data.r[0].t[0]"))?;

        Ok(table.d)
    }
}

pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Document, Box<dyn Error>> {
    // Whole-file read, the exports are small enough to hold in memory.
    let contents = fs::read_to_string(path)?;
    let document = serde_json::from_str::<Document>(&contents)?;

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_json() {
        let records = read_json("test-inputs/two_records.json")
            .unwrap()
            .into_records()
            .unwrap();
        let expected_records = vec![
            RawRecord {
                i: "2020-01-01".to_string(),
                v: json!("100.5"),
            },
            RawRecord {
                i: "2020-01-02".to_string(),
                v: json!("101.25"),
            },
        ];

        assert_eq!(records, expected_records);
    }

    #[test]
    fn only_first_region_and_table_are_read() {
        let records = read_json("test-inputs/mixed_values.json")
            .unwrap()
            .into_records()
            .unwrap();

        assert_eq!(records.len(), 5);
        assert_eq!(records[0].i, "2021-03-01");
        assert_eq!(records[1].v, json!(251));
        assert_eq!(records[4].i, "2021-03-05");
        assert!(records.iter().all(|r| r.i != "ignored"));
    }

    #[test]
    fn empty_series() {
        let records = read_json("test-inputs/empty_series.json")
            .unwrap()
            .into_records()
            .unwrap();

        assert!(records.is_empty());
    }

    #[test]
    fn missing_nested_field_is_a_decode_error() {
        let err = read_json("test-inputs/missing_path.json").unwrap_err();

        let err = err.downcast::<serde_json::Error>().unwrap();
        assert!(err.is_data());
        assert!(err.to_string().contains("missing field `t`"));
    }

    #[test]
    fn empty_table_list() {
        let document = read_json("test-inputs/no_tables.json").unwrap();

        assert_eq!(
            document.into_records(),
            Err(ConvertError::MissingPath("data.r[0].t[0]"))
        );
    }

    #[test]
    fn empty_region_list() {
        let document: Document = serde_json::from_str(r#"{"data":{"r":[]}}"#).unwrap();

        assert_eq!(
            document.into_records(),
            Err(ConvertError::MissingPath("data.r[0]"))
        );
    }

    #[test]
    fn malformed_json() {
        let err = read_json("test-inputs/malformed.json").unwrap_err();

        let err = err.downcast::<serde_json::Error>().unwrap();
        assert!(err.is_eof());
    }

    #[test]
    fn missing_file() {
        let err = read_json("test-inputs/does_not_exist.json").unwrap_err();

        let err = err.downcast::<std::io::Error>().unwrap();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
