use thiserror::Error;

/// Failures raised while turning a decoded document into output rows.
#[derive(Debug, Error, PartialEq)]
pub enum ConvertError {
    /// A level of `data.r[0].t[0].d` was present but empty
    #[error("document has no element at {0}")]
    MissingPath(&'static str),

    /// A `v` cell could not be read as a number and the strict policy is on
    #[error("record {index} ({date}) has a non-numeric value: {raw}")]
    NonNumeric {
        index: usize,
        date: String,
        raw: String,
    },
}
