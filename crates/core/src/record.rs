//! Typed measurement records.

use std::str::FromStr;

use crate::{StoreError, StoreResult};

/// Measurement category. Decided by which request array a record arrived in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    CtValue,
    ResultValue,
}

impl RecordKind {
    /// The label stored in the `type` column and used to name the request array.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CtValue => "CtValue",
            Self::ResultValue => "ResultValue",
        }
    }

    /// Name of the request array that carries records of this kind.
    pub fn array_label(self) -> &'static str {
        match self {
            Self::CtValue => "CtValues",
            Self::ResultValue => "ResultValues",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = StoreError;

    fn from_str(s: &str) -> StoreResult<Self> {
        match s {
            "CtValue" => Ok(Self::CtValue),
            "ResultValue" => Ok(Self::ResultValue),
            other => Err(StoreError::Decode(format!("unknown record type {other:?}"))),
        }
    }
}

/// One observation for one sample on one date, after validation.
///
/// `date` and `sample` are kept exactly as submitted. The assay fields hold whatever string
/// values the record carried; which of them are required depends on the batch's assay context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MeasurementRecord {
    pub kind: RecordKind,
    pub date: String,
    pub sample: String,
    pub vzv: Option<String>,
    pub hsv_1: Option<String>,
    pub hsv_2: Option<String>,
    pub hzv_1: Option<String>,
    pub hzv_2: Option<String>,
}
