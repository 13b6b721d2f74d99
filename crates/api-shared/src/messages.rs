//! JSON messages exchanged with callers.
//!
//! Field names follow the casing callers already submit (`CtValues`, `Sample`, `HSV-1`, ...),
//! independent of the column names used by the store.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /liaison_mdx`.
///
/// The two arrays are kept as raw JSON so that shape problems (not an array, an entry that is
/// not an object, a missing field) can be reported with the array label and index instead of a
/// generic deserialisation failure.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct SubmitBatchReq {
    #[serde(rename = "AssayName", default, skip_serializing_if = "Option::is_none")]
    pub assay_name: Option<String>,
    #[serde(rename = "CtValues", default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Object>>)]
    pub ct_values: Option<serde_json::Value>,
    #[serde(rename = "ResultValues", default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Object>>)]
    pub result_values: Option<serde_json::Value>,
}

/// One stored measurement as returned to the caller.
///
/// Assay columns that do not apply to the batch's assay are `null`, never an empty string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MeasurementRes {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub date: String,
    #[serde(rename = "Sample")]
    pub sample: String,
    #[serde(rename = "VZV")]
    pub vzv: Option<String>,
    #[serde(rename = "HSV-1")]
    pub hsv_1: Option<String>,
    #[serde(rename = "HSV-2")]
    pub hsv_2: Option<String>,
}

/// 400 body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

/// 500 body. `error` carries detail only in a development environment and is `{}` otherwise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ServerErrorRes {
    pub message: String,
    #[schema(value_type = Object)]
    pub error: serde_json::Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}
