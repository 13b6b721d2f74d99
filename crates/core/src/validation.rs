//! Record validation.
//!
//! Every record in a batch is checked against the batch's assay context before anything is
//! written. Checks run in array order and stop at the first failure; the error names the field,
//! the index and the array it came from.

use serde_json::{Map, Value};

use crate::assay::{
    AssayContext, FIELD_DATE, FIELD_HSV_1, FIELD_HSV_2, FIELD_HZV_1, FIELD_HZV_2, FIELD_SAMPLE,
    FIELD_SAMPLE_ALIAS, FIELD_VZV,
};
use crate::record::{MeasurementRecord, RecordKind};
use crate::{BatchError, BatchResult};

/// Validates one request array and returns its records in order.
///
/// `records` must be a JSON array of objects. Each object needs a non-blank `date` and
/// `Sample` (lowercase `sample` is accepted) plus the assay fields required by `assay`:
/// - [`AssayContext::Vzv`]: a string `VZV`, empty allowed
/// - [`AssayContext::Hsv`]: strings `HSV-1` and `HSV-2`, empty allowed
/// - [`AssayContext::Generic`]: non-blank `HZV-1` and `HZV-2`
///
/// # Errors
///
/// Returns `BatchError::ClientValidation` for the first problem found.
pub fn validate_records(
    records: &Value,
    kind: RecordKind,
    assay: AssayContext,
) -> BatchResult<Vec<MeasurementRecord>> {
    let label = kind.array_label();
    let items = records
        .as_array()
        .ok_or_else(|| BatchError::ClientValidation(format!("{label} must be an array")))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| validate_record(item, kind, index, assay))
        .collect()
}

fn validate_record(
    item: &Value,
    kind: RecordKind,
    index: usize,
    assay: AssayContext,
) -> BatchResult<MeasurementRecord> {
    let label = kind.array_label();
    let obj = item.as_object().ok_or_else(|| {
        BatchError::ClientValidation(format!("{label}[{index}] must be an object"))
    })?;
    let at = Location { label, index };

    let date = non_blank(obj.get(FIELD_DATE)).ok_or_else(|| at.invalid(FIELD_DATE))?;
    let sample = non_blank(
        obj.get(FIELD_SAMPLE)
            .or_else(|| obj.get(FIELD_SAMPLE_ALIAS)),
    )
    .ok_or_else(|| at.invalid(FIELD_SAMPLE))?;

    match assay {
        AssayContext::Vzv => {
            require_string(obj, FIELD_VZV, &at)?;
        }
        AssayContext::Hsv => {
            require_string(obj, FIELD_HSV_1, &at)?;
            require_string(obj, FIELD_HSV_2, &at)?;
        }
        AssayContext::Generic => {
            for key in [FIELD_HZV_1, FIELD_HZV_2] {
                non_blank(obj.get(key)).ok_or_else(|| at.invalid(key))?;
            }
        }
    }

    Ok(MeasurementRecord {
        kind,
        date: date.to_owned(),
        sample: sample.to_owned(),
        vzv: string_field(obj, FIELD_VZV),
        hsv_1: string_field(obj, FIELD_HSV_1),
        hsv_2: string_field(obj, FIELD_HSV_2),
        hzv_1: string_field(obj, FIELD_HZV_1),
        hzv_2: string_field(obj, FIELD_HZV_2),
    })
}

struct Location {
    label: &'static str,
    index: usize,
}

impl Location {
    fn invalid(&self, field: &str) -> BatchError {
        BatchError::ClientValidation(format!(
            "Missing or invalid \"{field}\" in {}[{}]",
            self.label, self.index
        ))
    }
}

/// A string value with at least one non-whitespace character.
fn non_blank(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

fn require_string(obj: &Map<String, Value>, key: &str, at: &Location) -> BatchResult<()> {
    match obj.get(key) {
        Some(Value::String(_)) => Ok(()),
        _ => Err(at.invalid(key)),
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_owned)
}
