//! Row normalisation.
//!
//! Maps validated records onto the fixed row shape the store accepts:
//! `(type, date, sample, vzv, hsv_1, hsv_2)`. Columns that do not apply to the batch's assay
//! hold `None`, which the store writes as NULL.

use crate::assay::AssayContext;
use crate::record::{MeasurementRecord, RecordKind};

/// Column names in insert order.
pub const ROW_COLUMNS: [&str; 6] = ["type", "date", "sample", "vzv", "hsv_1", "hsv_2"];

/// One row ready to be inserted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewRow {
    pub kind: RecordKind,
    pub date: String,
    pub sample: String,
    pub vzv: Option<String>,
    pub hsv_1: Option<String>,
    pub hsv_2: Option<String>,
}

impl NewRow {
    pub fn from_record(record: MeasurementRecord, assay: AssayContext) -> Self {
        let (vzv, hsv_1, hsv_2) = match assay {
            AssayContext::Vzv => (record.vzv, None, None),
            AssayContext::Hsv => (None, record.hsv_1, record.hsv_2),
            // Legacy merge for batches without a recognised assay name: keep whichever assay
            // columns the record happens to carry. Not expected once every sender names its assay.
            // HZV-1/HZV-2 are validated for this context but have no column, so they are not
            // persisted.
            AssayContext::Generic => (record.vzv, record.hsv_1, record.hsv_2),
        };

        Self {
            kind: record.kind,
            date: record.date,
            sample: record.sample,
            vzv,
            hsv_1,
            hsv_2,
        }
    }
}

/// Normalises records in order. Callers pass CtValues before ResultValues.
pub fn normalize_records<I>(records: I, assay: AssayContext) -> Vec<NewRow>
where
    I: IntoIterator<Item = MeasurementRecord>,
{
    records
        .into_iter()
        .map(|record| NewRow::from_record(record, assay))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: RecordKind) -> MeasurementRecord {
        MeasurementRecord {
            kind,
            date: "2024-01-01".into(),
            sample: "S1".into(),
            vzv: Some("Positive".into()),
            hsv_1: Some("Negative".into()),
            hsv_2: Some("".into()),
            hzv_1: Some("30.1".into()),
            hzv_2: Some("29.8".into()),
        }
    }

    #[test]
    fn test_vzv_context_drops_hsv_columns() {
        let row = NewRow::from_record(record(RecordKind::ResultValue), AssayContext::Vzv);
        assert_eq!(row.vzv.as_deref(), Some("Positive"));
        assert_eq!(row.hsv_1, None);
        assert_eq!(row.hsv_2, None);
    }

    #[test]
    fn test_hsv_context_drops_vzv_and_keeps_empty_strings() {
        let row = NewRow::from_record(record(RecordKind::ResultValue), AssayContext::Hsv);
        assert_eq!(row.vzv, None);
        assert_eq!(row.hsv_1.as_deref(), Some("Negative"));
        assert_eq!(row.hsv_2.as_deref(), Some(""));
    }

    #[test]
    fn test_generic_context_merges_present_columns() {
        let mut rec = record(RecordKind::CtValue);
        rec.hsv_1 = None;
        let row = NewRow::from_record(rec, AssayContext::Generic);
        assert_eq!(row.vzv.as_deref(), Some("Positive"));
        assert_eq!(row.hsv_1, None);
        assert_eq!(row.hsv_2.as_deref(), Some(""));
    }

    #[test]
    fn test_generic_context_does_not_persist_hzv_pair() {
        let rec = MeasurementRecord {
            vzv: None,
            hsv_1: None,
            hsv_2: None,
            ..record(RecordKind::CtValue)
        };
        let row = NewRow::from_record(rec, AssayContext::Generic);
        assert_eq!((row.vzv, row.hsv_1, row.hsv_2), (None, None, None));
        assert_eq!(row.sample, "S1");
    }

    #[test]
    fn test_normalize_preserves_order_and_kind() {
        let rows = normalize_records(
            vec![record(RecordKind::CtValue), record(RecordKind::ResultValue)],
            AssayContext::Vzv,
        );
        let kinds: Vec<_> = rows.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![RecordKind::CtValue, RecordKind::ResultValue]);
    }
}
