//! Batch validation and persistence.

use std::sync::Arc;

use api_shared::{MeasurementRes, SubmitBatchReq};
use serde_json::Value;
use tracing::{info, instrument};

use crate::assay::AssayContext;
use crate::normalize::{normalize_records, NewRow};
use crate::record::RecordKind;
use crate::store::MeasurementStore;
use crate::validation::validate_records;
use crate::{BatchError, BatchResult};

/// Largest batch accepted in one request.
///
/// Six bound parameters per row keeps a full batch well under PostgreSQL's 65535 parameter
/// limit for a single statement.
pub const MAX_BATCH_ROWS: usize = 10_000;

pub const MISSING_ARRAYS_MESSAGE: &str = "Request must include CtValues and/or ResultValues";

/// Validates a batch and normalises it into rows, without touching the store.
///
/// CtValues are validated completely before ResultValues, and rows come out in the same order.
///
/// # Errors
///
/// - `ClientValidation` when both arrays are absent, an array is not an array, a record fails
///   its field checks, or the batch exceeds [`MAX_BATCH_ROWS`]
/// - `EmptyBatch` when the arrays are present but yield no rows
pub fn prepare_rows(
    ct_values: Option<&Value>,
    result_values: Option<&Value>,
    assay: AssayContext,
) -> BatchResult<Vec<NewRow>> {
    if ct_values.is_none() && result_values.is_none() {
        return Err(BatchError::ClientValidation(MISSING_ARRAYS_MESSAGE.into()));
    }

    let mut records = Vec::new();
    for (values, kind) in [
        (ct_values, RecordKind::CtValue),
        (result_values, RecordKind::ResultValue),
    ] {
        if let Some(values) = values {
            records.extend(validate_records(values, kind, assay)?);
        }
    }

    let rows = normalize_records(records, assay);
    if rows.is_empty() {
        return Err(BatchError::EmptyBatch);
    }
    if rows.len() > MAX_BATCH_ROWS {
        return Err(BatchError::ClientValidation(format!(
            "Batch contains {} items; at most {MAX_BATCH_ROWS} are accepted per request",
            rows.len()
        )));
    }

    Ok(rows)
}

/// Validates batches and writes them through a shared store.
///
/// Holds no per-request state; clones share the same store handle.
#[derive(Clone)]
pub struct BatchService {
    store: Arc<dyn MeasurementStore>,
}

impl BatchService {
    pub fn new(store: Arc<dyn MeasurementStore>) -> Self {
        Self { store }
    }

    /// Validates every record, then writes all rows in one atomic insert.
    ///
    /// Nothing is written unless every record in both arrays passes. On success the stored rows
    /// come back in input order (CtValues, then ResultValues) with their store-assigned ids.
    ///
    /// # Errors
    ///
    /// Any error from [`prepare_rows`], `StoreFailure` when the insert fails, and `Internal`
    /// when the store does not return one row per submitted row.
    #[instrument(skip(self, ct_values, result_values), fields(assay))]
    pub async fn persist(
        &self,
        ct_values: Option<&Value>,
        result_values: Option<&Value>,
        assay_name: Option<&str>,
    ) -> BatchResult<Vec<MeasurementRes>> {
        let assay = AssayContext::from_assay_name(assay_name);
        tracing::Span::current().record("assay", assay.as_str());

        let rows = prepare_rows(ct_values, result_values, assay)?;
        let stored = self.store.insert_rows(&rows).await?;

        if stored.len() != rows.len() {
            return Err(BatchError::Internal(format!(
                "store returned {} rows for {} submitted",
                stored.len(),
                rows.len()
            )));
        }

        info!(inserted = stored.len(), "batch persisted");
        Ok(stored.into_iter().map(MeasurementRes::from).collect())
    }

    /// [`BatchService::persist`] for a deserialised request body.
    pub async fn submit(&self, req: &SubmitBatchReq) -> BatchResult<Vec<MeasurementRes>> {
        self.persist(
            req.ct_values.as_ref(),
            req.result_values.as_ref(),
            req.assay_name.as_deref(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::NewRow;
    use crate::store::{MemoryMeasurementStore, StoredRow};
    use crate::{BatchErrorKind, StoreError, StoreResult};
    use async_trait::async_trait;
    use serde_json::json;

    struct FailingStore;

    #[async_trait]
    impl MeasurementStore for FailingStore {
        async fn insert_rows(&self, _rows: &[NewRow]) -> StoreResult<Vec<StoredRow>> {
            Err(StoreError::Rejected("duplicate key value".into()))
        }
    }

    struct ShortStore;

    #[async_trait]
    impl MeasurementStore for ShortStore {
        async fn insert_rows(&self, _rows: &[NewRow]) -> StoreResult<Vec<StoredRow>> {
            Ok(Vec::new())
        }
    }

    fn service() -> (BatchService, Arc<MemoryMeasurementStore>) {
        let store = Arc::new(MemoryMeasurementStore::new());
        (BatchService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_generic_ct_value_is_persisted() {
        let (svc, store) = service();
        let ct = json!([{"date": "2024-01-01", "Sample": "S1", "HZV-1": "30.1", "HZV-2": "29.8"}]);

        let out = svc.persist(Some(&ct), None, None).await.expect("persisted");

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, "CtValue");
        assert_eq!(out[0].sample, "S1");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_vzv_result_value_has_null_hsv_columns() {
        let (svc, _store) = service();
        let rv = json!([{"date": "2024-01-02", "Sample": "S2", "VZV": "Positive"}]);

        let out = svc
            .persist(None, Some(&rv), Some("VZV-assay"))
            .await
            .expect("persisted");

        assert_eq!(out[0].kind, "ResultValue");
        assert_eq!(out[0].vzv.as_deref(), Some("Positive"));
        assert_eq!(out[0].hsv_1, None);
        assert_eq!(out[0].hsv_2, None);
    }

    #[tokio::test]
    async fn test_rows_come_back_ct_values_first_with_unique_ids() {
        let (svc, _store) = service();
        let ct = json!([
            {"date": "d1", "Sample": "c1", "HSV-1": "31", "HSV-2": "32"},
            {"date": "d2", "Sample": "c2", "HSV-1": "33", "HSV-2": ""}
        ]);
        let rv = json!([{"date": "d3", "Sample": "r1", "HSV-1": "Positive", "HSV-2": "Negative"}]);

        let out = svc
            .persist(Some(&ct), Some(&rv), Some("HSV 1/2"))
            .await
            .unwrap();

        let samples: Vec<&str> = out.iter().map(|r| r.sample.as_str()).collect();
        assert_eq!(samples, vec!["c1", "c2", "r1"]);
        let kinds: Vec<&str> = out.iter().map(|r| r.kind.as_str()).collect();
        assert_eq!(kinds, vec!["CtValue", "CtValue", "ResultValue"]);
        let ids: Vec<i64> = out.iter().map(|r| r.id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]), "ids must strictly increase: {ids:?}");
    }

    #[tokio::test]
    async fn test_invalid_late_record_writes_nothing() {
        let (svc, store) = service();
        let ct = json!([{"date": "d", "Sample": "s", "HZV-1": "1", "HZV-2": "2"}]);
        let rv = json!([
            {"date": "d", "Sample": "s", "HZV-1": "1", "HZV-2": "2"},
            {"date": "d", "Sample": "s", "HZV-1": "1"}
        ]);

        let err = svc
            .persist(Some(&ct), Some(&rv), None)
            .await
            .expect_err("should reject");

        assert_eq!(err.kind(), BatchErrorKind::ClientValidation);
        assert!(err.to_string().contains("ResultValues[1]"));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_ct_values_validated_before_result_values() {
        let (svc, _store) = service();
        let ct = json!([{"Sample": "s"}]);
        let rv = json!("not an array");

        let err = svc.persist(Some(&ct), Some(&rv), None).await.unwrap_err();
        assert!(err.to_string().contains("CtValues[0]"));
    }

    #[tokio::test]
    async fn test_both_arrays_absent_is_rejected() {
        let (svc, store) = service();
        let err = svc.persist(None, None, Some("VZV")).await.unwrap_err();

        assert_eq!(err.kind(), BatchErrorKind::ClientValidation);
        assert!(err.to_string().contains("must include CtValues and/or ResultValues"));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_both_arrays_empty_is_empty_batch() {
        let (svc, store) = service();
        let empty = json!([]);
        let err = svc
            .persist(Some(&empty), Some(&empty), None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), BatchErrorKind::EmptyBatch);
        assert_eq!(err.to_string(), "No valid items to insert");
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_store_failure_is_reported_as_store_failure() {
        let svc = BatchService::new(Arc::new(FailingStore));
        let rv = json!([{"date": "d", "Sample": "s", "VZV": ""}]);

        let err = svc.persist(None, Some(&rv), Some("VZV")).await.unwrap_err();
        assert_eq!(err.kind(), BatchErrorKind::StoreFailure);
        assert!(!err.kind().is_client_error());
    }

    #[tokio::test]
    async fn test_short_store_response_is_internal() {
        let svc = BatchService::new(Arc::new(ShortStore));
        let rv = json!([{"date": "d", "Sample": "s", "VZV": ""}]);

        let err = svc.persist(None, Some(&rv), Some("VZV")).await.unwrap_err();
        assert_eq!(err.kind(), BatchErrorKind::Internal);
    }

    #[tokio::test]
    async fn test_round_trip_through_store_keeps_values() {
        let (svc, store) = service();
        let rv = json!([
            {"date": "2024-03-04", "Sample": "S-42", "HSV-1": "Negative", "HSV-2": ""}
        ]);

        svc.persist(None, Some(&rv), Some("HSV")).await.unwrap();

        let rows = store.rows().await;
        assert_eq!(rows[0].date, "2024-03-04");
        assert_eq!(rows[0].sample, "S-42");
        assert_eq!(rows[0].hsv_1.as_deref(), Some("Negative"));
        assert_eq!(rows[0].hsv_2.as_deref(), Some(""));
        assert_eq!(rows[0].vzv, None);
    }

    #[test]
    fn test_oversized_batch_is_rejected() {
        let record = json!({"date": "d", "Sample": "s", "VZV": "Positive"});
        let ct = Value::Array(vec![record; MAX_BATCH_ROWS + 1]);

        let err = prepare_rows(Some(&ct), None, AssayContext::Vzv).unwrap_err();
        assert_eq!(err.kind(), BatchErrorKind::ClientValidation);
    }

    #[test]
    fn test_single_empty_array_is_empty_batch() {
        let err = prepare_rows(Some(&json!([])), None, AssayContext::Generic).unwrap_err();
        assert_eq!(err.kind(), BatchErrorKind::EmptyBatch);
    }
}
