//! The store seam.
//!
//! A store accepts one batch of rows as a single atomic insert and hands back what it wrote,
//! including the identifier it assigned to each row.

use async_trait::async_trait;

use crate::normalize::NewRow;
use crate::record::RecordKind;
use crate::StoreResult;

pub mod memory;
pub mod postgres;

pub use memory::MemoryMeasurementStore;
pub use postgres::PgMeasurementStore;

/// A row as persisted, with its store-assigned identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredRow {
    pub id: i64,
    pub kind: RecordKind,
    pub date: String,
    pub sample: String,
    pub vzv: Option<String>,
    pub hsv_1: Option<String>,
    pub hsv_2: Option<String>,
}

impl StoredRow {
    pub fn from_new(id: i64, row: NewRow) -> Self {
        Self {
            id,
            kind: row.kind,
            date: row.date,
            sample: row.sample,
            vzv: row.vzv,
            hsv_1: row.hsv_1,
            hsv_2: row.hsv_2,
        }
    }
}

impl From<StoredRow> for api_shared::MeasurementRes {
    fn from(row: StoredRow) -> Self {
        Self {
            id: row.id,
            kind: row.kind.as_str().to_owned(),
            date: row.date,
            sample: row.sample,
            vzv: row.vzv,
            hsv_1: row.hsv_1,
            hsv_2: row.hsv_2,
        }
    }
}

/// Durable storage for measurement rows.
///
/// Implementations must be thread-safe and must treat each call as one unit: either every row
/// is committed and one [`StoredRow`] per input row comes back in input order, or nothing is
/// committed and an error is returned.
#[async_trait]
pub trait MeasurementStore: Send + Sync + 'static {
    async fn insert_rows(&self, rows: &[NewRow]) -> StoreResult<Vec<StoredRow>>;
}
