//! In-memory store for tests and dry runs.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::instrument;

use super::{MeasurementStore, StoredRow};
use crate::normalize::NewRow;
use crate::StoreResult;

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    rows: Vec<StoredRow>,
}

/// Keeps rows in a vector behind a single lock.
///
/// Identifiers start at 1 and increase by one per row. A batch is appended while the lock is
/// held, so rows from concurrent batches never interleave.
#[derive(Debug, Default)]
pub struct MemoryMeasurementStore {
    state: Mutex<State>,
}

impl MemoryMeasurementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every row written so far, in write order.
    pub async fn rows(&self) -> Vec<StoredRow> {
        self.state.lock().await.rows.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl MeasurementStore for MemoryMeasurementStore {
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    async fn insert_rows(&self, rows: &[NewRow]) -> StoreResult<Vec<StoredRow>> {
        let mut state = self.state.lock().await;
        let first_id = state.last_id + 1;

        let written: Vec<StoredRow> = rows
            .iter()
            .cloned()
            .zip(first_id..)
            .map(|(row, id)| StoredRow::from_new(id, row))
            .collect();

        state.last_id += written.len() as i64;
        state.rows.extend(written.iter().cloned());
        Ok(written)
    }
}
