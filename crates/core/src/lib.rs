//! # MDX Core
//!
//! Core business logic for the Liaison MDX measurement intake service.
//!
//! This crate turns a submitted batch of assay measurements into stored rows:
//! - Resolving the assay context from the batch's free-text assay name
//! - Validating every record against that context before anything is written
//! - Normalising records into the fixed row shape the store accepts
//! - Writing all rows in one atomic insert through a pooled store
//!
//! **No API concerns**: HTTP routing, status codes and response bodies belong in `api-rest`.

pub mod assay;
pub mod config;
pub mod error;
pub mod normalize;
pub mod record;
pub mod service;
pub mod store;
pub mod validation;

pub use api_shared::{MeasurementRes, SubmitBatchReq};
pub use assay::AssayContext;
pub use config::{Environment, ServiceConfig, StoreConfig};
pub use error::{
    BatchError, BatchErrorKind, BatchResult, ConfigError, ConfigResult, StoreError, StoreResult,
};
pub use normalize::NewRow;
pub use record::{MeasurementRecord, RecordKind};
pub use service::{prepare_rows, BatchService};
pub use store::{MeasurementStore, MemoryMeasurementStore, PgMeasurementStore, StoredRow};
