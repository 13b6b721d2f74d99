/// Failures raised by a [`crate::store::MeasurementStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to connect to the store: {0}")]
    Connection(sqlx::Error),
    #[error("failed to begin transaction: {0}")]
    Begin(sqlx::Error),
    #[error("bulk insert failed: {0}")]
    Insert(sqlx::Error),
    #[error("failed to commit transaction: {0}")]
    Commit(sqlx::Error),
    #[error("failed to decode stored row: {0}")]
    Decode(String),
    #[error("store returned {returned} rows for {submitted} submitted")]
    RowCountMismatch { submitted: usize, returned: usize },
    #[error("store rejected the insert: {0}")]
    Rejected(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Category of a [`BatchError`]. Surfaces map this to a status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchErrorKind {
    ClientValidation,
    EmptyBatch,
    StoreFailure,
    Internal,
}

impl BatchErrorKind {
    /// True for failures caused by the request rather than the service.
    pub fn is_client_error(self) -> bool {
        matches!(self, Self::ClientValidation | Self::EmptyBatch)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("{0}")]
    ClientValidation(String),
    #[error("No valid items to insert")]
    EmptyBatch,
    #[error("store failure: {0}")]
    StoreFailure(#[from] StoreError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl BatchError {
    pub fn kind(&self) -> BatchErrorKind {
        match self {
            Self::ClientValidation(_) => BatchErrorKind::ClientValidation,
            Self::EmptyBatch => BatchErrorKind::EmptyBatch,
            Self::StoreFailure(_) => BatchErrorKind::StoreFailure,
            Self::Internal(_) => BatchErrorKind::Internal,
        }
    }
}

pub type BatchResult<T> = std::result::Result<T, BatchError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("missing required setting {0}")]
    Missing(&'static str),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
