/// Domain-specific error types for the simulation engine.
/// Every core error is returned synchronously at the call that violates a
/// precondition; no partial batch is ever produced on failure. Retry policy
/// for the remote data source lives in the feed, never in the core.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("insufficient data: need at least 2 observations, got {observations}")]
    InsufficientData { observations: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("insufficient samples: need at least {required}, got {actual}")]
    InsufficientSamples { required: usize, actual: usize },

    #[error("data source unavailable: {0}")]
    DataSourceUnavailable(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("input error: {0}")]
    Input(String),

    #[error("report error: {0}")]
    Report(String),
}

pub type SimResult<T> = Result<T, SimError>;
