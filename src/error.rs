use std::time::Duration;
use thiserror::Error;

// Startup errors, there is no sane fallback policy so these abort the service
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("rate limit must be at least 1 request per window")]
    ZeroLimit,

    #[error("rate window must be longer than zero")]
    ZeroWindow,

    #[error("sweep interval must be longer than zero")]
    ZeroSweepInterval,

    #[error("rate window must not exceed {max:?}")]
    WindowTooLong { max: Duration },

    #[error("sweep interval must not exceed {max:?}")]
    SweepIntervalTooLong { max: Duration },

    #[error("admission controller must be created inside a tokio runtime")]
    NoRuntime,
}
