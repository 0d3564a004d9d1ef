//! Error taxonomy for the price lookup pipeline.
//!
//! Every failure a lookup can surface collapses into one of four variants,
//! and the HTTP layer maps each variant to exactly one status class. Raw
//! browser errors are stringified at the boundary so callers never depend
//! on chromiumoxide types.

use std::time::Duration;

use chromiumoxide::error::CdpError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PriceError {
    /// Navigation or rendering exceeded the configured deadline.
    #[error("page fetch timed out after {limit:?}")]
    FetchTimeout { limit: Duration },

    /// The browser could not be launched, driven, or read.
    #[error("page fetch failed: {0}")]
    FetchFailed(String),

    /// The page rendered fine but no price survived extraction and filtering.
    #[error("no prices found for the requested item")]
    NoQuotesFound,

    /// A fault outside the pipeline proper, e.g. a panicked worker task.
    #[error("unexpected fault: {0}")]
    Unexpected(String),
}

impl From<CdpError> for PriceError {
    fn from(err: CdpError) -> Self {
        PriceError::FetchFailed(err.to_string())
    }
}
