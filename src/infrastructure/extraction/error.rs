//! Error types for the extraction engine.
//!
//! Extraction itself never fails outward: stage failures leave fields empty
//! on the partial record. These errors cover the parts that can genuinely
//! refuse to work, namely selector configuration and the page fetch.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ExtractionError {
    #[error("no usable selectors configured for field '{field}'")]
    NoUsableSelectors { field: String },

    #[error("failed to fetch page {url}: {message}")]
    FetchFailed { url: String, message: String },
}

impl ExtractionError {
    pub fn fetch_failed(url: &str, message: impl ToString) -> Self {
        Self::FetchFailed {
            url: url.to_string(),
            message: message.to_string(),
        }
    }
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;
