//! Typed errors for the retrieval and chat pipeline.
//!
//! The pipeline distinguishes three failure kinds:
//! - [`Error::InvalidInput`] — malformed caller input (empty message list,
//!   mismatched vector lengths). Surfaced as a client error, never retried.
//! - [`Error::Provider`] — an external service (embeddings or chat
//!   completions) failed. Recoverable everywhere except the final reply:
//!   embedding failures degrade to lexical-only results, intent
//!   classification failures degrade to "not product intent".
//! - [`Error::NotFound`] — a catalog id lookup missed.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("product {0} not found")]
    NotFound(u32),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Provider(e.to_string())
    }
}
