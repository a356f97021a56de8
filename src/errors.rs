//! errors.rs - Custom error types for the cleanable-core library.
//!
//! The cleaning pipeline itself is total and non-throwing; errors exist only
//! for programmer-level contract violations surfaced by calling collaborators,
//! such as a missing entity descriptor or an unparseable configuration patch.
//!
//! License: MIT

use thiserror::Error;

/// This enum represents all possible error types in the `cleanable-core` library.
///
/// `#[non_exhaustive]` signals to consumers that new variants may be added in
/// future versions without a breaking change.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CleanableError {
    #[error("No entity descriptor registered for alias '{0}'")]
    UnknownEntity(String),

    #[error("Failed to parse configuration patch: {0}")]
    ConfigParseError(String),

    #[error("A critical system error occurred: {0}")]
    AnyhowWrapper(#[from] anyhow::Error),
}
