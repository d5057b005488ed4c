//! Error types produced by the convert crate.
//!
//! Neither error ever escapes a conversion: [`MagnitudeError`] is recovered
//! inside the engine by leaving the matched literal untouched, and
//! [`ConvertError`] only arises while building an engine from configuration.

use thiserror::Error;

/// Why a numeric token could not be turned into a finite value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MagnitudeError {
    /// The token was empty or whitespace only.
    #[error("empty numeric token")]
    Empty,

    /// A slash fraction with a zero or missing part, or an unknown glyph.
    #[error("malformed fraction `{0}`")]
    InvalidFraction(String),

    /// The token does not start with a number.
    #[error("`{0}` is not a number")]
    NotANumber(String),

    /// The token parsed but overflowed to an infinite value.
    #[error("`{0}` is not finite")]
    NonFinite(String),
}

/// Errors raised while validating engine configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConvertError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ConvertError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
