//! Error types for Diorama operations.
//!
//! This module provides the main error type [`DioramaError`] which wraps
//! the error conditions that can occur while editing a diagram.

use std::{io, ops::Range};

use thiserror::Error;

use diorama_core::error::ModelError;

/// The main error type for Diorama operations.
///
/// # Diagnostic Variants
///
/// The `Scenario` variant carries the source text and the byte span of the
/// offending input, so callers can render a snippet.
#[derive(Debug, Error)]
pub enum DioramaError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{message}")]
    Scenario {
        message: String,
        span: Option<Range<usize>>,
        src: String,
    },
}

impl DioramaError {
    /// Create a new `InvalidRequest` error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a new `Scenario` error with the associated source text.
    pub fn new_scenario_error(
        message: impl Into<String>,
        span: Option<Range<usize>>,
        src: impl Into<String>,
    ) -> Self {
        Self::Scenario {
            message: message.into(),
            span,
            src: src.into(),
        }
    }
}
