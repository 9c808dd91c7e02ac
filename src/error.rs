//! Error handling for activity ingestion.
//!
//! Provides error types with context for format dispatch, decoding of the
//! four supported export formats, and entity persistence failures.

use std::path::PathBuf;
use thiserror::Error;

use crate::models::EntityKind;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("FIT decoding error: {0}")]
    Fit(#[from] fitparser::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unsupported file format: '{extension}' (expected one of csv, fit, gpx, tcx)")]
    UnsupportedFormat { extension: String },

    #[error("Missing required field '{field}' in file: {path}")]
    MalformedRequiredField { path: PathBuf, field: String },

    #[error("Invalid value for '{field}' in file: {path} - '{value}'")]
    InvalidValue {
        path: PathBuf,
        field: String,
        value: String,
    },

    #[error("Failed to persist {kind} batch: {reason}")]
    Sink { kind: EntityKind, reason: String },

    #[error("Input not found at path: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl IngestError {
    pub fn unsupported_format(extension: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            extension: extension.into(),
        }
    }

    pub fn missing_field(path: impl Into<PathBuf>, field: impl Into<String>) -> Self {
        Self::MalformedRequiredField {
            path: path.into(),
            field: field.into(),
        }
    }

    pub fn invalid_value(
        path: impl Into<PathBuf>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            path: path.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn sink(kind: EntityKind, reason: impl Into<String>) -> Self {
        Self::Sink {
            kind,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
