//! Error vocabulary shared by the desk's domain types.
//!
//! `ValidationError` covers malformed user input, `DomainError` covers
//! illegal lifecycle moves, and `ErrorCode` is the stable tag logged for
//! every failure reported to an actor.

use std::fmt;
use thiserror::Error;

/// Rejected input for a named form or command field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("'{field}' is required")]
    EmptyField { field: String },

    #[error("'{field}' is malformed: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Persian or Arabic-Indic digits where Latin digits are required.
    #[error("'{field}' accepts Latin digits only")]
    NonLatinDigits { field: String },
}

impl ValidationError {
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn non_latin_digits(field: impl Into<String>) -> Self {
        ValidationError::NonLatinDigits { field: field.into() }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::EmptyField { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NonLatinDigits { field } => field,
        }
    }
}

/// Stable failure tags, one per `ListingError` kind plus lifecycle moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ValidationFailed,
    DraftNotFound,
    InvalidStateTransition,
    NotPublished,
    DestinationMissing,
    Forbidden,
    NotEligible,
    TransportError,
    StorageError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "validation_failed",
            ErrorCode::DraftNotFound => "draft_not_found",
            ErrorCode::InvalidStateTransition => "invalid_state_transition",
            ErrorCode::NotPublished => "not_published",
            ErrorCode::DestinationMissing => "destination_missing",
            ErrorCode::Forbidden => "forbidden",
            ErrorCode::NotEligible => "not_eligible",
            ErrorCode::TransportError => "transport_error",
            ErrorCode::StorageError => "storage_error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rule of an aggregate was broken, e.g. publishing a draft twice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{code}] {message}")]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
}

impl DomainError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_transition(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidStateTransition, message)
    }
}
