use serde_json::Value;
use thiserror::Error;

use crate::path::CodingPath;

/// Error returned when a value cannot be decoded from its wire form.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// A required key is absent from its object.
    #[error("{path}: key \"{key}\" not found")]
    KeyNotFound { path: CodingPath, key: String },

    /// A value was required but the wire holds `null`.
    #[error("{path}: expected {expected}, found null")]
    ValueNotFound { path: CodingPath, expected: &'static str },

    /// The wire value has the wrong shape.
    #[error("{path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: CodingPath,
        expected: &'static str,
        found: &'static str,
    },

    /// The shape is right but the contents are not acceptable.
    #[error("{path}: {message}")]
    DataCorrupted { path: CodingPath, message: String },

    /// A one-of object carries none of its variant keys.
    #[error("{path}: no key of `{type_name}` is present")]
    NoKeyPresent { path: CodingPath, type_name: &'static str },

    /// Raised by user strategies and custom coding functions.
    #[error("{path}: {message}")]
    Custom { path: CodingPath, message: String },

    /// The input is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl DecodeError {
    pub fn key_not_found(path: CodingPath, key: impl Into<String>) -> Self {
        Self::KeyNotFound { path, key: key.into() }
    }

    pub fn value_not_found(path: CodingPath, expected: &'static str) -> Self {
        Self::ValueNotFound { path, expected }
    }

    /// Mismatch against `found`; `null` is reported as a missing value.
    pub fn type_mismatch(path: CodingPath, expected: &'static str, found: &Value) -> Self {
        if found.is_null() {
            return Self::value_not_found(path, expected);
        }
        Self::TypeMismatch {
            path,
            expected,
            found: describe(found),
        }
    }

    pub fn data_corrupted(path: CodingPath, message: impl Into<String>) -> Self {
        Self::DataCorrupted {
            path,
            message: message.into(),
        }
    }

    pub fn no_key_present(path: CodingPath, type_name: &'static str) -> Self {
        Self::NoKeyPresent { path, type_name }
    }

    pub fn custom(path: CodingPath, message: impl Into<String>) -> Self {
        Self::Custom {
            path,
            message: message.into(),
        }
    }

    /// Where the failure happened, if it happened inside the document.
    pub fn path(&self) -> Option<&CodingPath> {
        match self {
            Self::KeyNotFound { path, .. }
            | Self::ValueNotFound { path, .. }
            | Self::TypeMismatch { path, .. }
            | Self::DataCorrupted { path, .. }
            | Self::NoKeyPresent { path, .. }
            | Self::Custom { path, .. } => Some(path),
            Self::Json(_) => None,
        }
    }

    /// Whether the failure only says that something expected at `at` is
    /// missing there, rather than that a present value is wrong.
    pub fn is_absence_at(&self, at: &CodingPath) -> bool {
        match self {
            Self::KeyNotFound { path, .. } | Self::ValueNotFound { path, .. } | Self::NoKeyPresent { path, .. } => {
                path == at
            }
            _ => false,
        }
    }
}

/// Error returned when a value cannot be written to its wire form.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The value has no wire representation (non-finite floats, clashing values).
    #[error("{path}: {message}")]
    InvalidValue { path: CodingPath, message: String },

    /// The active one-of variant is excluded from coding.
    #[error("variant of `{type_name}` is excluded from encoding")]
    UnencodableVariant { type_name: &'static str },

    /// Raised by user strategies and custom coding functions.
    #[error("{message}")]
    Custom { message: String },

    /// Rendering the encoded tree failed.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl EncodeError {
    pub fn invalid_value(path: CodingPath, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            path,
            message: message.into(),
        }
    }

    pub fn unencodable_variant(type_name: &'static str) -> Self {
        Self::UnencodableVariant { type_name }
    }

    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom {
            message: message.into(),
        }
    }
}

/// Short description of a value's shape for error messages.
pub(crate) fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
