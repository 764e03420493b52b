//! Error types for airtab.
//!
//! This module provides a unified error type with explicit variants for
//! record-shape, encode/decode, transport and domain errors.

use std::fmt;
use thiserror::Error;

use crate::schema::{FieldKind, Mode};
use crate::types::FieldValue;

/// The unified error type for airtab operations.
///
/// Shape and configuration errors are programming errors and are reported
/// before any request is made. Decode errors mean the declared record shape
/// does not match the data the service returned.
#[derive(Debug, Error)]
pub enum Error {
    /// The record type does not satisfy the record contract.
    #[error("type error: {0}")]
    Type(#[from] TypeError),

    /// A logical field name is not declared on the record type.
    #[error("no field '{field}' in {type_name}")]
    UnknownField { field: String, type_name: String },

    /// A value of the wrong kind was assigned to a field.
    #[error("type error setting {type_name}.{field}: expected {expected}, got {got}")]
    FieldMismatch {
        type_name: String,
        field: String,
        expected: String,
        got: String,
    },

    /// The record type declares a field kind the codec cannot convert.
    #[error("unhandled type for field '{field}': {kind}")]
    UnhandledType { field: String, kind: String },

    /// Wire data does not match the declared field kind.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The response body was not the JSON envelope we expected.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The request failed or the service answered with an error envelope.
    #[error("client request error: {method} {path}: {message}")]
    Request {
        method: String,
        path: String,
        message: String,
    },

    /// The service answered a delete without confirming it.
    #[error("{table}: did not delete record '{id}': {response}")]
    NotDeleted {
        table: String,
        id: String,
        response: String,
    },

    /// An update or delete was attempted on a record that was never created.
    #[error("{table}: cannot {operation} a record without an ID")]
    NotPersisted {
        table: String,
        operation: &'static str,
    },

    /// A list page handed back the cursor it was requested with.
    #[error("{table}: service repeated pagination cursor '{cursor}'")]
    RepeatedCursor { table: String, cursor: String },

    /// Client configuration is missing or invalid.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl Error {
    /// Create a request error.
    pub fn request(
        method: impl fmt::Display,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Request {
            method: method.to_string(),
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create the error for a value of the wrong kind assigned to a field.
    pub fn field_mismatch(
        type_name: &str,
        field: &str,
        expected: FieldKind,
        got: &FieldValue,
    ) -> Self {
        Self::FieldMismatch {
            type_name: type_name.to_string(),
            field: field.to_string(),
            expected: expected.to_string(),
            got: got.kind_name().to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this error is a programming or configuration error.
    ///
    /// These are raised before any request is made and must not be retried.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::Type(_)
                | Error::UnknownField { .. }
                | Error::FieldMismatch { .. }
                | Error::UnhandledType { .. }
                | Error::Config { .. }
        )
    }

    /// Check if this error came from decoding a response.
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Parse(_) | Error::Json(_))
    }

    /// Check if this error came from the transport.
    pub fn is_request(&self) -> bool {
        matches!(self, Error::Request { .. })
    }
}

/// Record contract violations found by the shape validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// The described value is not a struct.
    #[error("{mode} {type_name}: expected a struct, found {found}")]
    NotStruct {
        mode: Mode,
        type_name: String,
        found: String,
    },

    /// There is no `Fields` member.
    #[error("{mode} {type_name}: missing Fields")]
    MissingFields { mode: Mode, type_name: String },

    /// `Fields` is not a struct.
    #[error("{mode} {type_name}: Fields is {found}, not a struct")]
    FieldsNotStruct {
        mode: Mode,
        type_name: String,
        found: String,
    },

    /// There is no `ID` member.
    #[error("{mode} {type_name}: missing ID")]
    MissingId { mode: Mode, type_name: String },

    /// `ID` is not a string.
    #[error("{mode} {type_name}: ID is {found}, not a string")]
    IdNotString {
        mode: Mode,
        type_name: String,
        found: String,
    },
}

/// A wire value that does not fit the declared field kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: expected {expected}, found {found}")]
pub struct ParseError {
    /// Path of the offending field, e.g. `Attachments[0].thumbnails.small.url`.
    pub field: String,
    /// What the declared kind accepts.
    pub expected: &'static str,
    /// What the wire carried.
    pub found: String,
}

impl ParseError {
    pub fn new(field: impl Into<String>, expected: &'static str, found: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            expected,
            found: found.into(),
        }
    }
}
