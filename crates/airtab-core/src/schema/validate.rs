//! Record contract checks run before every table operation.

use std::fmt;

use tracing::trace;

use crate::error::TypeError;

use super::shape::{CREATED_TIME, FIELDS, ID, MemberKind, RecordShape};

/// Whether a single record or a collection of records is being validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Single,
    Collection,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Single => f.write_str("record"),
            Mode::Collection => f.write_str("collection of"),
        }
    }
}

/// Check that `shape` describes a usable record.
///
/// Callers hand records over as `&mut R` or `&mut Vec<R>`, so the value is
/// always a mutable reference; what remains to check is the descriptor:
///
/// 1. the (element) type is a struct,
/// 2. it has a `Fields` member that is itself a struct,
/// 3. it has an `ID` member of type string.
///
/// The first failing check is reported.
pub fn validate(shape: &RecordShape, mode: Mode) -> Result<(), TypeError> {
    trace!(type_name = shape.type_name(), %mode, "validating record shape");
    let type_name = shape.type_name().to_string();

    if let Some(found) = shape.not_struct() {
        return Err(TypeError::NotStruct {
            mode,
            type_name,
            found: found.to_string(),
        });
    }

    match shape.member(FIELDS).map(|m| &m.kind) {
        None => return Err(TypeError::MissingFields { mode, type_name }),
        Some(MemberKind::Struct(_)) => {}
        Some(other) => {
            return Err(TypeError::FieldsNotStruct {
                mode,
                type_name,
                found: other.to_string(),
            });
        }
    }

    match shape.member(ID).map(|m| &m.kind) {
        None => Err(TypeError::MissingId { mode, type_name }),
        Some(MemberKind::String) => Ok(()),
        Some(other) => Err(TypeError::IdNotString {
            mode,
            type_name,
            found: other.to_string(),
        }),
    }
}

/// Whether the shape can carry a creation time back from the service.
pub(crate) fn has_created_time(shape: &RecordShape) -> bool {
    matches!(
        shape.member(CREATED_TIME).map(|m| &m.kind),
        Some(MemberKind::Timestamp)
    )
}
