//! Field value types.
//!
//! Plain Rust types are used where they fit (`String`, `i64`, `bool`,
//! `Vec<String>`); the aliases below name them after the column types they
//! map to. Dates, attachments and formula results get dedicated types.

mod attachment;
mod formula;
mod value;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use attachment::{Attachment, Thumbnail, Thumbnails};
pub use formula::FormulaResult;
pub use value::{FieldValue, FieldValues};

/// Single line text.
pub type Text = String;

/// Long text.
pub type LongText = String;

/// Single select option.
pub type SingleSelect = String;

/// Rating (1-10).
pub type Rating = i64;

/// Checkbox.
pub type Checkbox = bool;

/// Multiple select options.
pub type MultipleSelect = Vec<String>;

/// Linked record ids.
pub type RecordLink = Vec<String>;

/// A date or date-time column value.
///
/// The value is kept exactly as the service formats it; no time zone
/// handling is done here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Date(String);

impl Date {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Date {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Date {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for Date {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
