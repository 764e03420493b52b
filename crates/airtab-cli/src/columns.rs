//! Table columns declared on the command line.
//!
//! The CLI cannot know a table's fields at compile time, so the columns given
//! with `--column Name:kind` are registered once at startup and back the
//! schema of [`DynamicFields`].

use std::str::FromStr;
use std::sync::OnceLock;

use airtab_core::schema::{FieldKind, StructShape};
use airtab_core::{Attachment, Date, FieldValue, FieldValues, Fields, Row};
use anyhow::{Context, Result, anyhow, bail};

static COLUMNS: OnceLock<StructShape> = OnceLock::new();

/// A record with the registered columns as its fields.
pub type DynamicRecord = Row<DynamicFields>;

/// One `--column` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: FieldKind,
}

impl FromStr for ColumnSpec {
    type Err = anyhow::Error;

    /// Parse `Name:kind`. The name may itself contain colons; the kind is
    /// whatever follows the last one.
    fn from_str(s: &str) -> Result<Self> {
        let (name, kind) = s
            .rsplit_once(':')
            .with_context(|| format!("column '{s}' must be written as NAME:KIND"))?;
        if name.is_empty() {
            bail!("column '{s}' has an empty name");
        }

        let kind = match kind.to_ascii_lowercase().as_str() {
            "text" => FieldKind::Text,
            "number" | "int" | "integer" => FieldKind::Integer,
            "float" => FieldKind::Float,
            "checkbox" | "bool" => FieldKind::Checkbox,
            "date" => FieldKind::Date,
            "list" => FieldKind::StringList,
            "attachments" => FieldKind::Attachments,
            "formula" => FieldKind::Formula,
            other => bail!(
                "unknown column kind '{other}' (expected text, number, float, checkbox, \
                 date, list, attachments or formula)"
            ),
        };

        Ok(Self {
            name: name.to_string(),
            kind,
        })
    }
}

/// Build the schema for `columns`.
pub fn shape_of(columns: &[ColumnSpec]) -> StructShape {
    columns.iter().fold(StructShape::new("Columns"), |shape, column| {
        shape.field(column.name.clone(), column.kind.clone())
    })
}

/// Register the columns for this process. Later calls are ignored.
pub fn register(columns: &[ColumnSpec]) {
    if COLUMNS.set(shape_of(columns)).is_err() {
        tracing::debug!("columns already registered");
    }
}

/// Field values of a record whose columns were declared at runtime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicFields(pub FieldValues);

impl Fields for DynamicFields {
    fn shape() -> StructShape {
        COLUMNS
            .get()
            .cloned()
            .unwrap_or_else(|| StructShape::new("Columns"))
    }

    fn to_values(&self) -> FieldValues {
        self.0.clone()
    }

    fn apply_values(&mut self, values: FieldValues) -> airtab_core::Result<()> {
        let shape = Self::shape();
        for (name, value) in values {
            let Some(field) = shape.get(&name) else {
                return Err(airtab_core::Error::UnknownField {
                    field: name,
                    type_name: shape.type_name().to_string(),
                });
            };
            if !accepts(field.kind(), &value) {
                return Err(airtab_core::Error::field_mismatch(
                    shape.type_name(),
                    &name,
                    field.kind().clone(),
                    &value,
                ));
            }
            self.0.insert(name, value);
        }
        Ok(())
    }
}

fn accepts(kind: &FieldKind, value: &FieldValue) -> bool {
    matches!(
        (kind, value),
        (FieldKind::Text, FieldValue::Text(_))
            | (FieldKind::Integer, FieldValue::Integer(_))
            | (FieldKind::Float, FieldValue::Float(_))
            | (FieldKind::Checkbox, FieldValue::Checkbox(_))
            | (FieldKind::Date, FieldValue::Date(_))
            | (FieldKind::StringList, FieldValue::StringList(_))
            | (FieldKind::Attachments, FieldValue::Attachments(_))
            | (FieldKind::Formula, FieldValue::Formula(_))
            | (FieldKind::Struct(_), FieldValue::Struct(_))
    )
}

/// Parse `--set Name=value` assignments against the registered columns.
///
/// Lists and attachments take comma separated values; attachments are given
/// by URL.
pub fn parse_assignments(assignments: &[String]) -> Result<DynamicFields> {
    let shape = DynamicFields::shape();
    let mut values = FieldValues::new();

    for assignment in assignments {
        let (name, raw) = assignment
            .split_once('=')
            .with_context(|| format!("'{assignment}' must be written as NAME=VALUE"))?;
        let field = shape
            .get(name)
            .with_context(|| format!("'{name}' is not a declared column (use --column {name}:KIND)"))?;
        let value = parse_value(field.kind(), raw)
            .with_context(|| format!("invalid value for {name}"))?;
        values.insert(name, value);
    }

    let mut fields = DynamicFields::default();
    fields.apply_values(values)?;
    Ok(fields)
}

fn parse_value(kind: &FieldKind, raw: &str) -> Result<FieldValue> {
    let list = || {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    Ok(match kind {
        FieldKind::Text => FieldValue::Text(raw.to_string()),
        FieldKind::Integer => FieldValue::Integer(raw.trim().parse()?),
        FieldKind::Float => FieldValue::Float(raw.trim().parse()?),
        FieldKind::Checkbox => FieldValue::Checkbox(parse_bool(raw)?),
        FieldKind::Date => FieldValue::Date(Date::new(raw.trim())),
        FieldKind::StringList => FieldValue::StringList(list().collect()),
        FieldKind::Attachments => {
            FieldValue::Attachments(list().map(Attachment::from_url).collect())
        }
        FieldKind::Formula => bail!("formula fields are computed and cannot be set"),
        other => return Err(anyhow!("cannot set a {other} column from the command line")),
    })
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" | "" => Ok(false),
        other => bail!("'{other}' is not a checkbox value"),
    }
}
