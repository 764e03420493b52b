//! Logical to wire field name resolution.

use crate::error::Error;

use super::shape::RecordShape;

/// Resolve the wire name of the logical field `name` of a record type.
///
/// Returns the field's rename when it has one, the logical name otherwise.
///
/// # Errors
///
/// Returns [`Error::UnknownField`] when the record's `Fields` has no field
/// called `name`. Asking to sort or select a field that does not exist is a
/// configuration error, so it is reported before any request is made.
pub fn resolve_wire_name<'a>(name: &str, shape: &'a RecordShape) -> Result<&'a str, Error> {
    shape
        .fields()
        .and_then(|fields| fields.get(name))
        .map(|field| field.wire_name())
        .ok_or_else(|| Error::UnknownField {
            field: name.to_string(),
            type_name: shape.type_name().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDescriptor, FieldKind, StructShape};

    fn shape() -> RecordShape {
        RecordShape::standard(
            "Main",
            StructShape::new("MainFields")
                .field("Name", FieldKind::Text)
                .with(FieldDescriptor::new("when", FieldKind::Date).rename("When?")),
        )
    }

    #[test]
    fn plain_name_passes_through() {
        assert_eq!(resolve_wire_name("Name", &shape()).unwrap(), "Name");
    }

    #[test]
    fn rename_wins() {
        assert_eq!(resolve_wire_name("when", &shape()).unwrap(), "When?");
    }

    #[test]
    fn wire_name_is_not_a_logical_name() {
        let err = resolve_wire_name("When?", &shape()).unwrap_err();
        assert!(matches!(err, Error::UnknownField { ref field, .. } if field == "When?"));
    }

    #[test]
    fn unknown_field_is_config_error() {
        let err = resolve_wire_name("Nope", &shape()).unwrap_err();
        assert!(err.is_config());
        assert_eq!(err.to_string(), "no field 'Nope' in Main");
    }
}
