//! Record and field traits.
//!
//! A record type implements [`Record`]; its payload implements [`Fields`],
//! usually through the [`fields!`](crate::fields) macro, and every field of
//! the payload implements [`FieldType`].

use chrono::{DateTime, Utc};

use crate::Result;
use crate::error::{Error, ParseError};
use crate::schema::{FieldKind, RecordShape, StructShape};
use crate::types::{Attachment, Date, FieldValue, FieldValues, FormulaResult};

/// A type that can be stored in a record field.
pub trait FieldType: Sized {
    /// The kind tag recorded in the schema descriptor.
    fn kind() -> FieldKind;

    /// Convert to a dynamic value for encoding.
    fn to_value(&self) -> FieldValue;

    /// Convert from a dynamic value, handing the value back if it has the
    /// wrong kind.
    fn from_value(value: FieldValue) -> std::result::Result<Self, FieldValue>;

    /// Integer range the type can hold, when narrower than `i64`.
    fn bounds() -> Option<(i64, i64)> {
        None
    }

    /// Convert a value assigned to `field` of the struct `owner`.
    ///
    /// The default reports a rejected value as [`Error::FieldMismatch`].
    fn assign(value: FieldValue, owner: &str, field: &str) -> Result<Self> {
        Self::from_value(value).map_err(|got| Error::field_mismatch(owner, field, Self::kind(), &got))
    }
}

/// The payload struct of a record.
pub trait Fields: Default {
    /// Descriptor of the struct's fields.
    fn shape() -> StructShape;

    /// All field values keyed by logical name.
    fn to_values(&self) -> FieldValues;

    /// Assign values by logical name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] for a name the struct does not have and
    /// [`Error::FieldMismatch`] for a value of the wrong kind.
    fn apply_values(&mut self, values: FieldValues) -> Result<()>;
}

/// A record of a table: an id, a creation time and a payload.
pub trait Record: Default {
    type Fields: Fields;

    /// Descriptor of this record type.
    ///
    /// The default describes the standard layout with `Self::Fields` as the
    /// payload.
    fn shape() -> RecordShape {
        RecordShape::standard(std::any::type_name::<Self>(), Self::Fields::shape())
    }

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    fn created_time(&self) -> Option<DateTime<Utc>>;

    fn set_created_time(&mut self, created_time: Option<DateTime<Utc>>);

    fn fields(&self) -> &Self::Fields;

    fn fields_mut(&mut self) -> &mut Self::Fields;
}

/// A ready-made record holding a payload of type `F`.
///
/// # Example
///
/// ```
/// use airtab_core::{Row, fields};
///
/// fields! {
///     #[derive(Debug, Clone, Default, PartialEq)]
///     pub struct Book {
///         #[wire("Title")]
///         pub title: String,
///         #[wire("Rating")]
///         pub rating: i64,
///     }
/// }
///
/// let book = Row::new(Book { title: "Binti".to_string(), rating: 4 });
/// assert!(!book.is_persisted());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row<F> {
    pub id: String,
    pub created_time: Option<DateTime<Utc>>,
    pub fields: F,
}

impl<F> Row<F> {
    pub fn new(fields: F) -> Self {
        Self {
            id: String::new(),
            created_time: None,
            fields,
        }
    }

    /// Whether the record has been created on the service.
    pub fn is_persisted(&self) -> bool {
        !self.id.is_empty()
    }
}

impl<F: Fields> Record for Row<F> {
    type Fields = F;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn created_time(&self) -> Option<DateTime<Utc>> {
        self.created_time
    }

    fn set_created_time(&mut self, created_time: Option<DateTime<Utc>>) {
        self.created_time = created_time;
    }

    fn fields(&self) -> &F {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut F {
        &mut self.fields
    }
}

/// Build a zero-valued record and assign `data` to its fields by logical
/// name.
///
/// Useful when the payload struct has many fields and only a few are set.
///
/// # Errors
///
/// Fails when a name is not a field of the payload or a value has the wrong
/// kind for its field.
///
/// # Example
///
/// ```
/// use airtab_core::{FieldValue, Row, fields, new_record};
///
/// fields! {
///     #[derive(Debug, Clone, Default, PartialEq)]
///     pub struct Book {
///         pub title: String,
///         pub tags: Vec<String>,
///     }
/// }
///
/// let binti: Row<Book> = new_record([
///     ("title", FieldValue::from("Binti")),
///     ("tags", vec!["sci-fi", "fantasy"].into()),
/// ])
/// .unwrap();
/// assert_eq!(binti.fields.title, "Binti");
/// ```
pub fn new_record<R, K, I>(data: I) -> Result<R>
where
    R: Record,
    K: Into<String>,
    I: IntoIterator<Item = (K, FieldValue)>,
{
    let mut record = R::default();
    let values: FieldValues = data.into_iter().collect();
    record.fields_mut().apply_values(values)?;
    Ok(record)
}

impl FieldType for String {
    fn kind() -> FieldKind {
        FieldKind::Text
    }

    fn to_value(&self) -> FieldValue {
        FieldValue::Text(self.clone())
    }

    fn from_value(value: FieldValue) -> std::result::Result<Self, FieldValue> {
        match value {
            FieldValue::Text(s) => Ok(s),
            other => Err(other),
        }
    }
}

impl FieldType for i64 {
    fn kind() -> FieldKind {
        FieldKind::Integer
    }

    fn to_value(&self) -> FieldValue {
        FieldValue::Integer(*self)
    }

    fn from_value(value: FieldValue) -> std::result::Result<Self, FieldValue> {
        match value {
            FieldValue::Integer(n) => Ok(n),
            other => Err(other),
        }
    }
}

impl FieldType for i32 {
    fn kind() -> FieldKind {
        FieldKind::Integer
    }

    fn to_value(&self) -> FieldValue {
        FieldValue::Integer(i64::from(*self))
    }

    fn from_value(value: FieldValue) -> std::result::Result<Self, FieldValue> {
        match value {
            FieldValue::Integer(n) => i32::try_from(n).map_err(|_| FieldValue::Integer(n)),
            other => Err(other),
        }
    }

    fn bounds() -> Option<(i64, i64)> {
        Some((i64::from(i32::MIN), i64::from(i32::MAX)))
    }

    fn assign(value: FieldValue, owner: &str, field: &str) -> Result<Self> {
        match value {
            FieldValue::Integer(n) => i32::try_from(n).map_err(|_| {
                Error::from(ParseError::new(
                    format!("{owner}.{field}"),
                    "32-bit integer",
                    n.to_string(),
                ))
            }),
            other => Err(Error::field_mismatch(owner, field, Self::kind(), &other)),
        }
    }
}

impl FieldType for f64 {
    fn kind() -> FieldKind {
        FieldKind::Float
    }

    fn to_value(&self) -> FieldValue {
        FieldValue::Float(*self)
    }

    fn from_value(value: FieldValue) -> std::result::Result<Self, FieldValue> {
        match value {
            FieldValue::Float(n) => Ok(n),
            other => Err(other),
        }
    }
}

impl FieldType for bool {
    fn kind() -> FieldKind {
        FieldKind::Checkbox
    }

    fn to_value(&self) -> FieldValue {
        FieldValue::Checkbox(*self)
    }

    fn from_value(value: FieldValue) -> std::result::Result<Self, FieldValue> {
        match value {
            FieldValue::Checkbox(b) => Ok(b),
            other => Err(other),
        }
    }
}

impl FieldType for Date {
    fn kind() -> FieldKind {
        FieldKind::Date
    }

    fn to_value(&self) -> FieldValue {
        FieldValue::Date(self.clone())
    }

    fn from_value(value: FieldValue) -> std::result::Result<Self, FieldValue> {
        match value {
            FieldValue::Date(d) => Ok(d),
            other => Err(other),
        }
    }
}

impl FieldType for Vec<String> {
    fn kind() -> FieldKind {
        FieldKind::StringList
    }

    fn to_value(&self) -> FieldValue {
        FieldValue::StringList(self.clone())
    }

    fn from_value(value: FieldValue) -> std::result::Result<Self, FieldValue> {
        match value {
            FieldValue::StringList(list) => Ok(list),
            other => Err(other),
        }
    }
}

impl FieldType for Vec<Attachment> {
    fn kind() -> FieldKind {
        FieldKind::Attachments
    }

    fn to_value(&self) -> FieldValue {
        FieldValue::Attachments(self.clone())
    }

    fn from_value(value: FieldValue) -> std::result::Result<Self, FieldValue> {
        match value {
            FieldValue::Attachments(list) => Ok(list),
            other => Err(other),
        }
    }
}

impl FieldType for FormulaResult {
    fn kind() -> FieldKind {
        FieldKind::Formula
    }

    fn to_value(&self) -> FieldValue {
        FieldValue::Formula(self.clone())
    }

    fn from_value(value: FieldValue) -> std::result::Result<Self, FieldValue> {
        match value {
            FieldValue::Formula(f) => Ok(f),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FIELDS, MemberKind};

    crate::fields! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct Book {
            #[wire("Title")]
            title: String,
            #[wire("Author")]
            author: String,
            rating: i32,
            tags: Vec<String>,
        }
    }

    crate::fields! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct Shelf {
            /// The book on display.
            #[wire("Featured")]
            featured: Book,
        }
    }

    #[test]
    fn row_shape_is_standard() {
        let shape = Row::<Book>::shape();
        assert!(shape.type_name().contains("Row"));
        assert_eq!(
            shape.member(FIELDS).unwrap().kind,
            MemberKind::Struct(Book::shape())
        );
        let fields = shape.fields().unwrap();
        assert_eq!(fields.get("title").unwrap().wire_name(), "Title");
        assert_eq!(fields.get("rating").unwrap().wire_name(), "rating");
    }

    #[test]
    fn new_record_assigns_by_name() {
        let binti: Row<Book> = new_record([
            ("title", FieldValue::from("Binti")),
            ("author", "Nnedi Okorafor".into()),
            ("rating", 4i32.into()),
            ("tags", vec!["sci-fi", "fantasy"].into()),
        ])
        .unwrap();

        assert_eq!(binti.fields.author, "Nnedi Okorafor");
        assert_eq!(binti.fields.rating, 4);
        assert_eq!(binti.fields.tags, vec!["sci-fi", "fantasy"]);
        assert!(!binti.is_persisted());
    }

    #[test]
    fn new_record_rejects_unknown_field() {
        let err = new_record::<Row<Book>, _, _>([("Pages", FieldValue::from(300i64))]).unwrap_err();
        assert!(matches!(err, Error::UnknownField { ref field, .. } if field == "Pages"));
    }

    #[test]
    fn new_record_rejects_wrong_kind() {
        let err = new_record::<Row<Book>, _, _>([("rating", FieldValue::from("four"))]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "type error setting Book.rating: expected integer, got text"
        );
    }

    #[test]
    fn i32_rejects_overflow() {
        let value = FieldValue::Integer(i64::MAX);
        assert_eq!(i32::from_value(value.clone()), Err(value));
    }

    #[test]
    fn i32_out_of_range_is_parse_error() {
        let err = new_record::<Row<Book>, _, _>([("rating", FieldValue::from(i64::MAX))]).unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError { ref field, .. }) if field == "Book.rating"));
    }

    #[test]
    fn nested_struct_keeps_inner_error() {
        let mut inner = FieldValues::new();
        inner.insert("rating", "five");

        let err = new_record::<Row<Shelf>, _, _>([("featured", FieldValue::Struct(inner))]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "type error setting Book.rating: expected integer, got text"
        );

        let err = new_record::<Row<Shelf>, _, _>([("featured", FieldValue::from(1i64))]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "type error setting Shelf.featured: expected Book, got integer"
        );
    }

    #[test]
    fn descriptor_carries_integer_bounds() {
        let shape = Book::shape();
        let rating = shape.get("rating").unwrap();
        assert!(rating.accepts_integer(i64::from(i32::MAX)));
        assert!(!rating.accepts_integer(i64::from(i32::MAX) + 1));
    }

    #[test]
    fn values_round_trip_through_struct() {
        let book = Book {
            title: "Binti".to_string(),
            author: "Nnedi Okorafor".to_string(),
            rating: 4,
            tags: vec!["sci-fi".to_string()],
        };
        let mut copy = Book::default();
        copy.apply_values(book.to_values()).unwrap();
        assert_eq!(copy, book);
    }
}
