//! Schema descriptors for record types.

use std::fmt;

/// Name of the record member holding the record identifier.
pub const ID: &str = "ID";

/// Name of the record member holding the creation timestamp.
pub const CREATED_TIME: &str = "CreatedTime";

/// Name of the record member holding the user's field struct.
pub const FIELDS: &str = "Fields";

/// Type tag of a single field inside `Fields`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Single line text, long text, single select.
    Text,
    /// Integer numbers and ratings.
    Integer,
    /// Floating point numbers.
    Float,
    /// Checkbox.
    Checkbox,
    /// Date or date-time, kept as the service formats it.
    Date,
    /// Multiple select or linked record ids.
    StringList,
    /// Attachment list.
    Attachments,
    /// Computed formula result.
    Formula,
    /// Nested structured value.
    Struct(StructShape),
    /// A type the codec has no conversion for.
    Unsupported(String),
}

impl FieldKind {
    /// Short name used in error messages.
    pub fn name(&self) -> &str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Date => "date",
            FieldKind::StringList => "string list",
            FieldKind::Attachments => "attachments",
            FieldKind::Formula => "formula",
            FieldKind::Struct(shape) => &shape.type_name,
            FieldKind::Unsupported(name) => name,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One field of a field struct: logical name, optional wire rename, kind.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    name: String,
    rename: Option<String>,
    kind: FieldKind,
    bounds: Option<(i64, i64)>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            rename: None,
            kind,
            bounds: None,
        }
    }

    /// Use `wire_name` in the JSON payload instead of the logical name.
    pub fn rename(mut self, wire_name: impl Into<String>) -> Self {
        self.rename = Some(wire_name.into());
        self
    }

    /// Restrict an integer field to `min..=max`, e.g. the range of its Rust
    /// type. `None` leaves it unrestricted.
    pub fn bounds(mut self, bounds: Option<(i64, i64)>) -> Self {
        self.bounds = bounds;
        self
    }

    /// The logical name used in code.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name used on the wire.
    ///
    /// This is the only place the wire name is derived, so requests and
    /// responses always agree on it.
    pub fn wire_name(&self) -> &str {
        self.rename.as_deref().unwrap_or(&self.name)
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Whether `n` fits the field's integer range.
    pub fn accepts_integer(&self, n: i64) -> bool {
        self.bounds.is_none_or(|(min, max)| (min..=max).contains(&n))
    }
}

/// Ordered field descriptors of a struct.
#[derive(Debug, Clone, PartialEq)]
pub struct StructShape {
    type_name: String,
    fields: Vec<FieldDescriptor>,
}

impl StructShape {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Builder-style method to add a field.
    pub fn with(mut self, field: FieldDescriptor) -> Self {
        self.push(field);
        self
    }

    /// Builder-style method to add a field keeping its logical name on the wire.
    pub fn field(self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.with(FieldDescriptor::new(name, kind))
    }

    /// Add a field, replacing any earlier field with the same logical name.
    pub fn push(&mut self, field: FieldDescriptor) {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Look up a field by its logical name.
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Type of a top-level record member.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberKind {
    String,
    Timestamp,
    Struct(StructShape),
    Map,
    Other(String),
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::String => f.write_str("string"),
            MemberKind::Timestamp => f.write_str("timestamp"),
            MemberKind::Struct(shape) => write!(f, "struct {}", shape.type_name),
            MemberKind::Map => f.write_str("map"),
            MemberKind::Other(name) => f.write_str(name),
        }
    }
}

/// A named top-level member of a record type.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: String,
    pub kind: MemberKind,
}

/// Descriptor of a whole record type.
///
/// A record normally has three members: `ID` (string), `CreatedTime`
/// (timestamp) and `Fields` (struct). The shape validator checks that a
/// descriptor actually says so before it is used for a request.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordShape {
    type_name: String,
    not_struct: Option<String>,
    members: Vec<Member>,
}

impl RecordShape {
    /// Start describing a record type.
    pub fn builder(type_name: impl Into<String>) -> RecordShapeBuilder {
        RecordShapeBuilder {
            shape: RecordShape {
                type_name: type_name.into(),
                not_struct: None,
                members: Vec::new(),
            },
        }
    }

    /// The standard record shape with the given field struct.
    pub fn standard(type_name: impl Into<String>, fields: StructShape) -> Self {
        Self::builder(type_name).id().created_time().fields(fields).build()
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the non-struct kind this type was declared as, if any.
    pub fn not_struct(&self) -> Option<&str> {
        self.not_struct.as_deref()
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    /// The struct shape of the `Fields` member, if it is a struct.
    pub fn fields(&self) -> Option<&StructShape> {
        match self.member(FIELDS).map(|m| &m.kind) {
            Some(MemberKind::Struct(shape)) => Some(shape),
            _ => None,
        }
    }
}

/// Builder for [`RecordShape`].
#[derive(Debug, Clone)]
pub struct RecordShapeBuilder {
    shape: RecordShape,
}

impl RecordShapeBuilder {
    /// Add a string `ID` member.
    pub fn id(self) -> Self {
        self.member(ID, MemberKind::String)
    }

    /// Add a timestamp `CreatedTime` member.
    pub fn created_time(self) -> Self {
        self.member(CREATED_TIME, MemberKind::Timestamp)
    }

    /// Add a struct `Fields` member.
    pub fn fields(self, fields: StructShape) -> Self {
        self.member(FIELDS, MemberKind::Struct(fields))
    }

    /// Add an arbitrary member.
    pub fn member(mut self, name: impl Into<String>, kind: MemberKind) -> Self {
        let name = name.into();
        self.shape.members.retain(|m| m.name != name);
        self.shape.members.push(Member { name, kind });
        self
    }

    /// Declare the described type as something other than a struct.
    pub fn not_struct(mut self, kind: impl Into<String>) -> Self {
        self.shape.not_struct = Some(kind.into());
        self
    }

    pub fn build(self) -> RecordShape {
        self.shape
    }
}
