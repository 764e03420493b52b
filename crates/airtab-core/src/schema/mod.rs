//! Schema descriptors and the checks built on them.
//!
//! A record type registers a [`RecordShape`] describing its members and the
//! fields of its `Fields` struct. Everything that needs to know a record's
//! layout (validation, name resolution, the codec) works from this descriptor.

mod resolve;
mod shape;
mod validate;

pub use resolve::resolve_wire_name;
pub use shape::{
    CREATED_TIME, FIELDS, FieldDescriptor, FieldKind, ID, Member, MemberKind, RecordShape,
    RecordShapeBuilder, StructShape,
};
pub use validate::{Mode, validate};

pub(crate) use validate::has_created_time;
