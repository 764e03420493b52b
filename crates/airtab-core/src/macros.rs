//! The `fields!` macro.

/// Declare a payload struct and register its schema descriptor.
///
/// Every field's type must implement [`FieldType`](crate::FieldType). A field
/// uses its Rust name on the wire unless it carries a `#[wire("...")]`
/// rename. The struct must derive (or implement) `Default`.
///
/// Fields may carry doc comments before the `#[wire]` attribute; other
/// field attributes are not accepted.
///
/// The macro implements [`Fields`](crate::Fields) for the struct, and
/// [`FieldType`](crate::FieldType) so it can be nested inside another
/// payload.
///
/// # Example
///
/// ```
/// use airtab_core::{Date, Fields, FormulaResult, fields};
///
/// fields! {
///     #[derive(Debug, Clone, Default, PartialEq)]
///     pub struct Main {
///         /// Due date.
///         #[wire("When?")]
///         pub when: Date,
///         #[wire("Name")]
///         pub name: String,
///         #[wire("Formula")]
///         pub formula: FormulaResult,
///     }
/// }
///
/// let shape = Main::shape();
/// assert_eq!(shape.get("when").unwrap().wire_name(), "When?");
/// ```
#[macro_export]
macro_rules! fields {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[doc = $doc:literal])*
                $(#[wire($wire:literal)])?
                $fvis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[doc = $doc])*
                $fvis $field: $ty,
            )*
        }

        impl $crate::Fields for $name {
            fn shape() -> $crate::schema::StructShape {
                #[allow(unused_mut)]
                let mut shape = $crate::schema::StructShape::new(stringify!($name));
                $(
                    shape.push(
                        $crate::schema::FieldDescriptor::new(
                            stringify!($field),
                            <$ty as $crate::FieldType>::kind(),
                        )
                        $(.rename($wire))?
                        .bounds(<$ty as $crate::FieldType>::bounds())
                    );
                )*
                shape
            }

            fn to_values(&self) -> $crate::FieldValues {
                #[allow(unused_mut)]
                let mut values = $crate::FieldValues::new();
                $(
                    values.insert(
                        stringify!($field),
                        <$ty as $crate::FieldType>::to_value(&self.$field),
                    );
                )*
                values
            }

            #[allow(unused_variables)]
            fn apply_values(&mut self, values: $crate::FieldValues) -> $crate::Result<()> {
                for (name, value) in values {
                    $(
                        if name == stringify!($field) {
                            self.$field = <$ty as $crate::FieldType>::assign(
                                value,
                                stringify!($name),
                                &name,
                            )?;
                            continue;
                        }
                    )*
                    return Err($crate::Error::UnknownField {
                        field: name,
                        type_name: stringify!($name).to_string(),
                    });
                }
                Ok(())
            }
        }

        impl $crate::FieldType for $name {
            fn kind() -> $crate::schema::FieldKind {
                $crate::schema::FieldKind::Struct(<Self as $crate::Fields>::shape())
            }

            fn to_value(&self) -> $crate::FieldValue {
                $crate::FieldValue::Struct($crate::Fields::to_values(self))
            }

            fn from_value(
                value: $crate::FieldValue,
            ) -> ::std::result::Result<Self, $crate::FieldValue> {
                match value {
                    $crate::FieldValue::Struct(values) => {
                        let mut out = <Self as ::std::default::Default>::default();
                        match $crate::Fields::apply_values(&mut out, values.clone()) {
                            Ok(()) => Ok(out),
                            Err(_) => Err($crate::FieldValue::Struct(values)),
                        }
                    }
                    other => Err(other),
                }
            }

            fn assign(
                value: $crate::FieldValue,
                owner: &str,
                field: &str,
            ) -> $crate::Result<Self> {
                match value {
                    $crate::FieldValue::Struct(values) => {
                        let mut out = <Self as ::std::default::Default>::default();
                        $crate::Fields::apply_values(&mut out, values)?;
                        Ok(out)
                    }
                    other => Err($crate::Error::field_mismatch(
                        owner,
                        field,
                        <Self as $crate::FieldType>::kind(),
                        &other,
                    )),
                }
            }
        }
    };
}
