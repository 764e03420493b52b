//! List options and their query string encoding.

use std::fmt;
use std::str::FromStr;

use url::form_urlencoded;

use crate::Result;
use crate::error::Error;
use crate::schema::{RecordShape, resolve_wire_name};

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Direction::Asc),
            "desc" => Ok(Direction::Desc),
            _ => Err(Error::config(format!(
                "invalid sort direction '{s}': expected asc or desc"
            ))),
        }
    }
}

/// One sort key: a logical field name and a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: Direction,
}

/// Options for listing records.
///
/// Field names are logical names; they are translated to wire names when
/// the query is encoded. Options are copied by [`Table::list`](crate::Table::list)
/// before pagination starts, so one value can be reused across calls and
/// threads.
///
/// # Example
///
/// ```
/// use airtab_core::{Direction, Options};
///
/// let options = Options::new()
///     .sort("name", Direction::Desc)
///     .field("name")
///     .filter_by_formula("{Rating} > 3")
///     .max_records(50);
/// assert_eq!(options.sorts().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    sort: Vec<SortKey>,
    fields: Vec<String>,
    max_records: Option<u32>,
    filter_by_formula: Option<String>,
    view: Option<String>,
    typecast: bool,
    pub(crate) offset: Option<String>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sort key. Keys apply in the order they are added.
    pub fn sort(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.sort.push(SortKey {
            field: field.into(),
            direction,
        });
        self
    }

    /// Only return this field. May be called repeatedly.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.fields.push(field.into());
        self
    }

    /// Stop after this many records in total.
    pub fn max_records(mut self, max: u32) -> Self {
        self.max_records = Some(max);
        self
    }

    /// Only return records for which the formula is truthy.
    ///
    /// The formula is passed to the service as is.
    pub fn filter_by_formula(mut self, formula: impl Into<String>) -> Self {
        self.filter_by_formula = Some(formula.into());
        self
    }

    /// Return the records of a view, in the view's order.
    pub fn view(mut self, view: impl Into<String>) -> Self {
        self.view = Some(view.into());
        self
    }

    /// Ask the service to convert values to the column types.
    pub fn typecast(mut self, typecast: bool) -> Self {
        self.typecast = typecast;
        self
    }

    pub fn sorts(&self) -> &[SortKey] {
        &self.sort
    }

    pub fn selected_fields(&self) -> &[String] {
        &self.fields
    }

    pub fn max_records_value(&self) -> Option<u32> {
        self.max_records
    }

    /// Encode as a query string for records of `shape`.
    ///
    /// Parameters come in a fixed order: `offset`, `typecast`,
    /// `filterByFormula`, `view`, `maxRecords`, then `sort[i][field]` and
    /// `sort[i][direction]` for each sort key, then `fields[i]` for each
    /// selected field. Keys and values are form encoded. Default options
    /// encode to an empty string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] if a sort key or selected field is not
    /// a field of the record.
    pub fn encode(&self, shape: &RecordShape) -> Result<String> {
        let mut query = form_urlencoded::Serializer::new(String::new());

        if let Some(offset) = self.offset.as_deref().filter(|o| !o.is_empty()) {
            query.append_pair("offset", offset);
        }
        if self.typecast {
            query.append_pair("typecast", "true");
        }
        if let Some(formula) = &self.filter_by_formula {
            query.append_pair("filterByFormula", formula);
        }
        if let Some(view) = &self.view {
            query.append_pair("view", view);
        }
        if let Some(max) = self.max_records {
            query.append_pair("maxRecords", &max.to_string());
        }

        for (i, key) in self.sort.iter().enumerate() {
            let field = resolve_wire_name(&key.field, shape)?;
            query.append_pair(&format!("sort[{i}][field]"), field);
            query.append_pair(&format!("sort[{i}][direction]"), key.direction.as_str());
        }

        for (i, name) in self.fields.iter().enumerate() {
            let field = resolve_wire_name(name, shape)?;
            query.append_pair(&format!("fields[{i}]"), field);
        }

        Ok(query.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDescriptor, FieldKind, StructShape};

    fn shape() -> RecordShape {
        RecordShape::standard(
            "Main",
            StructShape::new("MainFields")
                .with(FieldDescriptor::new("name", FieldKind::Text).rename("Name"))
                .with(FieldDescriptor::new("when", FieldKind::Date).rename("When?"))
                .field("Notes", FieldKind::Text),
        )
    }

    #[test]
    fn default_options_encode_empty() {
        assert_eq!(Options::default().encode(&shape()).unwrap(), "");
    }

    #[test]
    fn sort_uses_wire_names() {
        let query = Options::new()
            .sort("name", Direction::Desc)
            .encode(&shape())
            .unwrap();
        assert_eq!(
            query,
            "sort%5B0%5D%5Bfield%5D=Name&sort%5B0%5D%5Bdirection%5D=desc"
        );
    }

    #[test]
    fn sorts_and_fields_are_indexed() {
        let query = Options::new()
            .sort("name", Direction::Asc)
            .sort("when", Direction::Desc)
            .field("Notes")
            .field("when")
            .field("name")
            .encode(&shape())
            .unwrap();

        let pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("sort[0][field]".into(), "Name".into()),
                ("sort[0][direction]".into(), "asc".into()),
                ("sort[1][field]".into(), "When?".into()),
                ("sort[1][direction]".into(), "desc".into()),
                ("fields[0]".into(), "Notes".into()),
                ("fields[1]".into(), "When?".into()),
                ("fields[2]".into(), "Name".into()),
            ]
        );
        assert!(query.contains("When%3F"));
    }

    #[test]
    fn scalar_options_come_first_in_order() {
        let mut options = Options::new()
            .field("name")
            .max_records(3)
            .view("Grid view")
            .filter_by_formula("AND({Rating} > 3, NOT({Check}))")
            .typecast(true);
        options.offset = Some("itr123/rec456".to_string());

        let query = options.encode(&shape()).unwrap();
        assert_eq!(
            query,
            "offset=itr123%2Frec456&typecast=true\
             &filterByFormula=AND%28%7BRating%7D+%3E+3%2C+NOT%28%7BCheck%7D%29%29\
             &view=Grid+view&maxRecords=3&fields%5B0%5D=Name"
        );
    }

    #[test]
    fn empty_offset_is_omitted() {
        let mut options = Options::new();
        options.offset = Some(String::new());
        assert_eq!(options.encode(&shape()).unwrap(), "");
    }

    #[test]
    fn unknown_sort_field_fails() {
        let err = Options::new()
            .sort("Rating", Direction::Asc)
            .encode(&shape())
            .unwrap_err();
        assert!(matches!(err, Error::UnknownField { ref field, .. } if field == "Rating"));
    }

    #[test]
    fn unknown_selected_field_fails() {
        let err = Options::new().field("Name").encode(&shape()).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn direction_parses() {
        assert_eq!("DESC".parse::<Direction>().unwrap(), Direction::Desc);
        assert_eq!("asc".parse::<Direction>().unwrap(), Direction::Asc);
        assert!("up".parse::<Direction>().is_err());
    }
}
