//! The table façade: get, list, create, update and delete records.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::Result;
use crate::codec::{DeleteEnvelope, decode_into, encode_for_write};
use crate::error::Error;
use crate::pagination::Pages;
use crate::query::Options;
use crate::record::Record;
use crate::schema::{Mode, validate};
use crate::transport::{Method, Transport};

/// Options for create and update requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Ask the service to convert values to the column types, e.g. to create
    /// missing select options.
    pub typecast: bool,
}

/// Entry point holding the transport shared by every table.
///
/// # Example
///
/// ```no_run
/// # use airtab_core::{Client, Result, Transport, Method, Row, fields};
/// # struct Http;
/// # impl Transport for Http {
/// #     fn request(&self, _: Method, _: &str, _: &str, _: Option<&[u8]>) -> Result<Vec<u8>> {
/// #         unimplemented!()
/// #     }
/// # }
/// fields! {
///     #[derive(Debug, Clone, Default)]
///     pub struct Book {
///         #[wire("Title")]
///         pub title: String,
///     }
/// }
///
/// # fn main() -> Result<()> {
/// let client = Client::new(Http);
/// let books = client.table("Books");
///
/// let mut book = Row::new(Book { title: "Binti".to_string() });
/// books.create(&mut book)?;
/// println!("created {}", book.id);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
}

impl Client {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Use a transport that is already shared.
    pub fn from_arc(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// A façade for the table called `name`.
    pub fn table(&self, name: impl Into<String>) -> Table {
        Table {
            name: name.into(),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

/// Operations on one table.
///
/// Every operation checks the record type against the record contract first
/// and fails with [`Error::Type`] before any request if it does not hold.
#[derive(Clone)]
pub struct Table {
    name: String,
    transport: Arc<dyn Transport>,
}

impl Table {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> String {
        urlencoding::encode(&self.name).into_owned()
    }

    fn record_path(&self, id: &str) -> String {
        format!("{}/{}", self.path(), urlencoding::encode(id))
    }

    fn require_id(&self, id: &str, operation: &'static str) -> Result<()> {
        if id.is_empty() {
            return Err(Error::NotPersisted {
                table: self.name.clone(),
                operation,
            });
        }
        Ok(())
    }

    /// Fetch the record `id` into `record`.
    ///
    /// The id, creation time and all fields of `record` are replaced.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::NotPersisted`] for an empty `id`, without a
    /// request.
    #[instrument(skip(self, record), fields(table = %self.name))]
    pub fn get<R: Record>(&self, id: &str, record: &mut R) -> Result<()> {
        let shape = R::shape();
        validate(&shape, Mode::Single)?;
        self.require_id(id, "get")?;

        let bytes = self
            .transport
            .request(Method::Get, &self.record_path(id), "", None)?;
        decode_into(&bytes, &shape, record)?;

        debug!("fetched record");
        Ok(())
    }

    /// Append every record matching `options` to `records`, page by page.
    ///
    /// Records arrive in the service's order. If a page fails, the records of
    /// the pages before it stay in `records` and the error is returned.
    ///
    /// # Errors
    ///
    /// Besides transport and decode errors, fails with
    /// [`Error::UnknownField`] if a sort key or selected field is not a field
    /// of the record, and [`Error::RepeatedCursor`] if the service hands back
    /// the cursor a page was requested with.
    #[instrument(skip(self, records, options), fields(table = %self.name))]
    pub fn list<R: Record>(&self, records: &mut Vec<R>, options: Option<&Options>) -> Result<()> {
        let before = records.len();
        let result = self.pages::<R>(options)?.collect_into(records);
        debug!(count = records.len() - before, "listed records");
        result
    }

    /// The pages of a list request, fetched lazily.
    ///
    /// The record type is validated here; nothing is requested until the
    /// first page is pulled.
    pub fn pages<R: Record>(&self, options: Option<&Options>) -> Result<Pages<'_, R>> {
        let shape = R::shape();
        validate(&shape, Mode::Collection)?;

        Ok(Pages::new(
            &*self.transport,
            &self.name,
            self.path(),
            shape,
            options.cloned().unwrap_or_default(),
        ))
    }

    /// Create `record` on the service.
    ///
    /// On success the id, creation time and fields the service returned are
    /// written back onto `record`.
    pub fn create<R: Record>(&self, record: &mut R) -> Result<()> {
        self.create_with(record, WriteOptions::default())
    }

    #[instrument(skip(self, record), fields(table = %self.name))]
    pub fn create_with<R: Record>(&self, record: &mut R, options: WriteOptions) -> Result<()> {
        let shape = R::shape();
        validate(&shape, Mode::Single)?;

        let body = encode_for_write(record, &shape, options.typecast)?;
        let bytes = self
            .transport
            .request(Method::Post, &self.path(), "", Some(&body))?;
        decode_into(&bytes, &shape, record)?;

        debug!(id = record.id(), "created record");
        Ok(())
    }

    /// Send the fields of `record` to the service.
    ///
    /// Fields left at their zero value are sent as well. The response is
    /// written back onto `record`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::NotPersisted`] if `record` has no id.
    pub fn update<R: Record>(&self, record: &mut R) -> Result<()> {
        self.update_with(record, WriteOptions::default())
    }

    #[instrument(skip(self, record), fields(table = %self.name, id = record.id()))]
    pub fn update_with<R: Record>(&self, record: &mut R, options: WriteOptions) -> Result<()> {
        let shape = R::shape();
        validate(&shape, Mode::Single)?;
        self.require_id(record.id(), "update")?;

        let body = encode_for_write(record, &shape, options.typecast)?;
        let bytes = self.transport.request(
            Method::Patch,
            &self.record_path(record.id()),
            "",
            Some(&body),
        )?;
        decode_into(&bytes, &shape, record)?;

        debug!("updated record");
        Ok(())
    }

    /// Delete `record` on the service and clear its id and creation time.
    ///
    /// Only the local value passed in is cleared; copies of it are not.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::NotPersisted`] if `record` has no id, and with
    /// [`Error::NotDeleted`] (leaving `record` untouched) if the service does
    /// not confirm the deletion.
    #[instrument(skip(self, record), fields(table = %self.name, id = record.id()))]
    pub fn delete<R: Record>(&self, record: &mut R) -> Result<()> {
        let shape = R::shape();
        validate(&shape, Mode::Single)?;
        self.require_id(record.id(), "delete")?;

        let bytes = self
            .transport
            .request(Method::Delete, &self.record_path(record.id()), "", None)?;
        let response: DeleteEnvelope = serde_json::from_slice(&bytes)?;
        if !response.deleted {
            return Err(Error::NotDeleted {
                table: self.name.clone(),
                id: record.id().to_string(),
                response: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        debug!(deleted = %response.id, "deleted record");
        record.set_id(String::new());
        record.set_created_time(None);
        Ok(())
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Row;

    crate::fields! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct Note {
            #[wire("Text")]
            text: String,
        }
    }

    struct Unreachable;

    impl Transport for Unreachable {
        fn request(&self, method: Method, path: &str, _: &str, _: Option<&[u8]>) -> Result<Vec<u8>> {
            panic!("unexpected request {method} {path}");
        }
    }

    #[test]
    fn paths_are_escaped() {
        let table = Client::new(Unreachable).table("My Table/2");
        assert_eq!(table.path(), "My%20Table%2F2");
        assert_eq!(table.record_path("rec 1"), "My%20Table%2F2/rec%201");
    }

    #[test]
    fn update_requires_id() {
        let table = Client::new(Unreachable).table("Notes");
        let mut note = Row::new(Note::default());
        let err = table.update(&mut note).unwrap_err();
        assert_eq!(err.to_string(), "Notes: cannot update a record without an ID");
    }

    #[test]
    fn get_requires_id() {
        let table = Client::new(Unreachable).table("Notes");
        let mut note = Row::new(Note::default());
        let err = table.get("", &mut note).unwrap_err();
        assert_eq!(err.to_string(), "Notes: cannot get a record without an ID");
    }

    #[test]
    fn delete_requires_id() {
        let table = Client::new(Unreachable).table("Notes");
        let mut note = Row::new(Note::default());
        assert!(matches!(
            table.delete(&mut note),
            Err(Error::NotPersisted { operation: "delete", .. })
        ));
    }

    #[test]
    fn client_and_table_are_shareable() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<Client>();
        assert_send_sync::<Table>();
    }
}
