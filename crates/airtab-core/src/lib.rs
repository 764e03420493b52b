//! airtab-core - typed records for the Airtable API
//!
//! This crate maps the service's JSON records onto user-defined record types
//! and drives list pagination. It does no I/O of its own: requests go through
//! a [`Transport`], normally `airtab_http::HttpTransport`.
//!
//! A record type is a [`Record`] whose payload implements [`Fields`]. The
//! [`fields!`] macro declares a payload struct together with its schema
//! descriptor, and [`Row`] is a ready-made record for any payload.
//!
//! # Example
//!
//! ```no_run
//! use airtab_core::{Client, Direction, Options, Row, Transport, fields};
//!
//! fields! {
//!     #[derive(Debug, Clone, Default)]
//!     pub struct Book {
//!         #[wire("Title")]
//!         pub title: String,
//!         #[wire("Rating")]
//!         pub rating: i64,
//!     }
//! }
//!
//! # fn example(transport: impl Transport + 'static) -> airtab_core::Result<()> {
//! let books = Client::new(transport).table("Books");
//!
//! let mut best: Vec<Row<Book>> = Vec::new();
//! let options = Options::new()
//!     .sort("rating", Direction::Desc)
//!     .filter_by_formula("{Rating} >= 4");
//! books.list(&mut best, Some(&options))?;
//!
//! for book in &best {
//!     println!("{}: {}", book.fields.title, book.fields.rating);
//! }
//! # Ok(())
//! # }
//! ```

mod macros;

pub mod codec;
pub mod error;
pub mod pagination;
pub mod query;
pub mod record;
pub mod schema;
pub mod table;
pub mod transport;
pub mod types;

// Re-export primary types at crate root for convenience
pub use error::{Error, ParseError, TypeError};
pub use pagination::Pages;
pub use query::{Direction, Options, SortKey};
pub use record::{FieldType, Fields, Record, Row, new_record};
pub use table::{Client, Table, WriteOptions};
pub use transport::{Method, ServiceError, Transport, check_for_service_error};
pub use types::{Attachment, Date, FieldValue, FieldValues, FormulaResult, Thumbnail, Thumbnails};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
