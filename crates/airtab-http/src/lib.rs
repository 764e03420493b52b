//! airtab-http - blocking HTTP transport for airtab
//!
//! [`HttpTransport`] implements [`airtab_core::Transport`] on top of a
//! blocking `reqwest` client: it builds
//! `{root}/{version}/{base}/{table}[/{id}]?{query}` URLs, sends the bearer
//! API key, rate limits and retries requests, and reports the service's
//! error envelopes as request errors.
//!
//! # Example
//!
//! ```no_run
//! use airtab_core::{Row, fields};
//! use airtab_http::{Config, connect};
//!
//! fields! {
//!     #[derive(Debug, Clone, Default)]
//!     pub struct Book {
//!         #[wire("Title")]
//!         pub title: String,
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = connect(Config::builder("keyXXXX", "appXXXX").build()?)?;
//!
//! let mut book = Row::<Book>::default();
//! client.table("Books").get("recXXXX", &mut book)?;
//! println!("{}", book.fields.title);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod rate_limit;

pub use client::HttpTransport;
pub use config::{Config, ConfigBuilder, RetryPolicy, RootUrl};
pub use error::ConfigError;
pub use rate_limit::{RateLimitConfig, RateLimiter};

/// A client whose tables talk to the service over HTTP.
pub fn connect(config: Config) -> Result<airtab_core::Client, ConfigError> {
    Ok(airtab_core::Client::new(HttpTransport::new(config)?))
}

/// Like [`connect`], configured from the `AIRTABLE_*` environment variables.
pub fn connect_from_env() -> Result<airtab_core::Client, ConfigError> {
    connect(Config::from_env()?)
}
