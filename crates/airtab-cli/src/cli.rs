//! CLI argument definitions.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use airtab_http::Config;

use crate::columns::ColumnSpec;
use crate::commands::{create, delete, get, list, update};

/// Read and write records in Airtable tables.
#[derive(Parser, Debug)]
#[command(name = "airtab")]
#[command(author, version = env!("AIRTAB_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Declare a table column as NAME:KIND (text, number, float, checkbox,
    /// date, list, attachments, formula). Repeatable.
    #[arg(long = "column", value_name = "NAME:KIND", global = true)]
    pub columns: Vec<ColumnSpec>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a single record
    Get(get::GetArgs),

    /// List the records of a table
    List(list::ListArgs),

    /// Create a record
    Create(create::CreateArgs),

    /// Update fields of an existing record
    Update(update::UpdateArgs),

    /// Delete a record
    Delete(delete::DeleteArgs),
}

/// Where and how to reach the service.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// API key
    #[arg(long, env = "AIRTABLE_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Base id (app...)
    #[arg(long, env = "AIRTABLE_BASE_ID", global = true)]
    pub base: Option<String>,

    /// API root URL
    #[arg(long, env = "AIRTABLE_ROOT_URL", global = true)]
    pub root_url: Option<String>,

    /// API version path segment
    #[arg(long, env = "AIRTABLE_VERSION", global = true)]
    pub api_version: Option<String>,

    /// Disable client-side rate limiting
    #[arg(long, env = "AIRTABLE_NO_LIMIT", global = true)]
    pub no_limit: bool,
}

impl ConnectionArgs {
    pub fn config(&self) -> Result<Config> {
        let api_key = self
            .api_key
            .clone()
            .context("No API key. Pass --api-key or set AIRTABLE_API_KEY.")?;
        let base = self
            .base
            .clone()
            .context("No base id. Pass --base or set AIRTABLE_BASE_ID.")?;

        let mut builder = Config::builder(api_key, base)
            .user_agent(format!("airtab-cli/{}", env!("AIRTAB_VERSION")));
        if let Some(root) = &self.root_url {
            builder = builder.root_url(root);
        }
        if let Some(version) = &self.api_version {
            builder = builder.version(version);
        }
        if self.no_limit {
            builder = builder.no_rate_limit();
        }

        builder.build().context("Invalid connection settings")
    }
}
