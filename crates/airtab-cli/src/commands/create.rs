//! Create record command implementation.

use anyhow::{Context, Result};
use clap::Args;

use airtab_core::{Client, Row, WriteOptions};

use crate::columns;
use crate::output;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Table name
    pub table: String,

    /// Set a column, as NAME=VALUE. Repeatable.
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub values: Vec<String>,

    /// Let the service convert values to the column types
    #[arg(long)]
    pub typecast: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub fn run(client: &Client, args: CreateArgs) -> Result<()> {
    let mut record = Row::new(columns::parse_assignments(&args.values)?);

    client
        .table(&args.table)
        .create_with(&mut record, WriteOptions { typecast: args.typecast })
        .with_context(|| format!("Failed to create record in {}", args.table))?;

    output::record(&record, args.pretty)
}
