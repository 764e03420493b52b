//! Update record command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;

use airtab_core::{Client, Row, WriteOptions};

use crate::columns;
use crate::output;

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Table name
    pub table: String,

    /// Record id
    pub id: String,

    /// Set a column, as NAME=VALUE. Repeatable. Columns not given are left
    /// as they are.
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub values: Vec<String>,

    /// Let the service convert values to the column types
    #[arg(long)]
    pub typecast: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub fn run(client: &Client, args: UpdateArgs) -> Result<()> {
    if args.values.is_empty() {
        bail!("Nothing to update. Pass at least one --set NAME=VALUE.");
    }

    let mut record = Row::new(columns::parse_assignments(&args.values)?);
    record.id = args.id.clone();

    client
        .table(&args.table)
        .update_with(&mut record, WriteOptions { typecast: args.typecast })
        .with_context(|| format!("Failed to update {} in {}", args.id, args.table))?;

    output::record(&record, args.pretty)
}
