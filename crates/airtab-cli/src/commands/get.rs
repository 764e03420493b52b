//! Get record command implementation.

use anyhow::{Context, Result};
use clap::Args;

use airtab_core::Client;

use crate::columns::DynamicRecord;
use crate::output;

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Table name
    pub table: String,

    /// Record id
    pub id: String,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub fn run(client: &Client, args: GetArgs) -> Result<()> {
    let mut record = DynamicRecord::default();
    client
        .table(&args.table)
        .get(&args.id, &mut record)
        .with_context(|| format!("Failed to get {} from {}", args.id, args.table))?;

    output::record(&record, args.pretty)
}
