//! Delete record command implementation.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use airtab_core::Client;

use crate::columns::DynamicRecord;
use crate::output;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Table name
    pub table: String,

    /// Record id
    pub id: String,
}

pub fn run(client: &Client, args: DeleteArgs) -> Result<()> {
    let mut record = DynamicRecord::default();
    record.id = args.id.clone();

    client
        .table(&args.table)
        .delete(&mut record)
        .with_context(|| format!("Failed to delete {} from {}", args.id, args.table))?;

    output::json(&json!({ "id": args.id, "deleted": true }))?;
    output::success(&format!("Deleted {}", args.id));
    Ok(())
}
