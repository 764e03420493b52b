//! Subcommand implementations.

pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use anyhow::{Context, Result};
use tracing::debug;

use crate::cli::{Cli, Commands};
use crate::columns;

pub fn handle(cli: Cli) -> Result<()> {
    columns::register(&cli.columns);

    let config = cli.connection.config()?;
    debug!(base = config.base_id(), root = %config.root_url(), "connecting");
    let client = airtab_http::connect(config).context("Failed to create client")?;

    match cli.command {
        Commands::Get(args) => get::run(&client, args),
        Commands::List(args) => list::run(&client, args),
        Commands::Create(args) => create::run(&client, args),
        Commands::Update(args) => update::run(&client, args),
        Commands::Delete(args) => delete::run(&client, args),
    }
}
