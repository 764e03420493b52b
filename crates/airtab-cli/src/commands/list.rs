//! List records command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;

use airtab_core::{Client, Direction, Options};

use crate::columns::DynamicRecord;
use crate::output;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Table name
    pub table: String,

    /// Sort by a column, as NAME or NAME:desc. Repeatable; earlier keys win.
    #[arg(long, value_name = "NAME[:asc|desc]")]
    pub sort: Vec<String>,

    /// Only return these columns. Repeatable.
    #[arg(long = "field", value_name = "NAME")]
    pub fields: Vec<String>,

    /// Only return records for which this formula is true
    #[arg(long)]
    pub filter: Option<String>,

    /// Read records through a view
    #[arg(long)]
    pub view: Option<String>,

    /// Stop after this many records
    #[arg(long)]
    pub max_records: Option<u32>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

impl ListArgs {
    fn options(&self) -> Result<Options> {
        let mut options = Options::new();
        for sort in &self.sort {
            let (name, direction) = parse_sort(sort)?;
            options = options.sort(name, direction);
        }
        for field in &self.fields {
            options = options.field(field);
        }
        if let Some(filter) = &self.filter {
            options = options.filter_by_formula(filter);
        }
        if let Some(view) = &self.view {
            options = options.view(view);
        }
        if let Some(max) = self.max_records {
            options = options.max_records(max);
        }
        Ok(options)
    }
}

fn parse_sort(s: &str) -> Result<(&str, Direction)> {
    let Some((name, direction)) = s.rsplit_once(':') else {
        return Ok((s, Direction::Asc));
    };
    match direction.parse() {
        Ok(direction) if !name.is_empty() => Ok((name, direction)),
        Ok(_) => bail!("sort key '{s}' has an empty column name"),
        // Not a direction suffix, so the colon belongs to the column name.
        Err(_) => Ok((s, Direction::Asc)),
    }
}

pub fn run(client: &Client, args: ListArgs) -> Result<()> {
    let options = args.options()?;
    let table = client.table(&args.table);

    let mut count = 0usize;
    for page in table.pages::<DynamicRecord>(Some(&options))? {
        let page = page.with_context(|| format!("Failed to list records of {}", args.table))?;
        for record in &page {
            output::record(record, args.pretty)?;
        }
        count += page.len();
    }

    if count == 0 {
        eprintln!("{}", "No records found.".dimmed());
    }

    Ok(())
}
