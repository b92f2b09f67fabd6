mod cli;

use anstream::{eprintln as aeprintln, println as aprintln};
use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dynaquery::config::Config;
use dynaquery::storage::{DynamoDbTable, Fixture};
use dynaquery_core::storage::{GetItemOutput, QueryOutput, QueryTable};
use dynaquery_core::value::item_to_json;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.global.default_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    let table_name = cli
        .command
        .table()
        .map(str::to_string)
        .or_else(|| config.table_name.clone())
        .context("No table given. Pass --table or set DYNAQUERY_TABLE")?;

    let table: Box<dyn QueryTable> = match cli.command.fixture() {
        Some(path) => {
            let fixture = Fixture::from_path(path).await?;
            tracing::info!("reading fixture {}", path.display());
            Box::new(fixture.into_table(&table_name).await?)
        }
        None => {
            tracing::info!("reading from {}", config.target_display());
            Box::new(DynamoDbTable::from_config(&config).await)
        }
    };

    match &cli.command {
        Commands::Query(args) => {
            let output = table.query(&args.to_request(&table_name)?).await?;
            print_output(&output, cli.global.silent)?;
        }
        Commands::Scan(args) => {
            let output = table.scan(&args.to_request(&table_name)?).await?;
            print_output(&output, cli.global.silent)?;
        }
        Commands::Get(args) => {
            let output = table.get_item(&args.to_request(&table_name)?).await?;
            print_item(&output, cli.global.silent)?;
        }
    }
    Ok(())
}

fn print_item(output: &GetItemOutput, silent: bool) -> Result<()> {
    if let Some(item) = &output.item {
        aprintln!("{}", serde_json::to_string(&item_to_json(item))?);
    }

    if silent {
        return Ok(());
    }
    if output.item.is_none() {
        aeprintln!("No item with that key");
    }
    if let Some(capacity) = output.consumed_capacity.as_ref().and_then(|c| c.capacity_units) {
        aeprintln!("{capacity} read capacity units consumed");
    }
    Ok(())
}

fn print_output(output: &QueryOutput, silent: bool) -> Result<()> {
    for item in &output.items {
        aprintln!("{}", serde_json::to_string(&item_to_json(item))?);
    }

    if silent {
        return Ok(());
    }
    aeprintln!(
        "{} items ({} scanned)",
        output.count,
        output.scanned_count
    );
    if let Some(capacity) = output.consumed_capacity.as_ref().and_then(|c| c.capacity_units) {
        aeprintln!("{capacity} read capacity units consumed");
    }
    if let Some(key) = &output.last_evaluated_key {
        aeprintln!(
            "More items remain after {}",
            serde_json::to_string(&item_to_json(key))?
        );
    }
    Ok(())
}
