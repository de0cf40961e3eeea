//! Command-line interface for surreal-query
//!
//! # Usage Examples
//!
//! ## One-shot query
//! ```bash
//! surreal-query query \
//!   --host localhost --namespace shop --database main \
//!   --username root --password root \
//!   --query 'SELECT * FROM person WHERE age > $age' \
//!   --param age=18 --fetch-type FETCH
//! ```
//!
//! ## Polling trigger
//! ```bash
//! # Print one JSON line per tick that returned rows
//! surreal-query watch --config trigger.yaml --interval 30s --max-events 10
//! ```
//!
//! Logging is controlled with `RUST_LOG` (e.g. `RUST_LOG=surreal_query=debug`).

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use surreal_query::config::{polling_trigger, query_task, variables};
use surreal_query::watch::{setup_shutdown_handler, watch, WatchOptions};
use surreal_query::{QueryOpts, WatchOpts};
use surreal_query_storage::FilesystemStorage;
use surreal_query_task::RunContext;

#[derive(Parser)]
#[command(name = "surreal-query")]
#[command(about = "Run SurrealQL queries once or on a schedule")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a query once and print its output as JSON
    Query(QueryOpts),

    /// Run a query every interval and print an event for each tick that returned rows
    Watch(WatchOpts),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Query(opts) => {
            let task = query_task(&opts)?;
            let ctx = run_context(&opts)?;

            let output = task.run(&ctx).await.context("Query failed")?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Watch(opts) => {
            let trigger = polling_trigger(&opts)?;
            let ctx = run_context(&opts.query)?;
            let options = WatchOptions {
                max_events: opts.max_events,
                fail_fast: opts.fail_fast,
            };

            let shutdown = setup_shutdown_handler();
            let mut stdout = std::io::stdout();
            let summary = watch(&trigger, &ctx, options, shutdown, |event| {
                serde_json::to_writer(&mut stdout, event)?;
                stdout.write_all(b"\n")?;
                stdout.flush()?;
                Ok(())
            })
            .await?;

            tracing::info!(
                "Stopped after {} ticks: {} events, {} failed ticks",
                summary.ticks,
                summary.events,
                summary.failures
            );
        }
    }

    Ok(())
}

fn run_context(opts: &QueryOpts) -> anyhow::Result<RunContext> {
    let renderer = variables(&opts.vars)?;
    let storage = FilesystemStorage::new(&opts.storage_dir);
    Ok(RunContext::new(Arc::new(renderer), Arc::new(storage)))
}
