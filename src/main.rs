use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

use medallion_warehouse::logging::init_logging;
use medallion_warehouse::pipeline::{run_full_pipeline, run_layer};
use medallion_warehouse::schema::{setup_database, Layer};
use medallion_warehouse::WarehouseConfig;

#[derive(Parser)]
#[command(name = "medallion-warehouse")]
#[command(about = "CSV-to-SQLite medallion data warehouse for CRM and ERP extracts")]
#[command(version)]
struct Cli {
    /// SQLite database file (overrides DW_DATABASE)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Directory holding source_crm/ and source_erp/ (overrides DW_DATASETS)
    #[arg(long)]
    datasets: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the warehouse schema (all layers plus the audit log)
    Init,
    /// Load the raw CSV extracts into the bronze tables
    Bronze,
    /// Cleanse the bronze tables into the silver layer
    Silver,
    /// Build the gold star schema from the silver layer
    Gold,
    /// Run the full pipeline: init, bronze, silver, gold
    Run {
        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = WarehouseConfig::from_env();
    if let Some(database) = cli.database {
        config.database = database;
    }
    if let Some(datasets) = cli.datasets {
        config.datasets = datasets;
    }

    init_logging(config.log_dir.as_deref());

    let conn = config
        .open_database()
        .with_context(|| format!("opening warehouse database {}", config.database.display()))?;

    match cli.command {
        Commands::Init => {
            setup_database(&conn)?;
            info!(database = %config.database.display(), "warehouse schema ready");
        }
        Commands::Bronze => {
            setup_database(&conn)?;
            run_single_layer(&conn, &config, Layer::Bronze)?;
        }
        Commands::Silver => {
            setup_database(&conn)?;
            run_single_layer(&conn, &config, Layer::Silver)?;
        }
        Commands::Gold => {
            setup_database(&conn)?;
            run_single_layer(&conn, &config, Layer::Gold)?;
        }
        Commands::Run { json } => {
            let summary = run_full_pipeline(&conn, &config).context("pipeline run failed")?;
            if json {
                println!("{}", summary.to_json()?);
            } else {
                for layer_run in &summary.layers {
                    println!("[{}] {:.2}s", layer_run.layer, layer_run.duration_secs);
                    for report in &layer_run.reports {
                        println!("  {}", report.summary());
                    }
                }
                println!("run {} finished in {:.2}s", summary.run_id, summary.total_secs);
            }
        }
    }

    Ok(())
}

fn run_single_layer(
    conn: &rusqlite::Connection,
    config: &WarehouseConfig,
    layer: Layer,
) -> Result<()> {
    let run_id = Uuid::new_v4().to_string();
    let layer_run = run_layer(conn, config, layer, &run_id)
        .with_context(|| format!("{layer} layer failed"))?;

    for report in &layer_run.reports {
        println!("{}", report.summary());
    }
    println!(
        "[{}] {} rows loaded in {:.2}s",
        layer_run.layer,
        layer_run.total_rows_out(),
        layer_run.duration_secs
    );

    Ok(())
}
