// Orchestrator - runs the layers in order with per-layer timings and a
// persisted audit trail. No dependency graph, no retries: a failed layer
// aborts the run and downstream tables stay stale until the next rerun.

use crate::audit::{record_layer, LayerRun};
use crate::bronze;
use crate::config::WarehouseConfig;
use crate::error::Result;
use crate::gold;
use crate::schema::{setup_database, Layer};
use crate::silver;
use rusqlite::Connection;
use serde::Serialize;
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

/// Everything one pipeline invocation did, layer by layer.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub layers: Vec<LayerRun>,
    pub total_secs: f64,
}

impl RunSummary {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Execute a single layer, record its reports, and return the timed run.
pub fn run_layer(
    conn: &Connection,
    config: &WarehouseConfig,
    layer: Layer,
    run_id: &str,
) -> Result<LayerRun> {
    info!(layer = %layer, "starting layer");
    let start = Instant::now();

    let reports = match layer {
        Layer::Bronze => bronze::run_bronze_layer(conn, config)?,
        Layer::Silver => silver::run_silver_layer(conn)?,
        Layer::Gold => gold::run_gold_layer(conn)?,
    };

    record_layer(conn, run_id, layer, &reports)?;

    let duration_secs = start.elapsed().as_secs_f64();
    info!(layer = %layer, duration_secs, "layer complete");

    Ok(LayerRun {
        layer,
        reports,
        duration_secs,
    })
}

/// Run the whole pipeline: schema setup, then bronze -> silver -> gold.
pub fn run_full_pipeline(conn: &Connection, config: &WarehouseConfig) -> Result<RunSummary> {
    let run_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    setup_database(conn)?;

    let mut layers = Vec::with_capacity(3);
    for layer in [Layer::Bronze, Layer::Silver, Layer::Gold] {
        layers.push(run_layer(conn, config, layer, &run_id)?);
    }

    let total_secs = start.elapsed().as_secs_f64();
    info!(run_id = %run_id, total_secs, "pipeline complete");

    Ok(RunSummary {
        run_id,
        layers,
        total_secs,
    })
}
