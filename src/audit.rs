// Transform reports - the counted audit trail the pipeline leaves behind.
// Every dropped or corrected row increments a named rule counter; reports
// are persisted to the audit_events table at the end of each layer.

use crate::error::Result;
use crate::schema::Layer;
use chrono::Utc;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-table record of what a transform did: rows in, rows out, and one
/// counter per cleansing rule that fired.
#[derive(Debug, Clone, Serialize)]
pub struct TransformReport {
    pub table: &'static str,
    pub rows_in: usize,
    pub rows_out: usize,
    counts: BTreeMap<&'static str, u64>,
}

impl TransformReport {
    pub fn new(table: &'static str) -> Self {
        TransformReport {
            table,
            rows_in: 0,
            rows_out: 0,
            counts: BTreeMap::new(),
        }
    }

    /// Increment a rule counter by one.
    pub fn bump(&mut self, rule: &'static str) {
        *self.counts.entry(rule).or_insert(0) += 1;
    }

    pub fn bump_by(&mut self, rule: &'static str, n: u64) {
        if n > 0 {
            *self.counts.entry(rule).or_insert(0) += n;
        }
    }

    /// Current count for a rule (0 if it never fired).
    pub fn count(&self, rule: &str) -> u64 {
        self.counts.get(rule).copied().unwrap_or(0)
    }

    pub fn rule_counts(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        self.counts.iter().map(|(rule, count)| (*rule, *count))
    }

    /// True when no rule fired at all.
    pub fn is_clean(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn summary(&self) -> String {
        if self.is_clean() {
            format!("{}: {} -> {} rows, clean", self.table, self.rows_in, self.rows_out)
        } else {
            let rules: Vec<String> = self
                .rule_counts()
                .map(|(rule, count)| format!("{rule}={count}"))
                .collect();
            format!(
                "{}: {} -> {} rows, {}",
                self.table,
                self.rows_in,
                self.rows_out,
                rules.join(", ")
            )
        }
    }
}

/// One executed layer: its reports plus wall-clock duration.
#[derive(Debug, Clone, Serialize)]
pub struct LayerRun {
    pub layer: Layer,
    pub reports: Vec<TransformReport>,
    pub duration_secs: f64,
}

impl LayerRun {
    pub fn total_rows_out(&self) -> usize {
        self.reports.iter().map(|r| r.rows_out).sum()
    }
}

/// Persist a layer's reports into the audit_events log, one row per rule
/// count, plus rows_in/rows_out for every table.
pub fn record_layer(
    conn: &Connection,
    run_id: &str,
    layer: Layer,
    reports: &[TransformReport],
) -> Result<()> {
    let recorded_at = Utc::now().to_rfc3339();
    let mut stmt = conn.prepare(
        "INSERT INTO audit_events (run_id, layer, table_name, rule, row_count, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;

    for report in reports {
        stmt.execute(params![
            run_id,
            layer.as_str(),
            report.table,
            "rows_in",
            report.rows_in as i64,
            recorded_at,
        ])?;
        stmt.execute(params![
            run_id,
            layer.as_str(),
            report.table,
            "rows_out",
            report.rows_out as i64,
            recorded_at,
        ])?;
        for (rule, count) in report.rule_counts() {
            stmt.execute(params![
                run_id,
                layer.as_str(),
                report.table,
                rule,
                count as i64,
                recorded_at,
            ])?;
        }
    }

    Ok(())
}
