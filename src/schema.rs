// Warehouse DDL - bronze/silver/gold tables plus the audit event log.
// Postgres-style schemas become table-name prefixes in SQLite.

use crate::error::Result;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

/// The three medallion layers, in load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layer {
    Bronze,
    Silver,
    Gold,
}

impl Layer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Bronze => "bronze",
            Layer::Silver => "silver",
            Layer::Gold => "gold",
        }
    }

    /// Tables owned by this layer, in creation order.
    pub fn tables(&self) -> &'static [&'static str] {
        match self {
            Layer::Bronze => &[
                "bronze_crm_customer_info",
                "bronze_crm_product_info",
                "bronze_crm_sales_details",
                "bronze_erp_customer_info",
                "bronze_erp_location",
                "bronze_erp_product_category",
            ],
            Layer::Silver => &[
                "silver_crm_customer_info",
                "silver_crm_product_info",
                "silver_crm_sales_details",
                "silver_erp_customer_info",
                "silver_erp_location",
                "silver_erp_product_category",
            ],
            Layer::Gold => &[
                "gold_dim_customers",
                "gold_dim_products",
                "gold_fact_sales",
            ],
        }
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // WAL keeps reruns cheap when a previous run aborted mid-layer
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // ==========================================================================
    // Bronze: raw CSV rows, loosely typed, duplicates and nulls allowed
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS bronze_crm_customer_info (
            cst_id INTEGER,
            cst_key TEXT,
            cst_firstname TEXT,
            cst_lastname TEXT,
            cst_marital_status TEXT,
            cst_gndr TEXT,
            cst_create_date TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS bronze_crm_product_info (
            prd_id INTEGER,
            prd_key TEXT,
            prd_nm TEXT,
            prd_cost REAL,
            prd_line TEXT,
            prd_start_dt TEXT,
            prd_end_dt TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS bronze_crm_sales_details (
            sls_ord_num TEXT,
            sls_prd_key TEXT,
            sls_cust_id INTEGER,
            sls_order_dt INTEGER,
            sls_ship_dt INTEGER,
            sls_due_dt INTEGER,
            sls_sales REAL,
            sls_quantity INTEGER,
            sls_price REAL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS bronze_erp_customer_info (
            cid TEXT,
            bdate TEXT,
            gen TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS bronze_erp_location (
            cid TEXT,
            cntry TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS bronze_erp_product_category (
            id TEXT,
            cat TEXT,
            subcat TEXT,
            maintenance TEXT
        )",
        [],
    )?;

    // ==========================================================================
    // Silver: identical grain, corrected values, no duplicate natural keys
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS silver_crm_customer_info (
            cst_id INTEGER NOT NULL,
            cst_key TEXT NOT NULL,
            cst_firstname TEXT,
            cst_lastname TEXT,
            cst_marital_status TEXT NOT NULL,
            cst_gndr TEXT NOT NULL,
            cst_create_date TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS silver_crm_product_info (
            prd_id INTEGER NOT NULL,
            cat_id TEXT NOT NULL,
            prd_key TEXT NOT NULL,
            prd_nm TEXT,
            prd_cost REAL NOT NULL,
            prd_line TEXT NOT NULL,
            prd_start_dt TEXT,
            prd_end_dt TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS silver_crm_sales_details (
            sls_ord_num TEXT NOT NULL,
            sls_prd_key TEXT NOT NULL,
            sls_cust_id INTEGER NOT NULL,
            sls_order_dt TEXT,
            sls_ship_dt TEXT,
            sls_due_dt TEXT,
            sls_sales REAL NOT NULL,
            sls_quantity INTEGER NOT NULL,
            sls_price REAL NOT NULL,
            amount_corrected INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS silver_erp_customer_info (
            cid TEXT NOT NULL,
            bdate TEXT,
            gen TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS silver_erp_location (
            cid TEXT NOT NULL,
            cntry TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS silver_erp_product_category (
            id TEXT NOT NULL,
            cat TEXT,
            subcat TEXT,
            maintenance TEXT
        )",
        [],
    )?;

    // ==========================================================================
    // Gold: star schema, the externally consumed contract
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS gold_dim_customers (
            customer_key INTEGER PRIMARY KEY,
            customer_id INTEGER NOT NULL,
            customer_number TEXT NOT NULL,
            first_name TEXT,
            last_name TEXT,
            country TEXT NOT NULL,
            marital_status TEXT NOT NULL,
            gender TEXT NOT NULL,
            birthdate TEXT,
            create_date TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS gold_dim_products (
            product_key INTEGER PRIMARY KEY,
            product_id INTEGER NOT NULL,
            product_number TEXT NOT NULL,
            product_name TEXT,
            category_id TEXT NOT NULL,
            category TEXT,
            subcategory TEXT,
            maintenance TEXT,
            cost REAL NOT NULL,
            product_line TEXT NOT NULL,
            start_date TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS gold_fact_sales (
            order_number TEXT NOT NULL,
            product_key INTEGER NOT NULL,
            customer_key INTEGER NOT NULL,
            order_date TEXT,
            shipping_date TEXT,
            due_date TEXT,
            sales_amount REAL NOT NULL,
            quantity INTEGER NOT NULL,
            price REAL NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Audit event log: one row per (run, table, rule) count
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS audit_events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            run_id TEXT NOT NULL,
            layer TEXT NOT NULL,
            table_name TEXT NOT NULL,
            rule TEXT NOT NULL,
            row_count INTEGER NOT NULL,
            recorded_at TEXT NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_fact_sales_customer ON gold_fact_sales(customer_key)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_fact_sales_product ON gold_fact_sales(product_key)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_audit_run ON audit_events(run_id)",
        [],
    )?;

    Ok(())
}

/// Truncate every table a layer owns. Each layer wipes its own output before
/// rewriting it, which is what makes the whole run rerunnable.
pub fn truncate_layer(conn: &Connection, layer: Layer) -> Result<()> {
    for table in layer.tables() {
        conn.execute(&format!("DELETE FROM {table}"), [])?;
    }
    Ok(())
}

/// Row count of an arbitrary warehouse table.
pub fn table_count(conn: &Connection, table: &str) -> Result<i64> {
    let count: i64 =
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
    Ok(count)
}
