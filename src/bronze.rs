// Bronze loader - bulk-copies CSV extracts into the raw tables.
// No transformation beyond column typing; rows that fail to parse at all
// are dropped and counted, never fatal. A missing source file is fatal.

use crate::audit::TransformReport;
use crate::config::WarehouseConfig;
use crate::error::Result;
use crate::schema::{truncate_layer, Layer};
use rusqlite::{params, Connection};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

pub const CRM_SOURCE_DIR: &str = "source_crm";
pub const ERP_SOURCE_DIR: &str = "source_erp";

/// (source directory, CSV filename, bronze table) for every extract.
pub const SOURCES: &[(&str, &str, &str)] = &[
    (CRM_SOURCE_DIR, "cust_info.csv", "bronze_crm_customer_info"),
    (CRM_SOURCE_DIR, "prd_info.csv", "bronze_crm_product_info"),
    (CRM_SOURCE_DIR, "sales_details.csv", "bronze_crm_sales_details"),
    (ERP_SOURCE_DIR, "CUST_AZ12.csv", "bronze_erp_customer_info"),
    (ERP_SOURCE_DIR, "LOC_A101.csv", "bronze_erp_location"),
    (ERP_SOURCE_DIR, "PX_CAT_G1V2.csv", "bronze_erp_product_category"),
];

// ============================================================================
// RAW ROW TYPES (one per CSV extract, loosely typed)
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CrmCustomerRow {
    pub cst_id: Option<i64>,
    pub cst_key: Option<String>,
    pub cst_firstname: Option<String>,
    pub cst_lastname: Option<String>,
    pub cst_marital_status: Option<String>,
    pub cst_gndr: Option<String>,
    pub cst_create_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrmProductRow {
    pub prd_id: Option<i64>,
    pub prd_key: Option<String>,
    pub prd_nm: Option<String>,
    pub prd_cost: Option<f64>,
    pub prd_line: Option<String>,
    pub prd_start_dt: Option<String>,
    pub prd_end_dt: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrmSalesRow {
    pub sls_ord_num: Option<String>,
    pub sls_prd_key: Option<String>,
    pub sls_cust_id: Option<i64>,
    pub sls_order_dt: Option<i64>,
    pub sls_ship_dt: Option<i64>,
    pub sls_due_dt: Option<i64>,
    pub sls_sales: Option<f64>,
    pub sls_quantity: Option<i64>,
    pub sls_price: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErpCustomerRow {
    pub cid: Option<String>,
    pub bdate: Option<String>,
    pub gen: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErpLocationRow {
    pub cid: Option<String>,
    pub cntry: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErpProductCategoryRow {
    pub id: Option<String>,
    pub cat: Option<String>,
    pub subcat: Option<String>,
    pub maintenance: Option<String>,
}

// ============================================================================
// LOADING
// ============================================================================

/// Read a CSV extract, dropping (and counting) records that fail to
/// deserialize instead of aborting the load.
fn read_rows<T: serde::de::DeserializeOwned>(
    path: &Path,
    report: &mut TransformReport,
) -> Result<Vec<T>> {
    let mut rdr = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();

    for result in rdr.deserialize() {
        report.rows_in += 1;
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                debug!(file = %path.display(), error = %e, "dropping malformed row");
                report.bump("malformed_row");
            }
        }
    }

    Ok(rows)
}

fn load_crm_customers(conn: &Connection, path: &Path) -> Result<TransformReport> {
    let mut report = TransformReport::new("bronze_crm_customer_info");
    let rows: Vec<CrmCustomerRow> = read_rows(path, &mut report)?;

    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO bronze_crm_customer_info
             (cst_id, cst_key, cst_firstname, cst_lastname, cst_marital_status, cst_gndr, cst_create_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for row in &rows {
            stmt.execute(params![
                row.cst_id,
                row.cst_key,
                row.cst_firstname,
                row.cst_lastname,
                row.cst_marital_status,
                row.cst_gndr,
                row.cst_create_date,
            ])?;
            report.rows_out += 1;
        }
    }
    tx.commit()?;
    Ok(report)
}

fn load_crm_products(conn: &Connection, path: &Path) -> Result<TransformReport> {
    let mut report = TransformReport::new("bronze_crm_product_info");
    let rows: Vec<CrmProductRow> = read_rows(path, &mut report)?;

    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO bronze_crm_product_info
             (prd_id, prd_key, prd_nm, prd_cost, prd_line, prd_start_dt, prd_end_dt)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for row in &rows {
            stmt.execute(params![
                row.prd_id,
                row.prd_key,
                row.prd_nm,
                row.prd_cost,
                row.prd_line,
                row.prd_start_dt,
                row.prd_end_dt,
            ])?;
            report.rows_out += 1;
        }
    }
    tx.commit()?;
    Ok(report)
}

fn load_crm_sales(conn: &Connection, path: &Path) -> Result<TransformReport> {
    let mut report = TransformReport::new("bronze_crm_sales_details");
    let rows: Vec<CrmSalesRow> = read_rows(path, &mut report)?;

    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO bronze_crm_sales_details
             (sls_ord_num, sls_prd_key, sls_cust_id, sls_order_dt, sls_ship_dt, sls_due_dt,
              sls_sales, sls_quantity, sls_price)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        for row in &rows {
            stmt.execute(params![
                row.sls_ord_num,
                row.sls_prd_key,
                row.sls_cust_id,
                row.sls_order_dt,
                row.sls_ship_dt,
                row.sls_due_dt,
                row.sls_sales,
                row.sls_quantity,
                row.sls_price,
            ])?;
            report.rows_out += 1;
        }
    }
    tx.commit()?;
    Ok(report)
}

fn load_erp_customers(conn: &Connection, path: &Path) -> Result<TransformReport> {
    let mut report = TransformReport::new("bronze_erp_customer_info");
    let rows: Vec<ErpCustomerRow> = read_rows(path, &mut report)?;

    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO bronze_erp_customer_info (cid, bdate, gen) VALUES (?1, ?2, ?3)",
        )?;
        for row in &rows {
            stmt.execute(params![row.cid, row.bdate, row.gen])?;
            report.rows_out += 1;
        }
    }
    tx.commit()?;
    Ok(report)
}

fn load_erp_locations(conn: &Connection, path: &Path) -> Result<TransformReport> {
    let mut report = TransformReport::new("bronze_erp_location");
    let rows: Vec<ErpLocationRow> = read_rows(path, &mut report)?;

    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt =
            tx.prepare("INSERT INTO bronze_erp_location (cid, cntry) VALUES (?1, ?2)")?;
        for row in &rows {
            stmt.execute(params![row.cid, row.cntry])?;
            report.rows_out += 1;
        }
    }
    tx.commit()?;
    Ok(report)
}

fn load_erp_categories(conn: &Connection, path: &Path) -> Result<TransformReport> {
    let mut report = TransformReport::new("bronze_erp_product_category");
    let rows: Vec<ErpProductCategoryRow> = read_rows(path, &mut report)?;

    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO bronze_erp_product_category (id, cat, subcat, maintenance)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for row in &rows {
            stmt.execute(params![row.id, row.cat, row.subcat, row.maintenance])?;
            report.rows_out += 1;
        }
    }
    tx.commit()?;
    Ok(report)
}

/// Load every CRM and ERP extract into the bronze tables.
///
/// All source files are checked up front so a missing extract aborts before
/// any table is truncated.
pub fn run_bronze_layer(
    conn: &Connection,
    config: &WarehouseConfig,
) -> Result<Vec<TransformReport>> {
    let mut paths = Vec::with_capacity(SOURCES.len());
    for (source_dir, filename, table) in SOURCES {
        paths.push((config.require_source(source_dir, filename)?, *table));
    }

    truncate_layer(conn, Layer::Bronze)?;

    let mut reports = Vec::with_capacity(paths.len());
    for (path, table) in &paths {
        info!(table = *table, file = %path.display(), "loading bronze table");
        let report = match *table {
            "bronze_crm_customer_info" => load_crm_customers(conn, path)?,
            "bronze_crm_product_info" => load_crm_products(conn, path)?,
            "bronze_crm_sales_details" => load_crm_sales(conn, path)?,
            "bronze_erp_customer_info" => load_erp_customers(conn, path)?,
            "bronze_erp_location" => load_erp_locations(conn, path)?,
            "bronze_erp_product_category" => load_erp_categories(conn, path)?,
            _ => unreachable!("unknown bronze table {table}"),
        };
        info!("{}", report.summary());
        reports.push(report);
    }

    Ok(reports)
}

// ============================================================================
// READ-BACK (the silver layer extracts from these)
// ============================================================================

pub fn fetch_crm_customers(conn: &Connection) -> Result<Vec<CrmCustomerRow>> {
    let mut stmt = conn.prepare(
        "SELECT cst_id, cst_key, cst_firstname, cst_lastname, cst_marital_status, cst_gndr, cst_create_date
         FROM bronze_crm_customer_info",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(CrmCustomerRow {
                cst_id: row.get(0)?,
                cst_key: row.get(1)?,
                cst_firstname: row.get(2)?,
                cst_lastname: row.get(3)?,
                cst_marital_status: row.get(4)?,
                cst_gndr: row.get(5)?,
                cst_create_date: row.get(6)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn fetch_crm_products(conn: &Connection) -> Result<Vec<CrmProductRow>> {
    let mut stmt = conn.prepare(
        "SELECT prd_id, prd_key, prd_nm, prd_cost, prd_line, prd_start_dt, prd_end_dt
         FROM bronze_crm_product_info",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(CrmProductRow {
                prd_id: row.get(0)?,
                prd_key: row.get(1)?,
                prd_nm: row.get(2)?,
                prd_cost: row.get(3)?,
                prd_line: row.get(4)?,
                prd_start_dt: row.get(5)?,
                prd_end_dt: row.get(6)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn fetch_crm_sales(conn: &Connection) -> Result<Vec<CrmSalesRow>> {
    let mut stmt = conn.prepare(
        "SELECT sls_ord_num, sls_prd_key, sls_cust_id, sls_order_dt, sls_ship_dt, sls_due_dt,
                sls_sales, sls_quantity, sls_price
         FROM bronze_crm_sales_details",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(CrmSalesRow {
                sls_ord_num: row.get(0)?,
                sls_prd_key: row.get(1)?,
                sls_cust_id: row.get(2)?,
                sls_order_dt: row.get(3)?,
                sls_ship_dt: row.get(4)?,
                sls_due_dt: row.get(5)?,
                sls_sales: row.get(6)?,
                sls_quantity: row.get(7)?,
                sls_price: row.get(8)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn fetch_erp_customers(conn: &Connection) -> Result<Vec<ErpCustomerRow>> {
    let mut stmt = conn.prepare("SELECT cid, bdate, gen FROM bronze_erp_customer_info")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(ErpCustomerRow {
                cid: row.get(0)?,
                bdate: row.get(1)?,
                gen: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn fetch_erp_locations(conn: &Connection) -> Result<Vec<ErpLocationRow>> {
    let mut stmt = conn.prepare("SELECT cid, cntry FROM bronze_erp_location")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(ErpLocationRow {
                cid: row.get(0)?,
                cntry: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn fetch_erp_categories(conn: &Connection) -> Result<Vec<ErpProductCategoryRow>> {
    let mut stmt =
        conn.prepare("SELECT id, cat, subcat, maintenance FROM bronze_erp_product_category")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(ErpProductCategoryRow {
                id: row.get(0)?,
                cat: row.get(1)?,
                subcat: row.get(2)?,
                maintenance: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
