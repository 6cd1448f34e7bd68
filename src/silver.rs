// Silver transformer - cleanses each bronze table into a silver table of
// identical grain. Rows that fail required-field validation are dropped and
// counted; corrections are counted per rule. Nothing here is fatal once the
// bronze layer exists.

use crate::audit::TransformReport;
use crate::bronze::{
    self, CrmCustomerRow, CrmProductRow, CrmSalesRow, ErpCustomerRow, ErpLocationRow,
    ErpProductCategoryRow,
};
use crate::cleansing::{
    align_erp_customer_id, align_erp_location_id, clean_str, normalize_country,
    normalize_erp_gender, normalize_gender, normalize_marital_status, normalize_product_line,
    nulled_if_future, parse_compact_date, parse_iso_date, split_product_key,
};
use crate::error::Result;
use crate::schema::{truncate_layer, Layer};
use chrono::{Local, NaiveDate};
use rusqlite::{params, Connection};
use tracing::info;

// ============================================================================
// CLEANSED ROW TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct SilverCrmCustomer {
    pub cst_id: i64,
    pub cst_key: String,
    pub cst_firstname: Option<String>,
    pub cst_lastname: Option<String>,
    pub cst_marital_status: String,
    pub cst_gndr: String,
    pub cst_create_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SilverCrmProduct {
    pub prd_id: i64,
    pub cat_id: String,
    pub prd_key: String,
    pub prd_nm: Option<String>,
    pub prd_cost: f64,
    pub prd_line: String,
    pub prd_start_dt: Option<NaiveDate>,
    pub prd_end_dt: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SilverCrmSale {
    pub sls_ord_num: String,
    pub sls_prd_key: String,
    pub sls_cust_id: i64,
    pub sls_order_dt: Option<NaiveDate>,
    pub sls_ship_dt: Option<NaiveDate>,
    pub sls_due_dt: Option<NaiveDate>,
    pub sls_sales: f64,
    pub sls_quantity: i64,
    pub sls_price: f64,
    pub amount_corrected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SilverErpCustomer {
    pub cid: String,
    pub bdate: Option<NaiveDate>,
    pub gen: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SilverErpLocation {
    pub cid: String,
    pub cntry: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SilverErpProductCategory {
    pub id: String,
    pub cat: Option<String>,
    pub subcat: Option<String>,
    pub maintenance: Option<String>,
}

fn was_trimmed(raw: &Option<String>) -> bool {
    matches!(raw, Some(s) if s.trim() != s.as_str())
}

// ============================================================================
// CRM CUSTOMERS
// ============================================================================

/// Cleanse CRM customer rows: drop null natural keys, trim strings, expand
/// gender and marital codes, then deduplicate keeping the latest create date.
pub fn transform_crm_customers(
    rows: Vec<CrmCustomerRow>,
    report: &mut TransformReport,
) -> Vec<SilverCrmCustomer> {
    report.rows_in = rows.len();
    let mut cleaned = Vec::with_capacity(rows.len());

    for row in rows {
        let cst_id = match row.cst_id {
            Some(id) => id,
            None => {
                report.bump("null_natural_key");
                continue;
            }
        };
        let cst_key = match clean_str(row.cst_key.as_deref()) {
            Some(key) => key,
            None => {
                report.bump("null_natural_key");
                continue;
            }
        };

        if [
            &row.cst_firstname,
            &row.cst_lastname,
            &row.cst_marital_status,
            &row.cst_gndr,
        ]
        .iter()
        .any(|field| was_trimmed(field))
        {
            report.bump("trimmed");
        }

        let gndr = normalize_gender(row.cst_gndr.as_deref());
        if clean_str(row.cst_gndr.as_deref()).as_deref() != Some(gndr.as_str()) {
            report.bump("gender_normalized");
        }

        let marital = normalize_marital_status(row.cst_marital_status.as_deref());
        if clean_str(row.cst_marital_status.as_deref()).as_deref() != Some(marital.as_str()) {
            report.bump("marital_status_normalized");
        }

        cleaned.push(SilverCrmCustomer {
            cst_id,
            cst_key,
            cst_firstname: clean_str(row.cst_firstname.as_deref()),
            cst_lastname: clean_str(row.cst_lastname.as_deref()),
            cst_marital_status: marital,
            cst_gndr: gndr,
            cst_create_date: parse_iso_date(row.cst_create_date.as_deref()),
        });
    }

    // Latest create date wins on duplicate ids; rows without a create date
    // sort last (Option: None < Some, so descending puts them at the end)
    cleaned.sort_by(|a, b| {
        a.cst_id
            .cmp(&b.cst_id)
            .then(b.cst_create_date.cmp(&a.cst_create_date))
    });
    let before = cleaned.len();
    cleaned.dedup_by_key(|row| row.cst_id);
    report.bump_by("duplicate_natural_key", (before - cleaned.len()) as u64);

    report.rows_out = cleaned.len();
    cleaned
}

// ============================================================================
// CRM PRODUCTS
// ============================================================================

/// Cleanse CRM product rows: split the raw key into category id and product
/// number, impute missing or negative costs with the mean of valid costs,
/// expand product-line codes, and derive end dates from the next version's
/// start date per product key.
pub fn transform_crm_products(
    rows: Vec<CrmProductRow>,
    report: &mut TransformReport,
) -> Vec<SilverCrmProduct> {
    report.rows_in = rows.len();
    let mut cleaned: Vec<(SilverCrmProduct, bool)> = Vec::with_capacity(rows.len());
    let mut cost_sum = 0.0;
    let mut cost_count = 0u64;

    for row in rows {
        let prd_id = match row.prd_id {
            Some(id) => id,
            None => {
                report.bump("null_natural_key");
                continue;
            }
        };
        let raw_key = match clean_str(row.prd_key.as_deref()) {
            Some(key) => key,
            None => {
                report.bump("null_natural_key");
                continue;
            }
        };
        let (cat_id, prd_key) = match split_product_key(&raw_key) {
            Some(parts) => parts,
            None => {
                report.bump("invalid_product_key");
                continue;
            }
        };

        let cost_valid = matches!(row.prd_cost, Some(c) if c >= 0.0);
        if let Some(c) = row.prd_cost {
            if cost_valid {
                cost_sum += c;
                cost_count += 1;
            }
        }

        let prd_line = normalize_product_line(row.prd_line.as_deref());
        if clean_str(row.prd_line.as_deref()).as_deref() != Some(prd_line.as_str()) {
            report.bump("product_line_normalized");
        }

        cleaned.push((
            SilverCrmProduct {
                prd_id,
                cat_id,
                prd_key,
                prd_nm: clean_str(row.prd_nm.as_deref()),
                prd_cost: row.prd_cost.unwrap_or(0.0),
                prd_line,
                prd_start_dt: parse_iso_date(row.prd_start_dt.as_deref()),
                // Derived below; the bronze value overlaps and is ignored
                prd_end_dt: None,
            },
            cost_valid,
        ));
    }

    // Null or negative costs take the mean of the valid ones
    let cost_mean = if cost_count > 0 {
        cost_sum / cost_count as f64
    } else {
        0.0
    };
    for (product, cost_valid) in cleaned.iter_mut() {
        if !*cost_valid {
            product.prd_cost = cost_mean;
            report.bump("cost_imputed");
        }
    }

    // End date = next version's start date minus one day; the last version
    // per key stays open (null end date)
    let mut products: Vec<SilverCrmProduct> = cleaned.into_iter().map(|(p, _)| p).collect();
    products.sort_by(|a, b| {
        a.prd_key
            .cmp(&b.prd_key)
            .then(a.prd_start_dt.cmp(&b.prd_start_dt))
    });
    for i in 0..products.len() {
        if i + 1 < products.len() && products[i + 1].prd_key == products[i].prd_key {
            products[i].prd_end_dt = products[i + 1].prd_start_dt.and_then(|d| d.pred_opt());
        }
    }

    report.rows_out = products.len();
    products
}

// ============================================================================
// CRM SALES
// ============================================================================

/// Apply the sales business rule: `sales = quantity * price`.
///
/// Null price is recovered from sales / quantity, negative price is made
/// absolute, and any remaining mismatch recomputes sales from quantity and
/// price. Returns the repaired `(sales, price)` pair and whether anything
/// was corrected, or `None` when both sales and price are missing.
pub fn apply_amount_rule(
    sales: Option<f64>,
    quantity: i64,
    price: Option<f64>,
) -> Option<(f64, f64, bool)> {
    let qty = quantity as f64;
    let mut corrected = false;

    let mut price = match price {
        Some(p) => p,
        None => {
            corrected = true;
            sales? / qty
        }
    };

    if price < 0.0 {
        price = price.abs();
        corrected = true;
    }

    let sales = match sales {
        Some(s) if s == qty * price => s,
        _ => {
            corrected = true;
            qty * price
        }
    };

    Some((sales, price, corrected))
}

/// Cleanse CRM sales rows: parse compact integer dates (invalid become
/// null), enforce the amount rule, and drop rows whose keys or amounts are
/// unrecoverable.
pub fn transform_crm_sales(
    rows: Vec<CrmSalesRow>,
    report: &mut TransformReport,
) -> Vec<SilverCrmSale> {
    report.rows_in = rows.len();
    let mut cleaned = Vec::with_capacity(rows.len());

    for row in rows {
        let (ord_num, prd_key, cust_id) = match (
            clean_str(row.sls_ord_num.as_deref()),
            clean_str(row.sls_prd_key.as_deref()),
            row.sls_cust_id,
        ) {
            (Some(o), Some(p), Some(c)) => (o, p, c),
            _ => {
                report.bump("missing_required");
                continue;
            }
        };

        let quantity = match row.sls_quantity {
            Some(q) if q > 0 => q,
            _ => {
                report.bump("unrecoverable_amounts");
                continue;
            }
        };

        let mut parse_date = |raw: Option<i64>| -> Option<NaiveDate> {
            let parsed = parse_compact_date(raw);
            if raw.is_some() && parsed.is_none() {
                report.bump("invalid_date_nulled");
            }
            parsed
        };
        let order_dt = parse_date(row.sls_order_dt);
        let ship_dt = parse_date(row.sls_ship_dt);
        let due_dt = parse_date(row.sls_due_dt);

        let (sales, price, corrected) =
            match apply_amount_rule(row.sls_sales, quantity, row.sls_price) {
                Some(result) => result,
                None => {
                    report.bump("unrecoverable_amounts");
                    continue;
                }
            };
        if corrected {
            report.bump("amount_corrected");
        }

        cleaned.push(SilverCrmSale {
            sls_ord_num: ord_num,
            sls_prd_key: prd_key,
            sls_cust_id: cust_id,
            sls_order_dt: order_dt,
            sls_ship_dt: ship_dt,
            sls_due_dt: due_dt,
            sls_sales: sales,
            sls_quantity: quantity,
            sls_price: price,
            amount_corrected: corrected,
        });
    }

    report.rows_out = cleaned.len();
    cleaned
}

// ============================================================================
// ERP TABLES
// ============================================================================

/// Cleanse ERP customer demographics: align ids to the CRM key format, null
/// future birthdates, normalize gender values.
pub fn transform_erp_customers(
    rows: Vec<ErpCustomerRow>,
    today: NaiveDate,
    report: &mut TransformReport,
) -> Vec<SilverErpCustomer> {
    report.rows_in = rows.len();
    let mut cleaned = Vec::with_capacity(rows.len());

    for row in rows {
        let cid = match clean_str(row.cid.as_deref()) {
            Some(cid) => align_erp_customer_id(&cid),
            None => {
                report.bump("null_natural_key");
                continue;
            }
        };

        let bdate_raw = parse_iso_date(row.bdate.as_deref());
        if row.bdate.as_deref().and_then(|s| clean_str(Some(s))).is_some() && bdate_raw.is_none() {
            report.bump("invalid_date_nulled");
        }
        let bdate = nulled_if_future(bdate_raw, today);
        if bdate_raw.is_some() && bdate.is_none() {
            report.bump("future_birthdate_nulled");
        }

        let gen = normalize_erp_gender(row.gen.as_deref());
        if clean_str(row.gen.as_deref()).as_deref() != Some(gen.as_str()) {
            report.bump("gender_normalized");
        }

        cleaned.push(SilverErpCustomer { cid, bdate, gen });
    }

    cleaned.sort_by(|a, b| a.cid.cmp(&b.cid));
    let before = cleaned.len();
    cleaned.dedup_by(|a, b| a.cid == b.cid);
    report.bump_by("duplicate_natural_key", (before - cleaned.len()) as u64);

    report.rows_out = cleaned.len();
    cleaned
}

/// Cleanse ERP location rows: strip hyphens from ids, expand country codes.
pub fn transform_erp_locations(
    rows: Vec<ErpLocationRow>,
    report: &mut TransformReport,
) -> Vec<SilverErpLocation> {
    report.rows_in = rows.len();
    let mut cleaned = Vec::with_capacity(rows.len());

    for row in rows {
        let cid = match clean_str(row.cid.as_deref()) {
            Some(cid) => align_erp_location_id(&cid),
            None => {
                report.bump("null_natural_key");
                continue;
            }
        };

        let cntry = normalize_country(row.cntry.as_deref());
        if clean_str(row.cntry.as_deref()).as_deref() != Some(cntry.as_str()) {
            report.bump("country_normalized");
        }

        cleaned.push(SilverErpLocation { cid, cntry });
    }

    cleaned.sort_by(|a, b| a.cid.cmp(&b.cid));
    let before = cleaned.len();
    cleaned.dedup_by(|a, b| a.cid == b.cid);
    report.bump_by("duplicate_natural_key", (before - cleaned.len()) as u64);

    report.rows_out = cleaned.len();
    cleaned
}

/// Cleanse ERP product category rows: trim-only passthrough.
pub fn transform_erp_categories(
    rows: Vec<ErpProductCategoryRow>,
    report: &mut TransformReport,
) -> Vec<SilverErpProductCategory> {
    report.rows_in = rows.len();
    let mut cleaned = Vec::with_capacity(rows.len());

    for row in rows {
        let id = match clean_str(row.id.as_deref()) {
            Some(id) => id,
            None => {
                report.bump("null_natural_key");
                continue;
            }
        };

        cleaned.push(SilverErpProductCategory {
            id,
            cat: clean_str(row.cat.as_deref()),
            subcat: clean_str(row.subcat.as_deref()),
            maintenance: clean_str(row.maintenance.as_deref()),
        });
    }

    cleaned.sort_by(|a, b| a.id.cmp(&b.id));
    let before = cleaned.len();
    cleaned.dedup_by(|a, b| a.id == b.id);
    report.bump_by("duplicate_natural_key", (before - cleaned.len()) as u64);

    report.rows_out = cleaned.len();
    cleaned
}

// ============================================================================
// LOAD
// ============================================================================

fn date_sql(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.to_string())
}

fn write_crm_customers(conn: &Connection, rows: &[SilverCrmCustomer]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO silver_crm_customer_info
             (cst_id, cst_key, cst_firstname, cst_lastname, cst_marital_status, cst_gndr, cst_create_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for row in rows {
            stmt.execute(params![
                row.cst_id,
                row.cst_key,
                row.cst_firstname,
                row.cst_lastname,
                row.cst_marital_status,
                row.cst_gndr,
                date_sql(row.cst_create_date),
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

fn write_crm_products(conn: &Connection, rows: &[SilverCrmProduct]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO silver_crm_product_info
             (prd_id, cat_id, prd_key, prd_nm, prd_cost, prd_line, prd_start_dt, prd_end_dt)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for row in rows {
            stmt.execute(params![
                row.prd_id,
                row.cat_id,
                row.prd_key,
                row.prd_nm,
                row.prd_cost,
                row.prd_line,
                date_sql(row.prd_start_dt),
                date_sql(row.prd_end_dt),
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

fn write_crm_sales(conn: &Connection, rows: &[SilverCrmSale]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO silver_crm_sales_details
             (sls_ord_num, sls_prd_key, sls_cust_id, sls_order_dt, sls_ship_dt, sls_due_dt,
              sls_sales, sls_quantity, sls_price, amount_corrected)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        for row in rows {
            stmt.execute(params![
                row.sls_ord_num,
                row.sls_prd_key,
                row.sls_cust_id,
                date_sql(row.sls_order_dt),
                date_sql(row.sls_ship_dt),
                date_sql(row.sls_due_dt),
                row.sls_sales,
                row.sls_quantity,
                row.sls_price,
                row.amount_corrected as i64,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

fn write_erp_customers(conn: &Connection, rows: &[SilverErpCustomer]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO silver_erp_customer_info (cid, bdate, gen) VALUES (?1, ?2, ?3)",
        )?;
        for row in rows {
            stmt.execute(params![row.cid, date_sql(row.bdate), row.gen])?;
        }
    }
    tx.commit()?;
    Ok(())
}

fn write_erp_locations(conn: &Connection, rows: &[SilverErpLocation]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt =
            tx.prepare("INSERT INTO silver_erp_location (cid, cntry) VALUES (?1, ?2)")?;
        for row in rows {
            stmt.execute(params![row.cid, row.cntry])?;
        }
    }
    tx.commit()?;
    Ok(())
}

fn write_erp_categories(conn: &Connection, rows: &[SilverErpProductCategory]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO silver_erp_product_category (id, cat, subcat, maintenance)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for row in rows {
            stmt.execute(params![row.id, row.cat, row.subcat, row.maintenance])?;
        }
    }
    tx.commit()?;
    Ok(())
}

/// Extract every bronze table, cleanse it, and load the silver layer.
pub fn run_silver_layer(conn: &Connection) -> Result<Vec<TransformReport>> {
    let today = Local::now().date_naive();

    let crm_customers = bronze::fetch_crm_customers(conn)?;
    let crm_products = bronze::fetch_crm_products(conn)?;
    let crm_sales = bronze::fetch_crm_sales(conn)?;
    let erp_customers = bronze::fetch_erp_customers(conn)?;
    let erp_locations = bronze::fetch_erp_locations(conn)?;
    let erp_categories = bronze::fetch_erp_categories(conn)?;

    truncate_layer(conn, Layer::Silver)?;

    let mut reports = Vec::with_capacity(6);

    let mut report = TransformReport::new("silver_crm_customer_info");
    let rows = transform_crm_customers(crm_customers, &mut report);
    write_crm_customers(conn, &rows)?;
    info!("{}", report.summary());
    reports.push(report);

    let mut report = TransformReport::new("silver_crm_product_info");
    let rows = transform_crm_products(crm_products, &mut report);
    write_crm_products(conn, &rows)?;
    info!("{}", report.summary());
    reports.push(report);

    let mut report = TransformReport::new("silver_crm_sales_details");
    let rows = transform_crm_sales(crm_sales, &mut report);
    write_crm_sales(conn, &rows)?;
    info!("{}", report.summary());
    reports.push(report);

    let mut report = TransformReport::new("silver_erp_customer_info");
    let rows = transform_erp_customers(erp_customers, today, &mut report);
    write_erp_customers(conn, &rows)?;
    info!("{}", report.summary());
    reports.push(report);

    let mut report = TransformReport::new("silver_erp_location");
    let rows = transform_erp_locations(erp_locations, &mut report);
    write_erp_locations(conn, &rows)?;
    info!("{}", report.summary());
    reports.push(report);

    let mut report = TransformReport::new("silver_erp_product_category");
    let rows = transform_erp_categories(erp_categories, &mut report);
    write_erp_categories(conn, &rows)?;
    info!("{}", report.summary());
    reports.push(report);

    Ok(reports)
}

// ============================================================================
// READ-BACK (the gold layer builds from these)
// ============================================================================

pub fn fetch_silver_crm_customers(conn: &Connection) -> Result<Vec<SilverCrmCustomer>> {
    let mut stmt = conn.prepare(
        "SELECT cst_id, cst_key, cst_firstname, cst_lastname, cst_marital_status, cst_gndr, cst_create_date
         FROM silver_crm_customer_info",
    )?;
    let rows = stmt
        .query_map([], |row| {
            let create_date: Option<String> = row.get(6)?;
            Ok(SilverCrmCustomer {
                cst_id: row.get(0)?,
                cst_key: row.get(1)?,
                cst_firstname: row.get(2)?,
                cst_lastname: row.get(3)?,
                cst_marital_status: row.get(4)?,
                cst_gndr: row.get(5)?,
                cst_create_date: parse_iso_date(create_date.as_deref()),
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn fetch_silver_crm_products(conn: &Connection) -> Result<Vec<SilverCrmProduct>> {
    let mut stmt = conn.prepare(
        "SELECT prd_id, cat_id, prd_key, prd_nm, prd_cost, prd_line, prd_start_dt, prd_end_dt
         FROM silver_crm_product_info",
    )?;
    let rows = stmt
        .query_map([], |row| {
            let start: Option<String> = row.get(6)?;
            let end: Option<String> = row.get(7)?;
            Ok(SilverCrmProduct {
                prd_id: row.get(0)?,
                cat_id: row.get(1)?,
                prd_key: row.get(2)?,
                prd_nm: row.get(3)?,
                prd_cost: row.get(4)?,
                prd_line: row.get(5)?,
                prd_start_dt: parse_iso_date(start.as_deref()),
                prd_end_dt: parse_iso_date(end.as_deref()),
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn fetch_silver_crm_sales(conn: &Connection) -> Result<Vec<SilverCrmSale>> {
    let mut stmt = conn.prepare(
        "SELECT sls_ord_num, sls_prd_key, sls_cust_id, sls_order_dt, sls_ship_dt, sls_due_dt,
                sls_sales, sls_quantity, sls_price, amount_corrected
         FROM silver_crm_sales_details",
    )?;
    let rows = stmt
        .query_map([], |row| {
            let order: Option<String> = row.get(3)?;
            let ship: Option<String> = row.get(4)?;
            let due: Option<String> = row.get(5)?;
            let corrected: i64 = row.get(9)?;
            Ok(SilverCrmSale {
                sls_ord_num: row.get(0)?,
                sls_prd_key: row.get(1)?,
                sls_cust_id: row.get(2)?,
                sls_order_dt: parse_iso_date(order.as_deref()),
                sls_ship_dt: parse_iso_date(ship.as_deref()),
                sls_due_dt: parse_iso_date(due.as_deref()),
                sls_sales: row.get(6)?,
                sls_quantity: row.get(7)?,
                sls_price: row.get(8)?,
                amount_corrected: corrected != 0,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn fetch_silver_erp_customers(conn: &Connection) -> Result<Vec<SilverErpCustomer>> {
    let mut stmt = conn.prepare("SELECT cid, bdate, gen FROM silver_erp_customer_info")?;
    let rows = stmt
        .query_map([], |row| {
            let bdate: Option<String> = row.get(1)?;
            Ok(SilverErpCustomer {
                cid: row.get(0)?,
                bdate: parse_iso_date(bdate.as_deref()),
                gen: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn fetch_silver_erp_locations(conn: &Connection) -> Result<Vec<SilverErpLocation>> {
    let mut stmt = conn.prepare("SELECT cid, cntry FROM silver_erp_location")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(SilverErpLocation {
                cid: row.get(0)?,
                cntry: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn fetch_silver_erp_categories(conn: &Connection) -> Result<Vec<SilverErpProductCategory>> {
    let mut stmt =
        conn.prepare("SELECT id, cat, subcat, maintenance FROM silver_erp_product_category")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(SilverErpProductCategory {
                id: row.get(0)?,
                cat: row.get(1)?,
                subcat: row.get(2)?,
                maintenance: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============================================================================
// TESTS
// ============================================================================
