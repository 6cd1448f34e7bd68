// Gold modeler - conforms the cleansed CRM and ERP tables into a star
// schema. Surrogate keys are dense integers assigned in natural-key order so
// a rerun over unchanged input produces identical keys. Fact rows that
// cannot resolve both dimensions are excluded and counted.

use crate::audit::TransformReport;
use crate::cleansing::NOT_AVAILABLE;
use crate::error::Result;
use crate::schema::{truncate_layer, Layer};
use crate::silver::{
    self, SilverCrmCustomer, SilverCrmProduct, SilverCrmSale, SilverErpCustomer,
    SilverErpLocation, SilverErpProductCategory,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

// ============================================================================
// DIMENSION / FACT ROWS (the externally consumed contract)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimCustomer {
    pub customer_key: i64,
    pub customer_id: i64,
    pub customer_number: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub country: String,
    pub marital_status: String,
    pub gender: String,
    pub birthdate: Option<NaiveDate>,
    pub create_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimProduct {
    pub product_key: i64,
    pub product_id: i64,
    pub product_number: String,
    pub product_name: Option<String>,
    pub category_id: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub maintenance: Option<String>,
    pub cost: f64,
    pub product_line: String,
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactSale {
    pub order_number: String,
    pub product_key: i64,
    pub customer_key: i64,
    pub order_date: Option<NaiveDate>,
    pub shipping_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub sales_amount: f64,
    pub quantity: i64,
    pub price: f64,
}

// ============================================================================
// SURVIVORSHIP
// ============================================================================

/// CRM wins when it carries a real value; ERP fills the gaps; `n/a` when
/// neither source knows.
pub fn survive_gender(crm: &str, erp: Option<&str>) -> String {
    if crm != NOT_AVAILABLE {
        return crm.to_string();
    }
    match erp {
        Some(g) if g != NOT_AVAILABLE => g.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

// ============================================================================
// DIMENSION BUILDERS
// ============================================================================

/// Join CRM customers (driver) with ERP demographics and location on the
/// shared customer number. Surrogate keys go 1..n in ascending customer id.
pub fn build_dim_customers(
    crm: Vec<SilverCrmCustomer>,
    erp: &[SilverErpCustomer],
    locations: &[SilverErpLocation],
    report: &mut TransformReport,
) -> Vec<DimCustomer> {
    report.rows_in = crm.len();

    let erp_by_cid: HashMap<&str, &SilverErpCustomer> =
        erp.iter().map(|c| (c.cid.as_str(), c)).collect();
    let loc_by_cid: HashMap<&str, &SilverErpLocation> =
        locations.iter().map(|l| (l.cid.as_str(), l)).collect();

    let mut crm = crm;
    crm.sort_by_key(|c| c.cst_id);

    let mut dims = Vec::with_capacity(crm.len());
    for (i, customer) in crm.into_iter().enumerate() {
        let demo = erp_by_cid.get(customer.cst_key.as_str());
        let location = loc_by_cid.get(customer.cst_key.as_str());

        let gender = survive_gender(&customer.cst_gndr, demo.map(|d| d.gen.as_str()));
        if gender != customer.cst_gndr {
            report.bump("gender_survived_from_erp");
        }

        dims.push(DimCustomer {
            customer_key: i as i64 + 1,
            customer_id: customer.cst_id,
            customer_number: customer.cst_key,
            first_name: customer.cst_firstname,
            last_name: customer.cst_lastname,
            country: location
                .map(|l| l.cntry.clone())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            marital_status: customer.cst_marital_status,
            gender,
            birthdate: demo.and_then(|d| d.bdate),
            create_date: customer.cst_create_date,
        });
    }

    report.rows_out = dims.len();
    dims
}

/// Current product versions joined with the ERP category lookup. Surrogate
/// keys go 1..n in ascending product number. Historical versions (closed
/// end date) never enter the dimension.
pub fn build_dim_products(
    products: Vec<SilverCrmProduct>,
    categories: &[SilverErpProductCategory],
    report: &mut TransformReport,
) -> Vec<DimProduct> {
    report.rows_in = products.len();

    let cat_by_id: HashMap<&str, &SilverErpProductCategory> =
        categories.iter().map(|c| (c.id.as_str(), c)).collect();

    let mut current: Vec<SilverCrmProduct> = Vec::with_capacity(products.len());
    for product in products {
        if product.prd_end_dt.is_some() {
            report.bump("historical_version_skipped");
        } else {
            current.push(product);
        }
    }
    current.sort_by(|a, b| a.prd_key.cmp(&b.prd_key));

    let mut dims = Vec::with_capacity(current.len());
    for (i, product) in current.into_iter().enumerate() {
        let category = cat_by_id.get(product.cat_id.as_str());
        if category.is_none() {
            report.bump("unknown_category");
        }

        dims.push(DimProduct {
            product_key: i as i64 + 1,
            product_id: product.prd_id,
            product_number: product.prd_key,
            product_name: product.prd_nm,
            category_id: product.cat_id,
            category: category.and_then(|c| c.cat.clone()),
            subcategory: category.and_then(|c| c.subcat.clone()),
            maintenance: category.and_then(|c| c.maintenance.clone()),
            cost: product.prd_cost,
            product_line: product.prd_line,
            start_date: product.prd_start_dt,
        });
    }

    report.rows_out = dims.len();
    dims
}

// ============================================================================
// FACT BUILDER
// ============================================================================

/// Resolve each sales line to its two dimensions, substituting surrogate
/// keys. Lines with no matching customer or product are excluded with a
/// counted reason. The amount invariant is re-checked on the way through:
/// a Silver row edited behind the pipeline's back gets recomputed and
/// counted rather than emitted inconsistent.
pub fn build_fact_sales(
    sales: Vec<SilverCrmSale>,
    customers: &[DimCustomer],
    products: &[DimProduct],
    report: &mut TransformReport,
) -> Vec<FactSale> {
    report.rows_in = sales.len();

    let customer_keys: HashMap<i64, i64> = customers
        .iter()
        .map(|c| (c.customer_id, c.customer_key))
        .collect();
    let product_keys: HashMap<&str, i64> = products
        .iter()
        .map(|p| (p.product_number.as_str(), p.product_key))
        .collect();

    let mut facts = Vec::with_capacity(sales.len());
    for sale in sales {
        let customer_key = match customer_keys.get(&sale.sls_cust_id) {
            Some(key) => *key,
            None => {
                report.bump("unknown_customer");
                continue;
            }
        };
        let product_key = match product_keys.get(sale.sls_prd_key.as_str()) {
            Some(key) => *key,
            None => {
                report.bump("unknown_product");
                continue;
            }
        };

        let expected = sale.sls_quantity as f64 * sale.sls_price;
        let sales_amount = if sale.sls_sales == expected {
            sale.sls_sales
        } else {
            report.bump("amount_corrected");
            expected
        };

        facts.push(FactSale {
            order_number: sale.sls_ord_num,
            product_key,
            customer_key,
            order_date: sale.sls_order_dt,
            shipping_date: sale.sls_ship_dt,
            due_date: sale.sls_due_dt,
            sales_amount,
            quantity: sale.sls_quantity,
            price: sale.sls_price,
        });
    }

    report.rows_out = facts.len();
    facts
}

// ============================================================================
// LOAD
// ============================================================================

fn date_sql(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.to_string())
}

fn write_dim_customers(conn: &Connection, rows: &[DimCustomer]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO gold_dim_customers
             (customer_key, customer_id, customer_number, first_name, last_name, country,
              marital_status, gender, birthdate, create_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        for row in rows {
            stmt.execute(params![
                row.customer_key,
                row.customer_id,
                row.customer_number,
                row.first_name,
                row.last_name,
                row.country,
                row.marital_status,
                row.gender,
                date_sql(row.birthdate),
                date_sql(row.create_date),
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

fn write_dim_products(conn: &Connection, rows: &[DimProduct]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO gold_dim_products
             (product_key, product_id, product_number, product_name, category_id, category,
              subcategory, maintenance, cost, product_line, start_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )?;
        for row in rows {
            stmt.execute(params![
                row.product_key,
                row.product_id,
                row.product_number,
                row.product_name,
                row.category_id,
                row.category,
                row.subcategory,
                row.maintenance,
                row.cost,
                row.product_line,
                date_sql(row.start_date),
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

fn write_fact_sales(conn: &Connection, rows: &[FactSale]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO gold_fact_sales
             (order_number, product_key, customer_key, order_date, shipping_date, due_date,
              sales_amount, quantity, price)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )?;
        for row in rows {
            stmt.execute(params![
                row.order_number,
                row.product_key,
                row.customer_key,
                date_sql(row.order_date),
                date_sql(row.shipping_date),
                date_sql(row.due_date),
                row.sales_amount,
                row.quantity,
                row.price,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

/// Build the star schema from the silver layer.
pub fn run_gold_layer(conn: &Connection) -> Result<Vec<TransformReport>> {
    let crm_customers = silver::fetch_silver_crm_customers(conn)?;
    let erp_customers = silver::fetch_silver_erp_customers(conn)?;
    let erp_locations = silver::fetch_silver_erp_locations(conn)?;
    let products = silver::fetch_silver_crm_products(conn)?;
    let categories = silver::fetch_silver_erp_categories(conn)?;
    let sales = silver::fetch_silver_crm_sales(conn)?;

    truncate_layer(conn, Layer::Gold)?;

    let mut reports = Vec::with_capacity(3);

    let mut report = TransformReport::new("gold_dim_customers");
    let dim_customers =
        build_dim_customers(crm_customers, &erp_customers, &erp_locations, &mut report);
    write_dim_customers(conn, &dim_customers)?;
    info!("{}", report.summary());
    reports.push(report);

    let mut report = TransformReport::new("gold_dim_products");
    let dim_products = build_dim_products(products, &categories, &mut report);
    write_dim_products(conn, &dim_products)?;
    info!("{}", report.summary());
    reports.push(report);

    let mut report = TransformReport::new("gold_fact_sales");
    let facts = build_fact_sales(sales, &dim_customers, &dim_products, &mut report);
    write_fact_sales(conn, &facts)?;
    info!("{}", report.summary());
    reports.push(report);

    Ok(reports)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn crm_customer(cst_id: i64, cst_key: &str, gender: &str) -> SilverCrmCustomer {
        SilverCrmCustomer {
            cst_id,
            cst_key: cst_key.to_string(),
            cst_firstname: Some("Jane".to_string()),
            cst_lastname: Some("Doe".to_string()),
            cst_marital_status: "Married".to_string(),
            cst_gndr: gender.to_string(),
            cst_create_date: NaiveDate::from_ymd_opt(2020, 1, 1),
        }
    }

    fn product(prd_id: i64, prd_key: &str, end_dt: Option<NaiveDate>) -> SilverCrmProduct {
        SilverCrmProduct {
            prd_id,
            cat_id: "CO_RF".to_string(),
            prd_key: prd_key.to_string(),
            prd_nm: Some("Road Frame".to_string()),
            prd_cost: 100.0,
            prd_line: "Road".to_string(),
            prd_start_dt: NaiveDate::from_ymd_opt(2012, 7, 1),
            prd_end_dt: end_dt,
        }
    }

    fn sale(ord: &str, prd_key: &str, cust_id: i64, sales: f64, qty: i64, price: f64) -> SilverCrmSale {
        SilverCrmSale {
            sls_ord_num: ord.to_string(),
            sls_prd_key: prd_key.to_string(),
            sls_cust_id: cust_id,
            sls_order_dt: NaiveDate::from_ymd_opt(2024, 1, 5),
            sls_ship_dt: None,
            sls_due_dt: None,
            sls_sales: sales,
            sls_quantity: qty,
            sls_price: price,
            amount_corrected: false,
        }
    }

    #[test]
    fn test_survivorship_crm_wins_erp_fills_nulls() {
        assert_eq!(survive_gender("Male", Some("Female")), "Male");
        assert_eq!(survive_gender("n/a", Some("Female")), "Female");
        assert_eq!(survive_gender("n/a", Some("n/a")), "n/a");
        assert_eq!(survive_gender("n/a", None), "n/a");
    }

    #[test]
    fn test_dim_customers_surrogate_keys_dense_by_natural_key() {
        // deliberately out of order
        let crm = vec![
            crm_customer(103, "AW00000103", "Female"),
            crm_customer(101, "AW00000101", "Male"),
            crm_customer(102, "AW00000102", "n/a"),
        ];
        let erp = vec![SilverErpCustomer {
            cid: "AW00000102".to_string(),
            bdate: NaiveDate::from_ymd_opt(1990, 9, 30),
            gen: "Female".to_string(),
        }];

        let mut report = TransformReport::new("gold_dim_customers");
        let dims = build_dim_customers(crm, &erp, &[], &mut report);

        let keys: Vec<i64> = dims.iter().map(|d| d.customer_key).collect();
        let ids: Vec<i64> = dims.iter().map(|d| d.customer_id).collect();
        assert_eq!(keys, vec![1, 2, 3]);
        assert_eq!(ids, vec![101, 102, 103]);

        // ERP fills the missing gender and the birthdate
        assert_eq!(dims[1].gender, "Female");
        assert_eq!(dims[1].birthdate, NaiveDate::from_ymd_opt(1990, 9, 30));
        assert_eq!(report.count("gender_survived_from_erp"), 1);
        // no location extract: country falls back to n/a
        assert_eq!(dims[0].country, "n/a");
    }

    #[test]
    fn test_spec_survivorship_example() {
        // CRM (cid=101, gender='M' -> "Male") + ERP (gender null -> "n/a")
        // merge to "Male"
        let crm = vec![crm_customer(101, "AW00000101", "Male")];
        let erp = vec![SilverErpCustomer {
            cid: "AW00000101".to_string(),
            bdate: None,
            gen: "n/a".to_string(),
        }];

        let mut report = TransformReport::new("gold_dim_customers");
        let dims = build_dim_customers(crm, &erp, &[], &mut report);

        assert_eq!(dims[0].gender, "Male");
    }

    #[test]
    fn test_dim_products_skips_historical_versions() {
        let products = vec![
            product(1, "FR-R92B-58", NaiveDate::from_ymd_opt(2012, 6, 30)),
            product(2, "FR-R92B-58", None),
            product(3, "HL-U509", None),
        ];
        let categories = vec![SilverErpProductCategory {
            id: "CO_RF".to_string(),
            cat: Some("Components".to_string()),
            subcat: Some("Road Frames".to_string()),
            maintenance: Some("Yes".to_string()),
        }];

        let mut report = TransformReport::new("gold_dim_products");
        let dims = build_dim_products(products, &categories, &mut report);

        assert_eq!(dims.len(), 2);
        assert_eq!(report.count("historical_version_skipped"), 1);
        let keys: Vec<i64> = dims.iter().map(|d| d.product_key).collect();
        assert_eq!(keys, vec![1, 2]);
        assert_eq!(dims[0].category.as_deref(), Some("Components"));
    }

    #[test]
    fn test_fact_sales_excludes_unresolvable_rows() {
        let customers = {
            let mut report = TransformReport::new("gold_dim_customers");
            build_dim_customers(
                vec![crm_customer(101, "AW00000101", "Male")],
                &[],
                &[],
                &mut report,
            )
        };
        let products = {
            let mut report = TransformReport::new("gold_dim_products");
            build_dim_products(vec![product(1, "FR-R92B-58", None)], &[], &mut report)
        };

        let sales = vec![
            sale("SO1001", "FR-R92B-58", 101, 125.0, 5, 25.0),
            sale("SO1002", "FR-R92B-58", 999, 25.0, 1, 25.0), // unknown customer
            sale("SO1003", "NO-SUCH-KEY", 101, 25.0, 1, 25.0), // unknown product
        ];

        let mut report = TransformReport::new("gold_fact_sales");
        let facts = build_fact_sales(sales, &customers, &products, &mut report);

        assert_eq!(facts.len(), 1);
        assert_eq!(report.count("unknown_customer"), 1);
        assert_eq!(report.count("unknown_product"), 1);
        assert_eq!(facts[0].customer_key, 1);
        assert_eq!(facts[0].product_key, 1);
    }

    #[test]
    fn test_fact_sales_amount_invariant_holds() {
        let customers = {
            let mut report = TransformReport::new("gold_dim_customers");
            build_dim_customers(
                vec![crm_customer(101, "AW00000101", "Male")],
                &[],
                &[],
                &mut report,
            )
        };
        let products = {
            let mut report = TransformReport::new("gold_dim_products");
            build_dim_products(vec![product(1, "FR-R92B-58", None)], &[], &mut report)
        };

        // a silver row edited behind the pipeline's back
        let sales = vec![sale("SO1001", "FR-R92B-58", 101, 200.0, 5, 25.0)];

        let mut report = TransformReport::new("gold_fact_sales");
        let facts = build_fact_sales(sales, &customers, &products, &mut report);

        assert_eq!(facts[0].sales_amount, 125.0);
        assert_eq!(report.count("amount_corrected"), 1);
        for fact in &facts {
            assert_eq!(fact.sales_amount, fact.quantity as f64 * fact.price);
        }
    }
}
