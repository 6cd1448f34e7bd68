// Full-pipeline tests over a small CRM + ERP fixture set: every layer runs
// against a real SQLite file and the gold contract is checked end to end.

use medallion_warehouse::config::config_at;
use medallion_warehouse::pipeline::run_full_pipeline;
use rusqlite::Connection;
use std::fs;
use std::path::Path;

fn write_fixtures(datasets: &Path) {
    let crm = datasets.join("source_crm");
    let erp = datasets.join("source_erp");
    fs::create_dir_all(&crm).unwrap();
    fs::create_dir_all(&erp).unwrap();

    fs::write(
        crm.join("cust_info.csv"),
        "cst_id,cst_key,cst_firstname,cst_lastname,cst_marital_status,cst_gndr,cst_create_date\n\
         101,AW00000101,Jane,Doe,M,M,2020-01-01\n\
         101,AW00000101,Janet,Doe,M,M,2019-06-15\n\
         102,AW00000102,Alice,Rivera,S,,2021-05-20\n\
         103,AW00000103,Eve,Stone,X,F,2021-03-02\n\
         ,AW00000104,Ghost,Row,S,M,2021-01-01\n",
    )
    .unwrap();

    fs::write(
        crm.join("prd_info.csv"),
        "prd_id,prd_key,prd_nm,prd_cost,prd_line,prd_start_dt,prd_end_dt\n\
         210,CO-RF-FR-R92B-58,HL Road Frame,-1,R,2011-07-01,\n\
         211,CO-RF-FR-R92B-58,HL Road Frame,1200,R,2012-07-01,\n\
         212,AC-HE-HL-U509,Sport-100 Helmet,35,S,2011-07-01,\n",
    )
    .unwrap();

    fs::write(
        crm.join("sales_details.csv"),
        "sls_ord_num,sls_prd_key,sls_cust_id,sls_order_dt,sls_ship_dt,sls_due_dt,sls_sales,sls_quantity,sls_price\n\
         SO1001,FR-R92B-58,101,20240105,20240112,20240119,200,5,25\n\
         SO1002,HL-U509,102,20240201,20240208,20240215,35,1,35\n\
         SO1003,HL-U509,999,20240301,20240308,20240315,35,1,35\n\
         SO1004,FR-R92B-58,103,0,20240108,20240115,,2,50\n",
    )
    .unwrap();

    fs::write(
        erp.join("CUST_AZ12.csv"),
        "cid,bdate,gen\n\
         NASAW00000101,1985-04-12,\n\
         NASAW00000102,1990-09-30,Female\n\
         NASAW00000103,2090-01-01,MALE\n",
    )
    .unwrap();

    fs::write(
        erp.join("LOC_A101.csv"),
        "cid,cntry\n\
         AW-00000101,US\n\
         AW-00000102,DE\n\
         AW-00000103,Australia\n",
    )
    .unwrap();

    fs::write(
        erp.join("PX_CAT_G1V2.csv"),
        "id,cat,subcat,maintenance\n\
         CO_RF,Components,Road Frames,Yes\n\
         AC_HE,Accessories,Helmets,No\n",
    )
    .unwrap();
}

/// Dump a table to comparable strings, ordered by its first column.
fn dump_table(conn: &Connection, table: &str) -> Vec<String> {
    let mut stmt = conn
        .prepare(&format!("SELECT * FROM {table} ORDER BY 1, 2"))
        .unwrap();
    let column_count = stmt.column_count();
    let rows = stmt
        .query_map([], |row| {
            let mut fields = Vec::with_capacity(column_count);
            for i in 0..column_count {
                fields.push(format!("{:?}", row.get_ref(i)?));
            }
            Ok(fields.join("|"))
        })
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    rows
}

#[test]
fn test_full_pipeline_builds_star_schema() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());
    let config = config_at(dir.path(), &dir.path().join("warehouse.db"));
    let conn = config.open_database().unwrap();

    let summary = run_full_pipeline(&conn, &config).unwrap();
    assert_eq!(summary.layers.len(), 3);

    // Silver dedup property: no two customer rows share a natural key
    let (total, distinct): (i64, i64) = conn
        .query_row(
            "SELECT COUNT(*), COUNT(DISTINCT cst_id) FROM silver_crm_customer_info",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(total, 3);
    assert_eq!(total, distinct);

    // The surviving duplicate is the latest create_date
    let first_name: String = conn
        .query_row(
            "SELECT cst_firstname FROM silver_crm_customer_info WHERE cst_id = 101",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(first_name, "Jane");

    // Dimension surrogate keys are dense from 1 in natural-key order
    let customers: Vec<(i64, i64, String, String)> = conn
        .prepare(
            "SELECT customer_key, customer_id, gender, country
             FROM gold_dim_customers ORDER BY customer_key",
        )
        .unwrap()
        .query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert_eq!(customers.len(), 3);
    assert_eq!(customers[0], (1, 101, "Male".to_string(), "United States".to_string()));
    // CRM gender missing -> ERP value survives
    assert_eq!(customers[1], (2, 102, "Female".to_string(), "Germany".to_string()));
    // CRM value wins over conflicting ERP value
    assert_eq!(customers[2], (3, 103, "Female".to_string(), "Australia".to_string()));

    // Future ERP birthdate was nulled, valid one carried through
    let bdate_101: Option<String> = conn
        .query_row(
            "SELECT birthdate FROM gold_dim_customers WHERE customer_id = 101",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(bdate_101.as_deref(), Some("1985-04-12"));
    let bdate_103: Option<String> = conn
        .query_row(
            "SELECT birthdate FROM gold_dim_customers WHERE customer_id = 103",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(bdate_103, None);

    // Products: only current versions, keys dense, category lookup joined
    let products: Vec<(i64, String, Option<String>)> = conn
        .prepare(
            "SELECT product_key, product_number, category
             FROM gold_dim_products ORDER BY product_key",
        )
        .unwrap()
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].0, 1);
    assert_eq!(products[0].1, "FR-R92B-58");
    assert_eq!(products[0].2.as_deref(), Some("Components"));
    assert_eq!(products[1].0, 2);
    assert_eq!(products[1].1, "HL-U509");

    // Facts: the unresolvable customer is excluded, the rest hold the
    // amount invariant exactly
    let facts: Vec<(String, f64, i64, f64)> = conn
        .prepare(
            "SELECT order_number, sales_amount, quantity, price
             FROM gold_fact_sales ORDER BY order_number",
        )
        .unwrap()
        .query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert_eq!(facts.len(), 3);
    assert!(facts.iter().all(|f| f.0 != "SO1003"));
    for (_, sales_amount, quantity, price) in &facts {
        assert_eq!(*sales_amount, *quantity as f64 * price);
    }
    // inconsistent line corrected: 5 * 25 = 125, not the source's 200
    assert_eq!(facts[0], ("SO1001".to_string(), 125.0, 5, 25.0));
    // null sales recovered from quantity * price
    assert_eq!(facts[2], ("SO1004".to_string(), 100.0, 2, 50.0));
}

#[test]
fn test_audit_trail_records_rule_counts() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());
    let config = config_at(dir.path(), &dir.path().join("warehouse.db"));
    let conn = config.open_database().unwrap();

    let summary = run_full_pipeline(&conn, &config).unwrap();

    let rule_count = |table: &str, rule: &str| -> i64 {
        conn.query_row(
            "SELECT COALESCE(SUM(row_count), 0) FROM audit_events
             WHERE run_id = ?1 AND table_name = ?2 AND rule = ?3",
            rusqlite::params![summary.run_id, table, rule],
            |row| row.get(0),
        )
        .unwrap()
    };

    assert_eq!(rule_count("silver_crm_customer_info", "null_natural_key"), 1);
    assert_eq!(rule_count("silver_crm_customer_info", "duplicate_natural_key"), 1);
    // SO1001 (inconsistent) and SO1004 (null sales)
    assert_eq!(rule_count("silver_crm_sales_details", "amount_corrected"), 2);
    assert_eq!(rule_count("silver_crm_sales_details", "invalid_date_nulled"), 1);
    assert_eq!(rule_count("silver_crm_product_info", "cost_imputed"), 1);
    assert_eq!(rule_count("silver_erp_customer_info", "future_birthdate_nulled"), 1);
    assert_eq!(rule_count("gold_fact_sales", "unknown_customer"), 1);

    // the silver flag carried through for the corrected sales line
    let flagged: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM silver_crm_sales_details WHERE amount_corrected = 1",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(flagged, 2);
}

#[test]
fn test_pipeline_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path());
    let config = config_at(dir.path(), &dir.path().join("warehouse.db"));
    let conn = config.open_database().unwrap();

    run_full_pipeline(&conn, &config).unwrap();
    let first: Vec<Vec<String>> = ["gold_dim_customers", "gold_dim_products", "gold_fact_sales"]
        .iter()
        .map(|t| dump_table(&conn, t))
        .collect();

    run_full_pipeline(&conn, &config).unwrap();
    let second: Vec<Vec<String>> = ["gold_dim_customers", "gold_dim_products", "gold_fact_sales"]
        .iter()
        .map(|t| dump_table(&conn, t))
        .collect();

    assert_eq!(first, second);
    assert!(!first[2].is_empty());
}
