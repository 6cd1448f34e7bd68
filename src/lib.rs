// Medallion Warehouse - Core Library
// CSV extracts from CRM and ERP sources, reshaped through bronze, silver,
// and gold layers into a star schema.

pub mod audit;
pub mod bronze;
pub mod cleansing;
pub mod config;
pub mod error;
pub mod gold;
pub mod logging;
pub mod pipeline;
pub mod schema;
pub mod silver;

// Re-export commonly used types
pub use audit::{LayerRun, TransformReport};
pub use config::WarehouseConfig;
pub use error::{EtlError, Result};
pub use gold::{DimCustomer, DimProduct, FactSale};
pub use pipeline::{run_full_pipeline, run_layer, RunSummary};
pub use schema::{setup_database, table_count, truncate_layer, Layer};
pub use silver::{
    SilverCrmCustomer, SilverCrmProduct, SilverCrmSale, SilverErpCustomer, SilverErpLocation,
    SilverErpProductCategory,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
