pub mod app_config;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod demo;
pub mod display;
pub mod error;
pub mod money;
pub mod payment;
pub mod session;
pub mod sync_state;

pub use app_config::{AppConfig, Environment};
pub use cart::{Cart, LineItem};
pub use catalog::{Catalog, Category, CategoryFilter, Product, StoreSettings};
pub use config::{load_app_config, load_app_config_from_env};
pub use demo::{load_catalog_file, DemoDataset};
pub use display::{Layout, ScreenProfile, Theme};
pub use error::{ConfigError, OrderError};
pub use money::{format_amount, round_currency, TaxBreakdown};
pub use payment::{PaymentMethod, PaymentState, TransactionRecord};
pub use session::{CartSummary, OrderSession};
pub use sync_state::{SyncCompletion, SyncTracker};
