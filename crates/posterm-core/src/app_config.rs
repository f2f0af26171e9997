use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use rust_decimal::Decimal;

use crate::demo::DemoDataset;
use crate::display::Layout;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Startup configuration shared by the terminal and the preview server.
/// Read once; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Base URL of the sync backend. `None` runs the terminal offline on
    /// demo data.
    pub backend_url: Option<String>,
    pub sync_interval_ms: u64,
    pub request_timeout_secs: u64,
    pub sync_max_retries: u32,
    pub sync_backoff_base_ms: u64,
    pub user_agent: String,
    /// Fraction, `0.15` for 15% GST.
    pub tax_rate: Decimal,
    pub currency: String,
    pub business_name: String,
    pub screen_width: u32,
    pub screen_height: u32,
    pub demo_dataset: DemoDataset,
    /// Optional YAML catalog used instead of the built-in dataset when the
    /// backend cannot be reached.
    pub catalog_path: Option<PathBuf>,
    pub payment_simulation_ms: u64,
    pub approval_dwell_ms: u64,
    pub bind_addr: SocketAddr,
    pub simulator_dir: PathBuf,
}

impl AppConfig {
    #[must_use]
    pub fn sync_interval(&self) -> Duration {
        Duration::from_millis(self.sync_interval_ms)
    }

    #[must_use]
    pub fn payment_simulation(&self) -> Duration {
        Duration::from_millis(self.payment_simulation_ms)
    }

    #[must_use]
    pub fn approval_dwell(&self) -> Duration {
        Duration::from_millis(self.approval_dwell_ms)
    }

    #[must_use]
    pub fn layout(&self) -> Layout {
        Layout::for_screen(self.screen_width, self.screen_height)
    }
}
