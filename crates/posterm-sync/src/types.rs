use posterm_core::{Catalog, Category, Product, StoreSettings};
use serde::{Deserialize, Serialize};

/// Body of `GET /api/sync`.
///
/// Missing top-level keys deserialize as empty, matching a backend that has
/// not been configured yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncPayload {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub settings: StoreSettings,
}

impl SyncPayload {
    /// Splits the payload into a catalog and the store settings.
    #[must_use]
    pub fn into_parts(self) -> (Catalog, StoreSettings) {
        (Catalog::new(self.products, self.categories), self.settings)
    }
}

/// Optional acknowledgement body from `POST /api/transactions`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionAck {
    #[serde(default)]
    pub reference: Option<String>,
}
