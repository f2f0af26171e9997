use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Icon shown on a category chip when the backend does not send one.
pub const DEFAULT_CATEGORY_ICON: &str = "\u{1F4E6}";

/// Filter id that selects every product.
pub const ALL_CATEGORIES: &str = "all";

/// A sellable item as delivered by the backend sync or a demo dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Unit price, tax exclusive. Accepts a JSON number or decimal string.
    pub price: Decimal,
    #[serde(default, alias = "categoryId")]
    pub category_id: Option<String>,
    /// Button background, e.g. `"#D4A574"`.
    #[serde(default, rename = "color")]
    pub display_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default, rename = "color")]
    pub display_color: String,
}

fn default_icon() -> String {
    DEFAULT_CATEGORY_ICON.to_string()
}

/// Store-level settings from the sync payload.
///
/// Only `business_name` and `currency` are interpreted; everything else is
/// kept verbatim so it can be shown in diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Which products the grid shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Category(String),
}

impl CategoryFilter {
    /// Maps a tapped chip id to a filter. `None` and `"all"` both select
    /// every product.
    #[must_use]
    pub fn from_id(id: Option<&str>) -> Self {
        match id {
            None | Some(ALL_CATEGORIES) => Self::All,
            Some(id) => Self::Category(id.to_string()),
        }
    }

    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::Category(id) => product.category_id.as_deref() == Some(id.as_str()),
        }
    }

    #[must_use]
    pub fn as_id(&self) -> &str {
        match self {
            Self::All => ALL_CATEGORIES,
            Self::Category(id) => id,
        }
    }
}

/// Products and categories currently on sale.
///
/// Always replaced wholesale; there is no per-item update path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
    categories: Vec<Category>,
}

impl Catalog {
    #[must_use]
    pub fn new(products: Vec<Product>, categories: Vec<Category>) -> Self {
        Self {
            products,
            categories,
        }
    }

    /// Swaps both lists in one step. Nothing from the previous catalog
    /// survives.
    pub fn replace(&mut self, products: Vec<Product>, categories: Vec<Category>) {
        self.products = products;
        self.categories = categories;
    }

    /// Products in stored order that belong to the filtered category.
    ///
    /// A product whose `category_id` matches no known category is only ever
    /// returned for [`CategoryFilter::All`].
    #[must_use]
    pub fn filter_products(&self, filter: &CategoryFilter) -> Vec<&Product> {
        self.products.iter().filter(|p| filter.matches(p)).collect()
    }

    #[must_use]
    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.categories.is_empty()
    }
}
