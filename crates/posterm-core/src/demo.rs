//! Built-in catalogs used when the backend is unreachable, plus loading of
//! a custom offline catalog from YAML.

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::catalog::{Catalog, Category, Product};
use crate::error::ConfigError;

/// `(id, name, icon, color)`
type CategoryRow = (&'static str, &'static str, &'static str, &'static str);
/// `(id, name, price in cents, category id, color)`
type ProductRow = (&'static str, &'static str, i64, &'static str, &'static str);

const COFFEE_CATEGORIES: &[CategoryRow] = &[
    ("cat-1", "Coffee", "\u{2615}", "#8B4513"),
    ("cat-2", "Food", "\u{1F37D}", "#228B22"),
    ("cat-3", "Drinks", "\u{1F964}", "#4169E1"),
    ("cat-4", "Desserts", "\u{1F370}", "#FF69B4"),
];

const COFFEE_PRODUCTS: &[ProductRow] = &[
    ("p1", "Flat White", 550, "cat-1", "#D4A574"),
    ("p2", "Cappuccino", 550, "cat-1", "#C4A484"),
    ("p3", "Long Black", 500, "cat-1", "#3C2415"),
    ("p4", "Latte", 550, "cat-1", "#E8D4B8"),
    ("p5", "Mocha", 600, "cat-1", "#5C4033"),
    ("p6", "Espresso", 400, "cat-1", "#2C1810"),
    ("p7", "Avo Toast", 1600, "cat-2", "#568203"),
    ("p8", "Eggs Bene", 2200, "cat-2", "#FFD700"),
    ("p9", "Bacon Eggs", 1800, "cat-2", "#CD853F"),
    ("p10", "Croissant", 650, "cat-2", "#DEB887"),
    ("p11", "OJ Fresh", 600, "cat-3", "#FFA500"),
    ("p12", "Smoothie", 800, "cat-3", "#FF6B6B"),
    ("p13", "Choc Cake", 900, "cat-4", "#4A2C2A"),
    ("p14", "Cheesecake", 1000, "cat-4", "#FFFACD"),
    ("p15", "Brownie", 700, "cat-4", "#3D2314"),
];

const RESTAURANT_CATEGORIES: &[CategoryRow] = &[
    ("cat-1", "Starters", "\u{1F957}", "#4CAF50"),
    ("cat-2", "Mains", "\u{1F356}", "#FF5722"),
    ("cat-3", "Drinks", "\u{1F377}", "#9C27B0"),
    ("cat-4", "Desserts", "\u{1F36E}", "#E91E63"),
];

const RESTAURANT_PRODUCTS: &[ProductRow] = &[
    ("p1", "Soup", 1200, "cat-1", "#FF9800"),
    ("p2", "Bruschetta", 1400, "cat-1", "#F44336"),
    ("p3", "Calamari", 1800, "cat-1", "#FFE0B2"),
    ("p4", "Salad", 1500, "cat-1", "#8BC34A"),
    ("p5", "Steak", 4200, "cat-2", "#8D6E63"),
    ("p6", "Fish", 3600, "cat-2", "#03A9F4"),
    ("p7", "Pasta", 2800, "cat-2", "#FFC107"),
    ("p8", "Risotto", 2600, "cat-2", "#FFEB3B"),
    ("p9", "Burger", 2400, "cat-2", "#795548"),
    ("p10", "Red Wine", 1400, "cat-3", "#880E4F"),
    ("p11", "White Wine", 1300, "cat-3", "#F5F5DC"),
    ("p12", "Beer", 1000, "cat-3", "#FFB300"),
    ("p13", "Tiramisu", 1400, "cat-4", "#D7CCC8"),
    ("p14", "Panna Cotta", 1200, "cat-4", "#FFF8E1"),
    ("p15", "Gelato", 1000, "cat-4", "#FFCCBC"),
];

const RETAIL_CATEGORIES: &[CategoryRow] = &[
    ("cat-1", "Apparel", "\u{1F455}", "#2196F3"),
    ("cat-2", "Accessories", "\u{1F45C}", "#9C27B0"),
    ("cat-3", "Footwear", "\u{1F45F}", "#4CAF50"),
    ("cat-4", "Sale", "\u{1F3F7}", "#F44336"),
];

const RETAIL_PRODUCTS: &[ProductRow] = &[
    ("p1", "T-Shirt", 3500, "cat-1", "#64B5F6"),
    ("p2", "Jeans", 8900, "cat-1", "#1565C0"),
    ("p3", "Hoodie", 7500, "cat-1", "#455A64"),
    ("p4", "Jacket", 12000, "cat-1", "#37474F"),
    ("p5", "Dress", 9500, "cat-1", "#EC407A"),
    ("p6", "Watch", 19900, "cat-2", "#78909C"),
    ("p7", "Sunglasses", 8500, "cat-2", "#212121"),
    ("p8", "Belt", 4500, "cat-2", "#5D4037"),
    ("p9", "Bag", 14900, "cat-2", "#8D6E63"),
    ("p10", "Sneakers", 12900, "cat-3", "#E0E0E0"),
    ("p11", "Boots", 16500, "cat-3", "#4E342E"),
    ("p12", "Sandals", 5500, "cat-3", "#BCAAA4"),
    ("p13", "Cap 50%", 1500, "cat-4", "#EF5350"),
    ("p14", "Scarf 40%", 2500, "cat-4", "#EF5350"),
    ("p15", "Gloves 30%", 1800, "cat-4", "#EF5350"),
];

/// Named built-in catalogs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DemoDataset {
    #[default]
    Coffee,
    Restaurant,
    Retail,
}

impl DemoDataset {
    pub const ALL: [DemoDataset; 3] = [Self::Coffee, Self::Restaurant, Self::Retail];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Coffee => "coffee",
            Self::Restaurant => "restaurant",
            Self::Retail => "retail",
        }
    }

    #[must_use]
    pub fn catalog(self) -> Catalog {
        let (categories, products) = match self {
            Self::Coffee => (COFFEE_CATEGORIES, COFFEE_PRODUCTS),
            Self::Restaurant => (RESTAURANT_CATEGORIES, RESTAURANT_PRODUCTS),
            Self::Retail => (RETAIL_CATEGORIES, RETAIL_PRODUCTS),
        };

        let categories = categories
            .iter()
            .map(|&(id, name, icon, color)| Category {
                id: id.to_string(),
                name: name.to_string(),
                icon: icon.to_string(),
                display_color: color.to_string(),
            })
            .collect();

        let products = products
            .iter()
            .map(|&(id, name, cents, category_id, color)| Product {
                id: id.to_string(),
                name: name.to_string(),
                price: Decimal::new(cents, 2),
                category_id: Some(category_id.to_string()),
                display_color: Some(color.to_string()),
            })
            .collect();

        Catalog::new(products, categories)
    }
}

impl std::fmt::Display for DemoDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DemoDataset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| ConfigError::InvalidEnvVar {
                var: "POSTERM_DEMO_DATASET".to_string(),
                reason: format!("unknown dataset '{s}'; expected coffee, restaurant or retail"),
            })
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    categories: Vec<Category>,
    products: Vec<Product>,
}

/// Load and validate an offline catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog_file(path: &Path) -> Result<Catalog, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_catalog_yaml(&content)
}

fn parse_catalog_yaml(content: &str) -> Result<Catalog, ConfigError> {
    let file: CatalogFile = serde_yaml::from_str(content)?;
    validate_catalog(&file)?;
    Ok(Catalog::new(file.products, file.categories))
}

fn validate_catalog(file: &CatalogFile) -> Result<(), ConfigError> {
    let mut seen_categories = HashSet::new();
    for category in &file.categories {
        if category.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "category id must be non-empty".to_string(),
            ));
        }
        if !seen_categories.insert(category.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate category id: '{}'",
                category.id
            )));
        }
    }

    let mut seen_products = HashSet::new();
    for product in &file.products {
        if product.id.trim().is_empty() || product.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "product id and name must be non-empty".to_string(),
            ));
        }
        if product.price.is_sign_negative() {
            return Err(ConfigError::Validation(format!(
                "product '{}' has negative price {}",
                product.id, product.price
            )));
        }
        if !seen_products.insert(product.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate product id: '{}'",
                product.id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CategoryFilter;

    #[test]
    fn every_dataset_has_four_categories_and_fifteen_products() {
        for dataset in DemoDataset::ALL {
            let catalog = dataset.catalog();
            assert_eq!(catalog.categories().len(), 4, "{dataset}");
            assert_eq!(catalog.products().len(), 15, "{dataset}");
        }
    }

    #[test]
    fn every_demo_product_points_at_a_known_category() {
        for dataset in DemoDataset::ALL {
            let catalog = dataset.catalog();
            for p in catalog.products() {
                let cat = p.category_id.as_deref().expect("demo products are categorized");
                assert!(catalog.category(cat).is_some(), "{dataset}: {}", p.id);
            }
        }
    }

    #[test]
    fn coffee_prices_match_menu() {
        let catalog = DemoDataset::Coffee.catalog();
        assert_eq!(catalog.product("p1").unwrap().price, Decimal::new(550, 2));
        assert_eq!(catalog.product("p6").unwrap().price, Decimal::new(400, 2));
        let coffee = catalog.filter_products(&CategoryFilter::from_id(Some("cat-1")));
        assert_eq!(coffee.len(), 6);
    }

    #[test]
    fn dataset_from_str() {
        assert_eq!("retail".parse::<DemoDataset>().unwrap(), DemoDataset::Retail);
        assert!(matches!(
            "bakery".parse::<DemoDataset>(),
            Err(ConfigError::InvalidEnvVar { .. })
        ));
    }

    #[test]
    fn yaml_catalog_parses() {
        let yaml = r##"
categories:
  - id: cat-1
    name: Tea
    icon: "T"
    color: "#00AA00"
products:
  - id: t1
    name: Green Tea
    price: 4.50
    category_id: cat-1
  - id: t2
    name: Chai
    price: "5.25"
"##;
        let catalog = parse_catalog_yaml(yaml).expect("valid yaml catalog");
        assert_eq!(catalog.products().len(), 2);
        assert_eq!(catalog.product("t2").unwrap().price, Decimal::new(525, 2));
        assert_eq!(catalog.categories()[0].display_color, "#00AA00");
    }

    #[test]
    fn yaml_catalog_rejects_duplicate_product_ids() {
        let yaml = r"
products:
  - { id: a, name: A, price: 1 }
  - { id: a, name: B, price: 2 }
";
        let err = parse_catalog_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("duplicate product id")));
    }

    #[test]
    fn yaml_catalog_rejects_negative_price() {
        let yaml = r"
products:
  - { id: a, name: A, price: -1 }
";
        let err = parse_catalog_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("negative price")));
    }

    #[test]
    fn missing_catalog_file_is_io_error() {
        let err = load_catalog_file(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::CatalogFileIo { .. }));
    }
}
