//! # Product Catalog
//!
//! Barcode lookup against an external product catalog.
//!
//! The catalog is a collaborator, not part of settlement. The API holds an
//! `Arc<dyn ProductCatalog>`; [`StaticCatalog`] is the implementation shipped
//! until a real catalog service is wired in.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// What the catalog knows about a barcode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductSummary {
    pub barcode: String,
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
}

/// Looks up product details by barcode.
pub trait ProductCatalog: Send + Sync {
    /// Returns `None` when the barcode is unknown.
    fn lookup(&self, barcode: &str) -> Option<ProductSummary>;
}

/// In-memory catalog with a fixed set of entries.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entries: HashMap<String, ProductSummary>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog preloaded with a few sample barcodes.
    pub fn with_samples() -> Self {
        let mut catalog = Self::new();
        catalog.insert(ProductSummary {
            barcode: "123456789012".to_string(),
            name: "Test Product 1".to_string(),
            description: Some("This is a test product description".to_string()),
            price_cents: 1999,
        });
        catalog.insert(ProductSummary {
            barcode: "987654321098".to_string(),
            name: "Test Product 2".to_string(),
            description: Some("Another test product description".to_string()),
            price_cents: 2999,
        });
        catalog.insert(ProductSummary {
            barcode: "456789123456".to_string(),
            name: "Test Product 3".to_string(),
            description: Some("A third test product description".to_string()),
            price_cents: 999,
        });
        catalog
    }

    pub fn insert(&mut self, summary: ProductSummary) {
        self.entries.insert(summary.barcode.clone(), summary);
    }
}

impl ProductCatalog for StaticCatalog {
    fn lookup(&self, barcode: &str) -> Option<ProductSummary> {
        self.entries.get(barcode.trim()).cloned()
    }
}
