use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::product::Product;

/// Immutable, row-oriented view of the product table for one selection
/// request. Refreshes construct a new snapshot and swap the shared pointer;
/// nothing mutates an existing snapshot in place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    products: Vec<Product>,
    loaded_at: DateTime<Utc>,
    source: String,
}

impl CatalogSnapshot {
    pub fn new(products: Vec<Product>, source: impl Into<String>) -> Self {
        Self { products, loaded_at: Utc::now(), source: source.into() }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Where this snapshot came from (file path, ingestion endpoint, seed).
    pub fn source(&self) -> &str {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_exposes_rows_read_only() {
        let snapshot = CatalogSnapshot::new(Vec::new(), "seed");
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.len(), 0);
        assert_eq!(snapshot.source(), "seed");
    }
}
