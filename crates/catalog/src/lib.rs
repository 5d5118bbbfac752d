//! Catalog ingestion and snapshot management.
//!
//! The catalog is an in-memory, read-mostly table: loaders build a complete
//! [`stickfit_core::CatalogSnapshot`] from a JSON export or the Shopify
//! products API, and the [`store::SnapshotStore`] publishes it to request
//! handlers with an atomic pointer swap. Nothing here mutates a published
//! snapshot.

pub mod loader;
pub mod shopify;
pub mod store;

use std::path::PathBuf;

use thiserror::Error;

pub use loader::{load_catalog, resolve_regional_path, Region};
pub use store::SnapshotStore;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read catalog file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse catalog file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: serde_json::Error },
    #[error("catalog file was not found: `{0}`")]
    MissingFile(PathBuf),
    #[error("shopify request failed: {0}")]
    Shopify(String),
}

impl From<CatalogError> for stickfit_core::ApplicationError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value.to_string())
    }
}
