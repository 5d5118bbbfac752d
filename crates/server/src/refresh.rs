use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::warn;

use stickfit_catalog::shopify::ShopifyClient;
use stickfit_catalog::{loader, CatalogError, SnapshotStore};
use stickfit_core::config::CatalogConfig;
use stickfit_core::CatalogSnapshot;

/// Periodic wholesale refresh: rebuild a complete snapshot and swap it in.
/// A failed refresh keeps the previous snapshot serving; it never leaves
/// requests without a catalog.
pub fn spawn(store: Arc<SnapshotStore>, config: CatalogConfig) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(config.refresh_secs));
        // The first tick fires immediately; bootstrap already loaded once.
        interval.tick().await;

        loop {
            interval.tick().await;
            match reload(&config).await {
                Ok(snapshot) => {
                    store.replace(snapshot);
                }
                Err(error) => {
                    let error = stickfit_core::ApplicationError::from(error);
                    warn!(
                        event_name = "catalog.refresh_failed",
                        error = %error,
                        "catalog refresh failed; keeping the previous snapshot"
                    );
                }
            }
        }
    })
}

/// Shopify is the refresh source when credentials are configured; the
/// regional file export otherwise.
async fn reload(config: &CatalogConfig) -> Result<CatalogSnapshot, CatalogError> {
    match (&config.shopify_base_url, &config.shopify_token) {
        (Some(base_url), Some(token)) => {
            ShopifyClient::new(base_url.clone(), token.clone())?.fetch_snapshot().await
        }
        _ => loader::load_catalog(&loader::configured_catalog_path(config)),
    }
}
