use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use stickfit_core::{CatalogSnapshot, Product, Tier};

use crate::CatalogError;

const API_VERSION: &str = "2025-01";

/// Admin-API client for the upstream Shopify store. Selection attributes the
/// products API does not carry (carbon, style scores) stay absent on the
/// mapped rows; the engine's missing-data defaults cover them.
pub struct ShopifyClient {
    http: reqwest::Client,
    base_url: String,
    token: SecretString,
}

impl ShopifyClient {
    pub fn new(base_url: impl Into<String>, token: SecretString) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|error| CatalogError::Shopify(error.to_string()))?;
        Ok(Self { http, base_url: base_url.into(), token })
    }

    /// Fetch the product list and map it into a catalog snapshot.
    pub async fn fetch_snapshot(&self) -> Result<CatalogSnapshot, CatalogError> {
        let url = format!(
            "{}/admin/api/{API_VERSION}/products.json?limit=250",
            self.base_url.trim_end_matches('/')
        );

        let response = self
            .http
            .get(&url)
            .header("X-Shopify-Access-Token", self.token.expose_secret())
            .send()
            .await
            .map_err(|error| CatalogError::Shopify(error.to_string()))?;

        if !response.status().is_success() {
            return Err(CatalogError::Shopify(format!(
                "products request returned status {}",
                response.status()
            )));
        }

        let payload: ProductsResponse = response
            .json()
            .await
            .map_err(|error| CatalogError::Shopify(error.to_string()))?;

        let products = map_products(payload);
        tracing::debug!(
            event_name = "catalog.shopify_fetched",
            rows = products.len(),
            "shopify products mapped into catalog rows"
        );
        Ok(CatalogSnapshot::new(products, format!("shopify:{}", self.base_url)))
    }
}

#[derive(Debug, Deserialize)]
struct ProductsResponse {
    products: Vec<ShopifyProduct>,
}

#[derive(Debug, Deserialize)]
struct ShopifyProduct {
    title: String,
    #[serde(default)]
    handle: String,
    #[serde(default)]
    product_type: String,
    /// Comma-separated tag list, e.g. "Elite, bow:Ultimate V2".
    #[serde(default)]
    tags: String,
    #[serde(default)]
    variants: Vec<ShopifyVariant>,
    #[serde(default)]
    image: Option<ShopifyImage>,
}

#[derive(Debug, Deserialize)]
struct ShopifyVariant {
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    price: Option<String>,
    /// First option axis; the store uses it for length.
    #[serde(default)]
    option1: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ShopifyImage {
    src: String,
}

/// One catalog row per variant with a SKU. Tier and bow come from tags;
/// price and length from the variant.
fn map_products(payload: ProductsResponse) -> Vec<Product> {
    let mut rows = Vec::new();

    for product in payload.products {
        let tags: Vec<String> =
            product.tags.split(',').map(|tag| tag.trim().to_string()).collect();
        let tier = tags.iter().find_map(|tag| Tier::parse(tag));
        let bow = tags.iter().find_map(|tag| {
            tag.to_ascii_lowercase()
                .strip_prefix("bow:")
                .map(|value| value.trim().to_string())
        });
        let product_url =
            (!product.handle.is_empty()).then(|| format!("/products/{}", product.handle));

        for variant in &product.variants {
            let Some(code) = variant.sku.as_deref().filter(|sku| !sku.trim().is_empty()) else {
                continue;
            };

            rows.push(Product {
                code: code.trim().to_string(),
                description: product.title.clone(),
                player_type: product.product_type.clone(),
                tier,
                price: variant
                    .price
                    .as_deref()
                    .and_then(|price| Decimal::from_str(price.trim()).ok())
                    .filter(|price| !price.is_sign_negative()),
                length: variant
                    .option1
                    .as_deref()
                    .and_then(|value| value.trim().trim_end_matches('"').parse::<f64>().ok())
                    .filter(|value| value.is_finite()),
                bow: bow.clone(),
                carbon_pct: None,
                power: None,
                touch: None,
                aerial: None,
                drag_flick: None,
                image_url: product.image.as_ref().map(|image| image.src.clone()),
                product_url: product_url.clone(),
                is_solid_core: crate::loader::derive_solid_core(&product.title, code),
            });
        }
    }

    rows
}
