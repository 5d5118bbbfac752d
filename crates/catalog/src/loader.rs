use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use stickfit_core::{CatalogSnapshot, Product, Tier};

use crate::CatalogError;

/// Catalog region. Regional exports are optional; anything unrecognized
/// reads as the global catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
    Global,
    Eu,
    Au,
}

impl Region {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "EU" => Self::Eu,
            "AU" => Self::Au,
            _ => Self::Global,
        }
    }

    fn file_name(&self) -> &'static str {
        match self {
            Self::Global => "catalog.json",
            Self::Eu => "catalog_eu.json",
            Self::Au => "catalog_au.json",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("GLOBAL"),
            Self::Eu => f.write_str("EU"),
            Self::Au => f.write_str("AU"),
        }
    }
}

/// Pick the catalog file for a region. The AU export is optional and falls
/// back to the global file when it is not present.
pub fn resolve_regional_path(data_dir: &Path, region: Region) -> PathBuf {
    let regional = data_dir.join(region.file_name());
    match region {
        Region::Au if !regional.exists() => data_dir.join(Region::Global.file_name()),
        _ => regional,
    }
}

/// The catalog file the configuration points at: an explicit path wins,
/// otherwise the region picks a file inside the data directory.
pub fn configured_catalog_path(config: &stickfit_core::config::CatalogConfig) -> PathBuf {
    config
        .path
        .clone()
        .unwrap_or_else(|| resolve_regional_path(&config.data_dir, Region::parse(&config.region)))
}

/// Load a catalog snapshot from a JSON export.
///
/// The export is an array of row objects keyed either by this crate's field
/// names or by the legacy sheet headers ("Product Code", "Full Price", ...),
/// so data exported from the upstream workbook loads unchanged. Numeric
/// fields parse leniently (currency markers stripped, non-finite values
/// dropped) and each row derives its solid-core flag here, at the ingestion
/// boundary.
pub fn load_catalog(path: &Path) -> Result<CatalogSnapshot, CatalogError> {
    if !path.exists() {
        return Err(CatalogError::MissingFile(path.to_path_buf()));
    }

    let raw = fs::read_to_string(path)
        .map_err(|source| CatalogError::ReadFile { path: path.to_path_buf(), source })?;
    let records: Vec<RawProductRecord> = serde_json::from_str(&raw)
        .map_err(|source| CatalogError::ParseFile { path: path.to_path_buf(), source })?;

    let products: Vec<Product> = records.into_iter().map(RawProductRecord::into_product).collect();

    tracing::debug!(
        event_name = "catalog.loaded",
        path = %path.display(),
        rows = products.len(),
        "catalog snapshot loaded from file"
    );

    Ok(CatalogSnapshot::new(products, path.display().to_string()))
}

/// Solid-core construction is not a column in the source data; it is
/// signalled by `SC` markers in the description and `CK`/`SC` patterns in
/// the product code.
pub fn derive_solid_core(description: &str, code: &str) -> bool {
    let description = description.to_ascii_uppercase();
    let code = code.to_ascii_uppercase();
    description.contains(" SC")
        || description.contains("SC ")
        || code.contains(" CK")
        || (code.contains("CK") && code.contains("SC"))
}

/// One row as it appears in the export, before cleaning.
#[derive(Debug, Deserialize)]
struct RawProductRecord {
    #[serde(alias = "Product Code")]
    code: String,
    #[serde(default, alias = "Description")]
    description: String,
    #[serde(default, alias = "Player Type")]
    player_type: String,
    #[serde(default, alias = "Playing Level")]
    tier: Option<Value>,
    #[serde(default, alias = "Full Price")]
    price: Option<Value>,
    #[serde(default, alias = "Length")]
    length: Option<Value>,
    #[serde(default, alias = "Bow")]
    bow: Option<String>,
    #[serde(default, alias = "Carbon")]
    carbon_pct: Option<Value>,
    #[serde(default, alias = "Power")]
    power: Option<Value>,
    #[serde(default, alias = "Touch and Control")]
    touch: Option<Value>,
    #[serde(default, alias = "Aerial")]
    aerial: Option<Value>,
    #[serde(default, alias = "Drag Flicking")]
    drag_flick: Option<Value>,
    #[serde(default, alias = "Image URL")]
    image_url: Option<String>,
    #[serde(default, alias = "Product URL")]
    product_url: Option<String>,
}

impl RawProductRecord {
    fn into_product(self) -> Product {
        let is_solid_core = derive_solid_core(&self.description, &self.code);
        Product {
            tier: self.tier.as_ref().and_then(lenient_string).as_deref().and_then(Tier::parse),
            price: self.price.as_ref().and_then(lenient_money),
            length: self.length.as_ref().and_then(lenient_number),
            carbon_pct: self.carbon_pct.as_ref().and_then(lenient_number),
            power: self.power.as_ref().and_then(lenient_number),
            touch: self.touch.as_ref().and_then(lenient_number),
            aerial: self.aerial.as_ref().and_then(lenient_number),
            drag_flick: self.drag_flick.as_ref().and_then(lenient_number),
            bow: self.bow.filter(|bow| !bow.trim().is_empty()),
            code: self.code,
            description: self.description,
            player_type: self.player_type,
            image_url: self.image_url,
            product_url: self.product_url,
            is_solid_core,
        }
    }
}

fn lenient_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Accept numbers or number-ish strings; strip currency markers; refuse
/// anything non-finite so NaN and infinities never enter a snapshot.
fn lenient_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => clean_numeric_text(text).parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|number| number.is_finite())
}

/// Money parses through `Decimal` to keep exact prices; negative amounts are
/// treated as bad data and dropped.
fn lenient_money(value: &Value) -> Option<Decimal> {
    let parsed = match value {
        Value::Number(number) => number.as_f64().and_then(Decimal::from_f64),
        Value::String(text) => Decimal::from_str(&clean_numeric_text(text)).ok(),
        _ => None,
    };
    parsed.filter(|amount| !amount.is_sign_negative())
}

fn clean_numeric_text(text: &str) -> String {
    text.chars().filter(|ch| !matches!(ch, '£' | '$' | '€' | ',' | ' ')).collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn loads_rows_keyed_by_legacy_sheet_headers() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("catalog.json");
        fs::write(
            &path,
            r#"[
                {
                    "Product Code": "EVO-80",
                    "Description": "Evolution 80 Ultimate",
                    "Player Type": "Outdoor Player",
                    "Playing Level": "Performance",
                    "Full Price": "£199.95",
                    "Length": "36.5",
                    "Bow": "Ultimate",
                    "Carbon": 80,
                    "Power": 8,
                    "Touch and Control": 7,
                    "Aerial": 8,
                    "Drag Flicking": 7,
                    "Image URL": "https://example.test/evo80.png"
                }
            ]"#,
        )
        .expect("write catalog");

        let snapshot = load_catalog(&path).expect("catalog should load");
        assert_eq!(snapshot.len(), 1);

        let row = &snapshot.products()[0];
        assert_eq!(row.code, "EVO-80");
        assert_eq!(row.tier, Some(Tier::Performance));
        assert_eq!(row.price, Some("199.95".parse().expect("decimal")));
        assert_eq!(row.length, Some(36.5));
        assert_eq!(row.carbon_pct, Some(80.0));
        assert_eq!(row.image_url.as_deref(), Some("https://example.test/evo80.png"));
    }

    #[test]
    fn malformed_values_degrade_to_missing_not_errors() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("catalog.json");
        fs::write(
            &path,
            r#"[
                {
                    "code": "ODD-1",
                    "player_type": "Outdoor Player",
                    "tier": "Legendary",
                    "price": "call us",
                    "length": null,
                    "carbon_pct": "n/a"
                }
            ]"#,
        )
        .expect("write catalog");

        let snapshot = load_catalog(&path).expect("catalog should load");
        let row = &snapshot.products()[0];
        assert_eq!(row.tier, None);
        assert_eq!(row.price, None);
        assert_eq!(row.length, None);
        assert_eq!(row.carbon_pct, None);
    }

    #[test]
    fn negative_prices_are_dropped_as_bad_data() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("catalog.json");
        fs::write(&path, r#"[{"code": "NEG-1", "price": -20.0}]"#).expect("write catalog");

        let snapshot = load_catalog(&path).expect("catalog should load");
        assert_eq!(snapshot.products()[0].price, None);
    }

    #[test]
    fn solid_core_markers_are_derived_at_ingestion() {
        assert!(derive_solid_core("EVOLUTION 95 SC ULTIMATE", "EV95"));
        assert!(derive_solid_core("", "CKSC-95"));
        assert!(!derive_solid_core("Evolution 95 Ultimate", "EV95"));
        assert!(!derive_solid_core("DISCOUNT", "EV95"));
    }

    #[test]
    fn missing_file_is_a_distinct_error() {
        let dir = TempDir::new().expect("temp dir");
        let missing = dir.path().join("nope.json");
        assert!(matches!(load_catalog(&missing), Err(CatalogError::MissingFile(_))));
    }

    #[test]
    fn au_region_falls_back_to_the_global_file_when_absent() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("catalog.json"), "[]").expect("write global");

        let au = resolve_regional_path(dir.path(), Region::Au);
        assert_eq!(au, dir.path().join("catalog.json"));

        fs::write(dir.path().join("catalog_au.json"), "[]").expect("write au");
        let au = resolve_regional_path(dir.path(), Region::Au);
        assert_eq!(au, dir.path().join("catalog_au.json"));
    }

    #[test]
    fn eu_region_always_points_at_the_eu_file() {
        let dir = TempDir::new().expect("temp dir");
        let eu = resolve_regional_path(dir.path(), Region::Eu);
        assert_eq!(eu, dir.path().join("catalog_eu.json"));
    }

    #[test]
    fn region_parse_defaults_to_global() {
        assert_eq!(Region::parse("eu"), Region::Eu);
        assert_eq!(Region::parse("AU"), Region::Au);
        assert_eq!(Region::parse("somewhere"), Region::Global);
        assert_eq!(Region::parse(""), Region::Global);
    }
}
