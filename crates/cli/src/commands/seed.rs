use std::fs;
use std::path::Path;

use rust_decimal::Decimal;

use stickfit_core::{Product, Tier};

use super::CommandResult;

const DEFAULT_OUT: &str = "data/catalog.json";

/// Write the deterministic demo catalog: every tier, every bow family, all
/// four player types, and a solid-core row, so a fresh checkout can serve
/// real-looking recommendations without the upstream export.
pub fn run(out: Option<&Path>) -> CommandResult {
    let path = out.unwrap_or_else(|| Path::new(DEFAULT_OUT));

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(error) = fs::create_dir_all(parent) {
                return CommandResult {
                    exit_code: 1,
                    output: format!("seed: could not create `{}`: {error}", parent.display()),
                };
            }
        }
    }

    let products = demo_products();
    let body = match serde_json::to_string_pretty(&products) {
        Ok(body) => body,
        Err(error) => {
            return CommandResult { exit_code: 1, output: format!("seed: encoding failed: {error}") }
        }
    };

    match fs::write(path, body) {
        Ok(()) => CommandResult {
            exit_code: 0,
            output: format!("seed: wrote {} rows to {}", products.len(), path.display()),
        },
        Err(error) => CommandResult {
            exit_code: 1,
            output: format!("seed: could not write `{}`: {error}", path.display()),
        },
    }
}

pub fn demo_products() -> Vec<Product> {
    vec![
        demo_row("GEN-50", "Genesis 50 Standard", Tier::Genesis, "39.95", 36.5, "Standard", 5.0, [4.0, 6.0, 2.0, 1.0], "Outdoor Player"),
        demo_row("GEN-70", "Genesis 70 Standard", Tier::Genesis, "54.95", 37.5, "Standard", 10.0, [5.0, 6.0, 2.0, 2.0], "Outdoor Player"),
        demo_row("EVO-40", "Evolution 40 Pro", Tier::Evolution, "79.95", 36.5, "Pro", 40.0, [6.0, 6.0, 4.0, 4.0], "Outdoor Player"),
        demo_row("EVO-60", "Evolution 60 Ultimate", Tier::Evolution, "99.95", 36.5, "Ultimate", 60.0, [6.0, 7.0, 6.0, 5.0], "Outdoor Player"),
        demo_row("INT-75", "Intermediate 75 Pro", Tier::Intermediate, "129.95", 35.5, "Pro", 75.0, [7.0, 7.0, 5.0, 5.0], "Outdoor Player"),
        demo_row("PER-85", "Performance 85 Ultimate", Tier::Performance, "159.95", 36.5, "Ultimate", 85.0, [8.0, 7.0, 7.0, 6.0], "Outdoor Player"),
        demo_row("ELI-90-V2", "Elite 90 Ultimate V2", Tier::Elite, "189.95", 36.5, "Ultimate V2", 90.0, [8.0, 8.0, 9.0, 7.0], "Outdoor Player"),
        demo_row("ELI-95", "Elite 95 Ultimate", Tier::Elite, "199.95", 36.5, "Ultimate", 95.0, [9.0, 8.0, 8.0, 7.0], "Outdoor Player"),
        demo_row("ELI-95X", "Elite 95 Xtreme", Tier::Elite, "209.95", 36.5, "Xtreme", 95.0, [8.0, 7.0, 8.0, 9.0], "Outdoor Player"),
        demo_row("ELI-98-CKSC", "Elite 98 SC Ultimate V2", Tier::Elite, "249.95", 37.5, "Ultimate V2", 98.0, [9.0, 9.0, 9.0, 9.0], "Outdoor Player"),
        demo_row("IND-60", "Indoor 60 Pro", Tier::Evolution, "89.95", 36.5, "Pro", 60.0, [6.0, 8.0, 3.0, 3.0], "Indoor Player"),
        demo_row("GK-140", "Keeper 140", Tier::Performance, "149.95", 36.5, "Standard", 70.0, [7.0, 6.0, 1.0, 1.0], "Outdoor Goalkeeper"),
    ]
}

#[allow(clippy::too_many_arguments)]
fn demo_row(
    code: &str,
    description: &str,
    tier: Tier,
    price: &str,
    length: f64,
    bow: &str,
    carbon: f64,
    attributes: [f64; 4],
    player_type: &str,
) -> Product {
    let [power, touch, aerial, drag_flick] = attributes;
    let price: Decimal = price.parse().unwrap_or(Decimal::ZERO);
    Product {
        code: code.to_string(),
        description: description.to_string(),
        player_type: player_type.to_string(),
        tier: Some(tier),
        price: Some(price),
        length: Some(length),
        bow: Some(bow.to_string()),
        carbon_pct: Some(carbon),
        power: Some(power),
        touch: Some(touch),
        aerial: Some(aerial),
        drag_flick: Some(drag_flick),
        image_url: None,
        product_url: None,
        is_solid_core: description.contains(" SC "),
    }
}
