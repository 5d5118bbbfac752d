use std::path::Path;
use std::time::Instant;

use rust_decimal::Decimal;

use stickfit_catalog::loader;
use stickfit_core::config::{AppConfig, LoadOptions};
use stickfit_core::{
    DeterministicSelectionEngine, Journey, PlayerType, Priority, Profile, SelectionEngine,
};

use super::CommandResult;

/// One full recommendation against the real catalog: proves the config,
/// loader, and engine work together before traffic does.
pub fn run(catalog: Option<&Path>) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult { exit_code: 1, output: format!("smoke: config error: {error}") }
        }
    };

    let path = catalog
        .map(Path::to_path_buf)
        .unwrap_or_else(|| loader::configured_catalog_path(&config.catalog));

    let snapshot = match loader::load_catalog(&path) {
        Ok(snapshot) => snapshot,
        Err(error) => {
            return CommandResult { exit_code: 1, output: format!("smoke: catalog error: {error}") }
        }
    };

    let engine = DeterministicSelectionEngine::new(config.engine);
    let profile = smoke_profile();

    let start = Instant::now();
    let selection = engine.recommend(&snapshot, &profile);
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    let mut lines = vec![format!(
        "smoke: {} rows from {} ({elapsed_ms:.2} ms)",
        snapshot.len(),
        path.display()
    )];

    match &selection.slate {
        Some(slate) => {
            lines.push(format!(
                "  primary    {} (score {:.3}, probability {:.2})",
                slate.primary.product.code, slate.primary.score, slate.primary.probability
            ));
            match &slate.secondary {
                Some(pick) => lines.push(format!(
                    "  secondary  {} (score {:.3})",
                    pick.product.code, pick.score
                )),
                None => lines.push("  secondary  none".to_string()),
            }
            match &slate.wildcard {
                Some(pick) => lines.push(format!(
                    "  wildcard   {} (score {:.3})",
                    pick.product.code, pick.score
                )),
                None => lines.push("  wildcard   none".to_string()),
            }
            lines.push(format!(
                "  fallback   {}",
                if selection.fallback.is_empty() {
                    "none".to_string()
                } else {
                    selection.fallback.relaxed.join(", ")
                }
            ));
            CommandResult { exit_code: 0, output: lines.join("\n") }
        }
        None => {
            lines.push("  no eligible rows for the smoke profile".to_string());
            CommandResult { exit_code: 1, output: lines.join("\n") }
        }
    }
}

fn smoke_profile() -> Profile {
    let skill = 7.0;
    Profile {
        skill,
        journey: Journey::from_skill(skill),
        player_type: PlayerType::OutdoorPlayer,
        priority: Priority::Both,
        preferred_bow: Some("ultimate".to_string()),
        budget: Decimal::from(160),
        length: None,
        attack: 7.0,
        midfield: 5.0,
        defence: 4.0,
        aerials: 5.0,
        dragflick: 5.0,
    }
}
