use stickfit_catalog::loader;
use stickfit_core::config::{AppConfig, LoadOptions};

/// Print the effective configuration after defaults, file, and environment
/// are merged. Secrets are reported as set/unset, never echoed.
pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("configuration error: {error}"),
    };

    let catalog_path = loader::configured_catalog_path(&config.catalog);

    let mut lines = vec![
        "effective configuration".to_string(),
        format!("  catalog.path          {}", catalog_path.display()),
        format!("  catalog.region        {}", config.catalog.region),
        format!("  catalog.refresh_secs  {}", config.catalog.refresh_secs),
        format!(
            "  catalog.shopify       {}",
            match &config.catalog.shopify_base_url {
                Some(base_url) => format!("{base_url} (token {})", set_or_unset(config.catalog.shopify_token.is_some())),
                None => "disabled".to_string(),
            }
        ),
        format!("  llm.enabled           {}", config.llm.enabled),
        format!("  llm.model             {}", config.llm.model),
        format!("  llm.api_key           {}", set_or_unset(config.llm.api_key.is_some())),
        format!("  server.bind           {}:{}", config.server.bind_address, config.server.port),
        format!("  logging.level         {}", config.logging.level),
        format!("  engine.version        {}", config.engine.version),
        format!(
            "  engine.tier_order     {}",
            config
                .engine
                .tier_order
                .iter()
                .map(|tier| tier.as_str())
                .collect::<Vec<_>>()
                .join(" < ")
        ),
        format!("  engine.price_grace    {:.0}%", config.engine.price_grace_pct * 100.0),
    ];
    lines.push(format!(
        "  engine.weights        affordability={} family_bias={} priority_focus={}",
        config.engine.weights.affordability,
        config.engine.weights.family_bias,
        config.engine.weights.priority_focus,
    ));

    lines.join("\n")
}

fn set_or_unset(set: bool) -> &'static str {
    if set {
        "set"
    } else {
        "unset"
    }
}
