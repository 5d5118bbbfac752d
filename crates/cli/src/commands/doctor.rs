use serde::Serialize;

use stickfit_catalog::loader;
use stickfit_core::config::{AppConfig, LoadOptions};

use super::CommandResult;

#[derive(Serialize)]
struct Check {
    name: &'static str,
    ok: bool,
    detail: String,
}

#[derive(Serialize)]
struct DoctorReport {
    ok: bool,
    checks: Vec<Check>,
}

/// Startup readiness: configuration loads and validates, the catalog file
/// resolves and parses, and the snapshot is non-empty.
pub fn run(json: bool) -> CommandResult {
    let mut checks = Vec::new();

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(Check {
                name: "config",
                ok: true,
                detail: "configuration loaded and validated".to_string(),
            });
            Some(config)
        }
        Err(error) => {
            checks.push(Check { name: "config", ok: false, detail: error.to_string() });
            None
        }
    };

    if let Some(config) = &config {
        let path = loader::configured_catalog_path(&config.catalog);
        match loader::load_catalog(&path) {
            Ok(snapshot) => {
                checks.push(Check {
                    name: "catalog",
                    ok: true,
                    detail: format!("{} rows from {}", snapshot.len(), path.display()),
                });
                checks.push(Check {
                    name: "catalog_rows",
                    ok: !snapshot.is_empty(),
                    detail: if snapshot.is_empty() {
                        "catalog is empty; run `stickfit seed` or point at an export".to_string()
                    } else {
                        "catalog has rows".to_string()
                    },
                });
            }
            Err(error) => {
                checks.push(Check { name: "catalog", ok: false, detail: error.to_string() });
            }
        }

        checks.push(Check {
            name: "narrative",
            ok: true,
            detail: if config.llm.enabled && config.llm.api_key.is_some() {
                format!("llm narrative active ({})", config.llm.model)
            } else {
                "deterministic narrative (llm disabled or keyless)".to_string()
            },
        });
    }

    let ok = checks.iter().all(|check| check.ok);
    let report = DoctorReport { ok, checks };

    let output = if json {
        serde_json::to_string_pretty(&report)
            .unwrap_or_else(|error| format!("{{\"ok\":false,\"error\":\"{error}\"}}"))
    } else {
        let mut lines = vec![format!("doctor: {}", if report.ok { "ok" } else { "failing" })];
        for check in &report.checks {
            lines.push(format!(
                "  [{}] {:<13} {}",
                if check.ok { "ok" } else { "!!" },
                check.name,
                check.detail
            ));
        }
        lines.join("\n")
    };

    CommandResult { exit_code: u8::from(!report.ok), output }
}
