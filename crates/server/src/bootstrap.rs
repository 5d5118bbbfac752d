use std::sync::Arc;

use secrecy::SecretString;
use thiserror::Error;
use tracing::info;

use stickfit_agent::{LlmClient, NarrativeGenerator, OpenAiChatClient};
use stickfit_catalog::{loader, CatalogError, SnapshotStore};
use stickfit_core::config::{AppConfig, ConfigError, LlmConfig, LoadOptions};
use stickfit_core::DeterministicSelectionEngine;

pub struct Application {
    pub config: AppConfig,
    pub store: Arc<SnapshotStore>,
    pub engine: Arc<DeterministicSelectionEngine>,
    pub narrative: Arc<NarrativeGenerator>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("llm client initialization failed: {0}")]
    Llm(String),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        region = %config.catalog.region,
        "starting application bootstrap"
    );

    let catalog_path = loader::configured_catalog_path(&config.catalog);
    let snapshot = loader::load_catalog(&catalog_path)?;
    info!(
        event_name = "system.bootstrap.catalog_loaded",
        correlation_id = "bootstrap",
        path = %catalog_path.display(),
        rows = snapshot.len(),
        "catalog snapshot loaded"
    );

    let store = Arc::new(SnapshotStore::new(snapshot));
    let engine = Arc::new(DeterministicSelectionEngine::new(config.engine.clone()));
    let narrative = Arc::new(build_narrative(&config.llm)?);

    Ok(Application { config, store, engine, narrative })
}

/// The narrative generator runs with a real client only when the feature is
/// on and a key is configured; otherwise it answers deterministically.
fn build_narrative(llm: &LlmConfig) -> Result<NarrativeGenerator, BootstrapError> {
    if !llm.enabled {
        return Ok(NarrativeGenerator::disabled());
    }
    let Some(api_key) = llm.api_key.clone() else {
        info!(
            event_name = "system.bootstrap.llm_keyless",
            correlation_id = "bootstrap",
            "narrative enabled without an api key; using deterministic copy"
        );
        return Ok(NarrativeGenerator::disabled());
    };

    let client = open_ai_client(llm, api_key)?;
    Ok(NarrativeGenerator::new(Some(client)))
}

fn open_ai_client(
    llm: &LlmConfig,
    api_key: SecretString,
) -> Result<Arc<dyn LlmClient>, BootstrapError> {
    let client = OpenAiChatClient::new(
        llm.base_url.clone(),
        api_key,
        llm.model.clone(),
        llm.timeout_secs,
        llm.max_tokens,
        llm.temperature,
        llm.max_retries,
    )
    .map_err(|error| BootstrapError::Llm(error.to_string()))?;
    Ok(Arc::new(client))
}
