use quartermaster_agent::analysis::LlmBuildingAnalyst;
use quartermaster_agent::llm::HttpLlmClient;
use quartermaster_agent::session::SessionOrchestrator;
use quartermaster_core::config::{AppConfig, ConfigError, LoadOptions};
use quartermaster_core::domain::inventory::{Catalog, CatalogLoadError};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub orchestrator: SessionOrchestrator<HttpLlmClient, LlmBuildingAnalyst<HttpLlmClient>>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Catalog(#[from] CatalogLoadError),
    #[error("llm client construction failed: {0}")]
    LlmClient(#[source] anyhow::Error),
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let catalog = Catalog::load_json(&config.catalog.path)?;
    info!(
        event_name = "system.bootstrap.catalog_loaded",
        items = catalog.len(),
        "catalog loaded"
    );

    let chat_client = HttpLlmClient::from_config(&config.llm).map_err(BootstrapError::LlmClient)?;
    let analysis_client =
        HttpLlmClient::from_config(&config.llm).map_err(BootstrapError::LlmClient)?;
    let analyst = LlmBuildingAnalyst::new(analysis_client, catalog.clone());
    let orchestrator = SessionOrchestrator::new(chat_client, analyst, catalog);

    Ok(Application { config, orchestrator })
}
