use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::shops::registry::SharedRegistry;
use crate::shops::ShopRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    pub config: Config,
    /// Process-wide shop registry, seeded with the built-in shops.
    pub registry: SharedRegistry,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let llm = LlmClient::new(
            config.openrouter_api_key.clone(),
            config.openrouter_base_url.clone(),
        );
        AppState {
            llm,
            config,
            registry: Arc::new(ShopRegistry::with_builtin_shops()),
        }
    }
}
