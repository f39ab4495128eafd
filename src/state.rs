//! Application state: the session store, the optional completion provider, and
//! the prompt templates.
//!
//! Everything a request needs is reached through this handle; there is no
//! process-wide client. Without OPENAI_API_KEY the provider is `None` and both
//! problem generation and answer submission fail with a configuration error.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::config::{AppConfig, Prompts};
use crate::openai::{CompletionProvider, OpenAI};
use crate::store::{MemoryStore, SessionStore, StoreError};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SessionStore>,
    pub provider: Option<Arc<dyn CompletionProvider>>,
    pub prompts: Prompts,
}

impl AppState {
    pub fn new(
        store: Arc<dyn SessionStore>,
        provider: Option<Arc<dyn CompletionProvider>>,
        prompts: Prompts,
    ) -> Self {
        Self { store, provider, prompts }
    }

    /// Build state from config: open the store, init the provider client.
    #[instrument(level = "info", skip_all)]
    pub async fn from_config(cfg: &AppConfig) -> Result<Self, StoreError> {
        let store: Arc<dyn SessionStore> = match &cfg.data_path {
            Some(path) => Arc::new(MemoryStore::open(path).await?),
            None => {
                warn!(target: "p5math_backend", "DATA_PATH not set; history is kept in memory only.");
                Arc::new(MemoryStore::new())
            }
        };

        let provider: Option<Arc<dyn CompletionProvider>> = match &cfg.provider {
            Some(pc) => match OpenAI::new(pc) {
                Ok(oa) => {
                    info!(target: "p5math_backend", base_url = %oa.base_url, model = %oa.model, "OpenAI enabled.");
                    Some(Arc::new(oa))
                }
                Err(e) => {
                    warn!(target: "p5math_backend", error = %e, "Failed to build OpenAI client; generation and submission disabled.");
                    None
                }
            },
            None => {
                info!(target: "p5math_backend", "OpenAI disabled (no OPENAI_API_KEY). Generation and submission will fail until configured.");
                None
            }
        };

        Ok(Self::new(store, provider, cfg.prompts.clone()))
    }
}
