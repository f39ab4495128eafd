//! P5 Math · Primary 5 word-problem practice backend
//!
//! - Axum HTTP API: generate a problem, submit an answer, history, stats
//! - OpenAI-compatible completion provider (via environment variables)
//! - Static SPA fallback (STATIC_DIR/index.html)
//!
//! Important env variables:
//!   PORT                : u16 (default 3000)
//!   OPENAI_API_KEY      : enables problem generation and AI feedback
//!   OPENAI_BASE_URL     : default "https://api.openai.com/v1"
//!   OPENAI_MODEL        : default "gpt-4o-mini"
//!   OPENAI_TIMEOUT_SECS : default 30
//!   DATA_PATH           : JSON snapshot file for sessions/submissions (memory only if unset)
//!   PROMPTS_CONFIG_PATH : TOML file overriding prompt templates
//!   STATIC_DIR          : frontend build directory (default "./static")
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

mod config;
mod domain;
mod error;
mod extract;
mod grading;
mod logic;
mod openai;
mod prompt;
mod protocol;
mod routes;
mod state;
mod stats;
mod store;
mod telemetry;
mod util;
mod validate;

#[cfg(test)]
mod test_support;

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::AppConfig;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let cfg = AppConfig::from_env();
  info!(target: "p5math_backend", addr = %cfg.addr, provider_enabled = cfg.provider.is_some(), data_path = ?cfg.data_path, "Configuration loaded");

  // Shared application state (store, provider client, prompts).
  let state = Arc::new(AppState::from_config(&cfg).await?);

  // HTTP router with routes, CORS and tracing layers.
  let app = build_router(state, &cfg.static_dir);

  let listener = TcpListener::bind(cfg.addr).await?;
  info!(target: "p5math_backend", addr = %cfg.addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "p5math_backend", error = %e, "Failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  info!(target: "p5math_backend", "Shutdown signal received");
}
