//! Factoreo · Factoring Tutor Backend
//!
//! - Axum HTTP + WebSocket API
//! - Gemini integration (all tutoring content is model-generated)
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT              : u16 (default 3000)
//!   GEMINI_API_KEY    : required; startup fails without it
//!   GEMINI_BASE_URL   : default "https://generativelanguage.googleapis.com/v1beta"
//!   GEMINI_MODEL      : default "gemini-2.5-flash"
//!   TUTOR_CONFIG_PATH : path to TOML config (prompt templates + topic bank)
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod seeds;
mod state;
mod protocol;
mod logic;
mod gemini;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (prompts, topic pool, Gemini client).
  // A missing credential is fatal: the app refuses to initialize.
  let state = match AppState::new() {
    Ok(s) => Arc::new(s),
    Err(e) => {
      error!(target: "factoreo_backend", error = %e, "Cannot initialize application state");
      return Err(e.into());
    }
  };

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "factoreo_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
