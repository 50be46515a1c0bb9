//! Application state: prompt templates, topic pool, and the Gemini client.
//!
//! There are no stores or caches: every result entity is created fresh per
//! request/response cycle and owned by the request that produced it.

use crate::config::{load_tutor_config_from_env, Prompts};
use crate::gemini::{Gemini, GenError};
use crate::seeds::default_context_topics;
use tracing::{info, instrument};

#[derive(Clone)]
pub struct AppState {
  pub gemini: Gemini,
  pub prompts: Prompts,
  pub topics: Vec<String>,
}

impl AppState {
  /// Build state from env: load config and construct the Gemini client.
  /// Fails when GEMINI_API_KEY is absent; the caller refuses to start.
  #[instrument(level = "info", skip_all)]
  pub fn new() -> Result<Self, GenError> {
    let cfg = load_tutor_config_from_env().unwrap_or_default();
    let prompts = cfg.prompts;
    let topics = if cfg.topics.is_empty() { default_context_topics() } else { cfg.topics };

    let gemini = Gemini::from_env()?;
    info!(
      target: "factoreo_backend",
      base_url = %gemini.base_url,
      model = %gemini.model,
      topic_pool = topics.len(),
      "Gemini enabled."
    );

    Ok(Self { gemini, prompts, topics })
  }
}
