//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{extract::{Query, State}, http::StatusCode, response::IntoResponse, Json};
use tracing::{info, instrument};

use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state, body), fields(?body.case, ?body.language, expr_len = body.expression.len()))]
pub async fn http_post_analyze(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AnalyzeIn>,
) -> impl IntoResponse {
  if body.expression.trim().is_empty() {
    let message = empty_expression_message(body.language).to_string();
    return (StatusCode::BAD_REQUEST, Json(ErrorOut { message })).into_response();
  }
  match do_analyze(&state, &body.expression, body.case, body.language).await {
    Ok(analysis) => {
      info!(target: "generation", is_valid = analysis.is_valid, steps = analysis.steps.len(), "HTTP analysis served");
      Json(analysis).into_response()
    }
    Err(message) => (StatusCode::BAD_GATEWAY, Json(ErrorOut { message })).into_response(),
  }
}

#[instrument(level = "info", skip(state, body), fields(?body.case, ?body.language))]
pub async fn http_post_example(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ExampleIn>,
) -> impl IntoResponse {
  match do_example(&state, body.case, body.language).await {
    Ok(example) => {
      info!(target: "generation", case_label = %example.case_label, "HTTP example served");
      Json(example).into_response()
    }
    Err(message) => (StatusCode::BAD_GATEWAY, Json(ErrorOut { message })).into_response(),
  }
}

#[instrument(level = "info", skip(state), fields(?q.language))]
pub async fn http_get_context(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ContextQuery>,
) -> impl IntoResponse {
  let fact = do_context(&state, q.language).await;
  info!(target: "generation", title = %fact.title, "HTTP context fact served");
  Json(fact)
}
