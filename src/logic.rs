//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This is the adapter between the generation client and the presentation
//! protocol:
//!   - Analysis results pass through unchanged; failures surface as a
//!     localized generic message.
//!   - Practice examples get the case's display label attached locally.
//!   - Context facts absorb failures into a fixed fallback fact. This is the
//!     only place a generation failure is swallowed.

use tracing::{error, instrument, warn};

use crate::domain::{AnalysisResult, FactoringCase, Language, MathContextFact, PracticeExample};
use crate::seeds::fallback_context_fact;
use crate::state::AppState;

pub fn empty_expression_message(lang: Language) -> &'static str {
  match lang {
    Language::Es => "Por favor, introduce una expresión algebraica.",
    Language::En => "Please enter an algebraic expression.",
  }
}

pub fn analysis_error_message(lang: Language) -> &'static str {
  match lang {
    Language::Es => "Hubo un error al analizar la expresión. Por favor, inténtalo de nuevo.",
    Language::En => "There was an error analyzing the expression. Please try again.",
  }
}

pub fn example_error_message(lang: Language) -> &'static str {
  match lang {
    Language::Es => "No se pudo generar un ejemplo. Inténtalo de nuevo.",
    Language::En => "Could not generate an example. Please try again.",
  }
}

/// Analyze an expression. Empty input is rejected before any prompt is
/// built; client failures become the localized generic analysis error.
#[instrument(level = "info", skip(state, expression), fields(?case, ?language, expr_len = expression.len()))]
pub async fn do_analyze(
  state: &AppState,
  expression: &str,
  case: FactoringCase,
  language: Language,
) -> Result<AnalysisResult, String> {
  if expression.trim().is_empty() {
    return Err(empty_expression_message(language).to_string());
  }
  match state.gemini.analyze_expression(&state.prompts, expression, case, language).await {
    Ok(analysis) => Ok(analysis),
    Err(e) => {
      error!(target: "generation", error = %e, "Analysis failed");
      Err(analysis_error_message(language).to_string())
    }
  }
}

/// Generate a practice example and attach the local display label for the
/// requested case. AutoDetect is a mode, not a method, so it is rejected.
#[instrument(level = "info", skip(state), fields(?case, ?language))]
pub async fn do_example(
  state: &AppState,
  case: FactoringCase,
  language: Language,
) -> Result<PracticeExample, String> {
  if case == FactoringCase::AutoDetect {
    warn!(target: "generation", "Practice example requested for auto_detect");
    return Err(example_error_message(language).to_string());
  }
  match state.gemini.practice_example(&state.prompts, case, language).await {
    Ok((problem, solution)) => Ok(PracticeExample {
      problem,
      solution,
      case_label: case.label(language).to_string(),
    }),
    Err(e) => {
      error!(target: "generation", error = %e, "Example generation failed");
      Err(example_error_message(language).to_string())
    }
  }
}

/// Fetch a trivia fact. Never fails: any client error is replaced by the
/// fixed bilingual fallback fact.
#[instrument(level = "info", skip(state), fields(?language))]
pub async fn do_context(state: &AppState, language: Language) -> MathContextFact {
  match state.gemini.context_fact(&state.prompts, &state.topics, language).await {
    Ok(fact) => fact,
    Err(e) => {
      error!(target: "generation", error = %e, "Context fact failed; serving fallback");
      fallback_context_fact(language)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::Prompts;
  use crate::gemini::Gemini;
  use crate::seeds::default_context_topics;
  use wiremock::matchers::{method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn test_state(uri: &str) -> AppState {
    AppState {
      gemini: Gemini {
        client: reqwest::Client::new(),
        api_key: "test_key".into(),
        base_url: uri.to_string(),
        model: "gemini-2.5-flash".into(),
      },
      prompts: Prompts::default(),
      topics: default_context_topics(),
    }
  }

  async fn mount_candidate(server: &MockServer, status: u16, text: &str) {
    let template = if status == 200 {
      ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "candidates": [ { "content": { "parts": [ { "text": text } ] } } ]
      }))
    } else {
      ResponseTemplate::new(status)
    };
    Mock::given(method("POST"))
      .and(path("/models/gemini-2.5-flash:generateContent"))
      .respond_with(template)
      .mount(server)
      .await;
  }

  #[tokio::test]
  async fn empty_expression_is_rejected_before_any_call() {
    let state = test_state("http://127.0.0.1:9"); // unroutable on purpose
    let err = do_analyze(&state, "   ", FactoringCase::AutoDetect, Language::Es).await.unwrap_err();
    assert_eq!(err, empty_expression_message(Language::Es));
    let err = do_analyze(&state, "", FactoringCase::AutoDetect, Language::En).await.unwrap_err();
    assert_eq!(err, empty_expression_message(Language::En));
  }

  #[tokio::test]
  async fn analysis_failure_surfaces_the_localized_message() {
    let server = MockServer::start().await;
    mount_candidate(&server, 503, "").await;
    let state = test_state(&server.uri());

    let err = do_analyze(&state, "x^2 - 9", FactoringCase::CommonFactor, Language::En).await.unwrap_err();
    assert_eq!(err, analysis_error_message(Language::En));
  }

  #[tokio::test]
  async fn example_failure_surfaces_the_localized_message() {
    let server = MockServer::start().await;
    mount_candidate(&server, 500, "").await;
    let state = test_state(&server.uri());

    let err = do_example(&state, FactoringCase::CommonFactor, Language::Es).await.unwrap_err();
    assert_eq!(err, example_error_message(Language::Es));
  }

  #[tokio::test]
  async fn example_label_comes_from_the_local_table() {
    let server = MockServer::start().await;
    // A label in the payload must be ignored; only problema/resultado count.
    mount_candidate(&server, 200, r#"{"problema":"x^2 - 9","resultado":"(x-3)(x+3)"}"#).await;
    let state = test_state(&server.uri());

    let ex = do_example(&state, FactoringCase::DifferenceOfSquares, Language::En).await.unwrap();
    assert_eq!(ex.problem, "x^2 - 9");
    assert_eq!(ex.solution, "(x-3)(x+3)");
    assert_eq!(ex.case_label, "Difference of Squares");

    let ex = do_example(&state, FactoringCase::DifferenceOfSquares, Language::Es).await.unwrap();
    assert_eq!(ex.case_label, "Diferencia de Cuadrados");
  }

  #[tokio::test]
  async fn example_rejects_auto_detect() {
    let state = test_state("http://127.0.0.1:9");
    let err = do_example(&state, FactoringCase::AutoDetect, Language::En).await.unwrap_err();
    assert_eq!(err, example_error_message(Language::En));
  }

  #[tokio::test]
  async fn context_failure_yields_exactly_the_fallback_fact() {
    let server = MockServer::start().await;
    mount_candidate(&server, 500, "").await;
    let state = test_state(&server.uri());

    for lang in [Language::Es, Language::En] {
      let fact = do_context(&state, lang).await;
      let fallback = fallback_context_fact(lang);
      assert_eq!(fact.title, fallback.title);
      assert_eq!(fact.content, fallback.content);
    }
  }

  #[tokio::test]
  async fn context_success_passes_the_fact_through() {
    let server = MockServer::start().await;
    mount_candidate(&server, 200, r#"{"title":"Hypatia","content":"She edited Ptolemy's Almagest."}"#).await;
    let state = test_state(&server.uri());

    let fact = do_context(&state, Language::En).await;
    assert_eq!(fact.title, "Hypatia");
  }
}
