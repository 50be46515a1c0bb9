//! Minimal Gemini client for our use-cases.
//!
//! We only call models/{model}:generateContent and always request a strict
//! JSON object constrained by one of three fixed response schemas.
//! Calls are instrumented and log model names, latencies, and response sizes
//! (not contents).
//!
//! NOTE: We never log the API key and we keep payload truncations short.

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::config::Prompts;
use crate::domain::{AnalysisResult, FactoringCase, Language, MathContextFact, Step};
use crate::util::fill_template;

const API_KEY_HEADER: &str = "x-goog-api-key";

// Per-call sampling temperatures. Analysis leans deterministic, examples
// creative, trivia maximal. Preserve these for behavior parity.
const TEMP_ANALYSIS: f32 = 0.3;
const TEMP_EXAMPLE: f32 = 0.8;
const TEMP_CONTEXT: f32 = 1.0;

/// Failure kinds of the generation client.
///
/// Callers treat transport/HTTP/decode all as one generic failure; the
/// distinction exists for logging and startup handling.
#[derive(Debug, Error)]
pub enum GenError {
  #[error("GEMINI_API_KEY environment variable is not set")]
  MissingApiKey,
  #[error("transport error: {0}")]
  Transport(String),
  #[error("Gemini HTTP {status}: {message}")]
  Http { status: u16, message: String },
  #[error("JSON decode error: {0}")]
  Decode(String),
}

/// The three fixed output-shape contracts the model must conform to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputContract {
  Analysis,
  PracticeExample,
  ContextFact,
}

impl OutputContract {
  pub fn name(&self) -> &'static str {
    match self {
      OutputContract::Analysis => "analysis",
      OutputContract::PracticeExample => "practice_example",
      OutputContract::ContextFact => "context_fact",
    }
  }

  /// Gemini `responseSchema` for this contract. Field names are the wire
  /// names the tutor has always used (Spanish for analysis/example).
  pub fn schema(&self) -> serde_json::Value {
    match self {
      OutputContract::Analysis => json!({
        "type": "OBJECT",
        "properties": {
          "tipo": {
            "type": "STRING",
            "description": "The identified factoring case type. If none, \"Unknown Case\"."
          },
          "esValido": {
            "type": "BOOLEAN",
            "description": "True if the expression corresponds to one of the factoring cases, false otherwise."
          },
          "pasos": {
            "type": "ARRAY",
            "description": "A list of detailed steps to solve the factoring.",
            "items": {
              "type": "OBJECT",
              "properties": {
                "paso": { "type": "STRING", "description": "A short descriptive title for the step." },
                "descripcion": { "type": "STRING", "description": "Detailed explanation of what is done in this step." }
              },
              "required": ["paso", "descripcion"]
            }
          },
          "resultado": {
            "type": "STRING",
            "description": "The final fully factored expression. Use the ^ symbol for exponents. Ex: (x + 2)(x - 2)."
          },
          "explicacionMetodo": {
            "type": "STRING",
            "description": "A very short and simple explanation (1-2 sentences) of the factoring method used, or why it cannot be factored."
          }
        },
        "required": ["tipo", "esValido", "pasos", "resultado", "explicacionMetodo"]
      }),
      OutputContract::PracticeExample => json!({
        "type": "OBJECT",
        "properties": {
          "problema": {
            "type": "STRING",
            "description": "A simple example exercise for the requested factoring case. Use ^ for exponents. Ex: x^2 - 9."
          },
          "resultado": {
            "type": "STRING",
            "description": "The factored solution for the example problem. Use ^ for exponents. Ex: (x - 3)(x + 3)."
          }
        },
        "required": ["problema", "resultado"]
      }),
      OutputContract::ContextFact => json!({
        "type": "OBJECT",
        "properties": {
          "title": {
            "type": "STRING",
            "description": "A short, catchy title for the fact or historical context."
          },
          "content": {
            "type": "STRING",
            "description": "A paragraph (2-3 sentences) explaining a historical fact, a real-world application, or a cultural note about algebra, polynomials, or famous mathematicians."
          }
        },
        "required": ["title", "content"]
      }),
    }
  }
}

#[derive(Clone)]
pub struct Gemini {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

// --- Decoded wire shapes (model output field names) ---

#[derive(Deserialize)]
struct AnalysisWire {
  tipo: String,
  #[serde(rename = "esValido")]
  es_valido: bool,
  pasos: Vec<StepWire>,
  resultado: String,
  #[serde(rename = "explicacionMetodo")]
  explicacion_metodo: String,
}

#[derive(Deserialize)]
struct StepWire {
  paso: String,
  descripcion: String,
}

#[derive(Deserialize)]
struct ExampleWire {
  problema: String,
  resultado: String,
}

#[derive(Deserialize)]
struct FactWire {
  title: String,
  content: String,
}

// --- Prompt builders ---

/// Build the analysis prompt. AutoDetect selects the "identify which case
/// applies" variant; any concrete case selects the "test this one method"
/// variant with the case label embedded.
pub fn build_analysis_prompt(
  prompts: &Prompts,
  expression: &str,
  case: FactoringCase,
  language: Language,
) -> String {
  match case {
    FactoringCase::AutoDetect => fill_template(
      &prompts.analysis_auto_template,
      &[("expression", expression), ("lang_instruction", language.instruction_all())],
    ),
    specific => fill_template(
      &prompts.analysis_case_template,
      &[
        ("expression", expression),
        ("case", specific.prompt_label()),
        ("lang_instruction", language.instruction_all()),
      ],
    ),
  }
}

/// Build the practice-exercise prompt for one concrete case.
pub fn build_example_prompt(prompts: &Prompts, case: FactoringCase, language: Language) -> String {
  fill_template(
    &prompts.example_template,
    &[("case", case.prompt_label()), ("lang_instruction", language.instruction())],
  )
}

/// Build the trivia-fact prompt for one topic.
pub fn build_context_prompt(prompts: &Prompts, topic: &str, language: Language) -> String {
  fill_template(
    &prompts.context_template,
    &[("topic", topic), ("lang_instruction", language.instruction())],
  )
}

impl Gemini {
  /// Construct the client from the environment. The API key is required;
  /// without it the application must refuse to initialize.
  pub fn from_env() -> Result<Self, GenError> {
    let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| GenError::MissingApiKey)?;
    let base_url = std::env::var("GEMINI_BASE_URL")
      .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into());
    let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".into());

    // No local timeout: latency is bounded only by the generation service.
    let client = reqwest::Client::builder()
      .build()
      .map_err(|e| GenError::Transport(e.to_string()))?;

    Ok(Self { client, api_key, base_url, model })
  }

  /// Schema-constrained JSON generation. Generic over the target type T.
  /// Exactly one outbound call per invocation; no retry, no caching.
  #[instrument(level = "info", skip(self, prompt), fields(model = %self.model, contract = contract.name(), prompt_len = prompt.len()))]
  async fn generate_json<T: for<'a> Deserialize<'a>>(
    &self,
    prompt: &str,
    contract: OutputContract,
    temperature: f32,
  ) -> Result<T, GenError> {
    let request_id = Uuid::new_v4();
    let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
    let req = GenerateContentRequest {
      contents: vec![Content { parts: vec![Part { text: prompt.into() }] }],
      generation_config: GenerationConfig {
        temperature,
        response_mime_type: "application/json".into(),
        response_schema: contract.schema(),
      },
    };

    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "factoreo-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(API_KEY_HEADER, &self.api_key)
      .json(&req)
      .send()
      .await
      .map_err(|e| GenError::Transport(e.to_string()))?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      let message = extract_gemini_error(&body).unwrap_or(body);
      error!(target: "generation", %request_id, status, "Gemini call failed");
      return Err(GenError::Http { status, message });
    }

    let body: GenerateContentResponse =
      res.json().await.map_err(|e| GenError::Transport(e.to_string()))?;
    if let Some(usage) = &body.usage_metadata {
      info!(%request_id, prompt_tokens = ?usage.prompt_token_count, candidate_tokens = ?usage.candidates_token_count, total_tokens = ?usage.total_token_count, "Gemini usage");
    }
    let text = body
      .candidates
      .first()
      .and_then(|c| c.content.as_ref())
      .and_then(|c| c.parts.first())
      .and_then(|p| p.text.clone())
      .unwrap_or_default();

    info!(%request_id, response_len = text.len(), "Gemini response received");
    serde_json::from_str::<T>(text.trim()).map_err(|e| GenError::Decode(e.to_string()))
  }

  // --- High-level helpers (domain-specialized) ---

  /// Analyze one expression, auto-detecting the case or testing a named one.
  #[instrument(level = "info", skip(self, prompts, expression), fields(?case, ?language, expr_len = expression.len(), model = %self.model))]
  pub async fn analyze_expression(
    &self,
    prompts: &Prompts,
    expression: &str,
    case: FactoringCase,
    language: Language,
  ) -> Result<AnalysisResult, GenError> {
    let prompt = build_analysis_prompt(prompts, expression, case, language);
    let start = std::time::Instant::now();
    let result = self.generate_json::<AnalysisWire>(&prompt, OutputContract::Analysis, TEMP_ANALYSIS).await;
    let elapsed = start.elapsed();

    let wire = match result {
      Ok(w) => {
        info!(?elapsed, "Analysis response received successfully");
        w
      }
      Err(e) => {
        error!(?elapsed, error = %e, "Model call failed during analysis");
        return Err(e);
      }
    };

    Ok(AnalysisResult {
      case_label: wire.tipo,
      is_valid: wire.es_valido,
      steps: wire
        .pasos
        .into_iter()
        .map(|s| Step { title: s.paso, description: s.descripcion })
        .collect(),
      factored_result: wire.resultado,
      method_explanation: wire.explicacion_metodo,
    })
  }

  /// Generate one practice problem + solution for a concrete case.
  /// The case label is attached later, locally, by the adapter.
  #[instrument(level = "info", skip(self, prompts), fields(?case, ?language, model = %self.model))]
  pub async fn practice_example(
    &self,
    prompts: &Prompts,
    case: FactoringCase,
    language: Language,
  ) -> Result<(String, String), GenError> {
    let prompt = build_example_prompt(prompts, case, language);
    let ex: ExampleWire =
      self.generate_json(&prompt, OutputContract::PracticeExample, TEMP_EXAMPLE).await?;
    Ok((ex.problema, ex.resultado))
  }

  /// Generate one trivia fact about a topic picked uniformly at random.
  #[instrument(level = "info", skip(self, prompts, topics), fields(?language, topic_pool = topics.len(), model = %self.model))]
  pub async fn context_fact(
    &self,
    prompts: &Prompts,
    topics: &[String],
    language: Language,
  ) -> Result<MathContextFact, GenError> {
    use rand::seq::SliceRandom;
    let topic = topics
      .choose(&mut rand::thread_rng())
      .map(String::as_str)
      .unwrap_or("the history of algebra");
    info!(target: "generation", %topic, "Context topic chosen");
    let prompt = build_context_prompt(prompts, topic, language);
    let fact: FactWire = self.generate_json(&prompt, OutputContract::ContextFact, TEMP_CONTEXT).await?;
    Ok(MathContextFact { title: fact.title, content: fact.content })
  }
}

// --- Wire DTOs ---

#[derive(Serialize)]
struct GenerateContentRequest {
  contents: Vec<Content>,
  #[serde(rename = "generationConfig")]
  generation_config: GenerationConfig,
}
#[derive(Serialize)]
struct Content {
  parts: Vec<Part>,
}
#[derive(Serialize)]
struct Part {
  text: String,
}
#[derive(Serialize)]
struct GenerationConfig {
  temperature: f32,
  #[serde(rename = "responseMimeType")]
  response_mime_type: String,
  #[serde(rename = "responseSchema")]
  response_schema: serde_json::Value,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
  #[serde(default, rename = "usageMetadata")]
  usage_metadata: Option<UsageMetadata>,
}
#[derive(Deserialize)]
struct Candidate {
  content: Option<CandidateContent>,
}
#[derive(Deserialize)]
struct CandidateContent {
  #[serde(default)]
  parts: Vec<CandidatePart>,
}
#[derive(Deserialize)]
struct CandidatePart {
  text: Option<String>,
}
#[derive(Deserialize)]
struct UsageMetadata {
  #[serde(default, rename = "promptTokenCount")]
  prompt_token_count: Option<u32>,
  #[serde(default, rename = "candidatesTokenCount")]
  candidates_token_count: Option<u32>,
  #[serde(default, rename = "totalTokenCount")]
  total_token_count: Option<u32>,
}

/// Try to extract a clean error message from a Gemini error body.
fn extract_gemini_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap {
    error: EObj,
  }
  #[derive(Deserialize)]
  struct EObj {
    message: String,
  }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}


#[cfg(test)]
mod http_tests {
  use super::*;
  use crate::domain::{FactoringCase, Language};
  use wiremock::matchers::{body_partial_json, header, method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn test_client(uri: &str) -> Gemini {
    Gemini {
      client: reqwest::Client::new(),
      api_key: "test_key".into(),
      base_url: uri.to_string(),
      model: "gemini-2.5-flash".into(),
    }
  }

  fn candidate_body(text: &str) -> serde_json::Value {
    serde_json::json!({
      "candidates": [
        { "content": { "parts": [ { "text": text } ] } }
      ],
      "usageMetadata": { "promptTokenCount": 42, "candidatesTokenCount": 20, "totalTokenCount": 62 }
    })
  }

  #[tokio::test]
  async fn practice_example_decodes_the_contract_fields() {
    let server = MockServer::start().await;
    let gemini = test_client(&server.uri());

    Mock::given(method("POST"))
      .and(path("/models/gemini-2.5-flash:generateContent"))
      .and(header(API_KEY_HEADER, "test_key"))
      .and(body_partial_json(serde_json::json!({
        "generationConfig": { "responseMimeType": "application/json" }
      })))
      .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body(
        r#"{"problema":"x^2 - 9","resultado":"(x-3)(x+3)"}"#,
      )))
      .mount(&server)
      .await;

    let (problem, solution) = gemini
      .practice_example(&Prompts::default(), FactoringCase::DifferenceOfSquares, Language::Es)
      .await
      .unwrap();
    assert_eq!(problem, "x^2 - 9");
    assert_eq!(solution, "(x-3)(x+3)");
  }

  #[tokio::test]
  async fn analysis_passes_invalid_case_through_unchanged() {
    let server = MockServer::start().await;
    let gemini = test_client(&server.uri());

    Mock::given(method("POST"))
      .and(path("/models/gemini-2.5-flash:generateContent"))
      .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body(
        r#"{"tipo":"Unknown Case","esValido":false,"pasos":[],"resultado":"","explicacionMetodo":"no common factor"}"#,
      )))
      .mount(&server)
      .await;

    let analysis = gemini
      .analyze_expression(&Prompts::default(), "x^3 + 1", FactoringCase::AutoDetect, Language::En)
      .await
      .unwrap();
    assert_eq!(analysis.case_label, "Unknown Case");
    assert!(!analysis.is_valid);
    assert!(analysis.steps.is_empty());
    assert_eq!(analysis.method_explanation, "no common factor");
  }

  #[tokio::test]
  async fn http_failure_is_an_error_not_default_content() {
    let server = MockServer::start().await;
    let gemini = test_client(&server.uri());

    Mock::given(method("POST"))
      .and(path("/models/gemini-2.5-flash:generateContent"))
      .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
        "error": { "message": "internal error" }
      })))
      .mount(&server)
      .await;

    let err = gemini
      .analyze_expression(&Prompts::default(), "x^2 - 9", FactoringCase::AutoDetect, Language::Es)
      .await
      .unwrap_err();
    match err {
      GenError::Http { status, message } => {
        assert_eq!(status, 500);
        assert_eq!(message, "internal error");
      }
      other => panic!("expected Http error, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn non_conforming_candidate_text_is_a_decode_error() {
    let server = MockServer::start().await;
    let gemini = test_client(&server.uri());

    Mock::given(method("POST"))
      .and(path("/models/gemini-2.5-flash:generateContent"))
      .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("not json at all")))
      .mount(&server)
      .await;

    let err = gemini
      .practice_example(&Prompts::default(), FactoringCase::CommonFactor, Language::En)
      .await
      .unwrap_err();
    assert!(matches!(err, GenError::Decode(_)), "got {err:?}");
  }

  #[tokio::test]
  async fn context_fact_uses_the_only_configured_topic() {
    let server = MockServer::start().await;
    let gemini = test_client(&server.uri());

    Mock::given(method("POST"))
      .and(path("/models/gemini-2.5-flash:generateContent"))
      .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body(
        r#"{"title":"Broken parts","content":"Al-jabr once meant bone-setting."}"#,
      )))
      .mount(&server)
      .await;

    let topics = vec!["The origin of mathematical symbols (like x, =, zero)".to_string()];
    let fact = gemini
      .context_fact(&Prompts::default(), &topics, Language::En)
      .await
      .unwrap();
    assert_eq!(fact.title, "Broken parts");

    // With a single topic the prompt is deterministic: assert it was sent.
    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let text = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(text.contains("The origin of mathematical symbols"));
  }
}
