//! Loading tutor configuration (prompt templates + optional topic bank) from TOML.
//!
//! See `TutorConfig` and `Prompts` for expected schema.

use serde::Deserialize;
use tracing::{info, error};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct TutorConfig {
  #[serde(default)]
  pub prompts: Prompts,
  /// Optional override of the built-in trivia topic list.
  #[serde(default)]
  pub topics: Vec<String>,
}

/// Prompt templates used by the generation client. Defaults are the tutor's
/// stock Spanish prompts; override them in TOML to tune tone or structure.
/// Placeholders: `{expression}`, `{case}`, `{topic}`, `{lang_instruction}`.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  /// Analysis, auto-detect variant: the model decides which case applies.
  pub analysis_auto_template: String,
  /// Analysis, case-specific variant: the model tests one named method.
  pub analysis_case_template: String,
  pub example_template: String,
  pub context_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      analysis_auto_template: r#"Analiza la siguiente expresión algebraica: "{expression}".
1. Identifica si corresponde a uno de los siguientes casos de factoreo: Factor Común, Diferencia de Cuadrados, Trinomio Cuadrado Perfecto, o Trinomio de la forma x² + bx + c.
2. Si corresponde a uno de los casos, proporciona una solución detallada paso a paso.
3. Muestra la expresión final factorizada.
4. Explica la teoría detrás del método de factoreo utilizado de forma muy breve y sencilla, en 1 o 2 frases como máximo.
5. Si la expresión no corresponde a ninguno de estos casos o es muy compleja, indícalo claramente y explica de forma sencilla por qué.
6. Usa el símbolo ^ para los exponentes (ej. x^2).
7. {lang_instruction}"#.into(),
      analysis_case_template: r#"Analiza si la expresión algebraica "{expression}" se puede resolver usando el método de "{case}".
1. Confirma si la expresión es un ejemplo válido de este caso.
2. Si lo es, proporciona una solución detallada paso a paso para este método específico.
3. Muestra la expresión final factorizada usando este método.
4. Explica por qué el método "{case}" es aplicable aquí de forma muy breve y sencilla, en 1 o 2 frases como máximo.
5. Si la expresión NO corresponde a este caso, explica claramente y de forma sencilla por qué no se puede aplicar este método y establece 'esValido' en 'false'.
6. Usa el símbolo ^ para los exponentes (ej. x^2).
7. {lang_instruction}"#.into(),
      example_template: r#"Genera un ejemplo simple y claro de un ejercicio de factoreo para el caso: "{case}".
- El problema debe ser fácil de entender para un estudiante.
- Proporciona tanto el problema como su solución factorizada.
- Usa el símbolo ^ para los exponentes (ej. x^2).
- {lang_instruction}"#.into(),
      context_template: r#"Tell me a surprising and interesting fact specifically about: "{topic}".
- Focus on something less known or curious related to mathematics.
- Keep it short, engaging, and educational (max 3 sentences).
- Do not simply define the term, give a 'fun fact'.
- {lang_instruction}"#.into(),
    }
  }
}

/// Attempt to load `TutorConfig` from TUTOR_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_tutor_config_from_env() -> Option<TutorConfig> {
  let path = std::env::var("TUTOR_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<TutorConfig>(&s) {
      Ok(cfg) => {
        info!(target: "factoreo_backend", %path, "Loaded tutor config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "factoreo_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "factoreo_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_templates_keep_their_placeholders() {
    let p = Prompts::default();
    assert!(p.analysis_auto_template.contains("{expression}"));
    assert!(!p.analysis_auto_template.contains("{case}"));
    assert!(p.analysis_case_template.contains("{expression}"));
    assert!(p.analysis_case_template.contains("{case}"));
    assert!(p.example_template.contains("{case}"));
    assert!(p.context_template.contains("{topic}"));
  }

  #[test]
  fn toml_override_replaces_only_given_fields() {
    let cfg: TutorConfig = toml::from_str(
      r#"
        topics = ["History of zero"]

        [prompts]
        analysis_auto_template = "a {expression} {lang_instruction}"
        analysis_case_template = "b {expression} {case} {lang_instruction}"
        example_template = "c {case} {lang_instruction}"
        context_template = "d {topic} {lang_instruction}"
      "#,
    )
    .unwrap();
    assert_eq!(cfg.topics.len(), 1);
    assert!(cfg.prompts.example_template.starts_with('c'));
  }
}
